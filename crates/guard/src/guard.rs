//! Scope guards that run an action when their scope ends
//!
//! One guard type, three firing policies:
//!
//! | alias            | runs the action when the scope is left ...      |
//! |------------------|-------------------------------------------------|
//! | [`ScopeExit`]    | by any path                                     |
//! | [`ScopeFail`]    | because a panic is unwinding through it         |
//! | [`ScopeSuccess`] | normally                                        |
//!
//! A panic from the action propagates to the caller when the scope is left
//! normally. When the thread is already unwinding, the panic is contained and
//! handed to the reporter in [`tidyup_core::report`], because letting it
//! escape would abort the process.

use crate::action::ExitAction;
use std::fmt;
use std::marker::PhantomData;
use tidyup_core::report::FailureOrigin;
use tidyup_core::unwind::{self, UnwindSnapshot};

mod sealed {
    pub trait Sealed {}
}

/// Decides whether a guard fires, given the unwind state at its creation
pub trait Policy: sealed::Sealed {
    /// Reported origin when this guard's action panics during unwinding
    const ORIGIN: FailureOrigin;

    fn should_fire(entered: &UnwindSnapshot) -> bool;
}

/// Fire on every exit
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

/// Fire only when the scope is left by unwinding
#[derive(Debug, Clone, Copy, Default)]
pub struct OnUnwind;

/// Fire only when the scope is left normally
#[derive(Debug, Clone, Copy, Default)]
pub struct OnSuccess;

impl sealed::Sealed for Always {}
impl sealed::Sealed for OnUnwind {}
impl sealed::Sealed for OnSuccess {}

impl Policy for Always {
    const ORIGIN: FailureOrigin = FailureOrigin::ScopeExit;

    #[inline]
    fn should_fire(_entered: &UnwindSnapshot) -> bool {
        true
    }
}

impl Policy for OnUnwind {
    const ORIGIN: FailureOrigin = FailureOrigin::ScopeFail;

    #[inline]
    fn should_fire(entered: &UnwindSnapshot) -> bool {
        entered.exiting_abnormally()
    }
}

impl Policy for OnSuccess {
    const ORIGIN: FailureOrigin = FailureOrigin::ScopeSuccess;

    #[inline]
    fn should_fire(entered: &UnwindSnapshot) -> bool {
        !entered.exiting_abnormally()
    }
}

/// Runs an action when dropped, if still armed and `P` allows it
#[must_use = "a scope guard fires when dropped; binding it to `_` drops it immediately"]
pub struct ScopeGuard<F: FnOnce(), P: Policy> {
    action: ExitAction<F>,
    entered: UnwindSnapshot,
    _policy: PhantomData<P>,
}

/// Runs its action whenever the scope ends
pub type ScopeExit<F> = ScopeGuard<F, Always>;

/// Runs its action only when the scope ends by unwinding
pub type ScopeFail<F> = ScopeGuard<F, OnUnwind>;

/// Runs its action only when the scope ends normally
pub type ScopeSuccess<F> = ScopeGuard<F, OnSuccess>;

impl<F: FnOnce(), P: Policy> ScopeGuard<F, P> {
    /// Create an armed guard
    pub fn new(action: F) -> Self {
        Self {
            action: ExitAction::new(action),
            entered: UnwindSnapshot::capture(),
            _policy: PhantomData,
        }
    }

    /// Disarm the guard; dropping it then does nothing
    pub fn release(&mut self) {
        if self.action.release() {
            tracing::trace!(policy = %P::ORIGIN, "scope guard released");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.action.is_armed()
    }
}

impl<F: FnOnce(), P: Policy> Drop for ScopeGuard<F, P> {
    fn drop(&mut self) {
        if !self.action.is_armed() {
            return;
        }

        if !P::should_fire(&self.entered) {
            tracing::trace!(policy = %P::ORIGIN, "scope guard skipped");
            self.action.release();
            return;
        }

        tracing::trace!(policy = %P::ORIGIN, "scope guard firing");
        if unwind::in_flight() > 0 {
            // The reporter has already seen the failure; nothing left to surface
            let _ = self.action.invoke_contained(P::ORIGIN);
        } else {
            self.action.invoke();
        }
    }
}

impl<F: FnOnce(), P: Policy> fmt::Debug for ScopeGuard<F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("policy", &P::ORIGIN)
            .field("armed", &self.is_armed())
            .field("entered", &self.entered)
            .finish()
    }
}

/// Run `action` when the returned guard is dropped
pub fn scope_exit<F: FnOnce()>(action: F) -> ScopeExit<F> {
    ScopeGuard::new(action)
}

/// Run `action` if the returned guard is dropped during unwinding
pub fn scope_fail<F: FnOnce()>(action: F) -> ScopeFail<F> {
    ScopeGuard::new(action)
}

/// Run `action` if the returned guard is dropped without unwinding
pub fn scope_success<F: FnOnce()>(action: F) -> ScopeSuccess<F> {
    ScopeGuard::new(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_policies_outside_unwinding() {
        let entered = UnwindSnapshot::capture();
        assert!(Always::should_fire(&entered));
        assert!(!OnUnwind::should_fire(&entered));
        assert!(OnSuccess::should_fire(&entered));
    }

    #[test]
    fn test_release_twice() {
        let fired = Cell::new(false);
        {
            let mut guard = scope_exit(|| fired.set(true));
            guard.release();
            guard.release();
            assert!(!guard.is_armed());
        }
        assert!(!fired.get());
    }

    #[test]
    fn test_skipped_guard_drops_action_unrun() {
        let fired = Cell::new(false);
        {
            let guard = scope_fail(|| fired.set(true));
            assert!(guard.is_armed());
        }
        assert!(!fired.get());
    }

    #[test]
    fn test_debug_output() {
        let guard = scope_success(|| {});
        let rendered = format!("{guard:?}");
        assert!(rendered.starts_with("ScopeGuard { policy: ScopeSuccess, armed: true"));
    }
}
