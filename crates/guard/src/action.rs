//! Invoke-once holder for a cleanup callable

use std::fmt;
use tidyup_core::report::{self, FailureOrigin};
use tidyup_core::Result;

/// Observable lifecycle of an [`ExitAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// Will run on the next [`ExitAction::invoke`]
    Armed,
    /// Disarmed by [`ExitAction::release`] without running
    Released,
    /// Already ran (or started running and panicked)
    Invoked,
}

enum Slot<F> {
    Armed(F),
    Released,
    Invoked,
}

/// A zero-argument callable that runs at most once.
///
/// Dropping an `ExitAction` never runs it; firing is left to the guards that
/// own one.
pub struct ExitAction<F: FnOnce()> {
    slot: Slot<F>,
}

impl<F: FnOnce()> ExitAction<F> {
    /// Create an armed action
    pub fn new(action: F) -> Self {
        Self {
            slot: Slot::Armed(action),
        }
    }

    pub fn state(&self) -> ActionState {
        match self.slot {
            Slot::Armed(_) => ActionState::Armed,
            Slot::Released => ActionState::Released,
            Slot::Invoked => ActionState::Invoked,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.slot, Slot::Armed(_))
    }

    /// Disarm without running. Returns `true` if this call did the disarming.
    pub fn release(&mut self) -> bool {
        if self.is_armed() {
            self.slot = Slot::Released;
            true
        } else {
            false
        }
    }

    /// Run the action if still armed. Returns whether it ran.
    ///
    /// The action is marked invoked before it starts, so a panicking action is
    /// never attempted again.
    pub fn invoke(&mut self) -> bool {
        match self.take() {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    /// Like [`ExitAction::invoke`], but a panic from the action is contained
    /// and reported instead of propagated.
    pub fn invoke_contained(&mut self, origin: FailureOrigin) -> Result<bool> {
        match self.take() {
            Some(action) => report::contain(origin, action).map(|()| true),
            None => Ok(false),
        }
    }

    fn take(&mut self) -> Option<F> {
        if !self.is_armed() {
            return None;
        }
        match std::mem::replace(&mut self.slot, Slot::Invoked) {
            Slot::Armed(action) => Some(action),
            _ => None,
        }
    }
}

impl<F: FnOnce()> fmt::Debug for ExitAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitAction")
            .field("state", &self.state())
            .finish()
    }
}
