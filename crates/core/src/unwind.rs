//! Abnormal-exit detection
//!
//! A scope exits abnormally when a failure starts propagating through it. The
//! host mechanism here is panic unwinding: the number of failures in flight on
//! the current thread is sampled when a guard is created and again when it is
//! dropped, and the scope is failing iff that number went up in between.
//!
//! `std::thread::panicking()` only says whether *some* panic is in flight, but
//! a `Drop` running during unwinding may raise and catch a nested panic of its
//! own. To tell those apart, a panic hook (installed on first use, chained in
//! front of any existing hook) counts panics started on each thread. While the
//! thread is not panicking the count reads as 0.
//!
//! Nested panics raised with `resume_unwind` bypass the hook and are not
//! counted. A nested panic caught by a bare `catch_unwind` while the thread
//! is already unwinding stays counted until the outer unwind ends; panics
//! contained by [`crate::report::contain`] are uncounted when caught.

use std::cell::Cell;
use std::panic;
use std::sync::Once;
use std::thread;

static HOOK: Once = Once::new();

thread_local! {
    /// Panics started on this thread since it last observed no panic
    static STARTED: Cell<usize> = const { Cell::new(0) };
}

fn started() -> usize {
    STARTED.try_with(Cell::get).unwrap_or(0)
}

fn set_started(count: usize) {
    let _ = STARTED.try_with(|started| started.set(count));
}

/// Install the counting hook. Setting a hook from a panicking thread is not
/// allowed, so installation waits for the first call outside of unwinding.
fn install_hook() {
    if HOOK.is_completed() || thread::panicking() {
        return;
    }

    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            set_started(started() + 1);
            previous(info);
        }));
        tracing::trace!("panic depth tracking installed");
    });
}

/// Number of failures currently propagating through the calling thread
pub fn in_flight() -> usize {
    install_hook();
    if !thread::panicking() {
        set_started(0);
        return 0;
    }
    // A panic that started before the hook existed is still one in flight
    started().max(1)
}

/// Run `f` under `catch_unwind`, uncounting any panic it raises
pub(crate) fn catch<F, T>(f: F) -> thread::Result<T>
where
    F: FnOnce() -> T + panic::UnwindSafe,
{
    let before = started();
    let result = panic::catch_unwind(f);
    if result.is_err() {
        set_started(before);
    }
    result
}

/// The in-flight failure count observed at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnwindSnapshot {
    depth: usize,
}

impl UnwindSnapshot {
    /// Sample the current in-flight failure count
    #[inline]
    pub fn capture() -> Self {
        Self { depth: in_flight() }
    }

    /// The count observed by [`UnwindSnapshot::capture`]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether more failures are in flight now than when the snapshot was taken
    #[inline]
    pub fn exiting_abnormally(&self) -> bool {
        in_flight() > self.depth
    }
}
