//! Reporting for cleanup failures that cannot be propagated
//!
//! A cleanup action that panics while its thread is already unwinding must not
//! escape the destructor: that would abort the process and hide the failure
//! that started the unwind. Such panics are caught here and handed to the
//! configured reporter instead. A reporter that panics itself is contained
//! the same way and the failure falls back to the default log line.

use crate::errors::{Error, Result};
use crate::unwind;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

type Reporter = Arc<dyn Fn(&SuppressedFailure) + Send + Sync>;

/// Process-wide reporter; `None` means the default tracing reporter
static REPORTER: Lazy<RwLock<Option<Reporter>>> = Lazy::new(|| RwLock::new(None));

/// Which kind of cleanup produced a suppressed failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureOrigin {
    ScopeExit,
    ScopeFail,
    ScopeSuccess,
    UniqueResource,
}

impl FailureOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureOrigin::ScopeExit => "scope-exit",
            FailureOrigin::ScopeFail => "scope-fail",
            FailureOrigin::ScopeSuccess => "scope-success",
            FailureOrigin::UniqueResource => "unique-resource",
        }
    }
}

impl fmt::Display for FailureOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cleanup panic that was contained instead of propagated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressedFailure {
    pub origin: FailureOrigin,
    pub message: String,
}

/// Install a reporter for suppressed failures.
///
/// Returns `true` if a previously installed reporter was replaced.
pub fn set_reporter<F>(reporter: F) -> bool
where
    F: Fn(&SuppressedFailure) + Send + Sync + 'static,
{
    REPORTER.write().replace(Arc::new(reporter)).is_some()
}

/// Restore the default reporter, which logs through `tracing`
pub fn reset_reporter() {
    REPORTER.write().take();
}

fn log_suppressed(failure: &SuppressedFailure) {
    tracing::warn!(
        origin = %failure.origin,
        reason = %failure.message,
        "cleanup panicked during unwinding, suppressed"
    );
}

/// Hand a suppressed failure to the configured reporter.
///
/// Never panics: a panicking reporter is logged and the failure is logged
/// by the default reporter instead.
pub fn report(failure: &SuppressedFailure) {
    // Clone out of the lock so a reporter may reconfigure reporting itself
    let reporter = REPORTER.read().clone();
    let Some(reporter) = reporter else {
        log_suppressed(failure);
        return;
    };

    if let Err(payload) = unwind::catch(AssertUnwindSafe(|| reporter(failure))) {
        tracing::error!(
            reason = %panic_message(payload.as_ref()),
            "failure reporter panicked"
        );
        log_suppressed(failure);
    }
}

/// Run `f`, containing any panic it raises.
///
/// A contained panic is reported and returned as [`Error::Suppressed`].
pub fn contain<F>(origin: FailureOrigin, f: F) -> Result<()>
where
    F: FnOnce(),
{
    // The caller is discarding the state `f` touched, so observing it
    // half-updated after a panic is not a concern.
    unwind::catch(AssertUnwindSafe(f)).map_err(|payload| {
        let failure = SuppressedFailure {
            origin,
            message: panic_message(payload.as_ref()),
        };
        report(&failure);
        Error::suppressed(&failure)
    })
}

/// Extract a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
