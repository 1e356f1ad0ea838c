/// Run the given statements when the enclosing block ends, by any path.
///
/// ```
/// use std::cell::Cell;
///
/// let closed = Cell::new(false);
/// {
///     tidyup::scope_exit! { closed.set(true) }
///     assert!(!closed.get());
/// }
/// assert!(closed.get());
/// ```
#[macro_export]
macro_rules! scope_exit {
    ($($body:tt)*) => {
        let _scope_exit_guard = $crate::guard::scope_exit(|| { $($body)* });
    };
}

/// Run the given statements if the enclosing block is left by unwinding.
///
/// ```
/// use std::cell::Cell;
/// use std::panic::{self, AssertUnwindSafe};
///
/// let rolled_back = Cell::new(false);
/// let _ = panic::catch_unwind(AssertUnwindSafe(|| {
///     tidyup::scope_fail! { rolled_back.set(true) }
///     panic!("write failed");
/// }));
/// assert!(rolled_back.get());
/// ```
#[macro_export]
macro_rules! scope_fail {
    ($($body:tt)*) => {
        let _scope_fail_guard = $crate::guard::scope_fail(|| { $($body)* });
    };
}

/// Run the given statements if the enclosing block is left normally.
///
/// ```
/// use std::cell::Cell;
///
/// let committed = Cell::new(false);
/// {
///     tidyup::scope_success! { committed.set(true) }
/// }
/// assert!(committed.get());
/// ```
#[macro_export]
macro_rules! scope_success {
    ($($body:tt)*) => {
        let _scope_success_guard = $crate::guard::scope_success(|| { $($body)* });
    };
}
