//! Scope-bound cleanup for Rust.
//!
//! Two families of tools:
//!
//! - **Scope guards** ([`scope_exit`], [`scope_fail`], [`scope_success`]) run
//!   a closure when they are dropped, always, only while a panic unwinds, or
//!   only on a normal exit.
//! - **[`UniqueResource`]** owns a non-pointer handle (a descriptor, an index,
//!   an OS handle) together with the function that releases it, and calls that
//!   function exactly once when ownership ends.
//!
//! Guards and wrappers declared in one scope are dropped, and so fire, in
//! reverse declaration order. Moving one moves its cleanup obligation with
//! it. None of the types synchronise; sharing one across threads is not
//! supported.
//!
//! ```
//! use tidyup::{make_unique_resource_checked, scope_fail};
//!
//! fn open(ok: bool) -> i32 {
//!     if ok { 3 } else { -1 }
//! }
//!
//! let fd = make_unique_resource_checked(open(true), &-1, |fd: &mut i32| {
//!     // close(*fd)
//!     let _ = fd;
//! });
//! assert!(fd.is_armed());
//!
//! let missing = make_unique_resource_checked(open(false), &-1, |_: &mut i32| {});
//! assert!(!missing.is_armed());
//!
//! let mut undo = scope_fail(|| println!("rolling back"));
//! undo.release();
//! ```

pub mod action;
pub mod checked;
pub mod guard;
mod macros;
pub mod resource;

pub use action::{ActionState, ExitAction};
pub use checked::{make_unique_resource_checked, try_make_unique_resource_checked};
pub use guard::{
    scope_exit, scope_fail, scope_success, Always, OnSuccess, OnUnwind, Policy, ScopeExit,
    ScopeFail, ScopeGuard, ScopeSuccess,
};
pub use resource::{Deleter, UniqueResource};
pub use tidyup_core::{report, unwind, Error, FailureOrigin, Result, SuppressedFailure};
