//! Core types shared by the tidyup guards.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias.
//! - **`unwind`**: detects whether a scope is being left because a failure is
//!   propagating through it.
//! - **`report`**: contains cleanup panics that happen during unwinding and
//!   routes them to a configurable reporter.

pub mod errors;
pub mod report;
pub mod unwind;

pub use self::{
    errors::{Error, Result},
    report::{FailureOrigin, SuppressedFailure},
    unwind::UnwindSnapshot,
};
