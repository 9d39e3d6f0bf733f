//! Diagnostics for definition building.
//!
//! The builder never renders anything. Each failure becomes a
//! [`Diagnostic`] carrying:
//! - A stable error code for searchability
//! - A one-line message (what went wrong)
//! - A primary label (where it went wrong)
//! - Secondary labels for the other sites involved (duplicates, cycles)
//! - Notes with context
//!
//! Turning that into terminal output is left to the presentation layer.

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
