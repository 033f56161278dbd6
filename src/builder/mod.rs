//! Builder API for ergonomic machine and callback construction.
//!
//! This module provides fluent builders for machine definitions and their
//! callbacks. Machine definitions are validated as a whole when built, so
//! every problem is reported in one pass.

pub mod callback;
pub mod error;
pub mod machine;

pub use callback::CallbackBuilder;
pub use error::{BuildError, DefinitionError};
pub use machine::MachineBuilder;
