//! Build errors for machine and callback builders.

use thiserror::Error;

/// Errors that can occur when building machines and callbacks.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("State reader not specified. Call .reader(fn) before .build()")]
    MissingReader,

    #[error("State writer not specified. Call .writer(fn) before .build()")]
    MissingWriter,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("Callback body not specified. Call .run(fn) or .hooks(before_yield, after_yield)")]
    MissingBody,

    #[error("Before callbacks always run. Use .around() or .after() to depend on the outcome")]
    ConditionOnBefore,

    #[error("Invalid machine definition ({} problems)", .0.len())]
    InvalidDefinition(Vec<DefinitionError>),
}

/// A single problem found while validating a machine definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    #[error("State '{0}' is defined more than once")]
    DuplicateState(String),

    #[error("Event '{0}' is defined more than once")]
    DuplicateEvent(String),

    #[error("Callback '{callback}' references unknown state '{state}'")]
    UnknownState { callback: String, state: String },

    #[error("Callback '{callback}' references unknown event '{event}'")]
    UnknownEvent { callback: String, event: String },
}
