use thiserror::Error;

use actions_types::ValueType;

use crate::instance::InstanceId;

/// Errors surfaced by registry lookups, property edits, bindings, and chain edits.
///
/// Every error is recoverable: the operation that produced it leaves the chain and its
/// instances exactly as they were.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// No variant is registered under the requested identifier.
    #[error("unknown action variant '{0}'")]
    UnknownVariant(String),
    /// The variant declares no property with this name.
    #[error("action '{variant}' has no property '{property}'")]
    UnknownProperty { variant: String, property: String },
    /// The instance is not part of the workflow.
    #[error("action {0} is not part of this workflow")]
    UnknownInstance(InstanceId),
    /// A literal edit was rejected because of its type or range.
    #[error("invalid value for '{property}': {reason}")]
    InvalidValue { property: String, reason: String },
    /// The binding source returns a different type than the property declares.
    #[error("property '{property}' expects {expected} but the selected action returns {found}")]
    TypeMismatch {
        property: String,
        expected: ValueType,
        found: ValueType,
    },
    /// The binding source is missing or does not run before the bound property's owner.
    #[error("property '{property}' can only use variables from actions that run before it (got {source_id})")]
    InvalidReference { property: String, source_id: InstanceId },
    /// A structural edit or run was requested while the workflow is running.
    #[error("the workflow is running")]
    AlreadyRunning,
    /// A structural edit or run was requested while a variable is being chosen.
    #[error("the workflow is waiting for a variable to be chosen")]
    ChainFrozen,
    /// A selection was committed or cancelled without one being in progress.
    #[error("no variable selection is in progress")]
    NoSelection,
}
