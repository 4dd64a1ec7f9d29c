//! Workflow chain runtime.
//!
//! The chain owns its action instances, validates bindings between them, runs them in order,
//! and reports progress through [`ChainEvent`]s.

pub mod chain;
pub mod selection;
pub mod state;

pub use chain::WorkflowChain;
pub use selection::PendingSelection;
pub use state::{ChainEvent, RunStatus};
