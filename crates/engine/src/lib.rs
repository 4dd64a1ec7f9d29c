//! # Actions Engine
//!
//! The engine assembles and runs workflows: linear chains of small automation steps such as
//! sending a notification, playing an alert, waiting, or storing a variable. One action's
//! return value can feed a property of any later action through a variable binding.
//!
//! ## Usage
//!
//! ```rust
//! use actions_engine::{ActionRegistry, RecordingHost, RunStatus, WorkflowChain};
//! use actions_types::PropertyValue;
//!
//! let registry = ActionRegistry::builtin();
//! let chain = WorkflowChain::new();
//!
//! let name = chain.append(registry.instantiate("text")?)?;
//! chain.configure(name, "string", PropertyValue::from("build finished"))?;
//! let notify = chain.append(registry.instantiate("notification")?)?;
//! chain.bind(notify, "title", name)?;
//!
//! let recording = RecordingHost::new();
//! chain.run(recording.host())?;
//!
//! assert_eq!(chain.status(), RunStatus::Completed);
//! assert_eq!(recording.notifications.sent()[0].title, "build finished");
//! # Ok::<(), actions_engine::ActionError>(())
//! ```
//!
//! ## Architecture
//!
//! - **`registry`**: immutable catalog of action variants
//! - **`instance`**: configured actions with properties, bindings, and a return slot
//! - **`resolve`**: copies bound return values into properties right before an action runs
//! - **`executor`**: variant behaviors and the host collaborators they call
//! - **`workflow`**: the ordered chain, its run protocol, and variable selection

pub mod error;
pub mod executor;
pub mod instance;
pub mod registry;
pub mod resolve;
pub mod workflow;

// Re-export commonly used types for convenience
pub use error::ActionError;
pub use executor::{
    ActionHost, AlertSink, ManualTimer, NotificationSink, Outcome, PreparedAction, RecordingHost, SentNotification, TimerCallback,
    TimerService, execute_action,
};
pub use instance::{ActionInstance, InstanceId, InstancePhase, PropertySlot};
pub use registry::{ActionRegistry, MAX_WAIT_SECONDS, VariantCategory};
pub use workflow::{ChainEvent, PendingSelection, RunStatus, WorkflowChain};
