//! Run status and lifecycle events.
//!
//! A chain reports progress through an optional unbounded channel so the presentation layer
//! can reflect execution without polling. Sending never blocks and a dropped receiver is
//! ignored.

use actions_types::PropertyValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::instance::InstanceId;

/// Lifecycle of the most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The chain has not been run yet.
    #[default]
    Idle,
    /// A run is in progress. A run halted by an `end` action stays here.
    Running,
    /// Every instance finished.
    Completed,
}

/// Event emitted while a chain runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChainEvent {
    RunStarted {
        at: DateTime<Utc>,
        actions: usize,
    },
    InstanceStarted {
        index: usize,
        instance: InstanceId,
        variant: String,
        at: DateTime<Utc>,
    },
    InstanceFinished {
        index: usize,
        instance: InstanceId,
        return_value: Option<PropertyValue>,
        at: DateTime<Utc>,
    },
    /// An action stopped the workflow; no further events follow for this run.
    RunHalted {
        index: usize,
        at: DateTime<Utc>,
    },
    RunCompleted {
        finished_at: DateTime<Utc>,
    },
}

/// Optional event channel.
#[derive(Debug, Default)]
pub(crate) struct EventEmitter {
    sender: Option<UnboundedSender<ChainEvent>>,
}

impl EventEmitter {
    pub(crate) fn set(&mut self, sender: Option<UnboundedSender<ChainEvent>>) {
        self.sender = sender;
    }

    pub(crate) fn emit(&self, event: ChainEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
