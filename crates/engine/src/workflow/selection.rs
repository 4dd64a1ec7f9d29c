//! Choosing a variable for a property.
//!
//! When the user asks to bind a property, the chain offers every earlier instance whose return
//! type matches the property and freezes its structure until the choice is committed or
//! cancelled. While frozen, nothing may be appended, removed, or run.

use tracing::debug;

use crate::{
    error::ActionError,
    instance::InstanceId,
    workflow::chain::{ChainState, WorkflowChain},
};

/// Property waiting for the user to pick a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub target: InstanceId,
    pub property: String,
}

impl ChainState {
    fn candidates(&self, target: InstanceId, property: &str) -> Result<Vec<InstanceId>, ActionError> {
        let target_index = self.index_of(target)?;
        let expected = self.instances[target_index].spec(property)?.value_type;
        Ok(self.instances[..target_index]
            .iter()
            .filter(|instance| instance.return_type() == expected)
            .map(|instance| instance.id())
            .collect())
    }
}

impl WorkflowChain {
    /// Instances that `property` on `target` may be bound to, in chain order.
    pub fn candidates(&self, target: InstanceId, property: &str) -> Result<Vec<InstanceId>, ActionError> {
        self.state.borrow().candidates(target, property)
    }

    /// Freezes the chain and returns the candidates for `property` on `target`.
    pub fn begin_selection(&self, target: InstanceId, property: &str) -> Result<Vec<InstanceId>, ActionError> {
        let mut state = self.state.borrow_mut();
        state.ensure_structure_editable()?;
        let candidates = state.candidates(target, property)?;
        state.selection = Some(PendingSelection {
            target,
            property: property.to_string(),
        });
        debug!(instance = %target, property, candidates = candidates.len(), "choosing variable");
        Ok(candidates)
    }

    /// Binds the pending property to `source` and unfreezes the chain. A refused binding keeps
    /// the selection open.
    pub fn commit_selection(&self, source: InstanceId) -> Result<(), ActionError> {
        let mut state = self.state.borrow_mut();
        let selection = state.selection.clone().ok_or(ActionError::NoSelection)?;
        state.bind(selection.target, &selection.property, source)?;
        state.selection = None;
        Ok(())
    }

    /// Abandons the pending selection, leaving the property as it was.
    pub fn cancel_selection(&self) -> Result<(), ActionError> {
        self.state
            .borrow_mut()
            .selection
            .take()
            .map(|_| ())
            .ok_or(ActionError::NoSelection)
    }

    pub fn selection(&self) -> Option<PendingSelection> {
        self.state.borrow().selection.clone()
    }

    /// True while a variable selection is in progress.
    pub fn is_frozen(&self) -> bool {
        self.state.borrow().selection.is_some()
    }
}
