//! Core executor data types.

use actions_types::{PropertyValue, VariantKind};
use indexmap::IndexMap;

use crate::instance::InstanceId;

/// An instance whose bindings have been resolved, ready to run.
///
/// This is the unit executed by the engine. Each `PreparedAction` is derived from an
/// `ActionInstance` right before it runs, so bound values reflect earlier return slots.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAction {
    /// Position in the chain.
    pub index: usize,
    /// Instance being executed.
    pub instance: InstanceId,
    /// Behavior template.
    pub kind: VariantKind,
    /// Property values in effect for this run, in declaration order.
    pub values: IndexMap<String, PropertyValue>,
}

impl PreparedAction {
    /// Numeric property value, or `0.0` when missing.
    pub fn number(&self, name: &str) -> f64 {
        self.values.get(name).and_then(PropertyValue::as_number).unwrap_or_default()
    }

    /// Text property value, or `""` when missing.
    pub fn text(&self, name: &str) -> &str {
        self.values.get(name).and_then(PropertyValue::as_text).unwrap_or_default()
    }
}

/// How an action finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The action completed; later actions may run. Carries the return value, if any.
    Finished(Option<PropertyValue>),
    /// The action completed and the workflow must not advance.
    Halted,
}

/// Continuation handed to a behavior; called exactly once if the behavior completes.
pub type Completion = Box<dyn FnOnce(Outcome)>;
