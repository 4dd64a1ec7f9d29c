//! Configured, runnable occurrences of an action variant.
//!
//! An [`ActionInstance`] owns its property values, an optional binding per property, and a
//! single return slot. It knows nothing about how it is displayed; the presentation layer
//! refers to instances by [`InstanceId`].

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use actions_types::{PropertySpec, PropertyValue, ValueType, VariantDescriptor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{error::ActionError, resolve::bound_value};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an action instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Execution phase of an instance within the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstancePhase {
    /// Not yet reached by the current run.
    #[default]
    Idle,
    /// Reading bound values from earlier instances.
    Resolving,
    /// Performing its behavior.
    Running,
    /// Finished for this run.
    Done,
}

/// Current state of a single property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySlot {
    literal: PropertyValue,
    binding: Option<InstanceId>,
    resolved: Option<PropertyValue>,
}

impl PropertySlot {
    fn new(default: PropertyValue) -> Self {
        Self {
            literal: default,
            binding: None,
            resolved: None,
        }
    }

    /// Last literal value entered for this property.
    pub fn literal(&self) -> &PropertyValue {
        &self.literal
    }

    /// Source instance when the property is bound to a variable.
    pub fn binding(&self) -> Option<InstanceId> {
        self.binding
    }

    /// Value in effect: the resolved variable when bound and resolved, otherwise the literal.
    pub fn value(&self) -> &PropertyValue {
        match (&self.binding, &self.resolved) {
            (Some(_), Some(resolved)) => resolved,
            _ => &self.literal,
        }
    }
}

/// A configured action occupying one slot of a workflow chain.
#[derive(Debug)]
pub struct ActionInstance {
    id: InstanceId,
    variant: Arc<VariantDescriptor>,
    properties: IndexMap<String, PropertySlot>,
    return_value: Option<PropertyValue>,
    phase: InstancePhase,
}

impl ActionInstance {
    /// Creates an instance with the variant's default property values.
    pub fn new(variant: Arc<VariantDescriptor>) -> Self {
        let properties = variant
            .properties
            .iter()
            .map(|spec| (spec.name.clone(), PropertySlot::new(spec.default.clone())))
            .collect();
        Self {
            id: InstanceId::next(),
            variant,
            properties,
            return_value: None,
            phase: InstancePhase::Idle,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn variant(&self) -> &VariantDescriptor {
        &self.variant
    }

    pub fn phase(&self) -> InstancePhase {
        self.phase
    }

    /// Value written by the most recent run, if the instance has finished.
    pub fn return_value(&self) -> Option<&PropertyValue> {
        self.return_value.as_ref()
    }

    /// Type of the return slot.
    pub fn return_type(&self) -> ValueType {
        self.variant.return_type
    }

    pub fn property(&self, name: &str) -> Option<&PropertySlot> {
        self.properties.get(name)
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertySlot)> {
        self.properties.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    /// Value currently in effect for `name`.
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name).map(PropertySlot::value)
    }

    /// Sets a literal value. On error the previous literal is kept.
    pub fn configure(&mut self, name: &str, value: PropertyValue) -> Result<(), ActionError> {
        let spec = self.spec(name)?;
        validate_literal(spec, &value)?;
        if let Some(slot) = self.properties.get_mut(name) {
            slot.literal = value;
        }
        Ok(())
    }

    /// Removes the binding on `name`, returning the source it pointed to.
    pub fn clear_binding(&mut self, name: &str) -> Result<Option<InstanceId>, ActionError> {
        self.spec(name)?;
        Ok(self.properties.get_mut(name).and_then(|slot| {
            slot.resolved = None;
            slot.binding.take()
        }))
    }

    /// Declared schema for `name`.
    pub fn spec(&self, name: &str) -> Result<&PropertySpec, ActionError> {
        self.variant.property(name).ok_or_else(|| ActionError::UnknownProperty {
            variant: self.variant.identifier.clone(),
            property: name.to_string(),
        })
    }

    /// Names of properties bound to `source`.
    pub fn bindings_to(&self, source: InstanceId) -> Vec<String> {
        self.properties
            .iter()
            .filter(|(_, slot)| slot.binding == Some(source))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Clears every binding that reads from `source` and returns the affected property names.
    pub(crate) fn unbind_from(&mut self, source: InstanceId) -> Vec<String> {
        let mut cleared = Vec::new();
        for (name, slot) in &mut self.properties {
            if slot.binding == Some(source) {
                slot.binding = None;
                slot.resolved = None;
                cleared.push(name.clone());
            }
        }
        cleared
    }

    /// Installs a binding. Ordering and type checks are the chain's job.
    pub(crate) fn set_binding(&mut self, name: &str, source: InstanceId) {
        if let Some(slot) = self.properties.get_mut(name) {
            slot.binding = Some(source);
            slot.resolved = None;
        }
    }

    /// Copies the return values of bound sources into the property map and returns the values
    /// the behavior should run with.
    ///
    /// `preceding` holds every instance that runs before this one.
    pub(crate) fn resolve(&mut self, preceding: &[ActionInstance]) -> IndexMap<String, PropertyValue> {
        self.phase = InstancePhase::Resolving;
        let variant = Arc::clone(&self.variant);
        for spec in &variant.properties {
            let Some(slot) = self.properties.get_mut(&spec.name) else {
                continue;
            };
            slot.resolved = slot.binding.and_then(|source| bound_value(spec, source, preceding));
        }
        self.properties
            .iter()
            .map(|(name, slot)| (name.clone(), slot.value().clone()))
            .collect()
    }

    pub(crate) fn start(&mut self) {
        self.phase = InstancePhase::Running;
    }

    pub(crate) fn finish(&mut self, return_value: Option<PropertyValue>) {
        self.return_value = return_value;
        self.phase = InstancePhase::Done;
    }

    /// Returns the instance to `Idle` ahead of a new run.
    pub(crate) fn reset(&mut self) {
        self.phase = InstancePhase::Idle;
        self.return_value = None;
        for slot in self.properties.values_mut() {
            slot.resolved = None;
        }
    }
}

fn validate_literal(spec: &PropertySpec, value: &PropertyValue) -> Result<(), ActionError> {
    let invalid = |reason: String| ActionError::InvalidValue {
        property: spec.name.clone(),
        reason,
    };

    if value.value_type() != spec.value_type {
        return Err(invalid(format!("expected {}, got {}", spec.value_type, value.value_type())));
    }

    if let PropertyValue::Number(number) = value {
        if !number.is_finite() {
            return Err(invalid(format!("{number} is not a finite number")));
        }
        if let Some(bounds) = spec.bounds {
            if !bounds.contains(*number) {
                return Err(invalid(format!("{number} is outside {}..={}", bounds.lower, bounds.upper)));
            }
            if bounds.whole && number.fract() != 0.0 {
                return Err(invalid(format!("{number} is not a whole number")));
            }
        }
    }

    Ok(())
}
