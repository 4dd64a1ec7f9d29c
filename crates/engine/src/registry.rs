//! Catalog of action variants.
//!
//! The registry is built once at process start and never mutated afterwards. Callers hold it
//! by reference (or behind an `Arc`) and inject it wherever variant lookup is needed.

use std::sync::Arc;

use actions_types::{NumericBounds, PropertySpec, ValueType, VariantDescriptor, VariantKind};
use indexmap::IndexMap;
use tracing::warn;

use crate::{error::ActionError, instance::ActionInstance};

/// Longest supported wait, in seconds (24 hours).
pub const MAX_WAIT_SECONDS: f64 = 86_400.0;

/// Presentation group of variants, in display order.
#[derive(Debug, Clone)]
pub struct VariantCategory<'registry> {
    pub name: &'registry str,
    pub variants: Vec<&'registry VariantDescriptor>,
}

/// Immutable identifier → descriptor table.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    variants: IndexMap<String, Arc<VariantDescriptor>>,
}

impl ActionRegistry {
    /// Builds a registry from descriptors. A repeated identifier keeps its first descriptor.
    pub fn from_variants(descriptors: impl IntoIterator<Item = VariantDescriptor>) -> Self {
        let mut variants = IndexMap::new();
        for descriptor in descriptors {
            if variants.contains_key(&descriptor.identifier) {
                warn!(identifier = %descriptor.identifier, "duplicate action variant ignored");
                continue;
            }
            variants.insert(descriptor.identifier.clone(), Arc::new(descriptor));
        }
        Self { variants }
    }

    /// Registry holding the built-in variants.
    pub fn builtin() -> Self {
        Self::from_variants(builtin_variants())
    }

    /// Returns the descriptor registered under `identifier`.
    pub fn lookup(&self, identifier: &str) -> Result<Arc<VariantDescriptor>, ActionError> {
        self.variants
            .get(identifier)
            .cloned()
            .ok_or_else(|| ActionError::UnknownVariant(identifier.to_string()))
    }

    /// Creates a new instance of `identifier` with default property values.
    pub fn instantiate(&self, identifier: &str) -> Result<ActionInstance, ActionError> {
        self.lookup(identifier).map(ActionInstance::new)
    }

    /// All descriptors in registration order.
    pub fn variants(&self) -> impl Iterator<Item = &VariantDescriptor> {
        self.variants.values().map(Arc::as_ref)
    }

    /// Variants grouped by category. Categories appear in the order their first variant was
    /// registered.
    pub fn categories(&self) -> Vec<VariantCategory<'_>> {
        let mut groups: IndexMap<&str, Vec<&VariantDescriptor>> = IndexMap::new();
        for descriptor in self.variants() {
            groups.entry(descriptor.category.as_str()).or_default().push(descriptor);
        }
        groups
            .into_iter()
            .map(|(name, variants)| VariantCategory { name, variants })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

fn builtin_variants() -> Vec<VariantDescriptor> {
    vec![
        VariantDescriptor {
            identifier: "notification".into(),
            title: "Send Notification".into(),
            icon_name: "preferences-system-notifications-symbolic".into(),
            doc: "Sends a desktop notification with a title and an optional description.\n\n\
                  An empty title falls back to \"Notification\"."
                .into(),
            category: "Notifications".into(),
            return_type: ValueType::None,
            properties: vec![
                PropertySpec::text("title", "Title", "Hello World!"),
                PropertySpec::text("body", "Description", ""),
            ],
            kind: VariantKind::Notification,
        },
        VariantDescriptor {
            identifier: "ring-bell".into(),
            title: "Play Alert Sound".into(),
            icon_name: "audio-volume-high-symbolic".into(),
            doc: "Plays the system alert sound.".into(),
            category: "Notifications".into(),
            return_type: ValueType::None,
            properties: Vec::new(),
            kind: VariantKind::RingBell,
        },
        VariantDescriptor {
            identifier: "wait".into(),
            title: "Wait".into(),
            icon_name: "preferences-system-time-symbolic".into(),
            doc: "Pauses the workflow for a number of seconds, up to 24 hours.\n\n\
                  Returns the number of seconds waited."
                .into(),
            category: "Control Flow".into(),
            return_type: ValueType::Number,
            properties: vec![PropertySpec::number(
                "seconds",
                "Seconds",
                5.0,
                Some(NumericBounds::whole(0.0, MAX_WAIT_SECONDS)),
            )],
            kind: VariantKind::Wait,
        },
        VariantDescriptor {
            identifier: "end".into(),
            title: "End Workflow".into(),
            icon_name: "process-stop-symbolic".into(),
            doc: "Stops the workflow. Actions after this one never run.".into(),
            category: "Control Flow".into(),
            return_type: ValueType::None,
            properties: Vec::new(),
            kind: VariantKind::End,
        },
        VariantDescriptor {
            identifier: "number".into(),
            title: "Number Variable".into(),
            icon_name: "accessories-calculator-symbolic".into(),
            doc: "Stores a number that later actions can use as a variable.".into(),
            category: "Variables".into(),
            return_type: ValueType::Number,
            properties: vec![PropertySpec::number("value", "Value", 0.0, None)],
            kind: VariantKind::Number,
        },
        VariantDescriptor {
            identifier: "text".into(),
            title: "Text Variable".into(),
            icon_name: "format-text-plaintext-symbolic".into(),
            doc: "Stores a piece of text that later actions can use as a variable.".into(),
            category: "Variables".into(),
            return_type: ValueType::Text,
            properties: vec![PropertySpec::text("string", "Text", "")],
            kind: VariantKind::Text,
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtin_identifiers_are_unique_and_resolvable() {
        let registry = ActionRegistry::builtin();
        assert_eq!(registry.len(), 6);

        let mut seen = HashSet::new();
        for descriptor in registry.variants() {
            assert!(seen.insert(descriptor.identifier.clone()), "duplicate {}", descriptor.identifier);
            let found = registry.lookup(&descriptor.identifier).expect("lookup builtin");
            assert_eq!(found.kind, descriptor.kind);
        }
    }

    #[test]
    fn unknown_identifier_fails() {
        let registry = ActionRegistry::builtin();
        let error = registry.lookup("launch-rocket").unwrap_err();
        assert_eq!(error, ActionError::UnknownVariant("launch-rocket".into()));
        assert!(registry.instantiate("launch-rocket").is_err());
    }

    #[test]
    fn groups_variants_by_category_in_display_order() {
        let registry = ActionRegistry::builtin();
        let categories = registry.categories();
        let names: Vec<_> = categories.iter().map(|category| category.name).collect();
        assert_eq!(names, vec!["Notifications", "Control Flow", "Variables"]);

        let variables: Vec<_> = categories[2].variants.iter().map(|variant| variant.identifier.as_str()).collect();
        assert_eq!(variables, vec!["number", "text"]);
    }

    #[test]
    fn duplicate_registrations_keep_the_first() {
        let mut descriptors = builtin_variants();
        let mut shadow = descriptors[0].clone();
        shadow.title = "Shadow".into();
        descriptors.push(shadow);

        let registry = ActionRegistry::from_variants(descriptors);
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.lookup("notification").expect("notification").title, "Send Notification");
    }
}
