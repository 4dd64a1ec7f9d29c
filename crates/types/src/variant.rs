//! Metadata describing an action variant: what it is called, how it is presented, which
//! properties it accepts, and what it returns.
//!
//! Property schemas preserve declaration order so that the presentation layer renders controls
//! in a predictable sequence.

use serde::{Deserialize, Serialize};

use crate::value::{PropertyValue, ValueType};

/// Behavior template attached to a variant. The engine maps each kind to a side effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum VariantKind {
    /// Sends a desktop notification.
    Notification,
    /// Plays an audible alert.
    RingBell,
    /// Suspends the workflow for a number of seconds.
    Wait,
    /// Stops the workflow without signalling further progress.
    End,
    /// Stores a numeric literal in the return slot.
    Number,
    /// Stores a text literal in the return slot.
    Text,
}

/// Inclusive numeric range accepted by a number property.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NumericBounds {
    /// Smallest accepted value.
    pub lower: f64,
    /// Largest accepted value.
    pub upper: f64,
    /// When true, fractional values are rejected.
    #[serde(default)]
    pub whole: bool,
}

impl NumericBounds {
    /// Whole-number range `lower..=upper`.
    pub fn whole(lower: f64, upper: f64) -> Self {
        Self { lower, upper, whole: true }
    }

    /// Returns true when `value` lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Clamps `value` into the range, rounding when the range only accepts whole numbers.
    pub fn clamp(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.lower, self.upper);
        if self.whole { clamped.round() } else { clamped }
    }
}

/// A named, typed field on an action variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertySpec {
    /// Key used in the instance property map (for example, `seconds`).
    pub name: String,
    /// Label shown next to the control.
    pub title: String,
    /// Declared type. Bindings must come from a source returning this type.
    pub value_type: ValueType,
    /// Value assigned when the action is instantiated.
    pub default: PropertyValue,
    /// Accepted range for number properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<NumericBounds>,
}

impl PropertySpec {
    /// Declares a text property.
    pub fn text(name: &str, title: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            value_type: ValueType::Text,
            default: PropertyValue::Text(default.to_string()),
            bounds: None,
        }
    }

    /// Declares a number property with an optional range.
    pub fn number(name: &str, title: &str, default: f64, bounds: Option<NumericBounds>) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            value_type: ValueType::Number,
            default: PropertyValue::Number(default),
            bounds,
        }
    }
}

/// Immutable description of an action variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantDescriptor {
    /// Unique identifier, for example `ring-bell`.
    pub identifier: String,
    /// Display title.
    pub title: String,
    /// Icon name from the freedesktop icon theme.
    pub icon_name: String,
    /// Longer help text shown in the "more information" view.
    pub doc: String,
    /// Presentation group. Carries no execution semantics.
    pub category: String,
    /// Type written to the return slot when the action finishes.
    pub return_type: ValueType,
    /// Ordered property schema.
    #[serde(default)]
    pub properties: Vec<PropertySpec>,
    /// Behavior template.
    pub kind: VariantKind,
}

impl VariantDescriptor {
    /// Looks up a property declaration by name.
    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// Returns true when this variant produces a value that later actions can bind to.
    pub fn returns_value(&self) -> bool {
        self.return_type != ValueType::None
    }
}
