//! Typed values stored in action properties and return slots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive type of a property or of an action's return slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// The action produces nothing. Never used for properties.
    #[default]
    None,
    /// A floating point number.
    Number,
    /// A UTF-8 string.
    Text,
}

impl ValueType {
    /// Returns the lowercase name used in logs and listings.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::None => "none",
            ValueType::Number => "number",
            ValueType::Text => "text",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete value held by a property or written to a return slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Numeric value.
    Number(f64),
    /// Text value. An empty string means "unset" for optional text properties.
    Text(String),
}

impl PropertyValue {
    /// Returns the primitive type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            PropertyValue::Number(_) => ValueType::Number,
            PropertyValue::Text(_) => ValueType::Text,
        }
    }

    /// Returns the number if this is a numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(number) => Some(*number),
            PropertyValue::Text(_) => None,
        }
    }

    /// Returns the string if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text.as_str()),
            PropertyValue::Number(_) => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(number) => write!(f, "{number}"),
            PropertyValue::Text(text) => write!(f, "{text:?}"),
        }
    }
}
