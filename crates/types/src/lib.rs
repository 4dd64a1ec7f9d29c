//! Shared type definitions for action variants, their property schemas, and the values that
//! flow between actions at run time.
//!
//! These types carry no behavior of their own. The engine attaches execution semantics to them
//! and the presentation layer reads them to render configuration controls.

pub mod value;
pub mod variant;

pub use value::{PropertyValue, ValueType};
pub use variant::{NumericBounds, PropertySpec, VariantDescriptor, VariantKind};
