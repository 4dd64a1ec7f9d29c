//! Variable resolution.
//!
//! Just before an instance runs, each bound property takes the return value of its source.
//! Sources always run earlier in the chain, so their return slots are populated by then. A
//! missing or mistyped value falls back to the property's literal.

use actions_types::{PropertySpec, PropertyValue};
use tracing::warn;

use crate::instance::{ActionInstance, InstanceId};

/// Reads the value a property bound to `source` should take, looking only at instances that
/// run before the property's owner.
pub(crate) fn bound_value(spec: &PropertySpec, source: InstanceId, preceding: &[ActionInstance]) -> Option<PropertyValue> {
    let Some(instance) = preceding.iter().find(|instance| instance.id() == source) else {
        warn!(property = %spec.name, source = %source, "variable source does not run before this action; using literal");
        return None;
    };

    let Some(value) = instance.return_value() else {
        warn!(property = %spec.name, source = %source, "variable source produced no value; using literal");
        return None;
    };

    if value.value_type() != spec.value_type {
        warn!(
            property = %spec.name,
            expected = %spec.value_type,
            found = %value.value_type(),
            "variable type does not match property; using literal"
        );
        return None;
    }

    match (value, spec.bounds) {
        (PropertyValue::Number(number), Some(bounds)) if !bounds.contains(*number) || (bounds.whole && number.fract() != 0.0) => {
            let clamped = bounds.clamp(*number);
            warn!(property = %spec.name, value = *number, clamped, "variable value outside property range; clamping");
            Some(PropertyValue::Number(clamped))
        }
        _ => Some(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ActionRegistry;

    fn finished(registry: &ActionRegistry, identifier: &str, value: PropertyValue) -> ActionInstance {
        let mut instance = registry.instantiate(identifier).expect("builtin variant");
        instance.finish(Some(value));
        instance
    }

    #[test]
    fn clamps_numbers_into_property_bounds() {
        let registry = ActionRegistry::builtin();
        let source = finished(&registry, "number", PropertyValue::Number(-40.0));
        let wait = registry.instantiate("wait").expect("wait variant");
        let spec = wait.spec("seconds").expect("seconds spec");

        let value = bound_value(spec, source.id(), std::slice::from_ref(&source));
        assert_eq!(value, Some(PropertyValue::Number(0.0)));
    }

    #[test]
    fn rounds_fractional_numbers_for_whole_properties() {
        let registry = ActionRegistry::builtin();
        let source = finished(&registry, "number", PropertyValue::Number(2.4));
        let wait = registry.instantiate("wait").expect("wait variant");
        let spec = wait.spec("seconds").expect("seconds spec");

        let value = bound_value(spec, source.id(), std::slice::from_ref(&source));
        assert_eq!(value, Some(PropertyValue::Number(2.0)));
    }

    #[test]
    fn missing_source_falls_back_to_literal() {
        let registry = ActionRegistry::builtin();
        let unfinished = registry.instantiate("text").expect("text variant");
        let notification = registry.instantiate("notification").expect("notification variant");
        let spec = notification.spec("title").expect("title spec");

        assert_eq!(bound_value(spec, unfinished.id(), std::slice::from_ref(&unfinished)), None);
        assert_eq!(bound_value(spec, unfinished.id(), &[]), None);
    }
}
