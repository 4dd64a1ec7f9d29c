//! Step expressions accepted by `actions run`.
//!
//! A step is `identifier[:property=value[,property=value...]]`. A value of `@N` binds the
//! property to the return value of step `N` (0-based); `@@` escapes a literal leading `@`.
//! Commas inside a value are kept when the text after them is not another `property=` pair.

use std::str::FromStr;

use actions_engine::{ActionRegistry, InstanceId, WorkflowChain};
use actions_types::{PropertyValue, ValueType};
use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepValue {
    Literal(String),
    Variable(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepExpression {
    pub variant: String,
    pub assignments: Vec<(String, StepValue)>,
}

impl FromStr for StepExpression {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        let (variant, rest) = match input.split_once(':') {
            Some((variant, rest)) => (variant.trim(), Some(rest)),
            None => (input.trim(), None),
        };
        if variant.is_empty() {
            bail!("step '{input}' is missing an action identifier");
        }

        let assignments = match rest {
            Some(rest) if !rest.trim().is_empty() => parse_assignments(rest).with_context(|| format!("in step '{input}'"))?,
            _ => Vec::new(),
        };

        Ok(Self {
            variant: variant.to_string(),
            assignments,
        })
    }
}

fn parse_assignments(input: &str) -> Result<Vec<(String, StepValue)>> {
    let mut pairs: Vec<String> = Vec::new();
    for segment in input.split(',') {
        match pairs.last_mut() {
            Some(previous) if !segment.contains('=') => {
                previous.push(',');
                previous.push_str(segment);
            }
            _ => pairs.push(segment.to_string()),
        }
    }

    pairs
        .iter()
        .map(|pair| {
            let (name, raw) = pair
                .split_once('=')
                .with_context(|| format!("expected property=value, got '{pair}'"))?;
            let name = name.trim();
            if name.is_empty() {
                bail!("missing property name in '{pair}'");
            }
            Ok((name.to_string(), parse_value(raw)))
        })
        .collect()
}

fn parse_value(raw: &str) -> StepValue {
    if let Some(escaped) = raw.strip_prefix("@@") {
        return StepValue::Literal(format!("@{escaped}"));
    }
    match raw.strip_prefix('@').map(|index| index.trim().parse::<usize>()) {
        Some(Ok(index)) => StepValue::Variable(index),
        _ => StepValue::Literal(raw.to_string()),
    }
}

/// Appends one instance per step to `chain`, then applies literals and bindings.
///
/// Bindings are applied after every step exists so that a reference to a later step is
/// reported by the engine as an invalid reference rather than a missing step.
pub fn build_chain(registry: &ActionRegistry, chain: &WorkflowChain, steps: &[StepExpression]) -> Result<Vec<InstanceId>> {
    let mut ids = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let instance = registry
            .instantiate(&step.variant)
            .with_context(|| format!("step {index}"))?;
        ids.push(chain.append(instance).with_context(|| format!("step {index}"))?);
    }

    for ((index, step), &id) in steps.iter().enumerate().zip(&ids) {
        for (property, value) in &step.assignments {
            match value {
                StepValue::Literal(raw) => {
                    let value_type = {
                        let instance = chain.instance(id).with_context(|| format!("step {index} vanished"))?;
                        instance.spec(property).with_context(|| format!("step {index}"))?.value_type
                    };
                    let value = literal_value(value_type, raw).with_context(|| format!("step {index}: property '{property}'"))?;
                    chain
                        .configure(id, property, value)
                        .with_context(|| format!("step {index}"))?;
                }
                StepValue::Variable(source_index) => {
                    let source = *ids
                        .get(*source_index)
                        .with_context(|| format!("step {index}: there is no step {source_index} to read '{property}' from"))?;
                    chain
                        .bind(id, property, source)
                        .with_context(|| format!("step {index}: binding '{property}' to step {source_index}"))?;
                }
            }
        }
    }

    Ok(ids)
}

fn literal_value(value_type: ValueType, raw: &str) -> Result<PropertyValue> {
    match value_type {
        ValueType::Number => {
            let number = raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("'{raw}' is not a number"))?;
            Ok(PropertyValue::Number(number))
        }
        ValueType::Text => Ok(PropertyValue::Text(raw.to_string())),
        ValueType::None => bail!("property does not accept values"),
    }
}
