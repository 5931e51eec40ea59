//! Typed rule conditions parsed from the stored `conditions` JSON object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::Price;

/// Stored key for the inclusive lower price bound.
pub const KEY_MIN_PRICE: &str = "minPrice";

/// Stored key for the inclusive upper price bound.
pub const KEY_MAX_PRICE: &str = "maxPrice";

/// A single condition a property must meet for a rule to pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Price must lie within the (inclusive) bounds that are set.
    PriceRange {
        min_price: Option<Price>,
        max_price: Option<Price>,
    },
    /// A condition this version does not understand. Kept so stored rules
    /// written by newer clients survive a round trip; it never blocks.
    Custom { name: String, payload: Value },
}

/// Parse the `conditions` column of a workflow rule.
///
/// `null` and `{}` mean "no conditions". Price bounds may be integers or
/// floats; fractional bounds are rounded inward since prices are whole units.
pub fn parse_rule_conditions(value: &Value) -> Result<Vec<RuleCondition>, CoreError> {
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(CoreError::Validation(format!(
                "Rule conditions must be a JSON object, got: {other}"
            )))
        }
    };

    let min_price = parse_bound(map.get(KEY_MIN_PRICE), KEY_MIN_PRICE, f64::ceil)?;
    let max_price = parse_bound(map.get(KEY_MAX_PRICE), KEY_MAX_PRICE, f64::floor)?;

    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "{KEY_MIN_PRICE} ({min}) must not exceed {KEY_MAX_PRICE} ({max})"
            )));
        }
    }

    let mut conditions = Vec::new();
    if min_price.is_some() || max_price.is_some() {
        conditions.push(RuleCondition::PriceRange {
            min_price,
            max_price,
        });
    }

    for (name, payload) in map {
        if name != KEY_MIN_PRICE && name != KEY_MAX_PRICE {
            conditions.push(RuleCondition::Custom {
                name: name.clone(),
                payload: payload.clone(),
            });
        }
    }

    Ok(conditions)
}

fn parse_bound(
    value: Option<&Value>,
    key: &str,
    round: fn(f64) -> f64,
) -> Result<Option<Price>, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() => Ok(Some(round(f) as Price)),
                _ => Err(CoreError::Validation(format!("{key} is out of range"))),
            }
        }
        Some(other) => Err(CoreError::Validation(format!(
            "{key} must be a number, got: {other}"
        ))),
    }
}
