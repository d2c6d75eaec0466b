//! Row filters built from `where` arguments.
//!
//! A [`Filter`] is a conjunction of per-attribute [`Condition`]s. It can be
//! built programmatically or parsed from a JSON object where a scalar value
//! means equality, an array means membership and an object maps operators
//! (`eq`, `ne`, `gt`, `gte`, `lt`, `lte`, `in`, `notIn`, `like`, optionally
//! prefixed with `$`) to operands.

use std::cmp::Ordering;

use regex::Regex;
use relayql_core::Record;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::StorageError;

/// A single predicate on an attribute value.
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    /// SQL `LIKE` pattern, compiled.
    Like(Regex),
}

impl Condition {
    fn parse(operator: &str, operand: &Value) -> Result<Self, StorageError> {
        let list = |operand: &Value| match operand {
            Value::Array(items) => Ok(items.clone()),
            other => Err(StorageError::invalid_filter(format!(
                "operator {operator} expects a list, got {other}"
            ))),
        };

        Ok(match operator.trim_start_matches('$') {
            "eq" => Self::Eq(operand.clone()),
            "ne" => Self::Ne(operand.clone()),
            "gt" => Self::Gt(operand.clone()),
            "gte" => Self::Gte(operand.clone()),
            "lt" => Self::Lt(operand.clone()),
            "lte" => Self::Lte(operand.clone()),
            "in" => Self::In(list(operand)?),
            "notIn" => Self::NotIn(list(operand)?),
            "like" => {
                let pattern = operand.as_str().ok_or_else(|| {
                    StorageError::invalid_filter("operator like expects a string")
                })?;
                Self::Like(like_to_regex(pattern)?)
            }
            other => {
                debug!(operator = %other, "Rejected unknown filter operator");
                return Err(StorageError::invalid_filter(format!(
                    "unknown operator {other}"
                )));
            }
        })
    }

    /// Evaluates the predicate against an attribute value (`Null` when absent).
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Self::Eq(expected) => values_equal(actual, expected),
            Self::Ne(expected) => !values_equal(actual, expected),
            Self::Gt(bound) => compare_values(actual, bound) == Some(Ordering::Greater),
            Self::Gte(bound) => matches!(
                compare_values(actual, bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Lt(bound) => compare_values(actual, bound) == Some(Ordering::Less),
            Self::Lte(bound) => matches!(
                compare_values(actual, bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::In(values) => values.iter().any(|v| values_equal(actual, v)),
            Self::NotIn(values) => !values.iter().any(|v| values_equal(actual, v)),
            Self::Like(regex) => actual.as_str().is_some_and(|s| regex.is_match(s)),
        }
    }
}

fn like_to_regex(pattern: &str) -> Result<Regex, StorageError> {
    let body = pattern
        .split('%')
        .map(|part| {
            part.split('_')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).map_err(|e| StorageError::invalid_filter(e.to_string()))
}

/// Equality with numeric normalisation, so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Orders two values of the same JSON type; `None` for mismatched types or nulls.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Conjunction of attribute conditions.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    /// Creates a filter that matches every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON `where` object. `null` matches every row.
    pub fn parse(value: &Value) -> Result<Self, StorageError> {
        let object = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(object) => object,
            other => {
                debug!(value = %other, "Rejected non-object where");
                return Err(StorageError::invalid_filter(format!(
                    "where must be an object, got {other}"
                )));
            }
        };

        let mut filter = Self::new();
        for (field, operand) in object {
            match operand {
                Value::Object(operators) => {
                    for (operator, operand) in operators {
                        filter = filter.with(field.clone(), Condition::parse(operator, operand)?);
                    }
                }
                Value::Array(values) => {
                    filter = filter.with(field.clone(), Condition::In(values.clone()));
                }
                scalar => filter = filter.eq(field.clone(), scalar.clone()),
            }
        }
        trace!(conditions = filter.conditions.len(), "Parsed where filter");
        Ok(filter)
    }

    /// Equality on every entry of `record`, with no operator parsing.
    pub fn equals(record: &Record) -> Self {
        record
            .iter()
            .fold(Self::new(), |filter, (field, value)| {
                filter.eq(field.clone(), value.clone())
            })
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, Condition::Eq(value.into()))
    }

    pub fn with(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.conditions.push((field.into(), condition));
        self
    }

    /// Appends all conditions of `other`.
    pub fn and(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn conditions(&self) -> &[(String, Condition)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|(field, condition)| {
            condition.matches(record.get(field).unwrap_or(&Value::Null))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_scalar_equality() {
        let filter = Filter::parse(&json!({"email": "a@b.com", "id": 1})).unwrap();
        assert!(filter.matches(&record(json!({"id": 1.0, "email": "a@b.com"}))));
        assert!(!filter.matches(&record(json!({"id": 2, "email": "a@b.com"}))));
    }

    #[test]
    fn test_operators() {
        let filter = Filter::parse(&json!({"age": {"gte": 18, "$lt": 65}})).unwrap();
        assert!(filter.matches(&record(json!({"age": 18}))));
        assert!(!filter.matches(&record(json!({"age": 70}))));
        assert!(!filter.matches(&record(json!({"age": null}))));

        let filter = Filter::parse(&json!({"id": [1, 3]})).unwrap();
        assert!(filter.matches(&record(json!({"id": 3}))));
        assert!(!filter.matches(&record(json!({"id": 2}))));

        let filter = Filter::parse(&json!({"id": {"notIn": [1]}, "text": {"ne": null}})).unwrap();
        assert!(filter.matches(&record(json!({"id": 2, "text": "x"}))));
        assert!(!filter.matches(&record(json!({"id": 2}))));
    }

    #[test]
    fn test_like() {
        let filter = Filter::parse(&json!({"email": {"like": "%@example.com"}})).unwrap();
        assert!(filter.matches(&record(json!({"email": "jo@example.com"}))));
        assert!(!filter.matches(&record(json!({"email": "jo@example.org"}))));

        let filter = Filter::parse(&json!({"code": {"like": "A_1.%"}})).unwrap();
        assert!(filter.matches(&record(json!({"code": "AB1.x"}))));
        assert!(!filter.matches(&record(json!({"code": "AB1x"}))));
    }

    #[test]
    fn test_invalid_where() {
        assert!(Filter::parse(&json!([1])).is_err());
        assert!(Filter::parse(&json!({"id": {"between": [1, 2]}})).is_err());
        assert!(Filter::parse(&json!({"id": {"in": 1}})).is_err());
        assert!(Filter::parse(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_operator_is_reported() {
        let err = Filter::parse(&json!({"id": {"$between": [1, 2]}})).unwrap_err();
        assert!(err.to_string().contains("unknown operator between"));
    }

    #[test]
    fn test_equals_does_not_parse_operators() {
        let filter = Filter::equals(&record(json!({"meta": {"gt": 1}})));
        assert!(filter.matches(&record(json!({"meta": {"gt": 1}}))));
    }
}
