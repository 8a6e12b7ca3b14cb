//! Structured queries
//!
//! A [`StructuredQuery`] is the JSON object produced by the translator:
//! `{filter, projection?, sort?, limit?, skip?}`. It is kept as the raw
//! object so it can be echoed back verbatim, and validated into a
//! [`QuerySpec`] right before execution.

pub mod engine;
pub mod filter;
pub mod projection;
pub mod sort;
pub mod value;

pub use engine::{find, CompiledFind};
pub use filter::Filter;
pub use projection::Projection;

use crate::error::ValidationError;
use crate::store::{FindOptions, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use value::{as_number, type_name};

/// Top-level keys understood by the executor
pub const QUERY_KEYS: &[&str] = &["filter", "projection", "sort", "limit", "skip"];

/// Query object produced by translation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredQuery(Map<String, Value>);

/// Validated query, ready to hand to a [`crate::store::DocumentStore`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub filter: Map<String, Value>,
    pub options: FindOptions,
}

impl StructuredQuery {
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self(object)
    }

    /// Wrap a JSON value; anything but an object is rejected
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(object) => Ok(Self(object)),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    /// Query with only a filter
    pub fn with_filter(filter: Map<String, Value>) -> Self {
        let mut object = Map::new();
        object.insert("filter".to_string(), Value::Object(filter));
        Self(object)
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_object(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Compact JSON text of the query
    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Check the query's shape and extract the find options.
    ///
    /// `projection`, `sort`, `limit` and `skip` are optional; `null` is
    /// treated as absent. A `limit` or `skip` of zero means none.
    pub fn validate(&self) -> Result<QuerySpec, ValidationError> {
        let filter = match self.0.get("filter") {
            None => return Err(ValidationError::MissingFilter),
            Some(Value::Object(filter)) => filter.clone(),
            Some(other) => return Err(ValidationError::FilterNotObject(type_name(other))),
        };

        for key in self.0.keys().filter(|k| !QUERY_KEYS.contains(&k.as_str())) {
            tracing::debug!("Ignoring unknown query key: {}", key);
        }

        let options = FindOptions {
            projection: parse_projection(self.0.get("projection"))?,
            sort: parse_sort(self.0.get("sort"))?,
            limit: parse_count("limit", self.0.get("limit"))?,
            skip: parse_count("skip", self.0.get("skip"))?,
        };
        Ok(QuerySpec { filter, options })
    }
}

impl std::fmt::Display for StructuredQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json_string())
    }
}

fn invalid(field: &'static str, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::InvalidField {
        field,
        expected,
        found: found.to_string(),
    }
}

fn parse_projection(value: Option<&Value>) -> Result<Option<Map<String, Value>>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(spec)) if spec.is_empty() => Ok(None),
        Some(Value::Object(spec)) => {
            for flag in spec.values() {
                let ok = match flag {
                    Value::Bool(_) => true,
                    other => matches!(as_number(other), Some(n) if n == 0.0 || n == 1.0),
                };
                if !ok {
                    return Err(invalid("projection", "a map of field to 0 or 1", flag));
                }
            }
            Ok(Some(spec.clone()))
        }
        Some(other) => Err(invalid("projection", "an object", other)),
    }
}

fn parse_sort(value: Option<&Value>) -> Result<Vec<(String, SortDirection)>, ValidationError> {
    let spec = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(spec)) => spec,
        Some(other) => return Err(invalid("sort", "an object", other)),
    };
    spec.iter()
        .map(|(path, direction)| {
            SortDirection::from_value(direction)
                .map(|d| (path.clone(), d))
                .ok_or_else(|| invalid("sort", "a map of field to 1 or -1", direction))
        })
        .collect()
}

fn parse_count(field: &'static str, value: Option<&Value>) -> Result<Option<usize>, ValidationError> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    match as_number(value) {
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64 => {
            let n = n as usize;
            Ok((n > 0).then_some(n))
        }
        _ => Err(invalid(field, "a non-negative integer", value)),
    }
}
