use std::fmt;

use serde_json::Value;

use super::schema::{FieldKind, FieldSpec, FilterSchema};
use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    List(Vec<String>),
    Range(i64, i64),
    Flag(bool),
}

impl FilterValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FilterValue::Text(_) => FieldKind::Text,
            FilterValue::List(_) => FieldKind::List,
            FilterValue::Range(..) => FieldKind::Range,
            FilterValue::Flag(_) => FieldKind::Flag,
        }
    }

    /// Canonical JSON form, as stored in filter tokens and request bodies
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Text(s) => Value::String(s.clone()),
            FilterValue::List(items) => Value::Array(
                items.iter().cloned().map(Value::String).collect(),
            ),
            FilterValue::Range(min, max) => {
                Value::Array(vec![Value::from(*min), Value::from(*max)])
            }
            FilterValue::Flag(b) => Value::Bool(*b),
        }
    }

    /// Flat string form used for query-string transport
    pub fn to_query_value(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::List(items) => items.join(","),
            FilterValue::Range(min, max) => format!("{min},{max}"),
            FilterValue::Flag(true) => "1".to_string(),
            FilterValue::Flag(false) => "0".to_string(),
        }
    }

    /// Strict decoding: the JSON type must match the canonical form exactly.
    pub fn from_json(spec: &FieldSpec, value: &Value) -> Result<Self, DecodeError> {
        let mismatch = || DecodeError::FieldType {
            key: spec.key.to_string(),
            expected: spec.kind().describe(),
        };

        match spec.kind() {
            FieldKind::Text => value
                .as_str()
                .map(|s| FilterValue::Text(s.to_string()))
                .ok_or_else(mismatch),
            FieldKind::List => {
                let items = value.as_array().ok_or_else(mismatch)?;
                items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).ok_or_else(mismatch))
                    .collect::<Result<Vec<_>, _>>()
                    .map(FilterValue::List)
            }
            FieldKind::Range => match value.as_array().map(Vec::as_slice) {
                Some([min, max]) => match (min.as_i64(), max.as_i64()) {
                    (Some(min), Some(max)) => Ok(FilterValue::Range(min, max)),
                    _ => Err(mismatch()),
                },
                _ => Err(mismatch()),
            },
            FieldKind::Flag => {
                value.as_bool().map(FilterValue::Flag).ok_or_else(mismatch)
            }
        }
    }

    /// Lenient decoding for filters that arrive as individual fields, which
    /// are often query-string shaped (`"1"`, `"a,b"`).
    pub fn coerce(spec: &FieldSpec, value: &Value) -> Result<Self, DecodeError> {
        if let Ok(strict) = Self::from_json(spec, value) {
            return Ok(strict);
        }
        let mismatch = || DecodeError::FieldType {
            key: spec.key.to_string(),
            expected: spec.kind().describe(),
        };

        match (spec.kind(), value) {
            (FieldKind::Text, Value::Number(n)) => Ok(FilterValue::Text(n.to_string())),
            (FieldKind::List, Value::String(s)) => Ok(FilterValue::List(split_list(s))),
            (FieldKind::Range, Value::String(s)) => {
                let (min, max) = s.split_once(',').ok_or_else(mismatch)?;
                match (min.trim().parse(), max.trim().parse()) {
                    (Ok(min), Ok(max)) => Ok(FilterValue::Range(min, max)),
                    _ => Err(mismatch()),
                }
            }
            (FieldKind::Flag, Value::String(s)) => match s.as_str() {
                "1" | "true" => Ok(FilterValue::Flag(true)),
                "0" | "false" => Ok(FilterValue::Flag(false)),
                _ => Err(mismatch()),
            },
            (FieldKind::Flag, Value::Number(n)) => match n.as_i64() {
                Some(1) => Ok(FilterValue::Flag(true)),
                Some(0) => Ok(FilterValue::Flag(false)),
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_value())
    }
}

/// Decoded filter entries, in the order they were read.
///
/// Applying a patch touches only the keys it carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub entries: Vec<(&'static str, FilterValue)>,
}

impl FilterPatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of merging individually supplied filter fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub applied: Vec<&'static str>,
    pub ignored: Vec<String>,
    pub rejected: Vec<String>,
}

/// The full, defaulted set of filters scoping one collection view.
///
/// Values are held in schema order and every key always has a value, so a
/// lookup of a known key never comes back empty.
#[derive(Debug, Clone)]
pub struct FilterSet {
    schema: &'static FilterSchema,
    values: Vec<FilterValue>,
}

impl FilterSet {
    pub fn new(schema: &'static FilterSchema) -> Self {
        Self {
            schema,
            values: schema.fields.iter().map(|f| f.default.to_value()).collect(),
        }
    }

    pub fn schema(&self) -> &'static FilterSchema {
        self.schema
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.schema.position(key).map(|i| &self.values[i])
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.get(key)? {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            FilterValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn range(&self, key: &str) -> Option<(i64, i64)> {
        match self.get(key)? {
            FilterValue::Range(min, max) => Some((*min, *max)),
            _ => None,
        }
    }

    /// Replace one value. The value must match the field's kind.
    pub fn set(&mut self, key: &str, value: FilterValue) -> Result<(), DecodeError> {
        let index = self
            .schema
            .position(key)
            .ok_or_else(|| DecodeError::UnknownField(key.to_string()))?;
        let spec = &self.schema.fields[index];
        if spec.kind() != value.kind() {
            return Err(DecodeError::FieldType {
                key: key.to_string(),
                expected: spec.kind().describe(),
            });
        }
        self.values[index] = value;
        Ok(())
    }

    /// Apply decoded entries one key at a time; returns how many applied.
    pub fn apply(&mut self, patch: FilterPatch) -> usize {
        let mut applied = 0;
        for (key, value) in patch.entries {
            if self.set(key, value).is_ok() {
                applied += 1;
            }
        }
        applied
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.schema);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldSpec, &FilterValue)> {
        self.schema.fields.iter().zip(self.values.iter())
    }

    /// Fields that take part in queries and sharing
    pub fn query_fields(&self) -> impl Iterator<Item = (&'static FieldSpec, &FilterValue)> {
        self.iter().filter(|(spec, _)| !spec.presentation)
    }

    /// Equality on everything except presentation-only keys
    pub fn same_query(&self, other: &FilterSet) -> bool {
        std::ptr::eq(self.schema, other.schema)
            && self.query_fields().eq(other.query_fields())
    }
}

impl PartialEq for FilterSet {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.values == other.values
    }
}
