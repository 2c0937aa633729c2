// crates/sitestack-harness/src/value.rs
// ============================================================================
// Module: Tagged Attribute Values
// Description: Typed view over loosely-typed provisioning tool attributes.
// Purpose: Replace untyped JSON lookups with accessors that fail instead of panic.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Plan and output structures from the provisioning tool are dynamically
//! typed. [`AttributeValue`] tags each value with its kind and [`AttributeSet`]
//! maps attribute names to values. Accessors return
//! [`HarnessError::TypeMismatch`] on kind mismatches.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Attribute Value
// ============================================================================

/// Tagged scalar or collection value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Unknown or absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// String value.
    String(String),
    /// Ordered list of values.
    List(Vec<AttributeValue>),
    /// Nested attribute map.
    Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns the kind label for the value.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Returns true when the value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Reads the value as a string slice.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::TypeMismatch`] when the value is not a string.
    pub fn as_str(&self) -> Result<&str, HarnessError> {
        match self {
            Self::String(value) => Ok(value),
            other => Err(mismatch("string", other)),
        }
    }

    /// Reads the value as a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::TypeMismatch`] when the value is not a boolean.
    pub fn as_bool(&self) -> Result<bool, HarnessError> {
        match self {
            Self::Bool(value) => Ok(*value),
            other => Err(mismatch("bool", other)),
        }
    }

    /// Reads the value as a float.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::TypeMismatch`] when the value is not a number.
    pub fn as_f64(&self) -> Result<f64, HarnessError> {
        match self {
            Self::Number(value) => Ok(*value),
            other => Err(mismatch("number", other)),
        }
    }

    /// Reads the value as a list.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::TypeMismatch`] when the value is not a list.
    pub fn as_list(&self) -> Result<&[Self], HarnessError> {
        match self {
            Self::List(values) => Ok(values),
            other => Err(mismatch("list", other)),
        }
    }

    /// Reads the value as a map.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::TypeMismatch`] when the value is not a map.
    pub fn as_map(&self) -> Result<&BTreeMap<String, Self>, HarnessError> {
        match self {
            Self::Map(values) => Ok(values),
            other => Err(mismatch("map", other)),
        }
    }

    /// Renders the value as display text for outputs and assertion messages.
    ///
    /// Strings render verbatim; everything else renders as compact JSON.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            other => other.to_json().to_string(),
        }
    }

    /// Converts the tagged value back into JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Number(value) => {
                serde_json::Number::from_f64(*value).map_or(Value::Null, Value::Number)
            }
            Self::String(value) => Value::String(value.clone()),
            Self::List(values) => Value::Array(values.iter().map(Self::to_json).collect()),
            Self::Map(values) => Value::Object(
                values.iter().map(|(key, value)| (key.clone(), value.to_json())).collect(),
            ),
        }
    }
}

impl From<&Value> for AttributeValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(*value),
            Value::Number(number) => number.as_f64().map_or(Self::Null, Self::Number),
            Value::String(value) => Self::String(value.clone()),
            Value::Array(values) => Self::List(values.iter().map(Self::from).collect()),
            Value::Object(values) => Self::Map(
                values.iter().map(|(key, value)| (key.clone(), Self::from(value))).collect(),
            ),
        }
    }
}

/// Builds a type mismatch error for `actual`.
fn mismatch(expected: &'static str, actual: &AttributeValue) -> HarnessError {
    HarnessError::TypeMismatch {
        expected,
        actual: actual.kind(),
    }
}

// ============================================================================
// SECTION: Attribute Set
// ============================================================================

/// Attribute name to value mapping for one planned resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    /// Attribute values keyed by name.
    values: BTreeMap<String, AttributeValue>,
}

impl AttributeSet {
    /// Builds an attribute set from a JSON object; non-objects yield an empty set.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let values = value
            .as_object()
            .map(|object| {
                object.iter().map(|(key, value)| (key.clone(), AttributeValue::from(value))).collect()
            })
            .unwrap_or_default();
        Self {
            values,
        }
    }

    /// Returns the attribute value when present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// Returns the attribute value or fails when missing.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MissingAttribute`] when the attribute is absent.
    pub fn require(&self, name: &str) -> Result<&AttributeValue, HarnessError> {
        self.values.get(name).ok_or_else(|| HarnessError::MissingAttribute(name.to_string()))
    }

    /// Reads a string attribute.
    ///
    /// # Errors
    ///
    /// Returns an error when the attribute is missing or not a string.
    pub fn string(&self, name: &str) -> Result<&str, HarnessError> {
        self.require(name)?.as_str()
    }

    /// Reads a boolean attribute.
    ///
    /// # Errors
    ///
    /// Returns an error when the attribute is missing or not a boolean.
    pub fn bool(&self, name: &str) -> Result<bool, HarnessError> {
        self.require(name)?.as_bool()
    }

    /// Resolves a `/`-separated path through nested maps and lists.
    ///
    /// List segments are zero-based indices, e.g. `website/0/index_document`.
    #[must_use]
    pub fn pointer(&self, path: &str) -> Option<&AttributeValue> {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                AttributeValue::Map(map) => map.get(segment)?,
                AttributeValue::List(list) => list.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the set holds no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates attribute names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod value_tests;
