// crates/sitestack-harness/src/outputs.rs
// ============================================================================
// Module: Output Set
// Description: Named outputs produced after a successful apply.
// Purpose: Expose real resource identifiers for direct emulator queries.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Outputs are decoded from `output -json`. String outputs keep their raw
//! value; other outputs are rendered as compact JSON text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::HarnessError;
use crate::value::AttributeValue;

// ============================================================================
// SECTION: Documents
// ============================================================================

/// One entry of `output -json`.
#[derive(Debug, Deserialize)]
struct OutputDocument {
    /// Output value.
    #[serde(default)]
    value: Value,
}

// ============================================================================
// SECTION: Output Set
// ============================================================================

/// Output name to string value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSet {
    /// Rendered values keyed by output name.
    values: BTreeMap<String, String>,
}

impl OutputSet {
    /// Decodes outputs from `output -json`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::PlanDecode`] when the JSON is malformed.
    pub fn from_json_str(raw: &str) -> Result<Self, HarnessError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let documents: BTreeMap<String, OutputDocument> = serde_json::from_str(trimmed)
            .map_err(|err| HarnessError::PlanDecode(format!("outputs: {err}")))?;
        let values = documents
            .into_iter()
            .map(|(name, document)| (name, AttributeValue::from(&document.value).render()))
            .collect();
        Ok(Self {
            values,
        })
    }

    /// Returns an output value when present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns an output value or fails when missing.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MissingOutput`] when the output is absent.
    pub fn require(&self, name: &str) -> Result<&str, HarnessError> {
        self.get(name).ok_or_else(|| HarnessError::MissingOutput(name.to_string()))
    }

    /// Returns an output value, failing when missing or empty.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MissingOutput`] when absent and
    /// [`HarnessError::Assertion`] when the value is empty.
    pub fn require_non_empty(&self, name: &str) -> Result<&str, HarnessError> {
        let value = self.require(name)?;
        if value.trim().is_empty() {
            return Err(HarnessError::Assertion {
                check: format!("output {name} non-empty"),
                expected: "non-empty string".to_string(),
                actual: format!("{value:?}"),
            });
        }
        Ok(value)
    }

    /// Iterates output names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the number of outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no outputs were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
