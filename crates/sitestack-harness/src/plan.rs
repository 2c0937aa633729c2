// crates/sitestack-harness/src/plan.rs
// ============================================================================
// Module: Plan Result
// Description: Planned resources decoded from the provisioning tool's JSON plan.
// Purpose: Provide read-only lookups over planned addresses and change actions.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`PlanResult`] is built from `show -json` output. Planned values are
//! collected from the root module and every nested child module, keyed by
//! resource address; change actions come from `resource_changes`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::HarnessError;
use crate::value::AttributeSet;

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// Top-level `show -json` document.
#[derive(Debug, Deserialize)]
struct PlanDocument {
    /// Planned resource values.
    #[serde(default)]
    planned_values: Option<PlannedValues>,
    /// Per-resource change actions.
    #[serde(default)]
    resource_changes: Vec<ResourceChangeDocument>,
}

/// Planned values wrapper.
#[derive(Debug, Deserialize)]
struct PlannedValues {
    /// Root module.
    #[serde(default)]
    root_module: Option<ModuleDocument>,
}

/// One module in the planned values tree.
#[derive(Debug, Deserialize)]
struct ModuleDocument {
    /// Resources declared directly in the module.
    #[serde(default)]
    resources: Vec<ResourceDocument>,
    /// Nested module calls.
    #[serde(default)]
    child_modules: Vec<ModuleDocument>,
}

/// One planned resource.
#[derive(Debug, Deserialize)]
struct ResourceDocument {
    /// Full resource address.
    address: String,
    /// Known attribute values.
    #[serde(default)]
    values: Value,
}

/// One entry of `resource_changes`.
#[derive(Debug, Deserialize)]
struct ResourceChangeDocument {
    /// Full resource address.
    address: String,
    /// Resource type.
    #[serde(rename = "type", default)]
    resource_type: String,
    /// Planned change.
    change: ChangeDocument,
}

/// Change body.
#[derive(Debug, Deserialize)]
struct ChangeDocument {
    /// Actions such as `create` or `delete`.
    #[serde(default)]
    actions: Vec<String>,
}

// ============================================================================
// SECTION: Plan Result
// ============================================================================

/// Planned change for a single resource address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    /// Resource type (for example `aws_s3_bucket`).
    pub resource_type: String,
    /// Planned actions (`create`, `update`, `delete`, `no-op`, ...).
    pub actions: Vec<String>,
}

impl ResourceChange {
    /// Returns true when the change creates the resource.
    #[must_use]
    pub fn creates(&self) -> bool {
        self.actions.iter().any(|action| action == "create")
    }
}

/// Planned resources keyed by address.
///
/// # Invariants
/// - Addresses are unique; a later duplicate replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanResult {
    /// Planned attributes keyed by address.
    planned: BTreeMap<String, AttributeSet>,
    /// Change actions keyed by address.
    changes: BTreeMap<String, ResourceChange>,
}

impl PlanResult {
    /// Decodes a plan from `show -json` output.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::PlanDecode`] when the JSON is malformed.
    pub fn from_json_str(raw: &str) -> Result<Self, HarnessError> {
        let document: PlanDocument =
            serde_json::from_str(raw).map_err(|err| HarnessError::PlanDecode(err.to_string()))?;
        let mut planned = BTreeMap::new();
        if let Some(root) = document.planned_values.and_then(|values| values.root_module) {
            collect_module(root, &mut planned);
        }
        let changes = document
            .resource_changes
            .into_iter()
            .map(|change| {
                (
                    change.address,
                    ResourceChange {
                        resource_type: change.resource_type,
                        actions: change.change.actions,
                    },
                )
            })
            .collect();
        Ok(Self {
            planned,
            changes,
        })
    }

    /// Returns the number of planned resource addresses.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.planned.len()
    }

    /// Iterates planned addresses in sorted order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.planned.keys().map(String::as_str)
    }

    /// Returns the planned attributes for an address.
    #[must_use]
    pub fn resource(&self, address: &str) -> Option<&AttributeSet> {
        self.planned.get(address)
    }

    /// Returns the planned attributes for an address or fails.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MissingResource`] when the address is not planned.
    pub fn require_resource(&self, address: &str) -> Result<&AttributeSet, HarnessError> {
        self.planned.get(address).ok_or_else(|| HarnessError::MissingResource(address.to_string()))
    }

    /// Returns planned addresses whose resource type matches.
    ///
    /// Matches the final `<type>.<name>` segment so module-nested and indexed
    /// addresses (`module.site.aws_s3_bucket.root[0]`) are included.
    #[must_use]
    pub fn addresses_of_type(&self, resource_type: &str) -> Vec<&str> {
        self.planned
            .keys()
            .filter(|address| address_type(address) == Some(resource_type))
            .map(String::as_str)
            .collect()
    }

    /// Returns the planned change for an address.
    #[must_use]
    pub fn change_for(&self, address: &str) -> Option<&ResourceChange> {
        self.changes.get(address)
    }
}

/// Flattens a module and its children into `planned`.
fn collect_module(module: ModuleDocument, planned: &mut BTreeMap<String, AttributeSet>) {
    for resource in module.resources {
        planned.insert(resource.address, AttributeSet::from_json(&resource.values));
    }
    for child in module.child_modules {
        collect_module(child, planned);
    }
}

/// Extracts the resource type from an address, skipping module and data prefixes.
fn address_type(address: &str) -> Option<&str> {
    let segments: Vec<&str> = address.split('.').collect();
    let mut index = 0;
    while index + 1 < segments.len() && segments[index] == "module" {
        index += 2;
    }
    if segments.get(index) == Some(&"data") {
        index += 1;
    }
    segments.get(index).copied().filter(|_| index + 1 < segments.len())
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod plan_tests;
