//! Serializable view of a resolved matrix.

use serde::Serialize;

use super::{Capability, Matrix};

/// One row of a [`CapabilityReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityEntry {
    /// Build definition name (`HAVE_*`).
    pub define: &'static str,
    /// What the capability provides.
    pub summary: &'static str,
    /// Resolved integer value.
    pub value: i64,
    /// Whether the capability is enabled.
    pub enabled: bool,
    /// `default`, `probed` or `external`.
    pub origin: &'static str,
    /// Cargo feature linking the library, for library capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<&'static str>,
}

/// Resolved matrix in a form suitable for logs and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    /// One entry per capability, in matrix order.
    pub capabilities: Vec<CapabilityEntry>,
}

impl CapabilityReport {
    /// Build a report from a resolved matrix.
    pub fn from_matrix(matrix: &Matrix) -> Self {
        let capabilities = matrix
            .iter()
            .map(|(capability, resolved)| CapabilityEntry {
                define: capability.define_name(),
                summary: capability.summary(),
                value: resolved.value,
                enabled: resolved.is_enabled(),
                origin: resolved.origin.as_str(),
                feature: capability.feature(),
            })
            .collect();

        Self { capabilities }
    }

    /// Report for the matrix this artifact was built with.
    pub fn current() -> Self {
        Self::from_matrix(&super::BUILD)
    }

    /// Entry for a capability.
    pub fn entry(&self, capability: Capability) -> Option<&CapabilityEntry> {
        self.capabilities
            .iter()
            .find(|entry| entry.define == capability.define_name())
    }
}
