//! Check catalog definitions.
//!
//! A [`Check`] is an externally authored business rule: a human-readable
//! message plus a SQL body that inserts rows into `trip_issues` when the rule
//! is violated for a trip. The catalog is replaced wholesale whenever the sync
//! collaborator downloads a new version.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Identifier of a check in the catalog.
pub type CheckId = i64;

/// Identifier of a trip.
pub type TripId = i64;

/// Identifier of the observer running checks.
pub type UserId = i64;

/// A single check definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Catalog id (unique within a catalog)
    pub id: CheckId,

    /// Message shown to the observer when the check triggers
    pub message: String,

    /// Parameterized SQL body
    #[serde(default)]
    pub sql: String,

    /// Findings are only shown to debriefers
    #[serde(default)]
    pub debriefer_only: bool,
}

impl Check {
    pub fn new(id: CheckId, message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
            sql: sql.into(),
            debriefer_only: false,
        }
    }

    /// Field values in hashing order.
    ///
    /// The order is part of the catalog checksum and must not change.
    pub fn checksum_fields(&self) -> [String; 4] {
        [
            self.id.to_string(),
            self.message.clone(),
            self.sql.clone(),
            self.debriefer_only.to_string(),
        ]
    }
}

/// Load a catalog from a JSON array of check objects.
///
/// Used as the backstop when the synced catalog table is empty, and by the
/// CLI to seed a fresh database. Duplicate ids are rejected.
pub fn load_catalog_json(path: &Path) -> CoreResult<Vec<Check>> {
    if !path.exists() {
        return Err(CoreError::CatalogInvalid {
            path: path.display().to_string(),
            message: "file does not exist".to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut checks: Vec<Check> =
        serde_json::from_str(&content).map_err(|e| CoreError::CatalogInvalid {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let mut seen = BTreeSet::new();
    for check in &checks {
        if !seen.insert(check.id) {
            return Err(CoreError::CatalogInvalid {
                path: path.display().to_string(),
                message: format!("duplicate check id {}", check.id),
            });
        }
    }
    checks.sort_by_key(|c| c.id);
    log::debug!("Loaded {} checks from {}", checks.len(), path.display());
    Ok(checks)
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
