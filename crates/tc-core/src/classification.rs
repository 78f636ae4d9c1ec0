//! Compatibility verdicts for catalog checks.
//!
//! Every check receives exactly one [`Classification`] per catalog version.
//! Stored status codes below 100 are not runnable on the device; codes of 100
//! and above are.

use crate::check::CheckId;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of evaluating a check for on-device executability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationStatus {
    /// Body is empty or starts with a disabled sentinel
    NotRunnableDisabledUpstream,
    /// Check id is on the manual exclusion list
    NotRunnableManualExclusion,
    /// Depends on columns only populated at the central server
    NotRunnableServerOnly,
    /// Uses `(+)` outer-join syntax
    NotRunnableLegacyJoin,
    /// `HAVING` appears before `GROUP BY`
    NotRunnableClauseOrder,
    /// References a function the embedded engine lacks
    NotRunnableUnsupportedMacro,
    /// Trial run hit a missing table or column
    NotRunnableMissingData,
    /// Trial run failed for any other reason
    NotRunnableExecutionError,
    /// Trial run succeeded unchanged
    RunnableAsIs,
    /// Trial run succeeded after a dialect rewrite
    RunnableWithRewrite,
}

impl ClassificationStatus {
    /// All statuses in code order.
    pub const ALL: [ClassificationStatus; 10] = [
        ClassificationStatus::NotRunnableDisabledUpstream,
        ClassificationStatus::NotRunnableManualExclusion,
        ClassificationStatus::NotRunnableServerOnly,
        ClassificationStatus::NotRunnableLegacyJoin,
        ClassificationStatus::NotRunnableClauseOrder,
        ClassificationStatus::NotRunnableUnsupportedMacro,
        ClassificationStatus::NotRunnableMissingData,
        ClassificationStatus::NotRunnableExecutionError,
        ClassificationStatus::RunnableAsIs,
        ClassificationStatus::RunnableWithRewrite,
    ];

    /// Stable code persisted in the classification cache.
    pub fn code(self) -> i64 {
        match self {
            ClassificationStatus::NotRunnableDisabledUpstream => 0,
            ClassificationStatus::NotRunnableManualExclusion => 1,
            ClassificationStatus::NotRunnableServerOnly => 2,
            ClassificationStatus::NotRunnableLegacyJoin => 3,
            ClassificationStatus::NotRunnableClauseOrder => 4,
            ClassificationStatus::NotRunnableUnsupportedMacro => 5,
            ClassificationStatus::NotRunnableMissingData => 6,
            ClassificationStatus::NotRunnableExecutionError => 7,
            ClassificationStatus::RunnableAsIs => 100,
            ClassificationStatus::RunnableWithRewrite => 101,
        }
    }

    /// Inverse of [`ClassificationStatus::code`].
    pub fn from_code(code: i64) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(CoreError::UnknownStatusCode {
                kind: "classification",
                code,
            })
    }

    pub fn is_runnable(self) -> bool {
        self.code() >= 100
    }

    /// Upper-case name used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationStatus::NotRunnableDisabledUpstream => "NOT_RUNNABLE_DISABLED_UPSTREAM",
            ClassificationStatus::NotRunnableManualExclusion => "NOT_RUNNABLE_MANUAL_EXCLUSION",
            ClassificationStatus::NotRunnableServerOnly => "NOT_RUNNABLE_SERVER_ONLY",
            ClassificationStatus::NotRunnableLegacyJoin => "NOT_RUNNABLE_LEGACY_JOIN",
            ClassificationStatus::NotRunnableClauseOrder => "NOT_RUNNABLE_CLAUSE_ORDER",
            ClassificationStatus::NotRunnableUnsupportedMacro => "NOT_RUNNABLE_UNSUPPORTED_MACRO",
            ClassificationStatus::NotRunnableMissingData => "NOT_RUNNABLE_MISSING_DATA",
            ClassificationStatus::NotRunnableExecutionError => "NOT_RUNNABLE_EXECUTION_ERROR",
            ClassificationStatus::RunnableAsIs => "RUNNABLE_AS_IS",
            ClassificationStatus::RunnableWithRewrite => "RUNNABLE_WITH_REWRITE",
        }
    }
}

impl fmt::Display for ClassificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub check_id: CheckId,
    pub status: ClassificationStatus,

    /// Body to execute instead of the catalog SQL.
    ///
    /// Only present for [`ClassificationStatus::RunnableWithRewrite`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewritten_sql: Option<String>,

    /// Diagnostic detail: offending token, missing object, or driver error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Classification {
    pub fn new(check_id: CheckId, status: ClassificationStatus) -> Self {
        Self {
            check_id,
            status,
            rewritten_sql: None,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn rewritten(check_id: CheckId, sql: String) -> Self {
        Self {
            check_id,
            status: ClassificationStatus::RunnableWithRewrite,
            rewritten_sql: Some(sql),
            detail: None,
        }
    }

    pub fn is_runnable(&self) -> bool {
        self.status.is_runnable()
    }
}

#[cfg(test)]
#[path = "classification_test.rs"]
mod tests;
