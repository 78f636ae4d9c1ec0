//! Configuration types and parsing for tripcheck.yml

use crate::check::{CheckId, TripId, UserId};
use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Engine configuration from tripcheck.yml
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Embedded database location
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Background run pacing
    #[serde(default)]
    pub run: RunConfig,

    /// Retry policy for contended statements
    #[serde(default)]
    pub retry: RetryConfig,

    /// Trial-run parameters and sentinel markers
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Curated dialect rules
    #[serde(default)]
    pub rules: RulesConfig,
}

/// Database section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the DuckDB file, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Run section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Checks processed between progress notifications
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Pause after each check so foreground readers get the connection
    #[serde(default = "default_yield_ms")]
    pub yield_ms: u64,

    /// Reject `start_run` when the catalog has not been classified yet,
    /// instead of classifying inside the run
    #[serde(default)]
    pub require_classified_catalog: bool,
}

/// Retry section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts per statement, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

/// Classifier section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Trip id substituted during trial runs
    #[serde(default = "default_trial_id")]
    pub trial_trip_id: TripId,

    /// User id substituted during trial runs
    #[serde(default = "default_trial_id")]
    pub trial_user_id: UserId,

    /// Leading tokens marking a check disabled upstream
    #[serde(default = "default_disabled_sentinels")]
    pub disabled_sentinels: Vec<String>,

    /// Message fragment identifying keypunch checks
    #[serde(default = "default_keypunch_message_marker")]
    pub keypunch_message_marker: String,

    /// Column fragment identifying keypunch-only data
    #[serde(default = "default_keypunch_column_marker")]
    pub keypunch_column_marker: String,
}

/// Rules section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Function and macro names the embedded engine cannot evaluate
    #[serde(default = "default_unsupported_macros")]
    pub unsupported_macros: Vec<String>,

    /// Check ids never run on the device
    #[serde(default)]
    pub excluded_checks: Vec<CheckId>,

    /// Identifier renames applied before the trial run
    #[serde(default = "default_function_renames")]
    pub function_renames: BTreeMap<String, String>,
}

fn default_db_path() -> String {
    "tripcheck.duckdb".to_string()
}

fn default_chunk_size() -> usize {
    25
}

fn default_yield_ms() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    50
}

fn default_max_backoff_ms() -> u64 {
    2000
}

fn default_trial_id() -> i64 {
    1
}

fn default_disabled_sentinels() -> Vec<String> {
    ["DISABLED", "IGNORED", "SEE PROCEDURE", "TEMP"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_keypunch_message_marker() -> String {
    "key punch".to_string()
}

fn default_keypunch_column_marker() -> String {
    "_kp".to_string()
}

fn default_unsupported_macros() -> Vec<String> {
    [
        "TO_CHAR",
        "TO_DATE",
        "SYSTIMESTAMP",
        "DECODE",
        "TRUNC",
        "TRANSLATE",
        "REGEXP_LIKE",
        "ROWNUM",
        "ROW_NUMBER",
        "NVL",
        "CHECK_CC",
        "CHECK_CC_UNSAMPLED",
        "FIND_ALL_TRPS",
        "F_MISSING_SALMON_BIOS",
        "ISALPHANUMERIC",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_function_renames() -> BTreeMap<String, String> {
    BTreeMap::from([("SYSDATE".to_string(), "CURRENT_TIMESTAMP".to_string())])
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            yield_ms: default_yield_ms(),
            require_classified_catalog: false,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            trial_trip_id: default_trial_id(),
            trial_user_id: default_trial_id(),
            disabled_sentinels: default_disabled_sentinels(),
            keypunch_message_marker: default_keypunch_message_marker(),
            keypunch_column_marker: default_keypunch_column_marker(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            unsupported_macros: default_unsupported_macros(),
            excluded_checks: Vec::new(),
            function_renames: default_function_renames(),
        }
    }
}

impl RunConfig {
    pub fn yield_interval(&self) -> Duration {
        Duration::from_millis(self.yield_ms)
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), doubling each time
    /// and capped at `max_backoff_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

impl RulesConfig {
    pub fn is_excluded(&self, check_id: CheckId) -> bool {
        self.excluded_checks.contains(&check_id)
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for tripcheck.yml or tripcheck.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("tripcheck.yml");
        let yaml_path = dir.join("tripcheck.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.run.chunk_size == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "run.chunk_size must be at least 1".to_string(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "retry.max_attempts must be at least 1".to_string(),
            });
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "retry.initial_backoff_ms ({}) exceeds retry.max_backoff_ms ({})",
                    self.retry.initial_backoff_ms, self.retry.max_backoff_ms
                ),
            });
        }
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path must not be empty".to_string(),
            });
        }
        for (from, to) in &self.rules.function_renames {
            if !is_identifier(from) || to.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("rules.function_renames: invalid rename '{from}' -> '{to}'"),
                });
            }
            if self
                .rules
                .unsupported_macros
                .iter()
                .any(|m| m.eq_ignore_ascii_case(from))
            {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "rules.function_renames: '{from}' is also listed in rules.unsupported_macros"
                    ),
                });
            }
        }
        Ok(())
    }

    /// Fingerprint of every setting that influences classification.
    ///
    /// Stored next to the catalog checksum; a change invalidates cached
    /// classifications.
    pub fn classification_fingerprint(&self) -> String {
        let mut macros: Vec<String> = self
            .rules
            .unsupported_macros
            .iter()
            .map(|m| m.to_ascii_uppercase())
            .collect();
        macros.sort();
        macros.dedup();
        let mut excluded = self.rules.excluded_checks.clone();
        excluded.sort_unstable();
        excluded.dedup();

        let canonical = serde_json::json!({
            "unsupported_macros": macros,
            "excluded_checks": excluded,
            "function_renames": self.rules.function_renames,
            "disabled_sentinels": self.classifier.disabled_sentinels,
            "keypunch": [
                self.classifier.keypunch_message_marker,
                self.classifier.keypunch_column_marker,
            ],
        });
        compute_checksum(&canonical.to_string())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
