//! Compatibility classifier and classification cache.
//!
//! Each check gets exactly one verdict per catalog version. Static scans run
//! first, in a fixed order; the first that matches decides. Checks that pass
//! every scan are trial-executed against the live schema inside a
//! transaction that is always rolled back.
//!
//! The cache is keyed by the catalog checksum and the classifier rules
//! fingerprint. Both are written only after the last verdict is stored, so
//! an interrupted pass always leaves the cache stale.

use crate::error::EngineResult;
use crate::progress::{Phase, RunControl};
use std::collections::BTreeMap;
use tc_core::{
    catalog_checksum, Check, CheckId, Classification, ClassificationStatus, Config, RunVersion,
};
use tc_db::{catalog, classifications, settings, DbError, TripDb};
use tc_sql::{apply_renames, render, CheckParameters, SqlScan};

/// Result of [`Classifier::classify_catalog`]
#[derive(Debug, Clone, Default)]
pub struct ClassificationPass {
    pub classifications: BTreeMap<CheckId, Classification>,
    /// False when the cached verdicts were current and reused
    pub evaluated: bool,
    /// The pass stopped on a cancellation request; nothing was cached
    pub canceled: bool,
}

impl ClassificationPass {
    pub fn runnable_count(&self) -> usize {
        self.classifications
            .values()
            .filter(|c| c.is_runnable())
            .count()
    }
}

/// Classifies the catalog stored in a [`TripDb`].
pub struct Classifier<'a> {
    db: &'a TripDb,
    config: &'a Config,
}

impl<'a> Classifier<'a> {
    pub fn new(db: &'a TripDb, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Whether the cache holds exactly one verdict per check of the current
    /// catalog, produced under the current rules.
    pub fn is_catalog_classified(&self) -> EngineResult<bool> {
        let fingerprint = self.config.classification_fingerprint();
        let fresh = self.db.with_conn(|conn| {
            let checks = catalog::load(conn)?;
            let stored_checksum = settings::get(conn, settings::CATALOG_CHECKSUM)?;
            let stored_fingerprint = settings::get(conn, settings::RULES_FINGERPRINT)?;
            let (total, distinct) = classifications::counts(conn)?;
            Ok(stored_checksum.as_deref() == Some(catalog_checksum(&checks).as_str())
                && stored_fingerprint.as_deref() == Some(fingerprint.as_str())
                && total == distinct
                && total == checks.len())
        })?;
        Ok(fresh)
    }

    pub fn classification_count(&self) -> EngineResult<usize> {
        let (total, _) = self.db.with_conn(classifications::counts)?;
        Ok(total)
    }

    pub fn classification_summary(&self) -> EngineResult<BTreeMap<ClassificationStatus, usize>> {
        Ok(self.db.with_conn(classifications::summary)?)
    }

    /// Cached verdicts, without checking freshness.
    pub fn cached(&self) -> EngineResult<BTreeMap<CheckId, Classification>> {
        Ok(self.db.with_conn(classifications::load)?)
    }

    /// Classify the whole catalog, or reuse the cache when it is current
    /// and `force` is false.
    pub fn classify_catalog(
        &self,
        force: bool,
        control: &mut RunControl<'_>,
    ) -> EngineResult<ClassificationPass> {
        if !force && self.is_catalog_classified()? {
            log::debug!("Catalog unchanged since last classification; reusing cache");
            return Ok(ClassificationPass {
                classifications: self.cached()?,
                evaluated: false,
                canceled: false,
            });
        }

        let checks = self.db.with_conn(catalog::load)?;
        let checksum = catalog_checksum(&checks);
        log::info!("Classifying {} checks", checks.len());

        self.db.transaction(|conn| {
            settings::remove(conn, settings::CATALOG_CHECKSUM)?;
            settings::remove(conn, settings::RULES_FINGERPRINT)?;
            classifications::clear(conn)
        })?;

        let total = checks.len();
        let mut verdicts = BTreeMap::new();
        for (done, check) in checks.iter().enumerate() {
            if control.is_canceled() {
                log::info!("Classification canceled after {done} of {total} checks");
                self.db.with_conn(classifications::clear)?;
                return Ok(ClassificationPass {
                    classifications: BTreeMap::new(),
                    evaluated: true,
                    canceled: true,
                });
            }
            let verdict = self.classify_check(check);
            log::debug!("Check {}: {}", check.id, verdict.status);
            self.db
                .with_conn(|conn| classifications::insert(conn, &verdict))?;
            verdicts.insert(check.id, verdict);
            control.check_processed(Phase::Classification, done + 1, total);
        }
        control.phase_finished(Phase::Classification, total, total);

        let fingerprint = self.config.classification_fingerprint();
        self.db.transaction(|conn| {
            settings::set(conn, settings::CATALOG_CHECKSUM, &checksum)?;
            settings::set(conn, settings::RULES_FINGERPRINT, &fingerprint)
        })?;

        log_summary(&verdicts);
        Ok(ClassificationPass {
            classifications: verdicts,
            evaluated: true,
            canceled: false,
        })
    }

    /// Verdict for a single check. Never fails: errors from the trial run
    /// become non-runnable verdicts.
    pub fn classify_check(&self, check: &Check) -> Classification {
        self.static_verdict(check)
            .unwrap_or_else(|| self.trial_verdict(check))
    }

    fn static_verdict(&self, check: &Check) -> Option<Classification> {
        let id = check.id;
        let classifier = &self.config.classifier;
        let rules = &self.config.rules;
        let body = check.sql.trim();
        let upper = body.to_ascii_uppercase();

        if body.is_empty() {
            return Some(Classification::new(
                id,
                ClassificationStatus::NotRunnableDisabledUpstream,
            ));
        }
        if let Some(sentinel) = classifier
            .disabled_sentinels
            .iter()
            .find(|s| upper.starts_with(&s.to_ascii_uppercase()))
        {
            return Some(
                Classification::new(id, ClassificationStatus::NotRunnableDisabledUpstream)
                    .with_detail(sentinel.clone()),
            );
        }

        if check
            .message
            .to_lowercase()
            .contains(&classifier.keypunch_message_marker.to_lowercase())
            && body
                .to_lowercase()
                .contains(&classifier.keypunch_column_marker.to_lowercase())
        {
            return Some(Classification::new(
                id,
                ClassificationStatus::NotRunnableServerOnly,
            ));
        }

        let scan = SqlScan::new(body);
        if scan.uses_legacy_outer_join() {
            return Some(Classification::new(
                id,
                ClassificationStatus::NotRunnableLegacyJoin,
            ));
        }
        if scan.having_precedes_group_by() {
            return Some(Classification::new(
                id,
                ClassificationStatus::NotRunnableClauseOrder,
            ));
        }
        if let Some(name) = scan.find_denied_macro(&rules.unsupported_macros) {
            return Some(
                Classification::new(id, ClassificationStatus::NotRunnableUnsupportedMacro)
                    .with_detail(name),
            );
        }
        if rules.is_excluded(id) {
            return Some(Classification::new(
                id,
                ClassificationStatus::NotRunnableManualExclusion,
            ));
        }
        None
    }

    fn trial_verdict(&self, check: &Check) -> Classification {
        let params = CheckParameters {
            trip_id: self.config.classifier.trial_trip_id,
            check_id: check.id,
            created_by: self.config.classifier.trial_user_id,
            created_date: RunVersion::now().to_string(),
        };

        if let Some(rewritten) = apply_renames(&check.sql, &self.config.rules.function_renames) {
            match self.trial(&rewritten, &params) {
                Ok(()) => return Classification::rewritten(check.id, rewritten),
                Err(e) => log::debug!(
                    "Check {}: rewritten body failed trial ({e}); trying original",
                    check.id
                ),
            }
        }

        match self.trial(&check.sql, &params) {
            Ok(()) => Classification::new(check.id, ClassificationStatus::RunnableAsIs),
            Err(DbError::MissingTable { table, .. }) => {
                Classification::new(check.id, ClassificationStatus::NotRunnableMissingData)
                    .with_detail(table)
            }
            Err(DbError::MissingColumn { table, column, .. }) => {
                Classification::new(check.id, ClassificationStatus::NotRunnableMissingData)
                    .with_detail(format!("{table}.{column}"))
            }
            Err(e) => {
                log::warn!(
                    "Check {} failed its trial run: {e}\n{}",
                    check.id,
                    render(&check.sql, &params)
                );
                Classification::new(check.id, ClassificationStatus::NotRunnableExecutionError)
                    .with_detail(e.to_string())
            }
        }
    }

    fn trial(&self, sql: &str, params: &CheckParameters) -> Result<(), DbError> {
        let rendered = render(sql, params);
        self.db
            .rollback_only(|conn| conn.execute_batch(&rendered).map_err(DbError::from))
    }
}

fn log_summary(verdicts: &BTreeMap<CheckId, Classification>) {
    let mut counts: BTreeMap<ClassificationStatus, usize> = BTreeMap::new();
    for v in verdicts.values() {
        *counts.entry(v.status).or_default() += 1;
    }
    let parts: Vec<String> = counts
        .iter()
        .map(|(status, n)| format!("{status}={n}"))
        .collect();
    log::info!(
        "Classified {} checks: {}",
        verdicts.len(),
        parts.join(", ")
    );
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
