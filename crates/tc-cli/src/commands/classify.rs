//! Classify command implementation

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tc_db::catalog;
use tc_engine::{Classifier, RunControl};

use crate::cli::{ClassifyArgs, GlobalArgs};
use crate::commands::common;

/// Execute the classify command
pub async fn execute(args: &ClassifyArgs, global: &GlobalArgs) -> Result<()> {
    let (config, db) = common::open(global)?;
    let classifier = Classifier::new(&db, &config);
    let total = db.with_conn(catalog::count)?;

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message("classifying");

    let pass = {
        let mut control = RunControl::new(config.run.chunk_size)
            .with_progress(|p| pb.set_position(p.checks_completed as u64));
        classifier
            .classify_catalog(args.force, &mut control)
            .context("Classification failed")?
    };
    pb.finish_and_clear();

    if !pass.evaluated {
        println!(
            "Catalog unchanged since last classification ({} checks).",
            pass.classifications.len()
        );
    }
    println!(
        "{} of {} checks runnable on this device",
        pass.runnable_count(),
        pass.classifications.len()
    );
    for (status, count) in classifier.classification_summary()? {
        println!("  {:<40} {count}", status.as_str());
    }
    Ok(())
}
