//! Run command implementation

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tc_db::catalog;
use tc_engine::{ChunkProgress, Phase, RunCoordinator, RunEvent, RunGuard};

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{self, ExitCode};

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let (config, db) = common::open(global)?;
    let total = db.with_conn(catalog::count)?;
    let coordinator = RunCoordinator::new(Arc::new(db), Arc::new(config), RunGuard::new());

    let mut handle = coordinator
        .start_run(args.trip_id, args.user)
        .with_context(|| format!("Failed to start run for trip {}", args.trip_id))?;

    let progress = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let mut phase = None;
    let mut cancel_sent = false;
    let terminal = loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(RunEvent::ChunkCompleted(chunk)) => {
                    if let Some(pb) = &progress {
                        show_chunk(pb, &chunk, &mut phase);
                    }
                }
                Some(terminal) => break Some(terminal),
                None => break None,
            },
            _ = tokio::signal::ctrl_c(), if !cancel_sent => {
                cancel_sent = true;
                if let Some(pb) = &progress {
                    pb.set_message("canceling");
                }
                coordinator.cancel_run();
            }
        }
    };
    handle.finish().await;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    match terminal {
        Some(RunEvent::Completed {
            trip_id,
            run_version,
            tally,
        }) => {
            println!("Trip {trip_id} checked as run {run_version}: {tally}");
            if tally.failed > 0 {
                println!(
                    "{} check(s) failed unexpectedly; see the log for details",
                    tally.failed
                );
            }
            Ok(())
        }
        Some(RunEvent::Canceled { trip_id, .. }) => {
            println!("Run for trip {trip_id} canceled; previous results kept");
            Err(ExitCode(130).into())
        }
        Some(RunEvent::Failed { trip_id, message }) => {
            anyhow::bail!("Run for trip {trip_id} failed: {message}")
        }
        Some(RunEvent::ChunkCompleted(_)) | None => {
            anyhow::bail!("Run for trip {} ended without a result", args.trip_id)
        }
    }
}

fn show_chunk(pb: &ProgressBar, chunk: &ChunkProgress, phase: &mut Option<Phase>) {
    if *phase != Some(chunk.phase) {
        pb.reset();
        *phase = Some(chunk.phase);
    }
    pb.set_length(chunk.total_checks as u64);
    pb.set_position(chunk.checks_completed as u64);
    pb.set_message(chunk.phase.to_string());
}
