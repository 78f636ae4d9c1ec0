//! Status command implementation

use anyhow::Result;
use tc_engine::SyncTracker;

use crate::cli::{GlobalArgs, StatusAction, StatusArgs};
use crate::commands::common;

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let (_, db) = common::open(global)?;
    let tracker = SyncTracker::new(&db);
    let trip_id = args.trip_id;

    let status = match args.action {
        None => tracker.status(trip_id)?,
        Some(StatusAction::Ready) => tracker.mark_ready(trip_id)?,
        Some(StatusAction::InProgress) => tracker.mark_in_progress(trip_id)?,
        Some(StatusAction::Cycle) => tracker.cycle_status(trip_id)?,
        Some(StatusAction::Failed) => tracker.mark_export_failed(trip_id)?,
        Some(StatusAction::Completed) => tracker.mark_export_completed(trip_id)?,
    };
    println!("Trip {trip_id}: {status} ({})", status.description());
    Ok(())
}
