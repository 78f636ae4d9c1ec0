//! Sync-list command implementation

use anyhow::Result;
use serde::Serialize;
use tc_core::SyncStatus;
use tc_engine::SyncTracker;

use crate::cli::{GlobalArgs, OutputFormat, SyncListArgs};
use crate::commands::common;

#[derive(Serialize)]
struct TripSync {
    trip_id: i64,
    status: SyncStatus,
    description: &'static str,
}

/// Execute the sync-list command
pub async fn execute(args: &SyncListArgs, global: &GlobalArgs) -> Result<()> {
    let (_, db) = common::open(global)?;
    let tracker = SyncTracker::new(&db);
    if args.track_all {
        tracker.track_all_trips()?;
    }

    let rows: Vec<TripSync> = tracker
        .overview()?
        .into_iter()
        .map(|(trip_id, status)| TripSync {
            trip_id,
            status,
            description: status.description(),
        })
        .collect();

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No trips are tracked yet.");
                return Ok(());
            }
            println!("{:<10} {:<12} DESCRIPTION", "TRIP", "STATUS");
            for row in &rows {
                println!(
                    "{:<10} {:<12} {}",
                    row.trip_id,
                    row.status.as_str(),
                    row.description
                );
            }
            let awaiting = tracker.ready_trip_ids()?.len();
            println!();
            println!("{awaiting} trip(s) awaiting upload");
        }
    }
    Ok(())
}
