//! Trip command implementation

use anyhow::{Context, Result};
use tc_db::trips;
use tc_engine::SyncTracker;

use crate::cli::{GlobalArgs, TripArgs, TripCommands};
use crate::commands::common;

/// Execute the trip command
pub async fn execute(args: &TripArgs, global: &GlobalArgs) -> Result<()> {
    match &args.command {
        TripCommands::Add { trip_id, user } => {
            let (_, db) = common::open(global)?;
            db.with_conn(|conn| trips::insert(conn, *trip_id, *user))
                .context("Failed to register trip")?;
            let status = SyncTracker::new(&db).status(*trip_id)?;
            println!("Trip {trip_id} registered ({})", status.description());
            Ok(())
        }
    }
}
