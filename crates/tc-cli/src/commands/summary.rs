//! Summary command implementation

use anyhow::Result;
use tc_engine::{trip_check_summary, RunLifecycle};

use crate::cli::{GlobalArgs, SummaryArgs};
use crate::commands::common;

/// Execute the summary command
pub async fn execute(args: &SummaryArgs, global: &GlobalArgs) -> Result<()> {
    let (_, db) = common::open(global)?;
    println!("{}", trip_check_summary(&db, args.trip_id)?);

    if args.hauls {
        let counts = RunLifecycle::new(&db).issue_counts_by_haul(args.trip_id)?;
        for (haul, count) in counts {
            println!("  haul {haul:<4} {count}");
        }
    }
    Ok(())
}
