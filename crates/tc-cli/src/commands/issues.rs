//! Issues command implementation

use anyhow::Result;
use serde::Serialize;
use tc_core::{Issue, RunVersion};
use tc_engine::visible_latest_issues;

use crate::cli::{GlobalArgs, IssuesArgs, OutputFormat};
use crate::commands::common;

#[derive(Serialize)]
struct IssueReport<'a> {
    trip_id: i64,
    run_version: &'a RunVersion,
    issues: &'a [Issue],
}

/// Execute the issues command
pub async fn execute(args: &IssuesArgs, global: &GlobalArgs) -> Result<()> {
    let (_, db) = common::open(global)?;
    let Some((issues, run_version)) = visible_latest_issues(&db, args.trip_id, args.debriefer)?
    else {
        println!("Trip checks have not been run for trip {}", args.trip_id);
        return Ok(());
    };

    match args.output {
        OutputFormat::Table => print_table(&issues, &run_version),
        OutputFormat::Json => {
            let report = IssueReport {
                trip_id: args.trip_id,
                run_version: &run_version,
                issues: &issues,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn print_table(issues: &[Issue], run_version: &RunVersion) {
    println!("Run {run_version}: {} issue(s)", issues.len());
    if issues.is_empty() {
        return;
    }
    println!(
        "{:<8} {:<6} {:<6} {:<24} {:<24} NOTES",
        "CHECK", "HAUL", "CATCH", "ITEM", "VALUE"
    );
    for issue in issues {
        println!(
            "{:<8} {:<6} {:<6} {:<24} {:<24} {}",
            issue.check_id,
            display(issue.fishing_activity_num),
            display(issue.catch_num),
            issue.error_item.as_deref().unwrap_or("-"),
            issue.error_value.as_deref().unwrap_or("-"),
            issue.notes.as_deref().unwrap_or(""),
        );
    }
}

fn display(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
