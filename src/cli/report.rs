//! CLI handlers that read the stored data for a meeting without polling.

use anyhow::Result;
use chrono::Local;

use super::args::{HistoryCliArgs, ReportCliArgs};
use crate::config::Config;
use crate::reporting::{file_names, render_cumulative_table, write_csv, ReportBuilder};
use crate::tracking::SessionStore;

pub fn handle_report_command(args: ReportCliArgs) -> Result<()> {
    let config = Config::load()?;
    let store = SessionStore::new(config.store.resolve_dir()?);
    let tracker = store.load(&args.meeting);

    if tracker.is_empty() {
        println!("No stored data for meeting {}.", args.meeting);
        return Ok(());
    }

    let rows = ReportBuilder::new(tracker.records()).cumulative_results();
    print!("{}", render_cumulative_table(&args.meeting, &rows));
    Ok(())
}

pub fn handle_history_command(args: HistoryCliArgs) -> Result<()> {
    let config = Config::load()?;
    let store = SessionStore::new(config.store.resolve_dir()?);
    let tracker = store.load(&args.meeting);

    let rows = ReportBuilder::new(tracker.records()).history_rows();
    let path = args.output.unwrap_or_else(|| {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        config
            .output
            .directory
            .join(file_names::detailed_history(&args.meeting, &stamp))
    });

    let path = write_csv(&path, &rows)?;
    println!(
        "Detailed history saved to {} ({} session rows)",
        path.display(),
        rows.len()
    );
    Ok(())
}
