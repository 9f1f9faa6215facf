pub mod args;
pub mod report;
pub mod track;

pub use args::{Cli, CliCommand, HistoryCliArgs, ReportCliArgs, TrackCliArgs};
pub use report::{handle_history_command, handle_report_command};
pub use track::handle_track_command;
