use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "camwatch")]
#[command(about = "Track camera-off time for Zoom meeting participants", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Poll a live meeting and track camera usage (default)
    Track(TrackCliArgs),
    /// Print cumulative results stored for a meeting
    Report(ReportCliArgs),
    /// Export the per-session history stored for a meeting as CSV
    History(HistoryCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug, Default)]
pub struct TrackCliArgs {
    /// Meeting ID to track (overrides ZOOM_MEETING_ID)
    #[arg(short, long)]
    pub meeting: Option<String>,
    /// Seconds between camera status checks
    #[arg(short, long)]
    pub interval: Option<u64>,
    /// Total tracking duration in minutes
    #[arg(short, long)]
    pub duration: Option<u64>,
    /// Minutes between interim saves
    #[arg(long, conflicts_with = "no_interim")]
    pub interim: Option<u64>,
    /// Disable interim saves
    #[arg(long)]
    pub no_interim: bool,
    /// Directory for CSV reports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ReportCliArgs {
    /// Meeting ID whose stored data should be reported
    #[arg(short, long, env = "ZOOM_MEETING_ID")]
    pub meeting: String,
}

#[derive(ClapArgs, Debug)]
pub struct HistoryCliArgs {
    /// Meeting ID whose stored history should be exported
    #[arg(short, long, env = "ZOOM_MEETING_ID")]
    pub meeting: String,
    /// Output file (default: detailed_history_<meeting>_<timestamp>.csv in the output directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
