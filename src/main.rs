use anyhow::Result;
use camwatch::{
    cli::{
        handle_history_command, handle_report_command, handle_track_command, Cli, CliCommand,
    },
    config,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before argument parsing so env-backed flags can see it.
    let dotenv_result = config::load_dotenv();

    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    dotenv_result?;

    match cli.command {
        Some(CliCommand::Version) => {
            println!("camwatch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(CliCommand::Report(args)) => handle_report_command(args),
        Some(CliCommand::History(args)) => handle_history_command(args),
        Some(CliCommand::Track(args)) => handle_track_command(args).await,
        None => handle_track_command(Default::default()).await,
    }
}
