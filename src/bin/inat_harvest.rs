use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use inat_harvest::app::{App, RunOptions};
use inat_harvest::config::ConfigLoader;
use inat_harvest::error::HarvestError;
use inat_harvest::inat::InatHttpClient;
use inat_harvest::output::{ConsoleOutput, JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "inat-harvest")]
#[command(about = "Download taxon-labeled iNaturalist images with a CSV metadata ledger")]
#[command(version, author)]
struct Cli {
    /// JSON config file (defaults to ./inat-harvest.json when present)
    #[arg(long)]
    config: Option<String>,

    /// Print the run summary as JSON instead of progress lines
    #[arg(long)]
    json: bool,

    /// Query the API and report what would be downloaded without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<HarvestError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &HarvestError) -> u8 {
    if error.is_config() { 2 } else { 1 }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Console
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let client = InatHttpClient::new(&config.api_base_url)?;
    let app = App::new(config, client);
    let options = RunOptions {
        dry_run: cli.dry_run,
    };

    match output_mode {
        OutputMode::Console => {
            let summary = app.run(options, &ConsoleOutput)?;
            ConsoleOutput::print_summary(&summary).into_diagnostic()?;
        }
        OutputMode::Json => {
            let summary = app.run(options, &JsonOutput)?;
            JsonOutput::print_summary(&summary).into_diagnostic()?;
        }
    }
    Ok(())
}
