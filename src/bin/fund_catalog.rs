use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use fund_catalog::app::{App, LogSink, ProgressSink};
use fund_catalog::browser::HttpBrowser;
use fund_catalog::config::{ConfigLoader, Mode};
use fund_catalog::error::CatalogError;
use fund_catalog::maya::MayaHttpClient;
use fund_catalog::output::{JsonOutput, OutputMode, render_summary};
use fund_catalog::store::Store;

#[derive(Parser)]
#[command(name = "fund-catalog")]
#[command(about = "Collects TASE mutual funds and ETFs and ranks them by total fee")]
#[command(version, author)]
struct Cli {
    /// Config file (defaults to fund-catalog.json when present).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Print the run summary as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    #[command(about = "Discover ids, fetch every instrument and rank by fee")]
    Run,
    #[command(about = "Fetch and rank the ids saved by a previous run")]
    Fetch,
    #[command(about = "Re-rank the saved catalog")]
    Rank,
}

impl From<Command> for Mode {
    fn from(value: Command) -> Self {
        match value {
            Command::Run => Mode::Full,
            Command::Fetch => Mode::FromIds,
            Command::Rank => Mode::RankOnly,
        }
    }
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<CatalogError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &CatalogError) -> u8 {
    match error {
        CatalogError::ConfigRead(_) | CatalogError::ConfigParse(_) => 2,
        CatalogError::Navigation(_)
        | CatalogError::NavigationStatus { .. }
        | CatalogError::MissingControl(_)
        | CatalogError::EndpointHttp(_)
        | CatalogError::EndpointStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let mode = cli.command.map(Mode::from).unwrap_or(config.mode);

    let browser = HttpBrowser::new(config.timeout_secs)?;
    let api = MayaHttpClient::new(&config.api_base_url, config.timeout_secs)?;
    let store = Store::new(config.paths.clone());
    let mut app = App::new(store, browser, api, config.discovery.clone());

    let sink: &dyn ProgressSink = match output_mode {
        OutputMode::Json => &JsonOutput,
        OutputMode::Human => &LogSink,
    };
    let summary = app.run(mode, sink)?;

    match output_mode {
        OutputMode::Json => JsonOutput::print_summary(&summary).into_diagnostic()?,
        OutputMode::Human => println!("{}", render_summary(&summary)),
    }
    Ok(())
}
