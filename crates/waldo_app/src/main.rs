mod platform;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use waldo_core::Phase;

use platform::app::App;
use platform::config::AppConfig;
use platform::logging::{self, LogDestination};

/// Submit an article for location extraction and follow its progress.
#[derive(Debug, Parser)]
#[command(name = "waldo", version)]
struct Cli {
    /// Article URL or article text; `-` reads the text from stdin.
    input: String,

    /// Server base URL, overriding the config file.
    #[arg(long)]
    server: Option<String>,

    /// RON config file (defaults to ./waldo.ron when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where log output goes, overriding the config file.
    #[arg(long, value_enum)]
    log: Option<LogDestination>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("waldo: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the session completed successfully.
fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.base_url = server;
    }
    if let Some(destination) = cli.log {
        config.log_destination = destination;
    }
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(config.log_destination, level);

    let input = if cli.input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read article text from stdin")?;
        text
    } else {
        cli.input
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let app = App::from_config(&config, io::stdout()).context("failed to build HTTP client")?;
    let view = runtime.block_on(app.run(input));
    Ok(view.phase == Phase::Complete && view.error.is_none())
}
