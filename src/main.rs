use anyhow::{Context, Result};
use clap::Parser;
use fieldkit::report::{build_reports, render_json, render_text};
use fieldkit::{Document, Settings, Theme, TimeZone};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

/// fieldkit - Resolve field configs and print display values for a data document
#[derive(Parser, Debug, Clone)]
#[command(name = "fieldkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON document with frames and fieldConfig
    #[arg(value_name = "DOCUMENT")]
    input: PathBuf,

    /// Time zone for time fields (e.g., utc, browser, Europe/Berlin)
    #[arg(short = 'z', long = "time-zone", value_name = "ZONE")]
    time_zone: Option<TimeZone>,

    /// Theme used to resolve color names (dark or light)
    #[arg(short = 't', long = "theme", value_name = "NAME")]
    theme: Option<String>,

    /// Print resolved display values as JSON instead of a table
    #[arg(long = "json")]
    json: bool,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Settings file to use instead of the one in the config directory
    #[arg(short = 's', long = "settings", value_name = "PATH")]
    settings: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = match &cli.settings {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load().unwrap_or_else(|e| {
            warn!("Using default settings: {:#}", e);
            Settings::default()
        }),
    };

    let theme = match &cli.theme {
        Some(name) => {
            Theme::by_name(name).with_context(|| format!("Unknown theme: {}", name))?
        }
        None => settings.theme()?,
    };
    let time_zone = cli.time_zone.unwrap_or(settings.time_zone);

    let document = Document::load_from_path(&cli.input)?;
    info!(
        "Loaded {} frames from {}",
        document.frames.len(),
        cli.input.display()
    );

    let frames = document.resolve(Arc::new(theme), time_zone, &settings.variables);
    let reports = build_reports(&frames);

    let output = if cli.json {
        render_json(&reports).context("Failed to serialize display values")?
    } else {
        render_text(&reports)
    };
    print!("{}", output);
    if cli.json {
        println!();
    }
    Ok(())
}
