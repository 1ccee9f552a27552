use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use routestats::manager::Manager;
use routestats::types::{CorrelationKind, DayType, Metric};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Correlate {
        #[arg(long)]
        start_location: String,
        #[arg(long, value_enum)]
        kind: CorrelationKind,
    },

    Hourly {
        #[arg(long)]
        route_id: u32,
        #[arg(long, value_enum)]
        day_type: DayType,
        #[arg(long, value_enum)]
        metric: Metric,
    },

    Summary,

    Routes,

    Analyze,

    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.data_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Correlate {
            start_location,
            kind,
        } => mgr.correlate(&start_location, kind)?,
        Command::Hourly {
            route_id,
            day_type,
            metric,
        } => mgr.hourly(route_id, day_type, metric)?,
        Command::Summary => mgr.summary()?,
        Command::Routes => mgr.routes()?,
        Command::Analyze => mgr.analyze()?,
        Command::Clean => mgr.clean()?,
    }

    Ok(())
}
