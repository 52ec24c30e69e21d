//! Headless view: load a BMS log, apply the filters, print the result as JSON.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use log::info;

use bms_dash::config::DashConfig;
use bms_dash::data::loader;
use bms_dash::{FilterCriteria, ViewEngine};

#[derive(Parser, Debug)]
#[command(author, version, about = "Filter a BMS log and print table rows and chart series as JSON", long_about = None)]
struct Cli {
    /// BMS log (.csv, .json, .parquet, .xlsx, .xls, .ods); without it the view is empty
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Keep only rows of this battery (exact match)
    #[arg(short, long)]
    battery_id: Option<String>,

    /// First day of the date range (YYYY-MM-DD); needs --end-date
    #[arg(long)]
    start_date: Option<String>,

    /// Last day of the date range (YYYY-MM-DD); needs --start-date
    #[arg(long)]
    end_date: Option<String>,

    /// Config file with custom column names (defaults to ./bms-dash.json)
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Output path (`-` for stdout)
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Indent the JSON output
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashConfig::from_file(path)?,
        None => DashConfig::load(),
    };
    let engine = ViewEngine::new(config.columns);

    let dataset = cli
        .input
        .as_deref()
        .map(|path| {
            loader::load_file(path).with_context(|| format!("loading {}", path.display()))
        })
        .transpose()?;
    if let Some(ds) = &dataset {
        info!("Loaded {} rows, columns {:?}", ds.len(), ds.columns);
    }

    let criteria = FilterCriteria {
        battery_id: cli.battery_id,
        start_date: cli.start_date,
        end_date: cli.end_date,
    };
    if criteria.start_date.is_some() != criteria.end_date.is_some() {
        log::warn!("Only one date bound given; date filtering is skipped");
    }

    let view = engine.compute(dataset.as_ref(), &criteria)?;
    info!("{} rows after filtering", view.table.len());

    let mut out: Box<dyn Write> = if cli.output.as_os_str() == "-" {
        Box::new(io::stdout().lock())
    } else {
        Box::new(
            File::create(&cli.output)
                .with_context(|| format!("creating {}", cli.output.display()))?,
        )
    };
    if cli.pretty {
        serde_json::to_writer_pretty(&mut out, &view)?;
    } else {
        serde_json::to_writer(&mut out, &view)?;
    }
    writeln!(out)?;
    Ok(())
}
