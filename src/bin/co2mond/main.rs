mod args;

use std::{process::ExitCode, time::Duration};

use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use co2mon::{
    co2mon::run_session,
    hid::{Co2Monitor, HidConfig},
    report::Report,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "co2mon=info,co2mond=info";

fn main() -> ExitCode {
    init_tracing();

    if let Err(e) = run() {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let args = Args::parse();

    let config = HidConfig {
        read_timeout: Duration::from_millis(args.timeout_ms),
    };

    let outcome = run_session(
        || Co2Monitor::open(args.device.as_deref(), config),
        &args.magic_table,
    );

    let report = Report::from_outcome(&outcome);
    let json = report.to_json().context("failed to serialize report")?;
    println!("{json}");

    outcome.context("failed to read CO2 monitor")?;

    Ok(())
}
