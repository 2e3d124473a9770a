//! CLI entry point: one measurement, one CSV.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use cs2000ctrl::{storage, Cs2000};

/// Trigger a CS-2000A measurement and save the spectrum as CSV.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial device the spectroradiometer is attached to (e.g. /dev/ttyUSB0).
    #[arg(long)]
    port: String,

    /// Directory the spectral CSV is written into.
    #[arg(long = "output_dir_path")]
    output_dir_path: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let mut device = Cs2000::open(&args.port)?;
    let spectrum = device.measure()?;
    storage::save_spectrum(&args.output_dir_path, &spectrum)?;

    Ok(())
}
