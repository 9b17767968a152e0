//! Generates the 2D example field map along x and z and archives it.
//!
//! Usage: `bdsim_fieldmap [--config FILE] [--output FILE] [--archive FILE | --no-archive] [--plot PNG]`

extern crate bdsim_fieldmap as lib;

use clap::Parser;
use lib::configuration::{self, FieldMapConfiguration, Overrides};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "bdsim_fieldmap")]
#[command(about = "Generate a 2D BDSIM field map and archive it")]
struct Args {
    /// YAML or JSON configuration; compiled-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field file to write, overriding the configuration
    #[arg(long)]
    output: Option<PathBuf>,

    /// Archive to write, overriding the configuration
    #[arg(long, conflicts_with = "no_archive")]
    archive: Option<PathBuf>,

    /// Skip archiving the field file
    #[arg(long = "no-archive")]
    no_archive: bool,

    /// Also save a quiver plot of the grid to this PNG
    #[arg(long)]
    plot: Option<PathBuf>,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn configuration(args: &Args) -> lib::Result<FieldMapConfiguration> {
    let overrides = Overrides {
        output_path: args.output.clone(),
        archive_path: args.archive.clone(),
        no_archive: args.no_archive,
        plot_path: args.plot.clone(),
    };
    configuration::resolve(args.config.as_deref(), &overrides)
}

fn main() {
    init_logging();
    let args = Args::parse();

    let config = match configuration(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    match lib::pipeline::run(&config) {
        Ok(output) => info!(
            "field map {} complete ({} x {} samples)",
            output.field_file.display(),
            output.metadata.counts[0],
            output.metadata.counts[1]
        ),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
