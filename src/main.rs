//! despike - remove spike vertices from polygon layers

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use despike::config::{SpikeRemovalConfig, UnsupportedPolicy};
use despike::provider::PlanarGeometry;

#[derive(Parser)]
#[command(name = "despike")]
#[command(author, version, about = "Remove spikes from polygon boundaries", long_about = None)]
struct Cli {
    /// Input polygons layer (.geojson or .json)
    input: PathBuf,

    /// Directory for the cleaned layer
    #[arg(short, long)]
    output_dir: PathBuf,

    /// File name of the cleaned layer
    #[arg(short = 'n', long)]
    output_name: String,

    /// Base distance in dataset units (metres for projected data)
    #[arg(short, long)]
    distance: f64,

    /// Unit correction applied to the distance
    #[arg(short, long, default_value_t = SpikeRemovalConfig::DEFAULT_SCALE_FACTOR, conflicts_with = "geographic")]
    scale_factor: f64,

    /// Geographic coordinates: use a scale factor of 0.00001
    #[arg(short, long)]
    geographic: bool,

    /// Vertices further than distance * multiplier from the buffer are spikes
    #[arg(short, long, default_value_t = SpikeRemovalConfig::DEFAULT_KEEP_MULTIPLIER)]
    keep_multiplier: f64,

    /// Replace an existing output file
    #[arg(long)]
    overwrite: bool,

    /// Also write buffer and vertex layers to <output-dir>/temp
    #[arg(long)]
    debug_layers: bool,

    /// Skip features with unsupported geometry instead of aborting
    #[arg(long)]
    skip_unsupported: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> SpikeRemovalConfig {
        let scale_factor = if self.geographic {
            SpikeRemovalConfig::GEOGRAPHIC_SCALE_FACTOR
        } else {
            self.scale_factor
        };
        SpikeRemovalConfig {
            input: self.input,
            output_dir: self.output_dir,
            output_name: self.output_name,
            distance: self.distance,
            scale_factor,
            keep_multiplier: self.keep_multiplier,
            overwrite: self.overwrite,
            debug_layers: self.debug_layers,
            on_unsupported: if self.skip_unsupported {
                UnsupportedPolicy::Skip
            } else {
                UnsupportedPolicy::Abort
            },
        }
    }
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config();
    info!(
        distance = config.distance,
        scale_factor = config.scale_factor,
        keep_multiplier = config.keep_multiplier,
        "starting spike removal"
    );

    let summary = despike::batch::run(&config, &PlanarGeometry)
        .with_context(|| format!("failed to clean {}", config.input.display()))?;

    if summary.degenerate_results > 0 {
        warn!(count = summary.degenerate_results, "some rings have fewer than 3 vertices left");
    }
    if summary.collapsed_buffers > 0 {
        warn!(count = summary.collapsed_buffers, "some polygons were too narrow to check and were left unchanged");
    }
    if summary.aborted {
        bail!("stopped on unsupported geometry; output is partial ({summary})");
    }
    info!("{summary}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
