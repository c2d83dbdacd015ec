//! ng-link - Neuroglancer state and link builder
//!
//! Builds viewer states for Zarr volumes on S3 or GCS and extracts cell
//! markers for annotation layers.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ng-link")]
#[command(author, version, about = "Neuroglancer state and link builder")]
#[command(long_about = "
Builds Neuroglancer viewer states from a JSON or YAML description of the
output dimensions and layers, writes them next to the data, and prints the
link that opens them.

Examples:
  ng-link build input.yaml --bucket aind-open-data --output-dir results
  ng-link build input.json --bucket my-bucket --scheme gs --output-dir out --print
  ng-link points detected_cells.xml -o cells.json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a viewer state and print its link
    #[command(visible_alias = "b")]
    Build(BuildArgs),

    /// Extract cell locations from a CellCounter marker file
    #[command(visible_alias = "p")]
    Points(PointsArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Input description (.json, .yaml or .yml)
    input: PathBuf,

    /// Bucket holding the image data and the written state
    #[arg(short, long)]
    bucket: String,

    /// Storage scheme: s3, gs
    #[arg(short, long, default_value = "s3")]
    scheme: String,

    /// Directory the state file is written to
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Viewer base URL
    #[arg(long, default_value = nglink_state::DEFAULT_BASE_URL)]
    base_url: String,

    /// State file name
    #[arg(long, default_value = nglink_state::DEFAULT_JSON_NAME)]
    json_name: String,

    /// Also print the state document to stdout
    #[arg(short, long)]
    print: bool,
}

#[derive(Args)]
struct PointsArgs {
    /// Marker file
    input: PathBuf,

    /// Output JSON (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build(args) => commands::build::run(args, cli.verbose),
        Commands::Points(args) => commands::points::run(args, cli.verbose),
    }
}
