//! State build command.
//!
//! Loads a description, builds the state, writes it to the output directory
//! and prints the viewer link.

use crate::BuildArgs;
use anyhow::{Context, Result};
use nglink_core::StorageScheme;
use nglink_state::{LinkConfig, NgState};
use tracing::info;

/// Runs the build command.
pub fn run(args: BuildArgs, verbose: bool) -> Result<()> {
    let scheme: StorageScheme = args
        .scheme
        .parse()
        .with_context(|| format!("Invalid --scheme: {}", args.scheme))?;

    let input = super::load_input(&args.input)?;
    let config = LinkConfig::builder(args.bucket)
        .scheme(scheme)
        .output_dir(args.output_dir)
        .base_url(args.base_url)
        .json_name(args.json_name)
        .verbose(verbose)
        .build();

    let mut state = NgState::new(&input, config)
        .with_context(|| format!("Failed to build state from: {}", args.input.display()))?;
    info!(layers = state.layers().len(), "state built");

    let path = state
        .save_state_as_json(false)
        .with_context(|| format!("Failed to write: {}", state.output_path().display()))?;

    if args.print {
        let doc = serde_json::to_string_pretty(state.state()).context("Failed to serialize state")?;
        println!("{doc}");
    }

    if verbose {
        println!("Wrote {}", path.display());
    }
    println!("{}", state.url_link());
    Ok(())
}
