//! Marker extraction command.

use crate::PointsArgs;
use anyhow::{Context, Result};
use nglink_state::{points, writer};

/// Runs the points command, writing `[{x, y, z}, ...]`.
pub fn run(args: PointsArgs, verbose: bool) -> Result<()> {
    let points = points::points_from_xml(&args.input)
        .with_context(|| format!("Failed to read markers: {}", args.input.display()))?;

    match &args.output {
        Some(path) => {
            writer::save_json(path, &points, verbose)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            if verbose {
                println!("{} points -> {}", points.len(), path.display());
            }
        }
        None => {
            let json = serde_json::to_string_pretty(&points).context("Failed to serialize points")?;
            println!("{json}");
        }
    }
    Ok(())
}
