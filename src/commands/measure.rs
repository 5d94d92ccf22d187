//! Measure command implementation.
//!
//! The measure command:
//! 1. Runs an external command a number of times, timing each run
//! 2. Prints the text report
//! 3. Optionally prints a hot-path summary
//! 4. Optionally writes a JSON report and an SVG flamegraph

use crate::aggregator::{hot_paths, Stopwatch};
use crate::clock::TimeUnit;
use crate::flamegraph::{generate_flamegraph, FlamegraphConfig};
use crate::output::write_report_json;
use crate::utils::config::MAX_MEASURE_RUNS;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::process::Command;

/// Arguments for the measure command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct MeasureArgs {
    /// Program and its arguments
    pub command: Vec<String>,

    /// Event name for each run (defaults to the program name)
    pub name: Option<String>,

    /// Number of times to run the command
    pub runs: u32,

    /// Reporting resolution
    pub resolution: TimeUnit,

    /// Output path for JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Output path for SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Print hot-path summary to stdout
    pub print_summary: bool,

    /// Number of hot paths in the summary
    pub top_paths: usize,
}

impl Default for MeasureArgs {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            name: None,
            runs: 1,
            resolution: TimeUnit::Milliseconds,
            output_json: None,
            output_svg: None,
            flamegraph_config: None,
            print_summary: false,
            top_paths: 10,
        }
    }
}

/// Execute the measure command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Command spawn failures
/// * File write errors
pub fn execute_measure(args: MeasureArgs) -> Result<()> {
    let program = args.command.first().context("No command given")?.clone();
    let event_name = args.name.clone().unwrap_or_else(|| program.clone());

    info!("Measuring {:?} over {} run(s)", program, args.runs);

    // Step 1/4: run and time the command
    info!("Step 1/4: Running command...");
    let mut stopwatch = Stopwatch::with_resolution(args.resolution);

    for run in 1..=args.runs {
        debug!("Run {}/{}", run, args.runs);
        stopwatch.start_named(&event_name);

        let status = Command::new(&program)
            .args(&args.command[1..])
            .status()
            .with_context(|| format!("Failed to run {:?}", program))?;

        stopwatch.stop_named(&event_name);

        if !status.success() {
            warn!("Run {}/{} exited with {}", run, args.runs, status);
        }
    }

    // Step 2/4: print the report
    info!("Step 2/4: Rendering report...");
    print!("{}", stopwatch.report());

    // Step 3/4: hot-path summary (if requested)
    if args.print_summary {
        info!("Step 3/4: Ranking hot paths...");
        let records = stopwatch.records();
        let spots = hot_paths(&records, args.resolution, args.top_paths);

        println!();
        println!("Hot paths:");
        for (i, spot) in spots.iter().enumerate() {
            println!(
                "  {}. {} {}{} ({:.1}%)",
                i + 1,
                spot.path,
                spot.time,
                args.resolution.suffix(),
                spot.percentage
            );
        }
    } else {
        info!("Step 3/4: Skipping summary (not requested)");
    }

    // Step 4/4: write outputs
    info!("Step 4/4: Writing output files...");

    if let Some(json_path) = &args.output_json {
        let report = stopwatch.to_report();
        write_report_json(&report, json_path).context("Failed to write report JSON")?;
        info!("Report written to: {}", json_path.display());
    }

    if let Some(svg_path) = &args.output_svg {
        let records = stopwatch.records();
        let svg = generate_flamegraph(&records, args.resolution, args.flamegraph_config.as_ref())
            .context("Failed to generate flamegraph")?;
        std::fs::write(svg_path, svg)
            .with_context(|| format!("Failed to write flamegraph to {}", svg_path.display()))?;
        info!("Flamegraph written to: {}", svg_path.display());
    }

    Ok(())
}

/// Validate measure arguments
///
/// **Public** - can be called before execute_measure for early validation
pub fn validate_args(args: &MeasureArgs) -> Result<()> {
    if args.command.is_empty() {
        anyhow::bail!("No command given");
    }

    if args.runs == 0 {
        anyhow::bail!("runs must be greater than 0");
    }

    if args.runs > MAX_MEASURE_RUNS {
        anyhow::bail!("runs is too large (max {})", MAX_MEASURE_RUNS);
    }

    if args.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_valid() {
        let args = MeasureArgs {
            command: vec!["true".to_string()],
            ..Default::default()
        };

        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_empty_command() {
        let args = MeasureArgs::default();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_zero_runs() {
        let args = MeasureArgs {
            command: vec!["true".to_string()],
            runs: 0,
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_too_many_runs() {
        let args = MeasureArgs {
            command: vec!["true".to_string()],
            runs: MAX_MEASURE_RUNS + 1,
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_zero_top_paths() {
        let args = MeasureArgs {
            command: vec!["true".to_string()],
            top_paths: 0,
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }
}
