//! Nestwatch CLI
//!
//! Times external commands with the hierarchical stopwatch and renders
//! text reports, JSON snapshots, and SVG flame graphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use nestwatch::clock::TimeUnit;
use nestwatch::commands::{execute_measure, validate_args, MeasureArgs};
use nestwatch::flamegraph::FlamegraphConfig;
use nestwatch::output::read_report_json;
use nestwatch::utils::config::SCHEMA_VERSION;

/// Nestwatch - hierarchical interval timing for external commands
#[derive(Parser, Debug)]
#[command(name = "nestwatch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run and time an external command
    Measure {
        /// Event name (defaults to the program name)
        #[arg(short, long)]
        name: Option<String>,

        /// Number of times to run the command
        #[arg(short, long, default_value = "1")]
        runs: u32,

        /// Reporting resolution: ns, micros, ms, s, m, h, d
        #[arg(long, default_value = "ms")]
        resolution: TimeUnit,

        /// Output path for JSON report (optional)
        #[arg(short, long)]
        json: Option<PathBuf>,

        /// Output path for SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Print hot-path summary to stdout
        #[arg(long)]
        summary: bool,

        /// Number of hot paths to include in the summary
        #[arg(long, default_value = "10")]
        top_paths: usize,

        /// Command to run, after --
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Measure {
            name,
            runs,
            resolution,
            json,
            flamegraph,
            title,
            width,
            summary,
            top_paths,
            command,
        } => {
            // Create flamegraph config
            let fg_config = if flamegraph.is_some() {
                let mut config = FlamegraphConfig::new();

                if let Some(title_str) = title {
                    config = config.with_title(title_str);
                }

                config.width = width;

                Some(config)
            } else {
                None
            };

            // Create measure args
            let args = MeasureArgs {
                command,
                name,
                runs,
                resolution,
                output_json: json,
                output_svg: flamegraph,
                flamegraph_config: fg_config,
                print_summary: summary,
                top_paths,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute measure
            execute_measure(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a report JSON file
///
/// **Private** - internal command implementation
fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report_json(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Resolution: {}", report.resolution);
    println!("  Events: {}", report.events.len());
    println!("  Still running: {}", report.still_running);
    println!("  Generated at: {}", report.generated_at);

    Ok(())
}

/// Display schema information
///
/// **Private** - internal command implementation
fn display_schema(show_details: bool) {
    println!("Nestwatch Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string       - Schema version (e.g., '1.0.0')");
        println!("  resolution: string    - Unit all durations are expressed in");
        println!("  generated_at: string  - ISO 8601 timestamp");
        println!("  events: array         - One entry per completed path, sorted");
        println!("    path: string        - Fully-qualified dotted path");
        println!("    time: number        - Total accumulated duration");
        println!("    count: number       - Completed occurrences");
        println!("    mean: number        - Mean duration per occurrence");
        println!("  still_running: number - Events still open at snapshot time");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Nestwatch v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Hierarchical interval timing for external commands.");
}
