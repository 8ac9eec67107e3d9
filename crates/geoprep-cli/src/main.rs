//! Command-line interface for `GeoPrep`, a set of small GeoJSON preparation tools.
//!
//! This binary provides a thin CLI over the [`geoprep_core`] library for preparing
//! feature collections before they are published to a web map.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! It parses arguments, configures logging, and delegates to command handlers, which call
//! straight into the core library.
//!
//! # Available Commands
//!
//! - `annotate` - Assign sequential ids and a random palette colour to every feature
//! - `simplify` - Topology-preserving simplification of every geometry
//! - `reproject` - Transform coordinates between reference systems
//! - `crs` - List the reference systems supported by the built-in transformer

mod display;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, debug, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use geoprep_core::annotate::{self, AnnotateOptions};
use geoprep_core::crs::supported_crs;
use geoprep_core::error::GeoPrepError;
use geoprep_core::progress::ConsoleProgress;
use geoprep_core::reproject::{self, DEFAULT_SOURCE_CRS, DEFAULT_TARGET_CRS, ReprojectOptions};
use geoprep_core::simplify::{self, SimplifyOptions};
use geoprep_core::types::{AnnotateStats, ReprojectStats, SimplifyStats};

use crate::display::display_crs_table;

#[derive(Parser)]
#[command(
    name = "geoprep",
    version,
    about = "Prepare GeoJSON for web maps",
    long_about = "GeoPrep annotates, simplifies and reprojects GeoJSON feature collections.\n\
                  Every command reads one file and atomically writes another."
)]
/// Command-line arguments and options for the `GeoPrep` CLI.
///
/// This struct defines the top-level CLI interface, including global flags for
/// logging verbosity and the subcommand to execute.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `GeoPrep` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Assigns ids 1..N and a random palette colour to every feature.
    ///
    /// The colour is stored in the `susycolor` property. Output is
    /// pretty-printed with two-space indentation.
    Annotate {
        /// Path to the input feature collection.
        #[arg(short, long, value_name = "FILE", default_value = "reprojected_WECA.json")]
        input: String,

        /// Path for the annotated output.
        #[arg(short, long, value_name = "FILE", default_value = "OA_w_ids.json")]
        output: String,

        /// Seed for the colour choice, for reproducible output.
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },

    /// Simplifies every geometry while preserving topology.
    Simplify {
        /// Path to the input GeoJSON.
        #[arg(value_name = "INPUT")]
        input: String,

        /// Path for the simplified output.
        #[arg(value_name = "OUTPUT")]
        output: String,

        /// Coordinate precision (accepted, not applied).
        #[arg(value_name = "PRECISION")]
        precision: u32,

        /// Maximum distance a removed vertex may lie from the result, in input units.
        #[arg(value_name = "TOLERANCE", allow_negative_numbers = true)]
        tolerance: f64,
    },

    /// Transforms every coordinate from one reference system to another.
    Reproject {
        /// Path to the input GeoJSON.
        #[arg(value_name = "INPUT")]
        input: String,

        /// Path for the reprojected output.
        #[arg(value_name = "OUTPUT")]
        output: String,

        /// Source reference system.
        #[arg(long, value_name = "CRS", default_value = DEFAULT_SOURCE_CRS)]
        from: String,

        /// Target reference system.
        #[arg(long, value_name = "CRS", default_value = DEFAULT_TARGET_CRS)]
        to: String,
    },

    /// Lists the reference systems supported by the built-in transformer.
    Crs,
}

/// Entry point for the `GeoPrep` command-line interface.
///
/// Usage errors print the usage message and exit with status 1. A failed
/// command prints a user-facing message and also exits with status 1.
fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                std::process::exit(1);
            },
        },
    };

    if let Err(err) = init_logging(&cli) {
        eprintln!("Failed to initialise logging: {err}");
        std::process::exit(1);
    }

    if let Err(err) = run(cli.command) {
        report(&err);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Annotate {
            input,
            output,
            seed,
        } => {
            let stats = handle_annotate(&input, &output, seed)?;
            println!(
                "Added unique IDs and random '{}' to {} features.",
                annotate::DEFAULT_COLOR_PROPERTY,
                stats.features
            );
        },
        Commands::Simplify {
            input,
            output,
            precision,
            tolerance,
        } => {
            let stats = handle_simplify(&input, &output, precision, tolerance)?;
            info!("Removed {} of {} vertices", stats.removed(), stats.vertices_before);
        },
        Commands::Reproject {
            input,
            output,
            from,
            to,
        } => {
            let stats = handle_reproject(&input, &output, &from, &to)?;
            debug!("Transformed {} geometries", stats.geometries);
        },
        Commands::Crs => handle_crs(),
    }

    Ok(())
}

/// Print the user-facing message and a suggestion when one exists.
fn report(err: &anyhow::Error) {
    debug!("{err:?}");
    match err.downcast_ref::<GeoPrepError>() {
        Some(geoprep_err) => {
            eprintln!("Error: {}", geoprep_err.user_message());
            if let Some(suggestion) = geoprep_err.recovery_suggestion() {
                eprintln!("Hint: {suggestion}");
            }
        },
        None => eprintln!("Error: {err:#}"),
    }
}

fn handle_annotate(input: &str, output: &str, seed: Option<u64>) -> Result<AnnotateStats> {
    info!("Annotate command:");
    info!("Input: {input}");
    info!("Output: {output}");
    debug!("Seed: {seed:?}");

    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let stats = annotate::annotate_file(input, output, &AnnotateOptions::default(), &mut rng)?;
    Ok(stats)
}

fn handle_simplify(
    input: &str,
    output: &str,
    precision: u32,
    tolerance: f64,
) -> Result<SimplifyStats> {
    info!("Simplify command:");
    info!("Input: {input}");
    info!("Output: {output}");
    debug!("Precision: {precision}");
    debug!("Tolerance: {tolerance}");

    let options = SimplifyOptions::new(precision, tolerance);
    let mut progress = ConsoleProgress::stdout();
    let stats = simplify::simplify_file(input, output, &options, &mut progress)?;
    Ok(stats)
}

fn handle_reproject(input: &str, output: &str, from: &str, to: &str) -> Result<ReprojectStats> {
    info!("Reproject command:");
    info!("Input: {input}");
    info!("Output: {output}");
    info!("From {from} to {to}");

    let options = ReprojectOptions::default().with_from(from).with_to(to);
    let stats = reproject::reproject_file(input, output, &options)?;
    Ok(stats)
}

/// Handles the `crs` subcommand by displaying the built-in reference systems.
fn handle_crs() {
    display_crs_table(supported_crs());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const POINTS: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [0, 0]}},
        {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1, 1]}}
      ]
    }"#;

    fn write_input(temp_dir: &TempDir, name: &str, contents: &str) -> String {
        let path = temp_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_parse_simplify_arguments() {
        let cli = Cli::try_parse_from(["geoprep", "simplify", "in.json", "out.json", "5", "0.01"])
            .unwrap();
        match cli.command {
            Commands::Simplify {
                precision,
                tolerance,
                ..
            } => {
                assert_eq!(precision, 5);
                assert!((tolerance - 0.01).abs() < f64::EPSILON);
            },
            _ => panic!("expected simplify"),
        }
    }

    #[test]
    fn test_parse_simplify_missing_arguments() {
        let err = Cli::try_parse_from(["geoprep", "simplify", "in.json"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_reproject_defaults() {
        let cli = Cli::try_parse_from(["geoprep", "-v", "reproject", "in.json", "out.json"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Reproject { from, to, .. } => {
                assert_eq!(from, "EPSG:27700");
                assert_eq!(to, "EPSG:4326");
            },
            _ => panic!("expected reproject"),
        }
    }

    #[test]
    fn test_parse_annotate_defaults() {
        let cli = Cli::try_parse_from(["geoprep", "annotate"]).unwrap();
        match cli.command {
            Commands::Annotate {
                input,
                output,
                seed,
            } => {
                assert_eq!(input, "reprojected_WECA.json");
                assert_eq!(output, "OA_w_ids.json");
                assert_eq!(seed, None);
            },
            _ => panic!("expected annotate"),
        }
    }

    #[test]
    fn test_handle_annotate() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let input = write_input(&temp_dir, "reprojected_WECA.json", POINTS);
        let output = temp_dir.path().join("OA_w_ids.json");

        let stats = handle_annotate(&input, &output.to_string_lossy(), Some(7))?;
        assert_eq!(stats.features, 2);
        assert_eq!(stats.last_id, Some(2));
        assert!(output.exists());
        Ok(())
    }

    #[test]
    fn test_handle_annotate_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("missing.json");
        let output = temp_dir.path().join("out.json");

        let err = handle_annotate(&input.to_string_lossy(), &output.to_string_lossy(), None)
            .unwrap_err();
        let geoprep_err = err.downcast_ref::<GeoPrepError>().unwrap();
        assert!(geoprep_err.user_message().contains("missing.json"));
        assert!(!output.exists());
    }

    #[test]
    fn test_handle_simplify_negative_tolerance() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_input(&temp_dir, "in.json", POINTS);
        let output = temp_dir.path().join("out.json");

        let result = handle_simplify(&input, &output.to_string_lossy(), 6, -1.0);
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_handle_reproject_unsupported_crs() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_input(&temp_dir, "in.json", POINTS);
        let output = temp_dir.path().join("out.json");

        let result = handle_reproject(&input, &output.to_string_lossy(), "EPSG:27700", "bogus");
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_handle_reproject() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let input = write_input(&temp_dir, "in.json", POINTS);
        let output = temp_dir.path().join("out.json");

        let stats = handle_reproject(&input, &output.to_string_lossy(), "EPSG:4326", "EPSG:3857")?;
        assert_eq!(stats.features, 2);
        assert_eq!(stats.coordinates, 2);
        Ok(())
    }
}
