//! Comet Kernel Generator
//!
//! Fetches heliocentric state vectors for the curated comet list from JPL
//! Horizons and writes them as SPK type 9 kernels, then prints the
//! body/id mapping as JSON.
//!
//! Usage:
//!   cargo run --bin comet_kernels -- [--max-comets-per-kernel N] [--out-dir DIR]

use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use cometkernels::catalogs::default_comets;
use cometkernels::horizons::{HorizonsClient, DEFAULT_TIMEOUT, HORIZONS_URL};
use cometkernels::planner::{KernelPlanner, WrittenKernel};
use cometkernels::summary::{self, SUMMARY_HEADING};
use cometkernels::{GeneratorConfig, SPKFactory};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Comet Kernel Generator
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generates SPICE SPK kernels for curated comets from JPL Horizons",
    long_about = None
)]
struct Args {
    /// Start of coverage (UTC)
    #[arg(long, default_value = "1950-01-01")]
    start_utc: String,

    /// End of coverage (UTC)
    #[arg(long, default_value = "2050-01-01")]
    stop_utc: String,

    /// Horizons step size, e.g. "5 d" or "12 h"
    #[arg(long, default_value = "5 d")]
    step_size: String,

    /// Directory the kernels are written to
    #[arg(long, default_value = "kernels/comets")]
    out_dir: PathBuf,

    /// Output file name prefix (without .bsp)
    #[arg(long, default_value = "comets_1950_2050_step5d")]
    file_prefix: String,

    /// Comets per kernel file; 0 writes a single kernel
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    max_comets_per_kernel: i64,

    /// Leading word of every segment identifier
    #[arg(long, default_value = "COMET")]
    segment_prefix: String,

    /// Horizons API endpoint
    #[arg(long, default_value = HORIZONS_URL)]
    horizons_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> GeneratorConfig {
        GeneratorConfig {
            start_time: self.start_utc,
            stop_time: self.stop_utc,
            step_size: self.step_size,
            out_dir: self.out_dir,
            file_prefix: self.file_prefix,
            max_per_kernel: self.max_comets_per_kernel,
            segment_prefix: self.segment_prefix,
            horizons_url: self.horizons_url,
            timeout: Duration::from_secs(self.timeout_secs),
            ..GeneratorConfig::default()
        }
    }
}

/// Format bytes as megabytes
fn format_megabytes(size_bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    format!("{:.2} MB", size_bytes as f64 / MB)
}

fn report_kernel(kernel: &WrittenKernel) {
    let size = fs::metadata(&kernel.path).map(|m| m.len()).unwrap_or(0);
    println!(
        "Wrote {} ({}, {} segments)",
        kernel.path.display(),
        format_megabytes(size),
        kernel.records.len()
    );
}

fn run(config: &GeneratorConfig) -> Result<()> {
    fs::create_dir_all(&config.out_dir)?;

    let client = HorizonsClient::with_endpoint(config.horizons_url.clone(), config.timeout)?;
    let catalog = default_comets();
    let planner = KernelPlanner::new(config, &client, &SPKFactory);

    let start_time = Instant::now();
    let records = planner.run(&catalog, report_kernel)?;
    println!("Generated {} segments in {:.2?}", records.len(), start_time.elapsed());

    println!();
    println!("{}", SUMMARY_HEADING);
    println!("{}", summary::emit(&records)?);

    Ok(())
}

fn main() {
    let config = Args::parse().into_config();

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
