//! Run configuration
//!
//! Defaults reproduce the baseline comet kernels: 1950-01-01 .. 2050-01-01 at
//! a five-day step, all comets in one file.

use std::path::PathBuf;
use std::time::Duration;

use crate::horizons::{DEFAULT_TIMEOUT, HORIZONS_URL};

/// Settings for one kernel-generation run
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Start of coverage (UTC calendar date)
    pub start_time: String,
    /// End of coverage (UTC calendar date)
    pub stop_time: String,
    /// Horizons step token
    pub step_size: String,
    /// Directory the kernels are written to
    pub out_dir: PathBuf,
    /// Output file name prefix, without extension
    pub file_prefix: String,
    /// Bodies per kernel file; 0 or less keeps everything in one file
    pub max_per_kernel: i64,
    /// Leading word of every segment identifier
    pub segment_prefix: String,
    /// Internal file name stored in the DAF file record
    pub internal_name: String,
    /// Horizons API endpoint
    pub horizons_url: String,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_time: "1950-01-01".to_string(),
            stop_time: "2050-01-01".to_string(),
            step_size: "5 d".to_string(),
            out_dir: PathBuf::from("kernels").join("comets"),
            file_prefix: "comets_1950_2050_step5d".to_string(),
            max_per_kernel: 0,
            segment_prefix: "COMET".to_string(),
            internal_name: "TSPICE COMETS".to_string(),
            horizons_url: HORIZONS_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
