//! Cometkernels: SPICE trajectory kernels for curated comets
//!
//! This crate queries JPL Horizons for heliocentric state vectors of a fixed
//! list of small bodies and writes them as SPK type 9 segments into one or
//! more kernel files.
//!
//! The pipeline runs strictly in order:
//!
//! 1. [`planner::plan`] splits the [`BodyCatalog`] into kernel groups
//! 2. every body of a group is fetched ([`EphemerisSource`]) and parsed
//!    ([`horizons::parse`])
//! 3. [`KernelWriter`] opens the group's file, writes one segment per body and
//!    closes it
//! 4. [`summary::emit`] renders the body/id mapping of everything written

pub mod catalogs;
pub mod config;
pub mod constants;
pub mod errors;
pub mod horizons;
pub mod jplephem;
pub mod kernel;
pub mod planner;
pub mod summary;

// Re-export commonly used types
pub use catalogs::{BodyCatalog, BodySpec};
pub use config::GeneratorConfig;
pub use errors::{CometKernelError, Result};
pub use horizons::{EphemerisQuery, EphemerisSource, HorizonsClient, ParsedEphemeris};
pub use jplephem::SPKFactory;
pub use kernel::{KernelFactory, KernelWriter, SegmentRecord, SegmentSink};
pub use planner::{KernelGroup, KernelPlanner};
