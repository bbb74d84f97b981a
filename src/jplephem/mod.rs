//! JPL/NAIF kernel writing
//!
//! This module writes SPICE binary kernels so comet trajectories can be loaded
//! by any SPICE-compatible reader.
//!
//! # Main Components
//!
//! - `daf`: Double Array File format writer (underlying format of SPK files)
//! - `spk`: Spacecraft Planet Kernel type 9 segment writer and the
//!   [`KernelFactory`](crate::kernel::KernelFactory) backed by it

pub mod daf;
pub mod spk;

// Re-export primary types for convenience
pub use self::daf::DAFWriter;
pub use self::spk::{SPKFactory, SPKWriter};
