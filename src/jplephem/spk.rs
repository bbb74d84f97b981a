//! Spacecraft Planet Kernel (SPK) writer
//!
//! Writes SPK data type 9 segments: discrete states with unequal time steps,
//! reconstructed by the reader with Lagrange interpolation.
//!
//! The SPK format is described in:
//! http://naif.jpl.nasa.gov/pub/naif/toolkit_docs/FORTRAN/req/spk.html
//!
//! A type 9 segment array holds, in order:
//!
//! - `n` states (x, y, z, vx, vy, vz)
//! - `n` epochs
//! - an epoch directory with every 100th epoch, `(n - 1) / 100` entries
//! - the polynomial degree
//! - `n`
use std::path::Path;

use crate::constants::MAX_SEGMENT_ID_LEN;
use crate::errors::{CometKernelError, Result};
use crate::jplephem::daf::DAFWriter;
use crate::kernel::{KernelFactory, SegmentSink, SegmentSpec};

/// DAF id word for SPK files
pub const SPK_LOCIDW: &str = "DAF/SPK";
/// SPK summaries carry two doubles (start, stop)
pub const SPK_ND: u32 = 2;
/// and six integers (target, center, frame, type, begin, end)
pub const SPK_NI: u32 = 6;
/// Lagrange interpolation, unequal time steps
pub const TYPE_LAGRANGE_UNEQUAL: i32 = 9;
/// Highest degree a type 9 segment may use
pub const MAX_LAGRANGE_DEGREE: usize = 15;
/// Epoch directory spacing
const DIRECTORY_STEP: usize = 100;

/// Built-in inertial frames by name and NAIF frame code
const FRAMES: [(&str, i32); 4] = [
    ("J2000", 1),
    ("B1950", 2),
    ("FK4", 3),
    ("ECLIPJ2000", 17),
];

/// NAIF frame code for a built-in inertial frame
pub fn frame_code(name: &str) -> Option<i32> {
    FRAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|&(_, code)| code)
}

/// Assemble the type 9 array for a segment
pub fn type9_array(epochs: &[f64], states: &[[f64; 6]], degree: usize) -> Vec<f64> {
    let n = epochs.len();
    let directory = (n.saturating_sub(1)) / DIRECTORY_STEP;

    let mut data = Vec::with_capacity(7 * n + directory + 2);
    for state in states {
        data.extend_from_slice(state);
    }
    data.extend_from_slice(epochs);
    for i in 1..=directory {
        data.push(epochs[i * DIRECTORY_STEP - 1]);
    }
    data.push(degree as f64);
    data.push(n as f64);
    data
}

/// Check a segment against the type 9 rules
pub fn validate_segment(segment: &SegmentSpec<'_>) -> std::result::Result<i32, String> {
    let n = segment.sample_count();

    if segment.segment_id.len() > MAX_SEGMENT_ID_LEN
        || !segment
            .segment_id
            .bytes()
            .all(|b| (0x20..0x7f).contains(&b))
    {
        return Err("segment id must be at most 40 printable ASCII characters".to_string());
    }
    let frame =
        frame_code(segment.frame).ok_or_else(|| format!("unknown frame {}", segment.frame))?;
    if segment.body == segment.center {
        return Err(format!("body and center are both {}", segment.body));
    }
    if segment.degree < 1 || segment.degree > MAX_LAGRANGE_DEGREE {
        return Err(format!(
            "degree {} outside 1..={}",
            segment.degree, MAX_LAGRANGE_DEGREE
        ));
    }
    if n != segment.states.len() {
        return Err(format!("{} epochs but {} states", n, segment.states.len()));
    }
    if n < segment.degree + 1 {
        return Err(format!("{} samples is too few for degree {}", n, segment.degree));
    }
    if !segment.epochs.windows(2).all(|w| w[0] < w[1]) {
        return Err("epochs are not strictly increasing".to_string());
    }
    if segment.start > segment.stop {
        return Err(format!("start {} is after stop {}", segment.start, segment.stop));
    }
    if segment.start < segment.epochs[0] || segment.stop > segment.epochs[n - 1] {
        return Err("coverage interval exceeds the sample epochs".to_string());
    }

    Ok(frame)
}

/// An SPK file open for writing
pub struct SPKWriter {
    daf: DAFWriter,
}

impl SPKWriter {
    /// Create a new SPK at `path`; fails if the file exists
    pub fn create<P: AsRef<Path>>(path: P, internal_name: &str) -> Result<Self> {
        let daf = DAFWriter::create(path, SPK_LOCIDW, SPK_ND, SPK_NI, internal_name)?;
        Ok(Self { daf })
    }

    /// Segments written so far
    pub fn segment_count(&self) -> usize {
        self.daf.array_count()
    }

    /// Path of the file being written
    pub fn path(&self) -> &Path {
        &self.daf.path
    }
}

impl SegmentSink for SPKWriter {
    fn write_segment(&mut self, segment: &SegmentSpec<'_>) -> Result<()> {
        let seg_err = |reason: String| CometKernelError::SegmentWrite {
            segment_id: segment.segment_id.to_string(),
            reason,
        };

        let frame = validate_segment(segment).map_err(seg_err)?;
        let data = type9_array(segment.epochs, segment.states, segment.degree);

        self.daf
            .add_array(
                segment.segment_id,
                &[segment.start, segment.stop],
                &[segment.body, segment.center, frame, TYPE_LAGRANGE_UNEQUAL],
                &data,
            )
            .map_err(|e| seg_err(e.to_string()))?;

        Ok(())
    }

    fn finalize(self) -> Result<()> {
        if self.segment_count() == 0 {
            return Err(CometKernelError::ContainerClose {
                path: self.daf.path.clone(),
                reason: "SPK has no segments".to_string(),
            });
        }
        let path = self.daf.path.clone();
        self.daf
            .close()
            .map_err(|e| CometKernelError::ContainerClose {
                path,
                reason: e.to_string(),
            })
    }

    fn abandon(self) -> Result<()> {
        let path = self.daf.path.clone();
        self.daf
            .discard()
            .map_err(|e| CometKernelError::ContainerClose {
                path,
                reason: e.to_string(),
            })
    }
}

/// Creates SPK files on the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct SPKFactory;

impl KernelFactory for SPKFactory {
    type Sink = SPKWriter;

    fn open(&self, path: &Path, internal_name: &str) -> Result<SPKWriter> {
        SPKWriter::create(path, internal_name)
    }
}
