//! Kernel file lifecycle
//!
//! A kernel file is opened, receives one interpolable segment per body of its
//! group, and is closed. Closing has two terminal paths:
//!
//! - `Finalize` once at least one segment has been written
//! - `Abandon` while the file is still empty
//!
//! Finalizing an empty SPK is an error in the format itself, so the handle
//! carries the close action explicitly and updates it on every successful
//! segment write instead of inferring it at close time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalogs::BodySpec;
use crate::constants::{DEFAULT_FRAME, INTERPOLATION_DEGREE, SUN};
use crate::errors::{CometKernelError, Result};
use crate::horizons::ParsedEphemeris;
use crate::planner::{segment_id, KernelGroup};

/// Everything needed to write one interpolable segment
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpec<'a> {
    /// Body the segment describes
    pub body: i32,
    /// Center the states are relative to
    pub center: i32,
    /// Reference frame name, e.g. "J2000"
    pub frame: &'a str,
    /// Start of coverage (seconds past J2000)
    pub start: f64,
    /// End of coverage (seconds past J2000)
    pub stop: f64,
    /// Segment identifier, at most 40 characters
    pub segment_id: &'a str,
    /// Interpolation degree
    pub degree: usize,
    /// Sample epochs, strictly increasing
    pub epochs: &'a [f64],
    /// Sample states, one per epoch
    pub states: &'a [[f64; 6]],
}

impl SegmentSpec<'_> {
    /// Number of samples in the segment
    pub fn sample_count(&self) -> usize {
        self.epochs.len()
    }
}

/// An open kernel file that accepts segments
pub trait SegmentSink {
    /// Persist one segment
    fn write_segment(&mut self, segment: &SegmentSpec<'_>) -> Result<()>;

    /// Make the file durable and valid; requires at least one segment
    fn finalize(self) -> Result<()>;

    /// Close the raw container without finalizing it
    fn abandon(self) -> Result<()>;
}

/// Creates new kernel files
pub trait KernelFactory {
    /// Handle type for an open file
    type Sink: SegmentSink;

    /// Create a new kernel file at `path`
    fn open(&self, path: &Path, internal_name: &str) -> Result<Self::Sink>;
}

/// How an open kernel file must be closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// At least one segment written
    Finalize,
    /// Nothing written yet
    Abandon,
}

/// An open kernel file together with its close action
pub struct KernelFileHandle<S: SegmentSink> {
    sink: S,
    path: PathBuf,
    segments_written: usize,
    close_action: CloseAction,
}

impl<S: SegmentSink> KernelFileHandle<S> {
    /// Wrap a freshly opened, empty kernel
    pub fn new(sink: S, path: impl Into<PathBuf>) -> Self {
        Self {
            sink,
            path: path.into(),
            segments_written: 0,
            close_action: CloseAction::Abandon,
        }
    }

    /// Write a segment and move to the finalize path on success
    pub fn write_segment(&mut self, segment: &SegmentSpec<'_>) -> Result<()> {
        self.sink.write_segment(segment)?;
        self.segments_written += 1;
        self.close_action = CloseAction::Finalize;
        Ok(())
    }

    /// Segments written so far
    pub fn segments_written(&self) -> usize {
        self.segments_written
    }

    /// The action [`close`](Self::close) will take
    pub fn close_action(&self) -> CloseAction {
        self.close_action
    }

    /// Path of the kernel file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the file along the path its state calls for
    pub fn close(self) -> Result<CloseAction> {
        let action = self.close_action;
        match action {
            CloseAction::Finalize => self.sink.finalize()?,
            CloseAction::Abandon => self.sink.abandon()?,
        }
        log::debug!("Closed {} ({:?})", self.path.display(), action);
        Ok(action)
    }
}

/// One written segment, as reported in the mapping summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRecord {
    /// Catalog label
    pub label: String,
    /// Horizons designation
    pub designation: String,
    /// Body id written to the segment
    pub numeric_id: i32,
    /// File name of the kernel holding the segment
    pub kernel_file_name: String,
    /// Number of samples in the segment
    pub row_count: usize,
}

/// Writes kernel groups through a [`KernelFactory`]
pub struct KernelWriter<'a, F: KernelFactory> {
    factory: &'a F,
    internal_name: String,
    segment_prefix: String,
    center: i32,
    frame: String,
    degree: usize,
}

impl<'a, F: KernelFactory> KernelWriter<'a, F> {
    /// Heliocentric J2000 writer with the standard degree
    pub fn new(
        factory: &'a F,
        internal_name: impl Into<String>,
        segment_prefix: impl Into<String>,
    ) -> Self {
        Self {
            factory,
            internal_name: internal_name.into(),
            segment_prefix: segment_prefix.into(),
            center: SUN,
            frame: DEFAULT_FRAME.to_string(),
            degree: INTERPOLATION_DEGREE,
        }
    }

    /// Write one segment per body of `group`, in group order
    ///
    /// Every body must have an entry in `parsed`. The file is closed before
    /// this returns, whether or not all segments made it.
    pub fn write(
        &self,
        group: &KernelGroup,
        mut parsed: HashMap<BodySpec, ParsedEphemeris>,
        output_path: &Path,
    ) -> Result<Vec<SegmentRecord>> {
        let kernel_file_name = output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let sink = self.factory.open(output_path, &self.internal_name)?;
        let mut handle = KernelFileHandle::new(sink, output_path);
        let mut records = Vec::with_capacity(group.bodies.len());

        let mut outcome = Ok(());
        for body in &group.bodies {
            let result = match parsed.remove(body) {
                Some(ephemeris) => {
                    self.write_body(&mut handle, body, &ephemeris, &kernel_file_name)
                }
                None => Err(CometKernelError::Other(format!(
                    "no parsed ephemeris for {}",
                    body.designation
                ))),
            };

            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    outcome = Err(e.for_body(group.index, &body.label));
                    break;
                }
            }
        }

        let written = handle.segments_written();
        match (outcome, handle.close()) {
            (Ok(()), Ok(_)) => {
                log::info!("Wrote {} segments to {}", written, output_path.display());
                Ok(records)
            }
            (Ok(()), Err(close_err)) => Err(close_err),
            (Err(e), close_result) => {
                if let Err(close_err) = close_result {
                    log::error!("Failed to close {}: {}", output_path.display(), close_err);
                }
                Err(e)
            }
        }
    }

    fn write_body(
        &self,
        handle: &mut KernelFileHandle<F::Sink>,
        body: &BodySpec,
        ephemeris: &ParsedEphemeris,
        kernel_file_name: &str,
    ) -> Result<SegmentRecord> {
        let (start, stop) = ephemeris.interval().ok_or_else(|| {
            CometKernelError::InsufficientSamples {
                found: 0,
                required: self.degree + 1,
            }
        })?;
        let id = segment_id(&self.segment_prefix, &body.designation, ephemeris.numeric_id);

        handle.write_segment(&SegmentSpec {
            body: ephemeris.numeric_id,
            center: self.center,
            frame: &self.frame,
            start,
            stop,
            segment_id: &id,
            degree: self.degree,
            epochs: &ephemeris.epochs,
            states: &ephemeris.states,
        })?;

        log::debug!("Wrote segment '{}' ({} rows)", id, ephemeris.len());

        Ok(SegmentRecord {
            label: body.label.clone(),
            designation: body.designation.clone(),
            numeric_id: ephemeris.numeric_id,
            kernel_file_name: kernel_file_name.to_string(),
            row_count: ephemeris.len(),
        })
    }
}
