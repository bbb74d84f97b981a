//! Error types for the comet kernel pipeline
//!
//! Every failure in the pipeline is fatal to the run. The variants map onto the
//! stage that failed so the caller can report which body, group and step broke.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the comet kernel pipeline
#[derive(Error, Debug)]
pub enum CometKernelError {
    /// The ephemeris service could not be reached, answered with a non-2xx
    /// status, or returned an envelope that is not valid JSON
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response envelope decoded but did not carry the `result` text
    #[error("Unexpected Horizons response (missing result): keys={keys:?}")]
    Envelope {
        /// Keys that were present in the envelope
        keys: Vec<String>,
    },

    /// A query was rejected before any request was made
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Neither the target-body header nor the record number was present
    #[error("Failed to resolve a numeric id (expected 'Target body name: ... (ID)' or 'Rec #:<id>')")]
    IdentifierResolution,

    /// The `$$SOE`/`$$EOE` block is missing or a row is under-populated
    #[error("Malformed vector table: {0}")]
    MalformedTable(String),

    /// Too few rows to support the interpolation model
    #[error("Too few ephemeris rows parsed: n={found} (need at least {required})")]
    InsufficientSamples {
        /// Rows actually parsed
        found: usize,
        /// Minimum support-point count
        required: usize,
    },

    /// A kernel group resolved to zero fetchable bodies
    #[error("Kernel group {group} has no bodies")]
    EmptyGroup {
        /// 1-based part index of the group
        group: usize,
    },

    /// The output kernel could not be created
    #[error("Failed to open kernel {path:?}: {reason}")]
    ContainerOpen {
        /// Path that was being created
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// The output kernel could not be finalized or abandoned
    #[error("Failed to close kernel {path:?}: {reason}")]
    ContainerClose {
        /// Path of the kernel being closed
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// A segment was rejected or could not be written
    #[error("Failed to write segment '{segment_id}': {reason}")]
    SegmentWrite {
        /// Segment identifier that failed
        segment_id: String,
        /// Underlying cause
        reason: String,
    },

    /// The mapping summary could not be serialized
    #[error("Summary error: {0}")]
    Summary(#[from] serde_json::Error),

    /// Error when a file I/O operation fails
    #[error("File I/O error on {path:?}: {source}")]
    Io {
        /// The path of the file that caused the error
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Other, miscellaneous errors
    #[error("{0}")]
    Other(String),

    /// A body failed somewhere in its fetch, parse or write step
    #[error("Body '{label}' in kernel group {group} failed: {source}")]
    Body {
        /// 1-based part index of the group
        group: usize,
        /// Catalog label of the failing body
        label: String,
        /// What went wrong
        #[source]
        source: Box<CometKernelError>,
    },
}

impl CometKernelError {
    /// Strip any `Body` context and return the underlying failure
    pub fn root(&self) -> &CometKernelError {
        match self {
            CometKernelError::Body { source, .. } => source.root(),
            other => other,
        }
    }

    /// Attach body and group context to an error
    pub fn for_body(self, group: usize, label: &str) -> CometKernelError {
        CometKernelError::Body {
            group,
            label: label.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type for comet kernel operations
pub type Result<T> = std::result::Result<T, CometKernelError>;

/// Helper function to convert a std::io::Error to CometKernelError
pub fn io_err(path: impl Into<PathBuf>, err: std::io::Error) -> CometKernelError {
    CometKernelError::Io {
        path: path.into(),
        source: err,
    }
}
