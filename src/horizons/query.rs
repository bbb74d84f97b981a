//! Horizons vector-table queries
//!
//! An [`EphemerisQuery`] fully determines one request to the Horizons API. The
//! parameter list is built here so it can be checked without a network call.

use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::{CometKernelError, Result};

/// Horizons code for the Sun's body center
pub const SUN_BODY_CENTER: &str = "500@10";

/// Date forms accepted for START_TIME/STOP_TIME
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One vector-table request for a single body
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisQuery {
    /// Small-body designation, e.g. "C/1995 O1"
    pub designation: String,
    /// Start of the table (UTC calendar date)
    pub start_time: String,
    /// End of the table (UTC calendar date)
    pub stop_time: String,
    /// Horizons step token, e.g. "5 d"
    pub step_size: String,
    /// Horizons center code
    pub center: String,
}

impl EphemerisQuery {
    /// Create a heliocentric query for the given designation and window
    pub fn new(
        designation: impl Into<String>,
        start_time: impl Into<String>,
        stop_time: impl Into<String>,
        step_size: impl Into<String>,
    ) -> Self {
        Self {
            designation: designation.into(),
            start_time: start_time.into(),
            stop_time: stop_time.into(),
            step_size: step_size.into(),
            center: SUN_BODY_CENTER.to_string(),
        }
    }

    /// Check the window and step before anything goes on the wire
    pub fn validate(&self) -> Result<()> {
        if self.designation.trim().is_empty() {
            return Err(CometKernelError::InvalidQuery(
                "designation must not be empty".to_string(),
            ));
        }
        if unquote(&self.step_size).trim().is_empty() {
            return Err(CometKernelError::InvalidQuery(
                "step size must not be empty".to_string(),
            ));
        }

        let start = parse_time(&self.start_time)?;
        let stop = parse_time(&self.stop_time)?;
        if start >= stop {
            return Err(CometKernelError::InvalidQuery(format!(
                "start time {} is not before stop time {}",
                self.start_time, self.stop_time
            )));
        }

        Ok(())
    }

    /// The `COMMAND` value: current apparition, no fragments
    pub fn command(&self) -> String {
        format!("'DES={};CAP;NOFRAG'", self.designation)
    }

    /// Query-string parameters in the order they are sent
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("format", "json".to_string()),
            ("MAKE_EPHEM", "YES".to_string()),
            ("EPHEM_TYPE", "VECTORS".to_string()),
            ("CENTER", self.center.clone()),
            ("OUT_UNITS", "KM-S".to_string()),
            ("VEC_TABLE", "2".to_string()),
            ("CSV_FORMAT", "YES".to_string()),
            ("OBJ_DATA", "YES".to_string()),
            ("STEP_SIZE", quote_value(&self.step_size)),
            ("START_TIME", quote_value(&self.start_time)),
            ("STOP_TIME", quote_value(&self.stop_time)),
            ("COMMAND", self.command()),
        ]
    }
}

/// Wrap a value in single quotes so Horizons keeps it as one token
///
/// Values that are already single-quoted are returned unchanged, so quoting
/// is idempotent.
pub fn quote_value(value: &str) -> String {
    if is_quoted(value) {
        value.to_string()
    } else {
        format!("'{}'", value)
    }
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'')
}

fn unquote(value: &str) -> &str {
    if is_quoted(value) {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_time(value: &str) -> Result<NaiveDateTime> {
    let raw = unquote(value).trim();

    for format in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(t);
        }
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CometKernelError::InvalidQuery(format!("unrecognized time '{}'", value)))
}
