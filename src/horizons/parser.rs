//! Horizons vector-table parser
//!
//! Turns the text report of a `VEC_TABLE=2`, `CSV_FORMAT=YES` request into a
//! numeric body id and an ordered series of heliocentric states.
//!
//! The numeric id comes from the first of these that matches:
//!
//! 1. `Target body name: <name> (<id>)`, the NAIF id when Horizons prints one
//! 2. `Rec #:<digits>`, the Horizons small-body record number
//!
//! Comets frequently only carry the record number. It is stable enough to tie
//! kernel segments to a viewer registry, but it is not a NAIF id and Horizons
//! does not promise it across database revisions, so its use is logged.

use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::{jd_to_seconds, MIN_SAMPLES};
use crate::errors::{CometKernelError, Result};

/// Start of the ephemeris block
pub const SOE_MARKER: &str = "$$SOE";
/// End of the ephemeris block
pub const EOE_MARKER: &str = "$$EOE";
/// Numeric columns every row must carry: JD, X, Y, Z, VX, VY, VZ
pub const ROW_COLUMNS: usize = 7;

lazy_static! {
    static ref TARGET_BODY_ID: Regex =
        Regex::new(r"(?m)^\s*Target body name:\s*.*\(([-0-9]+)\)\s*$").unwrap();
    static ref RECORD_NUMBER: Regex = Regex::new(r"(?m)^\s*Rec #:(\d+)\b").unwrap();
}

/// Parsed vector table for one body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEphemeris {
    /// Body id used for the kernel segment
    pub numeric_id: i32,
    /// TDB seconds past J2000, strictly increasing
    pub epochs: Vec<f64>,
    /// Position (km) and velocity (km/s), one per epoch
    pub states: Vec<[f64; 6]>,
}

impl ParsedEphemeris {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// Check if there are no samples
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// First and last epoch of the series
    pub fn interval(&self) -> Option<(f64, f64)> {
        Some((*self.epochs.first()?, *self.epochs.last()?))
    }
}

/// How a numeric id was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    /// From the `Target body name` header
    TargetBody,
    /// From the `Rec #` line
    RecordNumber,
}

type IdStrategy = fn(&str) -> Option<i32>;

/// Identifier strategies, tried in order
const ID_STRATEGIES: [(IdSource, IdStrategy); 2] = [
    (IdSource::TargetBody, target_body_id),
    (IdSource::RecordNumber, record_number_id),
];

/// Id from the `Target body name: ... (<id>)` header line
pub fn target_body_id(text: &str) -> Option<i32> {
    TARGET_BODY_ID
        .captures(text)
        .and_then(|c| c[1].parse().ok())
}

/// Id from the `Rec #:<digits>` line
pub fn record_number_id(text: &str) -> Option<i32> {
    RECORD_NUMBER
        .captures(text)
        .and_then(|c| c[1].parse().ok())
}

/// Resolve the numeric id, reporting which strategy matched
pub fn resolve_id(text: &str) -> Result<(i32, IdSource)> {
    ID_STRATEGIES
        .iter()
        .find_map(|&(source, strategy)| strategy(text).map(|id| (id, source)))
        .ok_or(CometKernelError::IdentifierResolution)
}

/// Every field of a CSV row that parses as a number, in column order
///
/// Labels, calendar strings and other text are skipped, as are NaN values.
/// This never fails; callers decide how many numbers they need.
pub fn numeric_fields(line: &str) -> Vec<f64> {
    line.split(',')
        .filter_map(|field| field.trim().parse::<f64>().ok())
        .filter(|v| !v.is_nan())
        .collect()
}

/// Convert one row to (epoch, state), requiring all seven columns
pub fn parse_row(line: &str) -> Result<(f64, [f64; 6])> {
    let nums = numeric_fields(line);
    if nums.len() < ROW_COLUMNS {
        return Err(CometKernelError::MalformedTable(format!(
            "expected >= {} numeric columns, found {}: {}",
            ROW_COLUMNS,
            nums.len(),
            line
        )));
    }

    let mut state = [0.0; 6];
    state.copy_from_slice(&nums[1..ROW_COLUMNS]);
    Ok((jd_to_seconds(nums[0]), state))
}

/// Text between `$$SOE` and `$$EOE`
pub fn data_block(text: &str) -> Result<&str> {
    let start = text.find(SOE_MARKER);
    let end = text.find(EOE_MARKER);

    match (start, end) {
        (Some(start), Some(end)) if end > start => Ok(&text[start + SOE_MARKER.len()..end]),
        _ => Err(CometKernelError::MalformedTable(format!(
            "failed to locate {}/{} block",
            SOE_MARKER, EOE_MARKER
        ))),
    }
}

/// Parse a full Horizons vector report
pub fn parse(text: &str) -> Result<ParsedEphemeris> {
    let (numeric_id, id_source) = resolve_id(text)?;
    if id_source == IdSource::RecordNumber {
        log::warn!(
            "No NAIF id in target header; using Horizons record number {} as body id",
            numeric_id
        );
    }

    let block = data_block(text)?;

    let mut epochs: Vec<f64> = Vec::new();
    let mut states: Vec<[f64; 6]> = Vec::new();

    for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (epoch, state) = parse_row(line)?;

        if let Some(&previous) = epochs.last() {
            if epoch <= previous {
                return Err(CometKernelError::MalformedTable(format!(
                    "epochs not strictly increasing at row {}: {}",
                    epochs.len() + 1,
                    line
                )));
            }
        }

        epochs.push(epoch);
        states.push(state);
    }

    if epochs.len() < MIN_SAMPLES {
        return Err(CometKernelError::InsufficientSamples {
            found: epochs.len(),
            required: MIN_SAMPLES,
        });
    }

    log::debug!("Parsed {} rows for body {}", epochs.len(), numeric_id);

    Ok(ParsedEphemeris {
        numeric_id,
        epochs,
        states,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ROWS: &str = "\
2451545.000000000, A.D. 2000-Jan-01 12:00:00.0000, -1.0E+08, 2.0E+08, 3.0E+07, -1.1E+01, 2.1E+00, 3.1E-01,
2451550.000000000, A.D. 2000-Jan-06 12:00:00.0000, -1.1E+08, 2.1E+08, 3.1E+07, -1.2E+01, 2.2E+00, 3.2E-01,
2451555.000000000, A.D. 2000-Jan-11 12:00:00.0000, -1.2E+08, 2.2E+08, 3.2E+07, -1.3E+01, 2.3E+00, 3.3E-01,
2451560.000000000, A.D. 2000-Jan-16 12:00:00.0000, -1.3E+08, 2.3E+08, 3.3E+07, -1.4E+01, 2.4E+00, 3.4E-01,
";

    fn report(header: &str, rows: &str) -> String {
        format!(
            "*******\n{}\nCenter body name: Sun (10)\n*******\n$$SOE\n{}$$EOE\n*******\n",
            header, rows
        )
    }

    #[test]
    fn test_target_body_header_wins() {
        let text = "Target body name: 1P/Halley (90000030)  {source: JPL#75}\nRec #:900033\n";
        // Header line has trailing text, so only the record number matches
        assert_eq!(resolve_id(text).unwrap(), (900033, IdSource::RecordNumber));

        let text = "Target body name: Halley (900033)\nRec #:12345\n";
        assert_eq!(resolve_id(text).unwrap(), (900033, IdSource::TargetBody));
    }

    #[test]
    fn test_negative_target_id() {
        assert_eq!(target_body_id("Target body name: Probe (-98)"), Some(-98));
    }

    #[test]
    fn test_record_number_fallback() {
        let text = "JPL/HORIZONS  2P/Encke\n Rec #:90000091 (+COV) Soln.date: 2024-Mar-01\n";
        assert_eq!(target_body_id(text), None);
        assert_eq!(resolve_id(text).unwrap(), (90000091, IdSource::RecordNumber));
    }

    #[test]
    fn test_no_identifier() {
        assert!(matches!(
            resolve_id("Target body name: Somebody\n"),
            Err(CometKernelError::IdentifierResolution)
        ));
    }

    #[test]
    fn test_numeric_fields_skips_text_and_nan() {
        let nums = numeric_fields(" 2451545.0, A.D. 2000-Jan-01, NaN, 1.5, n.a., -2e3,");
        assert_eq!(nums, vec![2451545.0, 1.5, -2000.0]);
        assert!(numeric_fields("").is_empty());
    }

    #[test]
    fn test_six_columns_is_malformed() {
        let line = "2451545.0, 1.0, 2.0, 3.0, 4.0, 5.0";
        assert!(matches!(
            parse_row(line),
            Err(CometKernelError::MalformedTable(_))
        ));
    }

    #[test]
    fn test_parse_row_converts_epoch() {
        let (epoch, state) = parse_row("2451546.0, X, 1, 2, 3, 4, 5, 6, 99").unwrap();
        assert_eq!(epoch, 86400.0);
        assert_eq!(state, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_report() {
        let parsed = parse(&report("Target body name: Halley (900033)", ROWS)).unwrap();
        assert_eq!(parsed.numeric_id, 900033);
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed.epochs.len(), parsed.states.len());
        assert_eq!(parsed.epochs[0], 0.0);
        assert_relative_eq!(parsed.epochs[1], 5.0 * 86400.0);
        assert!(parsed.epochs.windows(2).all(|w| w[0] < w[1]));
        assert_relative_eq!(parsed.states[3][0], -1.3e8);
        assert_relative_eq!(parsed.states[3][5], 0.34);
        assert_eq!(parsed.interval(), Some((0.0, 15.0 * 86400.0)));
    }

    #[test]
    fn test_missing_markers() {
        let text = "Target body name: Halley (900033)\n$$SOE\n2451545.0,1,2,3,4,5,6\n";
        assert!(matches!(parse(text), Err(CometKernelError::MalformedTable(_))));

        let text = "Target body name: Halley (900033)\n$$EOE\n2451545.0,1,2,3,4,5,6\n$$SOE\n";
        assert!(matches!(parse(text), Err(CometKernelError::MalformedTable(_))));
    }

    #[test]
    fn test_missing_id_checked_before_table() {
        assert!(matches!(
            parse("no header here\n"),
            Err(CometKernelError::IdentifierResolution)
        ));
    }

    #[test]
    fn test_short_row_aborts_whole_series() {
        let rows = format!("{}2451565.0, 1.0, 2.0, 3.0, 4.0, 5.0,\n", ROWS);
        assert!(matches!(
            parse(&report("Target body name: Halley (900033)", &rows)),
            Err(CometKernelError::MalformedTable(_))
        ));
    }

    #[test]
    fn test_too_few_rows() {
        let rows: String = ROWS.lines().take(3).map(|l| format!("{}\n", l)).collect();
        match parse(&report("Rec #:900033", &rows)) {
            Err(CometKernelError::InsufficientSamples { found, required }) => {
                assert_eq!(found, 3);
                assert_eq!(required, 4);
            }
            other => panic!("expected insufficient samples, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_order_rows_rejected() {
        let mut lines: Vec<&str> = ROWS.lines().collect();
        lines.swap(1, 2);
        let rows: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        assert!(matches!(
            parse(&report("Target body name: Halley (900033)", &rows)),
            Err(CometKernelError::MalformedTable(_))
        ));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let rows = ROWS.replace('\n', "\n\n");
        let parsed = parse(&report("Target body name: Halley (900033)", &rows)).unwrap();
        assert_eq!(parsed.len(), 4);
    }
}
