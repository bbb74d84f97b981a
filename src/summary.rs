//! Mapping summary
//!
//! After all kernels are written, the body-to-id mapping is printed as JSON so
//! it can be pasted into a viewer's body registry. Keys are sorted and records
//! keep their write order, which keeps the output diffable between runs.

use serde_json::Value;

use crate::errors::Result;
use crate::kernel::SegmentRecord;

/// Heading printed above the summary
pub const SUMMARY_HEADING: &str = "NAIF mapping summary (copy/paste into viewer):";

/// Serialize segment records as a pretty JSON array with sorted keys
pub fn emit(records: &[SegmentRecord]) -> Result<String> {
    // serde_json maps are ordered by key unless `preserve_order` is enabled
    let value: Value = serde_json::to_value(records)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
