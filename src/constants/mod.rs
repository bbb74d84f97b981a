//! Constants shared by the parser, the planner and the SPK writer

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;

// SPICE ids
/// NAIF id of the Sun, the center of every comet segment
pub const SUN: i32 = 10;
/// Reference frame every segment is written in
pub const DEFAULT_FRAME: &str = "J2000";

// Segment layout
/// Hard limit on the length of a DAF segment name (ND=2, NI=6)
pub const MAX_SEGMENT_ID_LEN: usize = 40;
/// Lagrange interpolation degree of the type 9 segments
pub const INTERPOLATION_DEGREE: usize = 3;
/// Minimum number of samples a segment needs (degree + 1 support points)
pub const MIN_SAMPLES: usize = INTERPOLATION_DEGREE + 1;

/// Convert a Julian date (TDB) to seconds past J2000
pub fn jd_to_seconds(jd: f64) -> f64 {
    (jd - J2000) * DAY_S
}

/// Convert seconds past J2000 back to a Julian date
pub fn seconds_to_jd(seconds: f64) -> f64 {
    J2000 + seconds / DAY_S
}
