//! End-to-end runs against canned Horizons reports, writing real SPK files

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use byteorder::{ByteOrder, LittleEndian};
use cometkernels::horizons::{EphemerisQuery, EphemerisSource};
use cometkernels::planner::KernelPlanner;
use cometkernels::{summary, BodyCatalog, BodySpec, CometKernelError, GeneratorConfig, SPKFactory};
use tempfile::tempdir;

const RECORD: usize = 1024;

/// Answers from a fixed set of reports, keyed by designation
struct FixtureSource {
    reports: HashMap<String, String>,
}

impl FixtureSource {
    fn new(entries: &[(&str, String)]) -> Self {
        Self {
            reports: entries
                .iter()
                .map(|(des, text)| (des.to_string(), text.clone()))
                .collect(),
        }
    }
}

impl EphemerisSource for FixtureSource {
    fn fetch(&self, query: &EphemerisQuery) -> cometkernels::Result<String> {
        self.reports
            .get(&query.designation)
            .cloned()
            .ok_or_else(|| CometKernelError::Transport(format!("no fixture for {}", query.designation)))
    }
}

fn report(name: &str, id: i32, rows: usize) -> String {
    let mut text = format!(
        "Target body name: {} ({})\n\
         Center body name: Sun (10)\n\
         $$SOE\n",
        name, id
    );
    for i in 0..rows {
        let k = i as f64;
        text.push_str(&format!(
            "{:.9}, A.D. 2000-Jan-01 00:00:00.0000, {:.6E}, {:.6E}, {:.6E}, {:.6E}, {:.6E}, {:.6E},\n",
            2451545.0 + 5.0 * k,
            -2.0e9 + 1.0e6 * k,
            1.0e9,
            3.0e8,
            1.5,
            -0.5,
            0.25 * k
        ));
    }
    text.push_str("$$EOE\n");
    text
}

fn config(out_dir: &Path, max_per_kernel: i64) -> GeneratorConfig {
    GeneratorConfig {
        out_dir: out_dir.to_path_buf(),
        file_prefix: "comets".to_string(),
        max_per_kernel,
        ..GeneratorConfig::default()
    }
}

fn summary_ints(bytes: &[u8]) -> Vec<i32> {
    let at = RECORD + 3 * 8 + 2 * 8;
    (0..6)
        .map(|i| LittleEndian::read_i32(&bytes[at + 4 * i..]))
        .collect()
}

#[test]
fn test_halley_single_kernel() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), 0);
    let source = FixtureSource::new(&[("1P", report("1P/Halley", 90000030, 5))]);
    let catalog = BodyCatalog::new(vec![BodySpec::new("1P/Halley", "1P")]);

    let mut written = Vec::new();
    let records = KernelPlanner::new(&config, &source, &SPKFactory)
        .run(&catalog, |k| written.push(k.path.clone()))
        .unwrap();

    assert_eq!(written, vec![dir.path().join("comets.bsp")]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].numeric_id, 90000030);
    assert_eq!(records[0].row_count, 5);
    assert_eq!(records[0].kernel_file_name, "comets.bsp");

    let bytes = fs::read(&written[0]).unwrap();
    assert_eq!(bytes.len() % RECORD, 0);
    assert_eq!(&bytes[0..8], b"DAF/SPK ");
    assert_eq!(LittleEndian::read_u32(&bytes[8..]), 2);
    assert_eq!(LittleEndian::read_u32(&bytes[12..]), 6);
    assert_eq!(&bytes[88..96], b"LTL-IEEE");

    // one summary covering the sample epochs
    assert_relative_eq!(LittleEndian::read_f64(&bytes[RECORD + 16..]), 1.0);
    assert_relative_eq!(LittleEndian::read_f64(&bytes[RECORD + 24..]), 0.0);
    assert_relative_eq!(LittleEndian::read_f64(&bytes[RECORD + 32..]), 20.0 * 86400.0);

    let ints = summary_ints(&bytes);
    assert_eq!(&ints[..4], &[90000030, 10, 1, 9]);
    assert_eq!(ints[4], 385);
    assert_eq!(ints[5], 385 + 7 * 5 + 2 - 1);

    let name = String::from_utf8_lossy(&bytes[2 * RECORD..2 * RECORD + 40]);
    assert_eq!(name.trim_end(), "COMET 1P (90000030)");

    let text = summary::emit(&records).unwrap();
    assert!(text.contains("\"numericId\": 90000030"));
    assert!(text.contains("\"kernelFileName\": \"comets.bsp\""));
}

#[test]
fn test_split_into_parts() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), 2);
    let source = FixtureSource::new(&[
        ("1P", report("1P/Halley", 90000030, 6)),
        ("2P", report("2P/Encke", 90000091, 6)),
        ("9P", report("9P/Tempel 1", 90000192, 6)),
    ]);
    let catalog = BodyCatalog::new(vec![
        BodySpec::new("1P/Halley", "1P"),
        BodySpec::new("2P/Encke", "2P"),
        BodySpec::new("9P/Tempel 1", "9P"),
    ]);

    let mut segments_per_file = Vec::new();
    let records = KernelPlanner::new(&config, &source, &SPKFactory)
        .run(&catalog, |k| segments_per_file.push(k.records.len()))
        .unwrap();

    assert_eq!(segments_per_file, vec![2, 1]);
    let files: Vec<&str> = records.iter().map(|r| r.kernel_file_name.as_str()).collect();
    assert_eq!(files, vec!["comets-part1.bsp", "comets-part1.bsp", "comets-part2.bsp"]);
    assert!(dir.path().join("comets-part1.bsp").exists());
    assert!(dir.path().join("comets-part2.bsp").exists());
    assert!(!dir.path().join("comets.bsp").exists());

    let second = fs::read(dir.path().join("comets-part2.bsp")).unwrap();
    assert_eq!(summary_ints(&second)[0], 90000192);
}

#[test]
fn test_rejected_first_segment_leaves_no_file() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), 1);
    // a body resolving to the Sun cannot be written relative to the Sun
    let source = FixtureSource::new(&[
        ("1P", report("1P/Halley", 90000030, 5)),
        ("SUN", report("Sun", 10, 5)),
    ]);
    let catalog = BodyCatalog::new(vec![
        BodySpec::new("1P/Halley", "1P"),
        BodySpec::new("Sun", "SUN"),
    ]);

    let err = KernelPlanner::new(&config, &source, &SPKFactory)
        .run(&catalog, |_| {})
        .unwrap_err();

    assert!(matches!(err.root(), CometKernelError::SegmentWrite { .. }));
    assert!(dir.path().join("comets-part1.bsp").exists());
    assert!(!dir.path().join("comets-part2.bsp").exists());
}

#[test]
fn test_fetch_failure_stops_before_open() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), 0);
    let source = FixtureSource::new(&[("1P", report("1P/Halley", 90000030, 5))]);
    let catalog = BodyCatalog::new(vec![
        BodySpec::new("1P/Halley", "1P"),
        BodySpec::new("2P/Encke", "2P"),
    ]);

    let err = KernelPlanner::new(&config, &source, &SPKFactory)
        .run(&catalog, |_| {})
        .unwrap_err();

    assert!(matches!(err.root(), CometKernelError::Transport(_)));
    assert!(err.to_string().contains("2P/Encke"), "{}", err);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_existing_kernel_is_not_overwritten() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), 0);
    fs::write(dir.path().join("comets.bsp"), b"keep").unwrap();
    let source = FixtureSource::new(&[("1P", report("1P/Halley", 90000030, 5))]);
    let catalog = BodyCatalog::new(vec![BodySpec::new("1P/Halley", "1P")]);

    let err = KernelPlanner::new(&config, &source, &SPKFactory)
        .run(&catalog, |_| {})
        .unwrap_err();

    assert!(matches!(err.root(), CometKernelError::ContainerOpen { .. }));
    assert_eq!(fs::read(dir.path().join("comets.bsp")).unwrap(), b"keep");
}
