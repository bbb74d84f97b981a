//! Kernel planning and the end-to-end run
//!
//! The catalog is split into groups, one output kernel per group. Each group
//! is fetched and parsed in full before its file is opened, so a bad body
//! aborts the run without leaving a half-written kernel behind. Groups run
//! strictly one after another and segment order follows catalog order.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::catalogs::{BodyCatalog, BodySpec};
use crate::config::GeneratorConfig;
use crate::constants::MAX_SEGMENT_ID_LEN;
use crate::errors::{CometKernelError, Result};
use crate::horizons::{parse, EphemerisQuery, EphemerisSource, ParsedEphemeris};
use crate::kernel::{KernelFactory, KernelWriter, SegmentRecord};

/// Kernel file extension
pub const KERNEL_EXTENSION: &str = "bsp";

/// Bodies destined for one output kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelGroup {
    /// 1-based part index
    pub index: usize,
    /// Members in catalog order
    pub bodies: Vec<BodySpec>,
}

/// A kernel file that was written and closed
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenKernel {
    /// Where the file landed
    pub path: PathBuf,
    /// One record per segment in the file
    pub records: Vec<SegmentRecord>,
}

/// Split bodies into consecutive groups of at most `max_per_group`
///
/// A non-positive limit yields a single group holding every body.
pub fn plan(bodies: &[BodySpec], max_per_group: i64) -> Vec<KernelGroup> {
    if max_per_group <= 0 {
        return vec![KernelGroup {
            index: 1,
            bodies: bodies.to_vec(),
        }];
    }

    bodies
        .chunks(max_per_group as usize)
        .enumerate()
        .map(|(i, chunk)| KernelGroup {
            index: i + 1,
            bodies: chunk.to_vec(),
        })
        .collect()
}

/// File name for a group; a `-part<k>` suffix is added only when split
pub fn kernel_file_name(prefix: &str, index: usize, group_count: usize) -> String {
    if group_count > 1 {
        format!("{}-part{}.{}", prefix, index, KERNEL_EXTENSION)
    } else {
        format!("{}.{}", prefix, KERNEL_EXTENSION)
    }
}

/// Segment identifier for a body, never longer than 40 bytes
///
/// Prefers `"<prefix> <designation> (<id>)"`; when that does not fit, the
/// prefix and designation are run together without whitespace and cut to
/// length.
pub fn segment_id(prefix: &str, designation: &str, numeric_id: i32) -> String {
    let full = format!("{} {} ({})", prefix, designation, numeric_id);
    if full.len() <= MAX_SEGMENT_ID_LEN {
        return full;
    }

    let compact: String = format!("{} {}", prefix, designation)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    truncate_bytes(&compact, MAX_SEGMENT_ID_LEN).to_string()
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a character
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Drives fetch, parse and write for every group of a catalog
pub struct KernelPlanner<'a, S: EphemerisSource, F: KernelFactory> {
    config: &'a GeneratorConfig,
    source: &'a S,
    factory: &'a F,
}

impl<'a, S: EphemerisSource, F: KernelFactory> KernelPlanner<'a, S, F> {
    /// Create a planner over a source and a kernel factory
    pub fn new(config: &'a GeneratorConfig, source: &'a S, factory: &'a F) -> Self {
        Self {
            config,
            source,
            factory,
        }
    }

    /// Groups and their output paths for a catalog
    pub fn layout(&self, catalog: &BodyCatalog) -> Vec<(KernelGroup, PathBuf)> {
        let groups = plan(catalog.bodies(), self.config.max_per_kernel);
        let count = groups.len();
        groups
            .into_iter()
            .map(|group| {
                let name = kernel_file_name(&self.config.file_prefix, group.index, count);
                let path = self.config.out_dir.join(name);
                (group, path)
            })
            .collect()
    }

    /// Write every group and return all segment records in write order
    ///
    /// `on_kernel` is called after each kernel file is closed. The first
    /// failure stops the run; kernels from earlier groups stay on disk.
    pub fn run<C>(&self, catalog: &BodyCatalog, mut on_kernel: C) -> Result<Vec<SegmentRecord>>
    where
        C: FnMut(&WrittenKernel),
    {
        let writer = KernelWriter::new(
            self.factory,
            self.config.internal_name.clone(),
            self.config.segment_prefix.clone(),
        );

        let layout = self.layout(catalog);
        log::info!(
            "Generating {} kernel(s) for {} bodies",
            layout.len(),
            catalog.len()
        );

        let mut all_records = Vec::with_capacity(catalog.len());
        for (group, path) in layout {
            let parsed = self.fetch_group(&group)?;
            let records = writer.write(&group, parsed, &path)?;

            let written = WrittenKernel { path, records };
            on_kernel(&written);
            all_records.extend(written.records);
        }

        Ok(all_records)
    }

    /// Fetch and parse every member of a group
    pub fn fetch_group(&self, group: &KernelGroup) -> Result<HashMap<BodySpec, ParsedEphemeris>> {
        let mut parsed = HashMap::with_capacity(group.bodies.len());

        for body in &group.bodies {
            let query = EphemerisQuery::new(
                body.designation.clone(),
                self.config.start_time.clone(),
                self.config.stop_time.clone(),
                self.config.step_size.clone(),
            );

            let ephemeris = self
                .source
                .fetch(&query)
                .and_then(|text| parse(&text))
                .map_err(|e| e.for_body(group.index, &body.label))?;

            log::info!(
                "{}: id {} with {} rows",
                body.label,
                ephemeris.numeric_id,
                ephemeris.len()
            );
            parsed.insert(body.clone(), ephemeris);
        }

        if parsed.is_empty() {
            return Err(CometKernelError::EmptyGroup { group: group.index });
        }

        Ok(parsed)
    }
}
