//! Double Array File format module for writing SPICE DAF files
//!
//! This module provides functionality for writing NAIF's Double Array File (DAF)
//! format, the container underneath SPK and PCK kernels.
//!
//! Layout written here (little-endian, `LTL-IEEE`):
//!
//! - record 1: file record (id word, ND, NI, internal name, FWARD, BWARD, FREE)
//! - record 2: first summary record, record 3: its name record
//! - record 4 onward: array data, with further summary/name record pairs
//!   allocated after the data whenever a summary record fills up
//!
//! Addresses are 1-based double-precision word indices into the file.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};

use crate::errors::{io_err, CometKernelError, Result};

/// Size of a DAF record (bytes)
pub const RECORD_SIZE: usize = 1024;
/// Size of a double-precision value (bytes)
const DOUBLE_SIZE: usize = 8;
/// Double-precision words per record
const RECORD_WORDS: usize = RECORD_SIZE / DOUBLE_SIZE;
/// Control words at the head of a summary record (NEXT, PREV, NSUM)
const SUMMARY_CONTROL_WORDS: usize = 3;
/// Length of the internal file name
pub const IFNAME_LEN: usize = 60;
/// Binary file format id for little-endian IEEE doubles
const LOCFMT: &[u8; 8] = b"LTL-IEEE";
/// Byte offset of the FTP validation string in the file record
const FTP_OFFSET: usize = 699;
/// FTP corruption detection string - used to validate files
pub const FTPSTR: &[u8] = b"FTPSTR:\r:\n:\r\n:\r\x00:\x81:\x10\xce:ENDFTP";

/// One array summary plus its name
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    doubles: Vec<f64>,
    ints: Vec<i32>,
}

/// A summary record and the arrays it describes
#[derive(Debug, Clone)]
struct SummaryRecord {
    record: usize,
    entries: Vec<Entry>,
}

/// Double Array File (DAF) writer
///
/// Arrays are streamed to disk as they are added; summary, name and file
/// records are written by [`DAFWriter::close`]. A writer that is dropped or
/// [`discard`](DAFWriter::discard)ed never becomes a valid DAF.
pub struct DAFWriter {
    /// Path to the DAF file
    pub path: PathBuf,
    /// File handle
    file: File,
    /// File version word, e.g. "DAF/SPK"
    pub locidw: String,
    /// Number of double-precision components
    pub nd: u32,
    /// Number of integer components
    pub ni: u32,
    /// Internal file name
    pub ifname: String,
    /// First free address
    free: usize,
    /// Summary records in file order
    summaries: Vec<SummaryRecord>,
}

impl DAFWriter {
    /// Create a new DAF file at the given path
    ///
    /// Fails if the file already exists.
    pub fn create<P: AsRef<Path>>(
        path: P,
        locidw: &str,
        nd: u32,
        ni: u32,
        ifname: &str,
    ) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();

        if nd < 2 || ni < 3 {
            return Err(CometKernelError::ContainerOpen {
                path: path_buf,
                reason: format!("unsupported summary format ND={}, NI={}", nd, ni),
            });
        }
        if locidw.len() > 8 || ifname.len() > IFNAME_LEN || !ifname.is_ascii() {
            return Err(CometKernelError::ContainerOpen {
                path: path_buf,
                reason: "id word or internal file name too long".to_string(),
            });
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path_buf)
            .map_err(|e| CometKernelError::ContainerOpen {
                path: path_buf.clone(),
                reason: e.to_string(),
            })?;

        let mut daf = DAFWriter {
            path: path_buf,
            file,
            locidw: locidw.to_string(),
            nd,
            ni,
            ifname: ifname.to_string(),
            free: 3 * RECORD_WORDS + 1,
            summaries: vec![SummaryRecord {
                record: 2,
                entries: Vec::new(),
            }],
        };

        // Provisional header so a crashed run leaves something recognizable
        let header = daf.file_record();
        daf.write_record(1, &header)
            .map_err(|e| CometKernelError::ContainerOpen {
                path: daf.path.clone(),
                reason: e.to_string(),
            })?;

        log::debug!("Created DAF {} ({})", daf.path.display(), daf.locidw);
        Ok(daf)
    }

    /// Size of one summary in double-precision words
    pub fn summary_length(&self) -> usize {
        self.nd as usize + (self.ni as usize + 1) / 2
    }

    /// Length of an array name in characters
    pub fn name_length(&self) -> usize {
        self.summary_length() * DOUBLE_SIZE
    }

    /// Summaries that fit in one summary record
    pub fn summaries_per_record(&self) -> usize {
        (RECORD_WORDS - SUMMARY_CONTROL_WORDS) / self.summary_length()
    }

    /// Number of arrays written so far
    pub fn array_count(&self) -> usize {
        self.summaries.iter().map(|s| s.entries.len()).sum()
    }

    /// First free address
    pub fn free(&self) -> usize {
        self.free
    }

    /// Append an array and its summary
    ///
    /// `ints` holds the first NI-2 integer components; the initial and final
    /// addresses are filled in here. Returns those addresses.
    pub fn add_array(
        &mut self,
        name: &str,
        doubles: &[f64],
        ints: &[i32],
        data: &[f64],
    ) -> Result<(usize, usize)> {
        if doubles.len() != self.nd as usize || ints.len() != self.ni as usize - 2 {
            return Err(CometKernelError::Other(format!(
                "summary has {} doubles and {} ints, expected {} and {}",
                doubles.len(),
                ints.len(),
                self.nd,
                self.ni - 2
            )));
        }
        if name.len() > self.name_length() {
            return Err(CometKernelError::Other(format!(
                "array name longer than {} characters: {}",
                self.name_length(),
                name
            )));
        }
        if data.is_empty() {
            return Err(CometKernelError::Other("array has no data".to_string()));
        }

        let full = self
            .summaries
            .last()
            .map_or(true, |s| s.entries.len() >= self.summaries_per_record());
        if full {
            let record = self.next_record();
            log::debug!("Summary record full; allocating record {}", record);
            self.summaries.push(SummaryRecord {
                record,
                entries: Vec::new(),
            });
            self.free = (record + 1) * RECORD_WORDS + 1;
        }

        let begin = self.free;
        let end = begin + data.len() - 1;

        let mut buffer = vec![0u8; data.len() * DOUBLE_SIZE];
        LittleEndian::write_f64_into(data, &mut buffer);
        self.write_at((begin - 1) * DOUBLE_SIZE, &buffer)?;

        let mut all_ints = ints.to_vec();
        all_ints.push(begin as i32);
        all_ints.push(end as i32);

        if let Some(current) = self.summaries.last_mut() {
            current.entries.push(Entry {
                name: name.to_string(),
                doubles: doubles.to_vec(),
                ints: all_ints,
            });
        }
        self.free = end + 1;

        Ok((begin, end))
    }

    /// Write summary, name and file records, then flush to disk
    pub fn close(mut self) -> Result<()> {
        let summaries = self.summaries.clone();
        for (i, summary) in summaries.iter().enumerate() {
            let next = summaries.get(i + 1).map_or(0, |s| s.record);
            let prev = if i == 0 { 0 } else { summaries[i - 1].record };

            let record = self.summary_record(next, prev, &summary.entries);
            self.write_record(summary.record, &record)?;

            let names = self.name_record(&summary.entries);
            self.write_record(summary.record + 1, &names)?;
        }

        let header = self.file_record();
        self.write_record(1, &header)?;

        // Pad out to a whole number of records
        let data_records = (self.free - 1 + RECORD_WORDS - 1) / RECORD_WORDS;
        let last_name_record = summaries.last().map_or(3, |s| s.record + 1);
        let records = data_records.max(last_name_record);
        self.file
            .set_len((records * RECORD_SIZE) as u64)
            .map_err(|e| io_err(&self.path, e))?;

        self.file.sync_all().map_err(|e| io_err(&self.path, e))?;

        log::debug!(
            "Closed DAF {} with {} arrays in {} records",
            self.path.display(),
            self.array_count(),
            records
        );
        Ok(())
    }

    /// Close the raw file and remove it
    pub fn discard(self) -> Result<()> {
        let DAFWriter { path, file, .. } = self;
        drop(file);
        fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
        log::debug!("Discarded DAF {}", path.display());
        Ok(())
    }

    /// First record after everything allocated so far
    fn next_record(&self) -> usize {
        let data_records = (self.free - 1 + RECORD_WORDS - 1) / RECORD_WORDS;
        let last_name_record = self.summaries.last().map_or(3, |s| s.record + 1);
        data_records.max(last_name_record) + 1
    }

    fn file_record(&self) -> Vec<u8> {
        let mut record = vec![0u8; RECORD_SIZE];

        put_padded(&mut record[0..8], self.locidw.as_bytes());
        LittleEndian::write_u32(&mut record[8..12], self.nd);
        LittleEndian::write_u32(&mut record[12..16], self.ni);
        put_padded(&mut record[16..76], self.ifname.as_bytes());

        let fward = self.summaries.first().map_or(2, |s| s.record);
        let bward = self.summaries.last().map_or(2, |s| s.record);
        LittleEndian::write_u32(&mut record[76..80], fward as u32);
        LittleEndian::write_u32(&mut record[80..84], bward as u32);
        LittleEndian::write_u32(&mut record[84..88], self.free as u32);
        record[88..96].copy_from_slice(LOCFMT);
        record[FTP_OFFSET..FTP_OFFSET + FTPSTR.len()].copy_from_slice(FTPSTR);

        record
    }

    fn summary_record(&self, next: usize, prev: usize, entries: &[Entry]) -> Vec<u8> {
        let mut record = vec![0u8; RECORD_SIZE];
        LittleEndian::write_f64(&mut record[0..8], next as f64);
        LittleEndian::write_f64(&mut record[8..16], prev as f64);
        LittleEndian::write_f64(&mut record[16..24], entries.len() as f64);

        let step = self.summary_length() * DOUBLE_SIZE;
        for (i, entry) in entries.iter().enumerate() {
            let start = SUMMARY_CONTROL_WORDS * DOUBLE_SIZE + i * step;
            for (j, value) in entry.doubles.iter().enumerate() {
                let pos = start + j * DOUBLE_SIZE;
                LittleEndian::write_f64(&mut record[pos..pos + DOUBLE_SIZE], *value);
            }
            // Integers are packed two per double word
            let int_start = start + self.nd as usize * DOUBLE_SIZE;
            for (j, value) in entry.ints.iter().enumerate() {
                let pos = int_start + j * 4;
                LittleEndian::write_i32(&mut record[pos..pos + 4], *value);
            }
        }

        record
    }

    fn name_record(&self, entries: &[Entry]) -> Vec<u8> {
        let mut record = vec![b' '; RECORD_SIZE];
        let nc = self.name_length();
        for (i, entry) in entries.iter().enumerate() {
            put_padded(&mut record[i * nc..(i + 1) * nc], entry.name.as_bytes());
        }
        record
    }

    /// Write a record (1024 bytes) at the given record number (1-indexed)
    fn write_record(&mut self, record_number: usize, data: &[u8]) -> Result<()> {
        self.write_at((record_number - 1) * RECORD_SIZE, data)
    }

    fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(offset as u64))
            .map_err(|e| io_err(&self.path, e))?;
        self.file
            .write_all(data)
            .map_err(|e| io_err(&self.path, e))
    }
}

/// Copy `src` into `dst`, blank-padding the rest
fn put_padded(dst: &mut [u8], src: &[u8]) {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
    for b in dst[n..].iter_mut() {
        *b = b' ';
    }
}
