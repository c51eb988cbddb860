//! Line-oriented batch driver: filenames in on stdin, one record out per line.

use anyhow::{Context, Result};
use jpeghash_core::{CoreError, DigestAlgorithm, TypeFilter};
use rayon::prelude::*;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::options::BatchOptions;
use crate::record::{FileName, Record};

/// One line of driver input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    /// A terminated line naming a file.
    Name { path: PathBuf, name: FileName },
    /// Trailing text with no line terminator.
    Malformed(FileName),
}

impl InputLine {
    fn from_bytes(mut raw: Vec<u8>) -> Self {
        if raw.last() != Some(&b'\n') {
            return Self::Malformed(raw.into());
        }
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }

        Self::Name {
            path: path_from_bytes(&raw),
            name: raw.into(),
        }
    }
}

#[cfg(unix)]
fn path_from_bytes(raw: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(raw))
}

#[cfg(not(unix))]
fn path_from_bytes(raw: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(raw).into_owned())
}

/// Reads the next line, `None` at end of input.
pub fn read_line<R: BufRead>(input: &mut R) -> Result<Option<InputLine>> {
    let mut raw = Vec::new();
    let n = input
        .read_until(b'\n', &mut raw)
        .context("Failed to read filename from input")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(InputLine::from_bytes(raw)))
}

/// Scans one input line and turns the outcome into a record.
///
/// Per-file failures become failure records; only errors that are not tied
/// to the file are returned.
pub fn process_line(
    line: &InputLine,
    filter: &TypeFilter,
    algorithm: DigestAlgorithm,
) -> Result<Record> {
    match line {
        InputLine::Name { path, name } => {
            match jpeghash_io::fingerprint_file(path, filter, algorithm) {
                Ok(fp) => Ok(Record::digest(name.clone(), &fp)),
                Err(e) => {
                    warn!("{}", e);
                    Record::failure(name.clone(), &e)
                }
            }
        }
        InputLine::Malformed(text) => {
            let err = CoreError::MalformedInputLine {
                line: text.to_string(),
            };
            warn!("{}", err);
            Record::failure(text.clone(), &err)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub records: usize,
    pub failures: usize,
}

impl BatchSummary {
    fn add(&mut self, record: &Record) {
        self.records += 1;
        if record.is_failure() {
            self.failures += 1;
        }
    }
}

/// Processes every line of `input`, writing records to `output` in input order.
pub fn run_batch<R, W>(
    mut input: R,
    output: &mut W,
    filter: &TypeFilter,
    options: &BatchOptions,
) -> Result<BatchSummary>
where
    R: BufRead,
    W: Write,
{
    info!(
        algorithm = %options.algorithm,
        jobs = options.jobs,
        excluded = filter.excluded_count(),
        "Starting batch"
    );

    let mut summary = BatchSummary::default();

    if options.is_parallel() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
            .context("Failed to build worker pool")?;

        let mut batch = Vec::with_capacity(options.batch_size());
        loop {
            batch.clear();
            let mut at_eof = false;
            let mut read_error = None;
            while batch.len() < options.batch_size() {
                match read_line(&mut input) {
                    Ok(Some(line)) => batch.push(line),
                    Ok(None) => {
                        at_eof = true;
                        break;
                    }
                    Err(e) => {
                        read_error = Some(e);
                        break;
                    }
                }
            }

            // Lines read before a failed read still get their records.
            if !batch.is_empty() {
                let records = pool.install(|| {
                    batch
                        .par_iter()
                        .map(|line| process_line(line, filter, options.algorithm))
                        .collect::<Result<Vec<Record>>>()
                })?;

                for record in &records {
                    record.write_to(output, options.format)?;
                    summary.add(record);
                }
                output.flush().context("Failed to flush output")?;
            }

            if let Some(e) = read_error {
                return Err(e);
            }
            if at_eof {
                break;
            }
        }
    } else {
        while let Some(line) = read_line(&mut input)? {
            let record = process_line(&line, filter, options.algorithm)?;
            record.write_to(output, options.format)?;
            summary.add(&record);
        }
        output.flush().context("Failed to flush output")?;
    }

    info!(
        records = summary.records,
        failures = summary.failures,
        "Batch complete"
    );

    Ok(summary)
}
