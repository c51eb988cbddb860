//! Batch options

use clap::ValueEnum;
use jpeghash_core::DigestAlgorithm;

/// Shape of the per-file records written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<digest>\t<filename>` lines, `!ERROR ...` on failure
    #[default]
    Tsv,
    /// One JSON object per line
    Json,
}

/// Options for one batch run over stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Digest used for every file
    pub algorithm: DigestAlgorithm,
    /// Worker threads; 1 scans inline on the reading thread
    pub jobs: usize,
    /// Record format
    pub format: OutputFormat,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha1,
            jobs: 1,
            format: OutputFormat::Tsv,
        }
    }
}

impl BatchOptions {
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the worker count (at least one)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Lines read ahead and scanned together when running in parallel
    pub fn batch_size(&self) -> usize {
        self.jobs * 16
    }

    pub fn is_parallel(&self) -> bool {
        self.jobs > 1
    }
}
