//! Batch driver and commands behind the `jpeghash` binary.

pub mod compare;
pub mod driver;
pub mod logging;
pub mod options;
pub mod record;

pub use compare::{DuplicateGroup, find_duplicates, write_groups};
pub use driver::{BatchSummary, InputLine, process_line, read_line, run_batch};
pub use options::{BatchOptions, OutputFormat};
pub use record::{FailureStage, FileName, Record};
