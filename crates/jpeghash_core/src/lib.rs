//! Segment-aware JPEG fingerprinting.
//!
//! [`TypeFilter`] decides which segment types count; [`SegmentHasher`] walks
//! the bytes and feeds the counted ones into a digest.

pub mod digest;
mod error;
pub mod filter;
pub mod markers;
pub mod scanner;

pub use digest::{DigestAlgorithm, Fingerprint, FingerprintBuilder, fingerprint};
pub use error::{CoreError, IoStage, Result};
pub use filter::{ExclusionRange, TypeFilter, parse_directives};
pub use scanner::{ScanMode, ScanState, ScanStats, SegmentHasher, scan};
