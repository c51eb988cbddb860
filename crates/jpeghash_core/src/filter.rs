//! Per-segment-type inclusion table and the exclusion directives that build it.
//!
//! A [`TypeFilter`] answers one question in constant time: should the bytes of
//! a segment introduced by type byte `t` contribute to the fingerprint? Every
//! type starts out included; directives such as `"E1"`, `"e0-ef"` or
//! `"APP1-APP15"` switch inclusive ranges off. The table is immutable once
//! built and is shared by reference across scans.

use std::str::FromStr;

use tracing::info;

use crate::error::{CoreError, Result};
use crate::markers::{marker_from_name, marker_name};

const TYPE_COUNT: usize = 256;

/// Inclusive range of segment type bytes to leave out of the fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExclusionRange {
    start: u8,
    end: u8,
}

impl ExclusionRange {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] when `end < start`.
    pub fn new(start: u8, end: u8) -> Result<Self> {
        if end < start {
            return Err(CoreError::invalid_range(
                format!("{start:02x}-{end:02x}"),
                "end of range precedes start",
            ));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn single(value: u8) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> u8 {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> u8 {
        self.end
    }

    #[must_use]
    pub fn contains(&self, value: u8) -> bool {
        (self.start..=self.end).contains(&value)
    }
}

impl std::fmt::Display for ExclusionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{:02x}", self.start)
        } else {
            write!(f, "{:02x}-{:02x}", self.start, self.end)
        }
    }
}

impl FromStr for ExclusionRange {
    type Err = CoreError;

    fn from_str(directive: &str) -> Result<Self> {
        let (lo, hi) = match directive.split_once('-') {
            Some((lo, hi)) => (lo, Some(hi)),
            None => (directive, None),
        };

        let start = parse_bound(directive, lo)?;
        let end = match hi {
            Some(hi) => parse_bound(directive, hi)?,
            None => start,
        };

        if end < start {
            return Err(CoreError::invalid_range(
                directive,
                "end of range precedes start",
            ));
        }

        Ok(Self { start, end })
    }
}

fn parse_bound(directive: &str, bound: &str) -> Result<u8> {
    let bound = bound.trim();
    if bound.is_empty() {
        return Err(CoreError::invalid_range(directive, "missing type value"));
    }

    if let Some(marker) = marker_from_name(bound) {
        return Ok(marker);
    }

    let digits = bound
        .strip_prefix("0x")
        .or_else(|| bound.strip_prefix("0X"))
        .unwrap_or(bound);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CoreError::invalid_range(
            directive,
            format!("'{bound}' is neither a hexadecimal byte nor a marker name"),
        ));
    }

    u32::from_str_radix(digits, 16)
        .ok()
        .and_then(|value| u8::try_from(value).ok())
        .ok_or_else(|| {
            CoreError::invalid_range(directive, format!("'{bound}' is outside 00-ff"))
        })
}

/// Parses every directive, stopping at the first invalid one.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRange`] naming the offending directive.
pub fn parse_directives<I, S>(directives: I) -> Result<Vec<ExclusionRange>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    directives
        .into_iter()
        .map(|d| d.as_ref().parse())
        .collect()
}

/// 256-entry table saying whether each segment type contributes to the digest.
#[derive(Clone, PartialEq, Eq)]
pub struct TypeFilter {
    included: [bool; TYPE_COUNT],
}

impl Default for TypeFilter {
    fn default() -> Self {
        Self {
            included: [true; TYPE_COUNT],
        }
    }
}

impl std::fmt::Debug for TypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeFilter")
            .field("excluded", &self.excluded_types().collect::<Vec<_>>())
            .finish()
    }
}

impl TypeFilter {
    /// Builds a filter from `(start, end)` byte pairs.
    ///
    /// Overlapping pairs are fine; excluding a type twice has no further effect.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] if any pair has `end < start`. No
    /// filter is produced in that case.
    pub fn build<I>(exclusions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let ranges = exclusions
            .into_iter()
            .map(|(start, end)| ExclusionRange::new(start, end))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_ranges(ranges))
    }

    #[must_use]
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = ExclusionRange>,
    {
        let mut filter = Self::default();
        for range in ranges {
            filter.exclude(range);
        }
        filter
    }

    fn exclude(&mut self, range: ExclusionRange) {
        for t in range.start..=range.end {
            info!("Exclude {}", type_label(t));
            self.included[usize::from(t)] = false;
        }
    }

    #[inline]
    #[must_use]
    pub fn is_included(&self, type_byte: u8) -> bool {
        self.included[usize::from(type_byte)]
    }

    /// Excluded type bytes in ascending order.
    pub fn excluded_types(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|&t| !self.is_included(t))
    }

    #[must_use]
    pub fn excluded_count(&self) -> usize {
        self.included.iter().filter(|&&inc| !inc).count()
    }

    #[must_use]
    pub fn is_all_included(&self) -> bool {
        self.included.iter().all(|&inc| inc)
    }
}

/// `0xe1 (APP1)` for named markers, plain `0x05` otherwise.
fn type_label(type_byte: u8) -> String {
    match marker_name(type_byte) {
        Some(name) => format!("0x{type_byte:02x} ({name})"),
        None => format!("0x{type_byte:02x}"),
    }
}
