//! Segment-aware streaming scanner.
//!
//! Walks raw bytes once, left to right, and feeds only the bytes of included
//! segments into a digest. A segment starts at an `FF xx` pair where `xx` is
//! not `00`; `FF 00` is a stuffed literal and stays in the enclosing segment.
//! Because a lone `FF` is ambiguous until the next byte arrives, its fate is
//! decided together with that byte. That pending decision is carried in
//! [`ScanState`] so chunks may end anywhere, including between `FF` and its
//! partner.
//!
//! The scanner accepts every byte sequence. Type bytes are not checked
//! against the JPEG marker set; `FF FF` treats the second `FF` as a type byte.

use memchr::memchr;
use sha2::Digest;
use sha2::digest::Output;
use tracing::debug;

use crate::filter::TypeFilter;
use crate::markers::{ESCAPE, STUFFED};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScanMode {
    #[default]
    Normal,
    /// The previous byte was [`ESCAPE`] and has not been hashed yet.
    SawEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanState {
    pub mode: ScanMode,
    /// Whether bytes of the current segment go into the digest. Only a new
    /// type byte changes it.
    pub want_data: bool,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            mode: ScanMode::Normal,
            want_data: true,
        }
    }
}

/// Counters gathered during one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub bytes_scanned: u64,
    pub bytes_hashed: u64,
    pub segments: u64,
    pub segments_excluded: u64,
    pub stuffed_bytes: u64,
}

impl ScanStats {
    #[must_use]
    pub fn bytes_skipped(&self) -> u64 {
        self.bytes_scanned - self.bytes_hashed
    }
}

/// Incremental scanner bound to one [`TypeFilter`] and one digest.
///
/// Feeding a buffer in any number of pieces produces the same digest as
/// feeding it whole.
///
/// ```
/// use jpeghash_core::{SegmentHasher, TypeFilter};
/// use sha1::Sha1;
///
/// let filter = TypeFilter::build([(0xE1, 0xE1)]).unwrap();
/// let mut hasher = SegmentHasher::<Sha1>::new(&filter);
/// hasher.update(&[0xFF, 0xD8, 0xFF]);
/// hasher.update(&[0xE1, 0x00, 0x04, 0xAA, 0xBB]);
/// let digest = hasher.finalize();
/// assert_eq!(digest.len(), 20);
/// ```
pub struct SegmentHasher<'f, D: Digest> {
    filter: &'f TypeFilter,
    state: ScanState,
    digest: D,
    stats: ScanStats,
}

impl<'f, D: Digest> SegmentHasher<'f, D> {
    #[must_use]
    pub fn new(filter: &'f TypeFilter) -> Self {
        Self {
            filter,
            state: ScanState::default(),
            digest: D::new(),
            stats: ScanStats::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn update(&mut self, data: &[u8]) {
        self.stats.bytes_scanned += data.len() as u64;

        let mut rest = data;

        if self.state.mode == ScanMode::SawEscape {
            let Some((&next, tail)) = rest.split_first() else {
                return;
            };
            self.resolve_escape(next);
            rest = tail;
        }

        loop {
            let Some(idx) = memchr(ESCAPE, rest) else {
                self.feed(rest);
                return;
            };

            self.feed(&rest[..idx]);

            match rest.get(idx + 1) {
                Some(&next) => {
                    self.resolve_escape(next);
                    rest = &rest[idx + 2..];
                }
                None => {
                    self.state.mode = ScanMode::SawEscape;
                    return;
                }
            }
        }
    }

    /// Decides the pending escape byte together with the byte after it.
    fn resolve_escape(&mut self, next: u8) {
        if next == STUFFED {
            self.stats.stuffed_bytes += 1;
        } else {
            self.state.want_data = self.filter.is_included(next);
            self.stats.segments += 1;
            if !self.state.want_data {
                self.stats.segments_excluded += 1;
            }
        }

        self.feed(&[ESCAPE, next]);
        self.state.mode = ScanMode::Normal;
    }

    #[inline]
    fn feed(&mut self, bytes: &[u8]) {
        if self.state.want_data && !bytes.is_empty() {
            self.digest.update(bytes);
            self.stats.bytes_hashed += bytes.len() as u64;
        }
    }

    #[must_use]
    pub fn finalize(self) -> Output<D> {
        self.finalize_with_stats().0
    }

    /// Flushes a trailing lone escape byte (if its segment is included) and
    /// produces the digest.
    #[must_use]
    pub fn finalize_with_stats(mut self) -> (Output<D>, ScanStats) {
        if self.state.mode == ScanMode::SawEscape {
            self.feed(&[ESCAPE]);
            self.state.mode = ScanMode::Normal;
        }

        debug!(
            scanned = self.stats.bytes_scanned,
            hashed = self.stats.bytes_hashed,
            segments = self.stats.segments,
            excluded = self.stats.segments_excluded,
            stuffed = self.stats.stuffed_bytes,
            "segment scan finished"
        );

        (self.digest.finalize(), self.stats)
    }
}

/// Scans `buffer` in one call and returns its digest.
#[must_use]
pub fn scan<D: Digest>(buffer: &[u8], filter: &TypeFilter) -> Output<D> {
    let mut hasher = SegmentHasher::<D>::new(filter);
    hasher.update(buffer);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha1::Sha1;

    /// Collects the bytes the scanner hashes by running the state machine one
    /// byte at a time.
    fn selected_bytes(buffer: &[u8], filter: &TypeFilter) -> Vec<u8> {
        let mut out = Vec::new();
        let mut state = ScanState::default();

        for (i, &byte) in buffer.iter().enumerate() {
            match state.mode {
                ScanMode::Normal if byte == ESCAPE => state.mode = ScanMode::SawEscape,
                ScanMode::Normal => {
                    if state.want_data {
                        out.push(byte);
                    }
                }
                ScanMode::SawEscape => {
                    if byte != STUFFED {
                        state.want_data = filter.is_included(byte);
                    }
                    if state.want_data {
                        out.extend_from_slice(&buffer[i - 1..=i]);
                    }
                    state.mode = ScanMode::Normal;
                }
            }
        }

        if state.mode == ScanMode::SawEscape && state.want_data {
            out.push(ESCAPE);
        }
        out
    }

    fn sha1(bytes: &[u8]) -> Output<Sha1> {
        Sha1::digest(bytes)
    }

    const SCENARIO: [u8; 7] = [0x41, 0xFF, 0xD8, 0x42, 0xFF, 0x00, 0x43];

    #[test]
    fn all_included_hashes_every_byte() {
        let filter = TypeFilter::default();
        assert_eq!(scan::<Sha1>(&SCENARIO, &filter), sha1(&SCENARIO));
    }

    #[test]
    fn excluded_segment_drops_marker_and_payload() {
        let filter = TypeFilter::build([(0xD8, 0xD8)]).unwrap();
        assert_eq!(selected_bytes(&SCENARIO, &filter), vec![0x41]);
        assert_eq!(scan::<Sha1>(&SCENARIO, &filter), sha1(&[0x41]));
    }

    #[test]
    fn stuffed_pair_in_included_segment_contributes_two_bytes() {
        let filter = TypeFilter::build([(0xE1, 0xE1)]).unwrap();
        let buffer = [0xFF, 0xDA, 0x10, 0xFF, 0x00, 0x20];

        let mut hasher = SegmentHasher::<Sha1>::new(&filter);
        hasher.update(&buffer);
        let (digest, stats) = hasher.finalize_with_stats();

        assert_eq!(digest, sha1(&buffer));
        assert_eq!(stats.stuffed_bytes, 1);
        assert_eq!(stats.bytes_hashed, 6);
    }

    #[test]
    fn stuffed_pair_keeps_excluded_state() {
        let filter = TypeFilter::build([(0xE1, 0xE1)]).unwrap();
        let buffer = [0x01, 0xFF, 0xE1, 0x02, 0xFF, 0x00, 0x03, 0xFF, 0xDB, 0x04];
        assert_eq!(
            selected_bytes(&buffer, &filter),
            vec![0x01, 0xFF, 0xDB, 0x04]
        );
        assert_eq!(
            scan::<Sha1>(&buffer, &filter),
            sha1(&[0x01, 0xFF, 0xDB, 0x04])
        );
    }

    #[test]
    fn trailing_escape_in_included_segment_is_hashed_once() {
        let filter = TypeFilter::default();
        let buffer = [0x10, 0x20, 0xFF];

        let mut hasher = SegmentHasher::<Sha1>::new(&filter);
        hasher.update(&buffer);
        assert_eq!(hasher.state().mode, ScanMode::SawEscape);
        let (digest, stats) = hasher.finalize_with_stats();

        assert_eq!(digest, sha1(&buffer));
        assert_eq!(stats.bytes_hashed, 3);
    }

    #[test]
    fn trailing_escape_in_excluded_segment_is_dropped() {
        let filter = TypeFilter::build([(0xFE, 0xFE)]).unwrap();
        let buffer = [0x10, 0xFF, 0xFE, 0x20, 0xFF];
        assert_eq!(scan::<Sha1>(&buffer, &filter), sha1(&[0x10]));
    }

    #[test]
    fn double_escape_treats_second_as_type_byte() {
        let filter = TypeFilter::build([(0xFF, 0xFF)]).unwrap();
        let buffer = [0x01, 0xFF, 0xFF, 0x02, 0xFF, 0xD9];
        assert_eq!(selected_bytes(&buffer, &filter), vec![0x01, 0xFF, 0xD9]);
        assert_eq!(scan::<Sha1>(&buffer, &filter), sha1(&[0x01, 0xFF, 0xD9]));
    }

    #[test]
    fn empty_buffer_hashes_nothing() {
        let filter = TypeFilter::build([(0x00, 0xFF)]).unwrap();
        assert_eq!(scan::<Sha1>(&[], &filter), sha1(&[]));
    }

    #[test]
    fn everything_excluded_still_hashes_leading_bytes() {
        let filter = TypeFilter::build([(0x01, 0xFF)]).unwrap();
        let buffer = [0xAA, 0xBB, 0xFF, 0xD8, 0xCC];
        assert_eq!(scan::<Sha1>(&buffer, &filter), sha1(&[0xAA, 0xBB]));
    }

    #[test]
    fn escape_split_across_updates() {
        let filter = TypeFilter::build([(0xE1, 0xE1)]).unwrap();
        let buffer = [0x01, 0xFF, 0xE1, 0x02, 0xFF, 0xDB, 0x03];

        let mut hasher = SegmentHasher::<Sha1>::new(&filter);
        hasher.update(&buffer[..2]);
        assert_eq!(hasher.state().mode, ScanMode::SawEscape);
        hasher.update(&[]);
        assert_eq!(hasher.state().mode, ScanMode::SawEscape);
        hasher.update(&buffer[2..5]);
        hasher.update(&buffer[5..]);

        assert_eq!(hasher.finalize(), scan::<Sha1>(&buffer, &filter));
    }

    #[test]
    fn stats_count_segments() {
        let filter = TypeFilter::build([(0xE0, 0xEF)]).unwrap();
        let buffer = [
            0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0xFF, 0xE1, 0x02, 0xFF, 0x00, 0xFF, 0xDB, 0x03,
        ];

        let mut hasher = SegmentHasher::<Sha1>::new(&filter);
        hasher.update(&buffer);
        let stats = *hasher.stats();

        assert_eq!(stats.bytes_scanned, 13);
        assert_eq!(stats.segments, 4);
        assert_eq!(stats.segments_excluded, 2);
        assert_eq!(stats.stuffed_bytes, 1);
        assert_eq!(stats.bytes_hashed, 5);
        assert_eq!(stats.bytes_skipped(), 8);
    }

    #[test]
    fn memchr_runs_match_bytewise_machine() {
        let filter = TypeFilter::build([(0xE1, 0xE2), (0xFE, 0xFF)]).unwrap();
        let buffer: Vec<u8> = (0..4096u32)
            .map(|i| match i % 97 {
                0 => 0xFF,
                1 if i % 3 == 0 => 0x00,
                1 => (0xE0 + (i % 5)) as u8,
                _ => (i.wrapping_mul(2_654_435_761) >> 24) as u8,
            })
            .collect();

        assert_eq!(
            scan::<Sha1>(&buffer, &filter),
            sha1(&selected_bytes(&buffer, &filter))
        );
    }
}
