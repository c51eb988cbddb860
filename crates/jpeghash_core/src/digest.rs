use std::str::FromStr;

use sha1::Sha1;
use sha2::Sha256;

use crate::filter::TypeFilter;
use crate::scanner::{ScanStats, SegmentHasher};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// Digest width in bytes.
    #[must_use]
    pub const fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(format!("unknown digest algorithm '{other}'")),
        }
    }
}

/// Digest of the included bytes of one input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

impl Fingerprint {
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex, two characters per digest byte.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Streaming scanner with the digest chosen at runtime.
pub enum FingerprintBuilder<'f> {
    Sha1(SegmentHasher<'f, Sha1>),
    Sha256(SegmentHasher<'f, Sha256>),
}

impl<'f> FingerprintBuilder<'f> {
    #[must_use]
    pub fn new(algorithm: DigestAlgorithm, filter: &'f TypeFilter) -> Self {
        match algorithm {
            DigestAlgorithm::Sha1 => Self::Sha1(SegmentHasher::new(filter)),
            DigestAlgorithm::Sha256 => Self::Sha256(SegmentHasher::new(filter)),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
        }
    }

    #[must_use]
    pub fn stats(&self) -> &ScanStats {
        match self {
            Self::Sha1(h) => h.stats(),
            Self::Sha256(h) => h.stats(),
        }
    }

    #[must_use]
    pub fn finish(self) -> (Fingerprint, ScanStats) {
        match self {
            Self::Sha1(h) => {
                let (out, stats) = h.finalize_with_stats();
                (
                    Fingerprint {
                        algorithm: DigestAlgorithm::Sha1,
                        bytes: out.to_vec(),
                    },
                    stats,
                )
            }
            Self::Sha256(h) => {
                let (out, stats) = h.finalize_with_stats();
                (
                    Fingerprint {
                        algorithm: DigestAlgorithm::Sha256,
                        bytes: out.to_vec(),
                    },
                    stats,
                )
            }
        }
    }
}

/// One-shot fingerprint of an in-memory buffer.
#[must_use]
pub fn fingerprint(buffer: &[u8], filter: &TypeFilter, algorithm: DigestAlgorithm) -> Fingerprint {
    let mut builder = FingerprintBuilder::new(algorithm, filter);
    builder.update(buffer);
    builder.finish().0
}
