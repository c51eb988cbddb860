use anyhow::{Result, anyhow};
use jpeghash_core::{CoreError, Fingerprint, IoStage};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::io::Write;

use crate::options::OutputFormat;

/// Filename exactly as it arrived on input, which need not be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(Vec<u8>);

impl FileName {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl From<Vec<u8>> for FileName {
    fn from(raw: Vec<u8>) -> Self {
        Self(raw)
    }
}

impl From<&[u8]> for FileName {
    fn from(raw: &[u8]) -> Self {
        Self(raw.to_vec())
    }
}

impl From<&str> for FileName {
    fn from(name: &str) -> Self {
        Self(name.as_bytes().to_vec())
    }
}

impl From<String> for FileName {
    fn from(name: String) -> Self {
        Self(name.into_bytes())
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// JSON carries text, so non-UTF-8 names are written lossily there.
impl Serialize for FileName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Open,
    Stat,
    #[serde(rename = "mmap")]
    Map,
    Read,
    InvalidFilename,
}

impl FailureStage {
    /// Text of the `!ERROR` line for this stage.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Open => "opening file",
            Self::Stat => "stat file",
            Self::Map => "mmap file",
            Self::Read => "reading file",
            Self::InvalidFilename => "Invalid filename",
        }
    }
}

impl From<IoStage> for FailureStage {
    fn from(stage: IoStage) -> Self {
        match stage {
            IoStage::Open => Self::Open,
            IoStage::Stat => Self::Stat,
            IoStage::Map => Self::Map,
            IoStage::Read => Self::Read,
        }
    }
}

/// Only per-file errors have a stage; configuration errors are rejected.
impl TryFrom<&CoreError> for FailureStage {
    type Error = anyhow::Error;

    fn try_from(err: &CoreError) -> Result<Self> {
        match err {
            CoreError::Io { stage, .. } => Ok((*stage).into()),
            CoreError::MalformedInputLine { .. } => Ok(Self::InvalidFilename),
            CoreError::InvalidRange { .. } => Err(anyhow!("Not a per-file failure: {err}")),
        }
    }
}

/// Outcome for one input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Digest {
        file: FileName,
        digest: String,
    },
    Failure {
        file: FileName,
        error: String,
        stage: FailureStage,
    },
}

impl Record {
    pub fn digest(file: impl Into<FileName>, fingerprint: &Fingerprint) -> Self {
        Self::Digest {
            file: file.into(),
            digest: fingerprint.to_hex(),
        }
    }

    /// # Errors
    ///
    /// Fails when `err` is not tied to a single input file.
    pub fn failure(file: impl Into<FileName>, err: &CoreError) -> Result<Self> {
        Ok(Self::Failure {
            file: file.into(),
            error: err.to_string(),
            stage: FailureStage::try_from(err)?,
        })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn file(&self) -> &FileName {
        match self {
            Self::Digest { file, .. } | Self::Failure { file, .. } => file,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Tsv => {
                match self {
                    Self::Digest { digest, .. } => write!(out, "{digest}\t")?,
                    Self::Failure { stage, .. } => write!(out, "!ERROR {}\t", stage.message())?,
                }
                out.write_all(self.file().as_bytes())?;
                writeln!(out)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, self)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}
