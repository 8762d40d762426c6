use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::database::HashAlgorithm;

/// Content hash of one generated artifact, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChecksumError {
    #[error("Checksum is empty")]
    Empty,
    #[error("Checksum {0:?} is not lowercase hexadecimal")]
    InvalidCharacter(String),
}

impl Checksum {
    pub fn from_content(algorithm: HashAlgorithm, content: &[u8]) -> Self {
        let hex = hex::encode(algorithm.digest(content));
        debug_assert_eq!(hex.len(), algorithm.hex_len());
        Checksum(hex)
    }

    pub fn parse(raw: impl Into<String>) -> Result<Self, ChecksumError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ChecksumError::Empty);
        }
        if !raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(ChecksumError::InvalidCharacter(raw));
        }
        Ok(Checksum(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Checksum {
    type Error = ChecksumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Checksum::parse(value)
    }
}

impl From<Checksum> for String {
    fn from(value: Checksum) -> Self {
        value.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base name shared by one input, its generated artifact and its database file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("Path has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("Path involves invalid UTF-8")]
    InvalidUtf8,
}

impl Subject {
    /// `input/foo.txt` and `output/foo.pdf` both name subject `foo`.
    pub fn from_path(path: &Path) -> Result<Self, SubjectError> {
        let stem = path
            .file_stem()
            .ok_or_else(|| SubjectError::NoFileName(path.to_path_buf()))?;
        let stem = stem.to_str().ok_or(SubjectError::InvalidUtf8)?;
        Ok(Subject(stem.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn database_path(&self, database_dir: &Path) -> PathBuf {
        database_dir.join(format!("{}.json", self.0))
    }

    pub fn artifact_path(&self, output_dir: &Path, extension: &str) -> PathBuf {
        output_dir.join(format!("{}.{extension}", self.0))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
