use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// What existing database files hold.
    #[default]
    Md5,
    Sha256,
}

impl HashAlgorithm {
    pub fn digest(self, content: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Md5 => Md5::digest(content).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(content).to_vec(),
        }
    }

    /// Length of the hex rendering of a digest.
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha256 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseFormat {
    /// Three `<category>_md5 = [...]` lists.
    #[default]
    Legacy,
    /// A `{"bad": [...], "good": [...], "unknown": [...]}` document.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub format: DatabaseFormat,
    pub hash_algorithm: HashAlgorithm,
}

impl StoreConfig {
    pub fn legacy() -> Self {
        Self {
            format: DatabaseFormat::Legacy,
            hash_algorithm: HashAlgorithm::Md5,
        }
    }

    pub fn json_sha256() -> Self {
        Self {
            format: DatabaseFormat::Json,
            hash_algorithm: HashAlgorithm::Sha256,
        }
    }
}
