pub mod batch;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::database::{ClassificationDatabase, DatabaseError, StoreConfig};
use crate::types::{Category, CheckResult, CheckStatus, Checksum};

pub use batch::{BatchChecker, BatchError, BatchReport, CheckTally};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("File {} not generated", display_name(.0))]
    ArtifactMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl CheckError {
    /// Whether a batch should stop here. A missing artifact only fails its
    /// own check; a broken database needs a human.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CheckError::ArtifactMissing(_))
    }
}

/// A classified artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub checksum: Checksum,
    pub category: Category,
    /// Whether the database file was rewritten.
    pub database_changed: bool,
    pub message: String,
}

/// Checks one generated artifact against its subject's checksum database.
///
/// Single-threaded by design: two checks must never share a database file
/// concurrently.
#[derive(Debug, Clone, Default)]
pub struct ArtifactChecker {
    config: StoreConfig,
}

impl ArtifactChecker {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn check(&self, artifact_path: &Path, database_path: &Path) -> Result<Verdict, CheckError> {
        // Missing artifact: no hash, no database access
        let content = match fs::read(artifact_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CheckError::ArtifactMissing(artifact_path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let checksum = Checksum::from_content(self.config.hash_algorithm, &content);

        let mut db = ClassificationDatabase::load(database_path, self.config.format)?;
        let classification = db.classify(&checksum);
        let database_changed = db.save(database_path, self.config.format)?;

        let message = format!(
            "Validity of file {} checksum '{}' is {}.",
            display_name(artifact_path),
            checksum,
            classification.category,
        );

        Ok(Verdict {
            checksum,
            category: classification.category,
            database_changed,
            message,
        })
    }

    /// Like [`check`](Self::check), but a missing artifact is reported as a
    /// `fail` result instead of an error.
    pub fn check_artifact(
        &self,
        artifact_path: &Path,
        database_path: &Path,
    ) -> Result<CheckResult, CheckError> {
        match self.check(artifact_path, database_path) {
            Ok(verdict) => Ok(CheckResult {
                status: verdict.category.into(),
                message: verdict.message,
            }),
            Err(e @ CheckError::ArtifactMissing(_)) => Ok(CheckResult {
                status: CheckStatus::Fail,
                message: e.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}

/// Check with the default (legacy MD5) configuration.
pub fn check_artifact(artifact_path: &Path, database_path: &Path) -> Result<CheckResult, CheckError> {
    ArtifactChecker::default().check_artifact(artifact_path, database_path)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
