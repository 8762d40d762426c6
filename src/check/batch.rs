use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::check::{ArtifactChecker, CheckError};
use crate::types::{CheckResult, CheckStatus, Subject};

/// Number of checks per status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckTally {
    counts: BTreeMap<CheckStatus, usize>,
}

impl CheckTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, status: CheckStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// `bad=1, good=2, unknown=1`
impl fmt::Display for CheckTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (status, count) in &self.counts {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{status}={count}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
#[error("checking {}: {source}", artifact.display())]
pub struct BatchError {
    pub artifact: PathBuf,
    /// Results gathered before the failing check.
    pub partial: BatchReport,
    #[source]
    pub source: CheckError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub results: Vec<CheckResult>,
    pub tally: CheckTally,
}

/// Runs artifact checks one after another.
///
/// A missing artifact is recorded as `fail` and the batch goes on; any other
/// error ends the batch.
#[derive(Debug, Clone, Default)]
pub struct BatchChecker {
    checker: ArtifactChecker,
}

impl BatchChecker {
    pub fn new(checker: ArtifactChecker) -> Self {
        Self { checker }
    }

    pub fn run<I>(&self, items: I) -> Result<BatchReport, BatchError>
    where
        I: IntoIterator<Item = (PathBuf, PathBuf)>,
    {
        let mut report = BatchReport::default();

        for (artifact, database) in items {
            let result = match self.checker.check(&artifact, &database) {
                Ok(verdict) => CheckResult {
                    status: verdict.category.into(),
                    message: verdict.message,
                },
                Err(e) if !e.is_fatal() => {
                    warn!(artifact = %artifact.display(), "artifact not generated");
                    CheckResult {
                        status: CheckStatus::Fail,
                        message: e.to_string(),
                    }
                }
                Err(source) => {
                    return Err(BatchError {
                        artifact,
                        partial: report,
                        source,
                    });
                }
            };
            report.tally.record(result.status);
            report.results.push(result);
        }

        Ok(report)
    }

    /// Check `<output_dir>/<subject>.<extension>` against
    /// `<database_dir>/<subject>.json` for every subject, in the given order.
    pub fn run_subjects(
        &self,
        subjects: &[Subject],
        output_dir: &Path,
        extension: &str,
        database_dir: &Path,
    ) -> Result<BatchReport, BatchError> {
        self.run(subjects.iter().map(|subject| {
            (
                subject.artifact_path(output_dir, extension),
                subject.database_path(database_dir),
            )
        }))
    }
}
