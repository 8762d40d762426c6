//! Good/bad/unknown checksum database for regression-testing generated files.
//!
//! `checksum-classify` hashes a generated artifact, looks the checksum up in a
//! per-subject database of hand-maintained classifications, records novel
//! checksums as `unknown`, and writes the database back only when it changed.
//! The on-disk form is sorted and sentinel-terminated so that maintainers can
//! move lines between categories by hand and diffs stay minimal.

pub mod check;
pub mod database;
pub mod types;

pub use check::{check_artifact, ArtifactChecker, CheckError};
pub use database::{ClassificationDatabase, DatabaseError, DatabaseFormat, HashAlgorithm, StoreConfig};
pub use types::{Category, CheckResult, CheckStatus, Checksum, Classification, Subject};
