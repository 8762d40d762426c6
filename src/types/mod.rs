pub mod classification;
pub mod identifiers;

pub use classification::{Category, CheckResult, CheckStatus, Classification};
pub use identifiers::{Checksum, ChecksumError, Subject, SubjectError};
