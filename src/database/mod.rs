pub mod config;
pub mod database;
pub mod format;

pub use config::{DatabaseFormat, HashAlgorithm, StoreConfig};
pub use database::{ClassificationDatabase, DatabaseError};
pub use format::{ParseError, SENTINEL};
