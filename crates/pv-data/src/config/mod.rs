//! Store connection configuration
//!
//! The three connection settings come from the environment (with `.env`
//! support), never from user input.

use std::path::{Path, PathBuf};

use crate::DataError;

/// Directory holding the store files.
pub const ENV_DB_ROOT: &str = "PCAVIZ_DB_ROOT";
/// Logical database name, resolved to `<root>/<name>.db`.
pub const ENV_DB_NAME: &str = "PCAVIZ_DB_NAME";
/// Table holding the projection records.
pub const ENV_DB_TABLE: &str = "PCAVIZ_DB_TABLE";

/// Connection settings for the record store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection endpoint: the directory containing the database files
    pub root: PathBuf,
    /// Logical database name
    pub database: String,
    /// Collection/table holding the records
    pub collection: String,
}

impl StoreConfig {
    pub fn new(root: impl AsRef<Path>, database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Read the configuration from the environment, loading `.env` first.
    pub fn from_env() -> Result<Self, DataError> {
        dotenvy::dotenv().ok();

        let root = require_env(ENV_DB_ROOT)?;
        let database = require_env(ENV_DB_NAME)?;
        let collection = require_env(ENV_DB_TABLE)?;

        Ok(Self::new(root, database, collection))
    }

    /// Path of the database file this configuration points at.
    pub fn database_path(&self) -> PathBuf {
        self.root.join(format!("{}.db", self.database))
    }

    /// Example settings shown alongside connection errors.
    pub fn example() -> String {
        format!(
            "{}=./data\n{}=projections\n{}=pca_records",
            ENV_DB_ROOT, ENV_DB_NAME, ENV_DB_TABLE
        )
    }
}

fn require_env(name: &str) -> Result<String, DataError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(DataError::Config(format!("{} is not set", name))),
    }
}
