use crate::error::BackendError;
use crate::keywords::NativeParams;

/// Native key naming the database file.
pub const DATA_SOURCE: &str = "Data Source";

/// Settings for opening a `SQLite` database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteOptions {
    pub db_path: String,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// Read options from native parameters; a missing data source means `:memory:`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Other` for a native key this adapter does not know.
    pub fn from_native(params: &NativeParams) -> Result<Self, BackendError> {
        let mut opts = Self::new(":memory:".to_string());
        for (key, value) in params {
            match key.as_str() {
                DATA_SOURCE => opts.db_path.clone_from(value),
                other => {
                    return Err(BackendError::Other(format!(
                        "unsupported SQLite connection parameter `{other}`"
                    )));
                }
            }
        }
        Ok(opts)
    }

    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.db_path == ":memory:"
    }
}
