use mysql_async::{Opts, OptsBuilder};

use crate::error::BackendError;
use crate::keywords::NativeParams;

/// Settings for one MySQL connection, read from `Server`/`Port`/`Uid`/`Pwd`/`Database`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MysqlOptions {
    pub server: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl Default for MysqlOptions {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: 3306,
            user: None,
            password: None,
            database: None,
        }
    }
}

impl MysqlOptions {
    /// # Errors
    ///
    /// Returns `BackendError::Other` for a non-numeric port or an unknown key.
    pub fn from_native(params: &NativeParams) -> Result<Self, BackendError> {
        let mut opts = Self::default();
        for (key, value) in params {
            match key.as_str() {
                "Server" => opts.server.clone_from(value),
                "Port" => {
                    opts.port = value.parse().map_err(|e| {
                        BackendError::Other(format!("invalid MySQL port `{value}`: {e}"))
                    })?;
                }
                "Uid" => opts.user = Some(value.clone()),
                "Pwd" => opts.password = Some(value.clone()),
                "Database" => opts.database = Some(value.clone()),
                other => {
                    return Err(BackendError::Other(format!(
                        "unsupported MySQL connection parameter `{other}`"
                    )));
                }
            }
        }
        Ok(opts)
    }

    #[must_use]
    pub fn to_opts(&self) -> Opts {
        OptsBuilder::default()
            .ip_or_hostname(self.server.clone())
            .tcp_port(self.port)
            .user(self.user.clone())
            .pass(self.password.clone())
            .db_name(self.database.clone())
            .into()
    }
}
