use tokio_postgres::Config as PgConfig;

use crate::error::BackendError;
use crate::keywords::NativeParams;

/// Settings for one PostgreSQL connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub dbname: Option<String>,
}

impl PostgresOptions {
    /// Read options from native (`host`, `port`, `user`, `password`, `dbname`) parameters.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Other` if `host` or `user` is missing, the port is not a number,
    /// or an unknown key is present.
    pub fn from_native(params: &NativeParams) -> Result<Self, BackendError> {
        let mut host = None;
        let mut port = 5432;
        let mut user = None;
        let mut password = None;
        let mut dbname = None;
        for (key, value) in params {
            match key.as_str() {
                "host" => host = Some(value.clone()),
                "port" => {
                    port = value.parse().map_err(|e| {
                        BackendError::Other(format!("invalid PostgreSQL port `{value}`: {e}"))
                    })?;
                }
                "user" => user = Some(value.clone()),
                "password" => password = Some(value.clone()),
                "dbname" => dbname = Some(value.clone()),
                other => {
                    return Err(BackendError::Other(format!(
                        "unsupported PostgreSQL connection parameter `{other}`"
                    )));
                }
            }
        }

        let host = host.ok_or_else(|| BackendError::Other("host is required".to_string()))?;
        let user = user.ok_or_else(|| BackendError::Other("user is required".to_string()))?;
        Ok(Self {
            host,
            port,
            user,
            password,
            dbname,
        })
    }

    #[must_use]
    pub fn to_config(&self) -> PgConfig {
        let mut cfg = PgConfig::new();
        cfg.host(&self.host);
        cfg.port(self.port);
        cfg.user(&self.user);
        if let Some(password) = &self.password {
            cfg.password(password);
        }
        if let Some(dbname) = &self.dbname {
            cfg.dbname(dbname);
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(pairs: &[(&str, &str)]) -> NativeParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn reads_all_fields() {
        let opts = PostgresOptions::from_native(&native(&[
            ("host", "db.internal"),
            ("port", "6543"),
            ("user", "app"),
            ("password", "secret"),
            ("dbname", "orders"),
        ]))
        .unwrap();
        assert_eq!(opts.port, 6543);
        assert_eq!(opts.dbname.as_deref(), Some("orders"));
        assert_eq!(opts.to_config().get_user(), Some("app"));
    }

    #[test]
    fn port_defaults_and_must_be_numeric() {
        let opts = PostgresOptions::from_native(&native(&[("host", "h"), ("user", "u")])).unwrap();
        assert_eq!(opts.port, 5432);
        assert!(
            PostgresOptions::from_native(&native(&[("host", "h"), ("user", "u"), ("port", "x")]))
                .is_err()
        );
    }

    #[test]
    fn host_and_user_are_required() {
        assert!(PostgresOptions::from_native(&native(&[("user", "u")])).is_err());
        assert!(PostgresOptions::from_native(&native(&[("host", "h")])).is_err());
    }
}
