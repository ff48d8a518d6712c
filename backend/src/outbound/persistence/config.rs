//! SQL Server connection settings read from the environment.

use mockable::Env;
use tiberius::{AuthMethod, Config};
use tracing::{debug, warn};
use zeroize::Zeroizing;

const SERVER_ENV: &str = "MSSQL_SERVER";
const NAME_ENV: &str = "MSSQL_NAME";
const USER_ENV: &str = "MSSQL_USER";
const PASSWORD_ENV: &str = "MSSQL_PASSWD";
const DRIVER_ENV: &str = "MSSQL_DRIVER";
const CHARSET_ENV: &str = "MSSQL_CHARSET";
const TRUST_CERT_ENV: &str = "MSSQL_TRUST_CERT";
const DEFAULT_PORT: u16 = 1433;
const APPLICATION_NAME: &str = "fgw-admin";

/// Errors raised while reading database settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DbConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable holds a value that cannot be used.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Accepted shape.
        expected: &'static str,
    },
}

/// Connection settings for the SQL Server instance.
#[derive(Clone)]
pub struct DbConfig {
    host: String,
    port: u16,
    database: String,
    user: String,
    password: Zeroizing<String>,
    trust_cert: bool,
}

impl DbConfig {
    /// Read `MSSQL_*` variables.
    ///
    /// `MSSQL_SERVER` accepts `host`, `host:port` or `host,port`. A named
    /// instance (`host\instance`) is reduced to its host and the default
    /// port. `MSSQL_DRIVER` and `MSSQL_CHARSET` are accepted for
    /// compatibility with ODBC-style `.env` files; the native driver needs
    /// neither.
    ///
    /// # Errors
    /// Returns [`DbConfigError`] when a required variable is missing or the
    /// server address cannot be parsed.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, DbConfigError> {
        let server = required(env, SERVER_ENV)?;
        let (host, port) = parse_server(&server)?;
        let database = required(env, NAME_ENV)?;
        let user = required(env, USER_ENV)?;
        let password = Zeroizing::new(env.string(PASSWORD_ENV).unwrap_or_default());
        if password.is_empty() {
            warn!("{PASSWORD_ENV} is empty");
        }
        let trust_cert = match env.string(TRUST_CERT_ENV) {
            None => true,
            Some(value) => parse_flag(&value).ok_or(DbConfigError::InvalidEnv {
                name: TRUST_CERT_ENV,
                value,
                expected: "1|0|true|false",
            })?,
        };
        for name in [DRIVER_ENV, CHARSET_ENV] {
            if let Some(value) = env.string(name) {
                debug!(variable = name, %value, "ignoring ODBC-only setting");
            }
        }

        Ok(Self {
            host,
            port,
            database,
            user,
            password,
            trust_cert,
        })
    }

    /// Database host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Build the driver configuration.
    #[must_use]
    pub fn to_tiberius(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.database(&self.database);
        config.application_name(APPLICATION_NAME);
        config.authentication(AuthMethod::sql_server(&self.user, self.password.as_str()));
        if self.trust_cert {
            config.trust_cert();
        }
        config
    }
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("trust_cert", &self.trust_cert)
            .finish_non_exhaustive()
    }
}

fn required<E: Env>(env: &E, name: &'static str) -> Result<String, DbConfigError> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(DbConfigError::MissingEnv { name })
}

fn parse_server(raw: &str) -> Result<(String, u16), DbConfigError> {
    let invalid = || DbConfigError::InvalidEnv {
        name: SERVER_ENV,
        value: raw.to_owned(),
        expected: "host, host:port or host,port",
    };

    if let Some((host, instance)) = raw.split_once('\\') {
        warn!(%host, %instance, "named instances are not resolved; using the default port");
        return if host.is_empty() {
            Err(invalid())
        } else {
            Ok((host.to_owned(), DEFAULT_PORT))
        };
    }

    match raw.rsplit_once([':', ',']) {
        Some((host, port)) => {
            let port = port.trim().parse::<u16>().map_err(|_| invalid())?;
            let host = host.trim();
            if host.is_empty() {
                Err(invalid())
            } else {
                Ok((host.to_owned(), port))
            }
        }
        None => Ok((raw.to_owned(), DEFAULT_PORT)),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
