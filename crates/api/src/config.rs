use std::path::PathBuf;
use std::time::Duration;

use crate::opts;

/// Server configuration resolved from the environment.
///
/// Every option also honours the `<VAR>FILE` indirection described in
/// [`crate::opts`].
///
/// | Env Var                       | Default     |
/// |-------------------------------|-------------|
/// | `TASKS_HOST`                  | `0.0.0.0`   |
/// | `TASKS_PORT`                  | `8080`      |
/// | `TASKS_STORAGE`               | `sqlite`    |
/// | `TASKS_DATA_DIR`              | `./data`    |
/// | `TASKS_DBSERVER`              | `db`        |
/// | `TASKS_DBPORT`                | `5432`      |
/// | `TASKS_USERNAME`              | *required*  |
/// | `TASKS_PASSWORD`              | *required*  |
/// | `TASKS_DBNAME`                | *required*  |
/// | `TASKS_STATIC_DIR`            | unset       |
/// | `TASKS_SHUTDOWN_TIMEOUT_SECS` | unset       |
///
/// The postgres rows apply only when `TASKS_STORAGE=postgres`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Storage backend selection plus its connection parameters.
    pub storage: StorageConfig,
    /// Directory served for any path outside the task API, when set.
    pub static_dir: Option<PathBuf>,
    /// Upper bound on the graceful-shutdown drain. Unset means the drain
    /// waits as long as in-flight requests need.
    pub shutdown_timeout: Option<Duration>,
}

/// Which storage backend to wire at startup.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Embedded SQLite store; the data file lives at `<data_dir>/tasks.db`.
    Sqlite { data_dir: PathBuf },
    /// Networked PostgreSQL store.
    Postgres { url: String },
}

/// A configuration problem fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("{name} not provided")]
    Missing { name: &'static str },
    #[error("invalid storage option {0:?}")]
    UnknownStorage(String),
}

impl ServerConfig {
    /// Resolve the full configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = opts::get_option("TASKS_HOST", "0.0.0.0");

        let port_raw = opts::get_option("TASKS_PORT", "8080");
        let port: u16 = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "TASKS_PORT",
            value: port_raw,
        })?;

        let storage = match opts::get_option("TASKS_STORAGE", "sqlite").as_str() {
            "sqlite" => StorageConfig::Sqlite {
                data_dir: PathBuf::from(opts::get_option("TASKS_DATA_DIR", "./data")),
            },
            "postgres" => StorageConfig::Postgres {
                url: postgres_url_from_env()?,
            },
            other => return Err(ConfigError::UnknownStorage(other.to_string())),
        };

        let static_dir = opts::lookup("TASKS_STATIC_DIR").map(PathBuf::from);

        let shutdown_timeout = match opts::lookup("TASKS_SHUTDOWN_TIMEOUT_SECS") {
            None => None,
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "TASKS_SHUTDOWN_TIMEOUT_SECS",
                    value: raw,
                })?;
                Some(Duration::from_secs(secs))
            }
        };

        Ok(Self {
            host,
            port,
            storage,
            static_dir,
            shutdown_timeout,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    opts::lookup(name).ok_or(ConfigError::Missing { name })
}

fn postgres_url_from_env() -> Result<String, ConfigError> {
    let server = opts::get_option("TASKS_DBSERVER", "db");
    let port = opts::get_option("TASKS_DBPORT", "5432");
    let username = required("TASKS_USERNAME")?;
    let password = required("TASKS_PASSWORD")?;
    let dbname = required("TASKS_DBNAME")?;

    Ok(format!(
        "postgres://{username}:{password}@{server}:{port}/{dbname}?sslmode=disable"
    ))
}
