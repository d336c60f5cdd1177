use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} tidak ditemukan di environment")]
    Missing(&'static str),

    #[error("{name} tidak valid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration, read from the environment (and `.env`).
///
/// | Env Var              | Default              |
/// |----------------------|----------------------|
/// | `DATABASE_URL`       | required             |
/// | `HOST`               | `127.0.0.1`          |
/// | `PORT`               | `3000`               |
/// | `DB_MAX_CONNECTIONS` | `5`                  |
/// | `PUBLIC_DIR`         | `public`             |
/// | `STORAGE_DIR`        | `storage/app/public` |
/// | `MAX_BODY_BYTES`     | `10485760`           |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    /// Parent of the public `images/` directory.
    pub public_dir: PathBuf,
    /// Root of the storage disk served under `/storage`.
    pub storage_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: parse_var("PORT", 3000)?,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            public_dir: env::var("PUBLIC_DIR")
                .unwrap_or_else(|_| "public".into())
                .into(),
            storage_dir: env::var("STORAGE_DIR")
                .unwrap_or_else(|_| "storage/app/public".into())
                .into(),
            max_body_bytes: parse_var("MAX_BODY_BYTES", 10 * 1024 * 1024)?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
