use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sea_orm::ConnectOptions;
use serde::{Deserialize, Serialize};

use folio_core::{StoreError, StoreResult};

use crate::RecordingMode;

const DEFAULT_CONFIG_NAME: &str = "folio.json";
const DEFAULT_DB_NAME: &str = "folio.sqlite";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DatabaseConfig {
    Sqlite { path: Option<String> },
    Postgres { url: String },
    Mysql { url: String },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_ms: Option<u64>,
    pub acquire_timeout_ms: Option<u64>,
    pub idle_timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FolioConfig {
    pub database: DatabaseConfig,
    pub pool: Option<PoolConfig>,
    pub recording_mode: Option<RecordingMode>,
}

impl FolioConfig {
    pub fn default_sqlite(path: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig::Sqlite {
                path: Some(path.into()),
            },
            pool: None,
            recording_mode: Some(RecordingMode::Error),
        }
    }

    pub fn load_or_init(base_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(base_dir)
            .map_err(|err| StoreError::storage(format!("create config dir: {err}")))?;
        let config_path = base_dir.join(DEFAULT_CONFIG_NAME);
        if config_path.exists() {
            let raw = fs::read_to_string(&config_path)
                .map_err(|err| StoreError::storage(format!("read config: {err}")))?;
            return serde_json::from_str(&raw)
                .map_err(|err| StoreError::validation(format!("parse config: {err}")));
        }
        let default = FolioConfig::default_sqlite(DEFAULT_DB_NAME);
        let payload = serde_json::to_string_pretty(&default)
            .map_err(|err| StoreError::storage(format!("serialize config: {err}")))?;
        fs::write(&config_path, payload)
            .map_err(|err| StoreError::storage(format!("write config: {err}")))?;
        log::info!("wrote default config to {}", config_path.display());
        Ok(default)
    }

    /// Relative SQLite paths resolve against `base_dir`.
    pub fn sqlite_path(&self, base_dir: &Path) -> StoreResult<PathBuf> {
        match &self.database {
            DatabaseConfig::Sqlite { path } => {
                let candidate =
                    PathBuf::from(path.clone().unwrap_or_else(|| DEFAULT_DB_NAME.to_string()));
                if candidate.is_absolute() {
                    Ok(candidate)
                } else {
                    Ok(base_dir.join(candidate))
                }
            }
            _ => Err(StoreError::validation("config is not sqlite backend")),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.database {
            DatabaseConfig::Sqlite { .. } => "sqlite",
            DatabaseConfig::Postgres { .. } => "postgres",
            DatabaseConfig::Mysql { .. } => "mysql",
        }
    }

    pub fn connection_url(&self, base_dir: &Path) -> StoreResult<String> {
        match &self.database {
            DatabaseConfig::Sqlite { .. } => {
                let path = self.sqlite_path(base_dir)?;
                Ok(format!("sqlite://{}?mode=rwc", path.display()))
            }
            DatabaseConfig::Postgres { url } | DatabaseConfig::Mysql { url } => Ok(url.clone()),
        }
    }

    pub fn connect_options(&self, base_dir: &Path) -> StoreResult<ConnectOptions> {
        let mut options = ConnectOptions::new(self.connection_url(base_dir)?);
        if let Some(pool) = &self.pool {
            pool.apply(&mut options);
        }
        Ok(options)
    }

    pub fn recording_mode(&self) -> RecordingMode {
        self.recording_mode.unwrap_or_default()
    }
}

impl PoolConfig {
    pub fn apply(&self, options: &mut ConnectOptions) {
        if let Some(max) = self.max_connections {
            options.max_connections(max);
        }
        if let Some(min) = self.min_connections {
            options.min_connections(min);
        }
        if let Some(timeout_ms) = self.connect_timeout_ms {
            options.connect_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(timeout_ms) = self.acquire_timeout_ms {
            options.acquire_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(timeout_ms) = self.idle_timeout_ms {
            options.idle_timeout(Duration::from_millis(timeout_ms));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_or_init_writes_default_then_reads_it_back() {
        let dir = tempdir().expect("tempdir");
        let first = FolioConfig::load_or_init(dir.path()).expect("init");
        assert_eq!(first.backend_name(), "sqlite");
        assert!(dir.path().join(DEFAULT_CONFIG_NAME).exists());

        let second = FolioConfig::load_or_init(dir.path()).expect("reload");
        assert_eq!(
            second.sqlite_path(dir.path()).expect("path"),
            dir.path().join(DEFAULT_DB_NAME)
        );
        assert_eq!(second.recording_mode(), RecordingMode::Error);
    }

    #[test]
    fn malformed_config_is_a_validation_error() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ not json").expect("write");
        let err = FolioConfig::load_or_init(dir.path()).expect_err("parse");
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn remote_urls_pass_through() {
        let config = FolioConfig {
            database: DatabaseConfig::Postgres {
                url: "postgres://folio@localhost/folio".to_string(),
            },
            pool: None,
            recording_mode: Some(RecordingMode::Warn),
        };
        let url = config.connection_url(Path::new("/unused")).expect("url");
        assert_eq!(url, "postgres://folio@localhost/folio");
        assert!(config.sqlite_path(Path::new("/unused")).is_err());
    }
}
