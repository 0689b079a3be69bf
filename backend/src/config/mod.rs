//! Central module for application-wide configuration settings.
//!
//! Settings are layered with figment: built-in defaults, then an optional
//! `profile.toml`, then `PROFILE_`-prefixed environment variables where `__`
//! separates sections (`PROFILE_FTP__HOST`, `PROFILE_LLM__API_KEY`, ...).

use std::path::{Path, PathBuf};
use std::time::Duration;

use adapters::{ConnectionConfig, Credential};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};

pub const CONFIG_FILE: &str = "profile.toml";
pub const ENV_PREFIX: &str = "PROFILE_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://profile.db?mode=rwc".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub root: PathBuf,
    pub public_base_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
            public_base_url: "http://127.0.0.1:3000/uploads".into(),
        }
    }
}

/// Remote file-transfer endpoint.
///
/// Read once at startup: [`AppConfig::ftp_connection`] is called when the
/// handler state is built and the resulting `ConnectionConfig` is passed to
/// every connect. Changes need a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Credential,
    pub connect_timeout_secs: u64,
    /// When set, transfer requests name local files relative to this
    /// directory. When unset any path the process can access is accepted.
    pub local_root: Option<PathBuf>,
}

impl Default for FtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 21,
            username: String::new(),
            password: Credential::default(),
            connect_timeout_secs: 30,
            local_root: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: Credential,
    pub base_url: String,
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: Credential::default(),
            base_url: adapters::llm::DEFAULT_BASE_URL.into(),
            model: adapters::llm::DEFAULT_MODEL.into(),
        }
    }
}

/// Fully resolved application configuration after all layers merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment name, used as the profile-picture key prefix.
    pub environment: String,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub ftp: FtpSettings,
    pub llm: LlmSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            storage: StorageSettings::default(),
            ftp: FtpSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads defaults < `profile.toml` < environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config: AppConfig = Self::figment(path)
            .extract()
            .map_err(|err| AppError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.environment.trim().is_empty() {
            return Err(AppError::Config("environment must not be empty".into()));
        }
        if self.server.bind.trim().is_empty() {
            return Err(AppError::Config("server.bind must not be empty".into()));
        }
        if self.ftp.connect_timeout_secs == 0 {
            return Err(AppError::Config("ftp.connect_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Builds the FTP connection parameters shared by all sessions. FTP
    /// settings are optional at startup, so completeness is checked on connect.
    pub fn ftp_connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.ftp.host.clone(),
            port: self.ftp.port,
            username: self.ftp.username.clone(),
            credential: self.ftp.password.clone(),
        }
    }

    pub fn ftp_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.ftp.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ftp.port, 21);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
    }

    #[test]
    fn environment_overrides_file_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "profile.toml",
                r#"
                    environment = "staging"

                    [ftp]
                    host = "ftp.internal"
                    username = "file-user"
                "#,
            )?;
            jail.set_env("PROFILE_FTP__HOST", "ftp.example.com");
            jail.set_env("PROFILE_FTP__PASSWORD", "p");

            let config = AppConfig::load_from(Path::new("profile.toml")).expect("config loads");
            assert_eq!(config.environment, "staging");

            let connection = config.ftp_connection();
            assert_eq!(connection.host, "ftp.example.com");
            assert_eq!(connection.port, 21);
            assert_eq!(connection.username, "file-user");
            assert_eq!(connection.credential.expose(), "p");
            assert!(connection.validate().is_ok());
            assert_eq!(config.ftp.local_root, None);
            Ok(())
        });
    }

    #[test]
    fn zero_timeout_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("PROFILE_FTP__CONNECT_TIMEOUT_SECS", "0");
            assert!(AppConfig::load_from(Path::new("missing.toml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn local_root_is_read_from_the_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("PROFILE_FTP__LOCAL_ROOT", "/srv/transfers");
            let config = AppConfig::load_from(Path::new("missing.toml")).expect("config loads");
            assert_eq!(config.ftp.local_root, Some(PathBuf::from("/srv/transfers")));
            Ok(())
        });
    }
}
