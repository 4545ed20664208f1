//! Configuration module
//!
//! Reads the service configuration from a TOML file
//! (`~/.config/studio-booking/config.toml` by default). Every section and
//! field is optional; missing values fall back to the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::NewUser;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "STUDIO_BOOKING_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub admin: AdminSeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON collections
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub session_hours: i64,
    pub cookie_name: String,
    /// Add `Secure` to the session cookie (HTTPS deployments)
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            session_hours: 12,
            cookie_name: "studio_session".to_string(),
            cookie_secure: false,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Account created on first start when no admin exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSeedConfig {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Default for AdminSeedConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            name: "Administrator".to_string(),
            email: String::new(),
            phone: "-".to_string(),
        }
    }
}

impl AdminSeedConfig {
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            name: self.name.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            phone: self.phone.clone(),
            email: Some(self.email.clone()).filter(|e| !e.is_empty()),
            workplace: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Load `path`, writing the defaults there first when the file does not exist.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let cfg = Self::default();
            cfg.save(path)?;
            return Ok(cfg);
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// `$STUDIO_BOOKING_CONFIG`, else `<config dir>/studio-booking/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studio-booking")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9100

            [security]
            cookie_secure = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.security.cookie_secure);
        assert_eq!(cfg.security.cookie_name, "studio_session");
        assert_eq!(cfg.admin.username, "admin");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.logging.format = "json".into();
        cfg.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!(loaded.logging.is_json());
    }

    #[test]
    fn first_start_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = AppConfig::load_or_init(&path).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn admin_seed_becomes_valid_new_user() {
        let seed = AdminSeedConfig::default().to_new_user();
        assert!(seed.validate().is_ok());
        assert_eq!(seed.email, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppConfig::load(&dir.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
