use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Site configuration is already installed")]
    AlreadyInstalled,
}

/// Site-wide settings for one marginalia installation.
///
/// The site has exactly one owner; `admin_email` identifies them to whatever
/// front-door the deployment puts in front of the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub site_title: String,
    #[serde(default)]
    pub site_description: String,
    #[serde(default)]
    pub site_keywords: String,
    pub admin_email: String,
    pub posts_path: PathBuf,
}

/// Which parts of the configuration are filled in. Surfaces that gate on a
/// complete setup (the first-run screen) read this instead of poking at
/// individual fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigStatus {
    pub site_titled: bool,
    pub admin_configured: bool,
    pub posts_path_set: bool,
}

static GLOBAL: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the configured posts path
        config.posts_path = Self::expand_path(&config.posts_path).unwrap_or(config.posts_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/marginalia");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Installs this configuration as the process-wide one.
    ///
    /// Call once at startup; later reads go through [`Config::global`].
    /// There is deliberately no way to swap the configuration afterwards.
    pub fn install(self) -> Result<&'static Config, ConfigError> {
        GLOBAL.set(self).map_err(|_| ConfigError::AlreadyInstalled)?;
        Ok(GLOBAL.get().expect("just installed"))
    }

    /// The process-wide configuration, if one has been installed.
    pub fn global() -> Option<&'static Config> {
        GLOBAL.get()
    }

    pub fn status(&self) -> ConfigStatus {
        ConfigStatus {
            site_titled: !self.site_title.trim().is_empty(),
            admin_configured: !self.admin_email.trim().is_empty(),
            posts_path_set: !self.posts_path.as_os_str().is_empty(),
        }
    }

    /// Whether every required field is filled in.
    pub fn is_configured(&self) -> bool {
        let status = self.status();
        status.site_titled && status.admin_configured && status.posts_path_set
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
