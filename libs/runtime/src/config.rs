use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::home_dir::resolve_home_dir;

/// Home directory name under the platform base when `server.home_dir` is empty.
pub const DEFAULT_HOME_SUBDIR: &str = ".users-server";

/// Prefix for environment overrides: `APP__SERVER__PORT=9000` sets `server.port`.
const ENV_PREFIX: &str = "APP__";

/// Users server configuration.
///
/// `modules` holds one raw section per module (`modules.users_info`,
/// `modules.api_ingress`); modules read their own typed view through
/// [`AppConfig::module_config`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    pub logging: Option<LoggingConfig>,
    /// Extra `<module>.yaml` files, each merged in as `modules.<module>`.
    #[serde(default)]
    pub modules_dir: Option<PathBuf>,
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Absolute after loading; log files and relative SQLite paths live here.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite DSN, e.g. `sqlite://database/users.db`.
    pub url: String,
    #[serde(default)]
    pub max_conns: Option<u32>,
    #[serde(default)]
    pub busy_timeout_ms: Option<u32>,
}

/// Subsystem name → logging settings; `default` catches everything else.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String,
    /// Empty disables the file sink.
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

pub fn default_logging_config() -> LoggingConfig {
    LoggingConfig::from([(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/users-server.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    )])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: Some(DatabaseConfig {
                url: "sqlite://database/users.db".to_string(),
                max_conns: None,
                busy_timeout_ms: None,
            }),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

/// Overrides taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    /// 1 → debug, 2+ → trace on the default console sink.
    pub verbose: u8,
}

impl AppConfig {
    /// Built-in defaults when no file is given, otherwise the file layered
    /// over bare server defaults and `APP__` environment variables.
    /// `server.home_dir` comes back absolute and existing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.resolve_home_dir()?;
        if let Some(dir) = config.modules_dir.clone() {
            config.merge_module_dir(&dir)?;
        }
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        // Figment skips missing files without complaint.
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }

        // Sections absent from the file stay `None`.
        let bare = AppConfig {
            database: None,
            logging: None,
            ..Self::default()
        };

        Figment::new()
            .merge(Serialized::defaults(bare))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn resolve_home_dir(&mut self) -> Result<()> {
        let configured = Some(self.server.home_dir.clone()).filter(|h| !h.trim().is_empty());
        let resolved = resolve_home_dir(configured, DEFAULT_HOME_SUBDIR, true)
            .context("Failed to resolve server.home_dir")?;
        self.server.home_dir = resolved.to_string_lossy().into_owned();
        Ok(())
    }

    /// Each `<name>.yaml`/`<name>.yml` in `dir` replaces `modules.<name>`.
    /// A missing directory is not an error.
    fn merge_module_dir(&mut self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Ok(());
        }
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read modules_dir {}", dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_yaml || !path.is_file() {
                continue;
            }

            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let section: serde_json::Value = serde_yaml::from_str(&raw)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?;
            self.modules.insert(name.to_string(), section);
        }
        Ok(())
    }

    /// Typed view of `modules.<module_name>`; `T::default()` when absent.
    pub fn module_config<T>(&self, module_name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(module_name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("Invalid config for module '{}'", module_name)),
            None => Ok(T::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        let level = match overrides.verbose {
            0 => return,
            1 => "debug",
            _ => "trace",
        };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            default_section.console_level = level.to_string();
        }
    }
}
