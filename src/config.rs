//! YAML configuration for the bot.
//!
//! The file is located by, in order: an explicit path (`--config`), the `MINECORD_CONFIG`
//! environment variable, then `$PWD/minecord.yaml`, `$HOME/.config/minecord.yaml` and
//! `/etc/minecord.yaml`. Values are read leniently: bad optional values fall back to their
//! defaults with a warning rather than aborting startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "minecord.yaml";
pub const CONFIG_ENV: &str = "MINECORD_CONFIG";
pub const DEFAULT_ADMINS_FILE: &str = "admins.yaml";
pub const DEFAULT_RCON_HOST: &str = "localhost";
pub const DEFAULT_RCON_PORT: u16 = 25575;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),
    #[error("no configuration file found. Searched in:\n{}", format_searched(.0))]
    NoneFound(Vec<PathBuf>),
    #[error("failed to read configuration file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid YAML in configuration file {path}: {source}")]
    Yaml { path: PathBuf, source: serde_yaml::Error },
    #[error("configuration file {0} must contain a YAML mapping")]
    NotAMapping(PathBuf),
}

fn format_searched(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| format!("  - {}", p.display())).collect::<Vec<_>>().join("\n")
}

#[derive(Debug, Clone)]
pub struct Config {
    source: PathBuf,
    data: Mapping,
}

/// Default search locations, most specific first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(".config").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from("/etc").join(CONFIG_FILE_NAME));
    paths
}

impl Config {
    /// Resolve and load the configuration. `explicit` wins over `MINECORD_CONFIG`, which wins
    /// over the default search locations.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                Self::load(&path)
            }
            None => {
                let searched = default_config_paths();
                match searched.iter().find(|p| p.exists()) {
                    Some(path) => Self::load(path),
                    None => Err(ConfigError::NoneFound(searched)),
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(target: "minecord::config", "Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_yaml_str(&text, path)
    }

    pub fn from_yaml_str(text: &str, source: &Path) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(text)
            .map_err(|source_err| ConfigError::Yaml { path: source.to_path_buf(), source: source_err })?;
        match value {
            Value::Mapping(data) => Ok(Self { source: source.to_path_buf(), data }),
            _ => Err(ConfigError::NotAMapping(source.to_path_buf())),
        }
    }

    pub fn source(&self) -> &Path { &self.source }

    fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => {
                warn!(target: "minecord::config", "Warning: {} ({:?}) is not a scalar value. Ignoring.", key, other);
                None
            }
        }
    }

    /// Path of the admin role store. Relative defaults are resolved against the working
    /// directory here, so the store itself never has to guess a location.
    pub fn admins_yaml(&self) -> PathBuf {
        match self.get_string("admins_yaml").filter(|s| !s.trim().is_empty()) {
            Some(p) => PathBuf::from(p),
            None => std::env::current_dir()
                .map(|cwd| cwd.join(DEFAULT_ADMINS_FILE))
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ADMINS_FILE)),
        }
    }

    pub fn rcon_host(&self) -> String {
        self.get_string("rcon_host").unwrap_or_else(|| DEFAULT_RCON_HOST.to_string())
    }

    pub fn rcon_port(&self) -> u16 {
        let Some(raw) = self.get("rcon_port") else { return DEFAULT_RCON_PORT };
        let parsed = match raw {
            Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
            Value::String(s) => s.trim().parse::<u16>().ok(),
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            warn!(
                target: "minecord::config",
                "Warning: rcon_port ({:?}) is not a valid port. Using default {}.", raw, DEFAULT_RCON_PORT
            );
            DEFAULT_RCON_PORT
        })
    }

    pub fn rcon_password(&self) -> Option<String> {
        self.get_string("rcon_password")
    }

    pub fn console_user_id(&self) -> Option<String> {
        self.get_string("console_user_id")
    }

    pub fn console_display_name(&self) -> Option<String> {
        self.get_string("console_display_name")
    }

    /// Optional identity → display name map used to resolve mention targets.
    pub fn members(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        let Some(Value::Mapping(m)) = self.get("members") else { return out };
        for (k, v) in m {
            let key = match k {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if let Value::String(name) = v {
                out.insert(key, name.clone());
            }
        }
        out
    }
}

/// Commented sample configuration printed by `--print-sample-config`.
pub fn sample_config() -> &'static str {
    r#"# Minecord Configuration File
# This file contains all configuration for the Minecord bot

# Authorization / User mapping
# The file maps a caller id to { display-name, role } where role is root or delegate.
# Root entries must be added by hand; the make-admin command only creates delegates.
admins_yaml: "/path/to/admins.yaml"

# Minecraft RCON Configuration
rcon_host: "localhost"      # Minecraft server hostname
rcon_port: 25575            # RCON port (default: 25575)
rcon_password: "your_rcon_password_here"  # RCON password

# Console front end
console_user_id: "123456789012345678"  # Optional: caller id used for console commands
console_display_name: "operator"       # Optional: caller display name
members:                               # Optional: id -> display name for make-admin targets
  "234567890123456789": "Steve"
"#
}
