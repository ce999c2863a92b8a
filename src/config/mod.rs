//! Configuration management for `ticket_desk`.
//!
//! Precedence (lowest to highest):
//! 1. Built-in defaults
//! 2. User config (`~/.config/td/config.yaml`)
//! 3. Project config (`.tickets/config.yaml`)
//! 4. Environment variables (`TD_*`)
//! 5. Command-line flags
//!
//! YAML files are flattened to dotted keys (`mail: {mode: log}` becomes
//! `mail.mode`).

use crate::error::{DeskError, Result};
use crate::notify::{LogMailer, Mailer, OutboxMailer};
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the workspace directory.
pub const DESK_DIR_NAME: &str = ".tickets";
/// Environment variable that pins the workspace directory.
pub const DESK_DIR_ENV: &str = "TD_DIR";

const DEFAULT_DB_FILENAME: &str = "tickets.db";
const DEFAULT_OUTBOX_DIRNAME: &str = "outbox";
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAIL_FROM: &str = "ticket-desk@localhost";
const ENV_PREFIX: &str = "TD_";

/// Discover the active `.tickets` directory.
///
/// Honors `TD_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns `NotInitialized` if no directory is found, or an I/O error if the
/// CWD cannot be read.
pub fn discover_desk_dir(start: Option<&Path>) -> Result<PathBuf> {
    let env_override = env::var(DESK_DIR_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from);
    discover_desk_dir_with_env(start, env_override.as_deref())
}

fn discover_desk_dir_with_env(start: Option<&Path>, env_override: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(DESK_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !current.pop() {
            break;
        }
    }

    Err(DeskError::NotInitialized)
}

/// A flat layer of configuration keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        let mut layer = Self::default();
        flatten_yaml(&value, "", &mut layer.values);
        Ok(layer)
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `TD_*` pairs.
    ///
    /// `TD_MAIL_MODE` is visible as `mail_mode`, `mail.mode` and `mail-mode`.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if key == DESK_DIR_ENV {
                continue;
            }
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                for variant in env_key_variants(stripped) {
                    layer.values.insert(variant, value.clone());
                }
            }
        }
        layer
    }

    fn get(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|key| self.values.get(&normalize_key(key)).or_else(|| self.values.get(*key)))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub actor: Option<String>,
    pub lock_timeout: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        if let Some(path) = &self.db {
            layer
                .values
                .insert("db".to_string(), path.to_string_lossy().to_string());
        }
        if let Some(actor) = &self.actor {
            layer.values.insert("actor".to_string(), actor.clone());
        }
        if let Some(timeout) = self.lock_timeout {
            layer
                .values
                .insert("lock-timeout".to_string(), timeout.to_string());
        }
        layer
    }
}

/// Load project config (`.tickets/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(desk_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&desk_dir.join("config.yaml"))
}

/// Load user config (`~/.config/td/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home).join(".config").join("td").join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer
        .values
        .insert("mail.mode".to_string(), MailMode::Outbox.as_str().to_string());
    layer
        .values
        .insert("mail.from".to_string(), DEFAULT_MAIL_FROM.to_string());
    layer.values.insert(
        "lock-timeout".to_string(),
        DEFAULT_LOCK_TIMEOUT_MS.to_string(),
    );
    layer
}

/// Load configuration with the full precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(desk_dir: &Path, cli: &CliOverrides) -> Result<ConfigLayer> {
    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        load_user_config()?,
        load_project_config(desk_dir)?,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]))
}

/// How notification emails leave the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailMode {
    /// Spool JSON files into the outbox directory.
    Outbox,
    /// Only log.
    Log,
}

impl MailMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Outbox => "outbox",
            Self::Log => "log",
        }
    }
}

/// Typed view of the merged configuration.
#[derive(Debug, Clone, Serialize)]
pub struct DeskConfig {
    pub desk_dir: PathBuf,
    pub db_path: PathBuf,
    pub actor: Option<String>,
    pub lock_timeout_ms: u64,
    pub mail_mode: MailMode,
    pub outbox_dir: PathBuf,
    pub mail_from: String,
}

impl DeskConfig {
    /// Interpret a merged layer.
    ///
    /// Relative paths are resolved against `desk_dir`.
    ///
    /// # Errors
    ///
    /// Returns `Config` for an unknown mail mode or a non-numeric lock timeout.
    pub fn from_layer(desk_dir: &Path, layer: &ConfigLayer) -> Result<Self> {
        let resolve = |value: &str| {
            let path = PathBuf::from(value);
            if path.is_absolute() {
                path
            } else {
                desk_dir.join(path)
            }
        };

        let db_path = layer
            .get(&["db", "database"])
            .map_or_else(|| desk_dir.join(DEFAULT_DB_FILENAME), resolve);

        let lock_timeout_ms = match layer.get(&["lock-timeout", "lock_timeout"]) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                DeskError::Config(format!("lock-timeout must be milliseconds, got '{raw}'"))
            })?,
            None => DEFAULT_LOCK_TIMEOUT_MS,
        };

        let mail_mode = match layer.get(&["mail.mode", "mail-mode", "mail_mode"]) {
            None | Some("outbox") => MailMode::Outbox,
            Some("log") => MailMode::Log,
            Some(other) => {
                return Err(DeskError::Config(format!(
                    "mail.mode must be 'outbox' or 'log', got '{other}'"
                )));
            }
        };

        let outbox_dir = layer
            .get(&["mail.outbox", "mail-outbox", "mail_outbox"])
            .map_or_else(|| desk_dir.join(DEFAULT_OUTBOX_DIRNAME), resolve);

        let mail_from = layer
            .get(&["mail.from", "mail-from", "mail_from"])
            .unwrap_or(DEFAULT_MAIL_FROM)
            .to_string();

        Ok(Self {
            desk_dir: desk_dir.to_path_buf(),
            db_path,
            actor: layer.get(&["actor"]).map(str::to_string),
            lock_timeout_ms,
            mail_mode,
            outbox_dir,
            mail_from,
        })
    }

    /// Discover the desk directory and load its configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` outside a desk, or a config error.
    pub fn load(cli: &CliOverrides) -> Result<Self> {
        let desk_dir = discover_desk_dir(None)?;
        let layer = load_config(&desk_dir, cli)?;
        Self::from_layer(&desk_dir, &layer)
    }

    /// Open the configured database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseNotFound` if the file is missing, or a database error.
    pub fn open_storage(&self) -> Result<SqliteStorage> {
        if !self.db_path.exists() {
            return Err(DeskError::DatabaseNotFound {
                path: self.db_path.clone(),
            });
        }
        debug!(db = %self.db_path.display(), "Opening storage");
        SqliteStorage::open_with_timeout(&self.db_path, Some(self.lock_timeout_ms))
    }

    /// Build the configured mailer.
    #[must_use]
    pub fn mailer(&self) -> Box<dyn Mailer> {
        match self.mail_mode {
            MailMode::Outbox => Box::new(OutboxMailer::new(&self.outbox_dir, &self.mail_from)),
            MailMode::Log => Box::new(LogMailer),
        }
    }

    /// The actor email, or `NotSignedIn`.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` when no actor is configured.
    pub fn require_actor(&self) -> Result<&str> {
        self.actor.as_deref().ok_or_else(|| DeskError::NotSignedIn {
            reason: "no actor configured".to_string(),
        })
    }
}

/// Create a fresh `.tickets` directory under `root` with an empty database.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if a database exists and `force` is false,
/// or an I/O / database error.
pub fn init_desk_dir(root: &Path, force: bool) -> Result<PathBuf> {
    let desk_dir = root.join(DESK_DIR_NAME);
    let db_path = desk_dir.join(DEFAULT_DB_FILENAME);

    if db_path.exists() {
        if !force {
            return Err(DeskError::AlreadyInitialized { path: desk_dir });
        }
        fs::remove_file(&db_path)?;
    }

    fs::create_dir_all(desk_dir.join(DEFAULT_OUTBOX_DIRNAME))?;
    SqliteStorage::open(&db_path)?;

    let config_path = desk_dir.join("config.yaml");
    if !config_path.exists() {
        fs::write(
            &config_path,
            "# Ticket desk configuration\n\
             # actor: you@example.com\n\
             mail:\n  mode: outbox\n  from: ticket-desk@localhost\n",
        )?;
    }

    Ok(desk_dir)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn env_key_variants(raw: &str) -> Vec<String> {
    let lower = raw.to_lowercase();
    vec![lower.clone(), lower.replace('_', "."), lower.replace('_', "-")]
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
