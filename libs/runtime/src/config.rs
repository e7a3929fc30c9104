use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application configuration: logging plus a flexible per-module
/// configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base directory for relative paths such as log files.
    /// Empty means the current working directory; a leading `~` expands to `$HOME`.
    #[serde(default)]
    pub home_dir: String,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
    /// Directory containing per-module YAML files (optional).
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// Per-module configuration bag: module_name → arbitrary JSON/YAML value.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/users.log", empty disables the file sink
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "warn".to_string(),
            file: String::new(),
            file_level: "debug".to_string(),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let config_path = config_path.as_ref();
        if !config_path.is_file() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        }

        // Optional sections stay None unless YAML/ENV provide them.
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path))
            // Example: APP__MODULES__USERS_STORE__FETCH_LIMIT=50
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())?;

        if let Some(dir) = config.modules_dir.clone() {
            merge_module_files(&mut config.modules, dir)?;
        }

        Ok(config)
    }

    /// Load configuration from file or fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let logging = self.logging.get_or_insert_with(default_logging_config);
        let default_section = logging.entry("default".to_string()).or_insert_with(|| Section {
            console_level: "warn".to_string(),
            file: String::new(),
            file_level: String::new(),
            max_size_mb: None,
        });
        default_section.console_level = match args.verbose {
            0 => default_section.console_level.clone(), // keep
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        };
    }

    /// Resolved base directory for relative paths.
    pub fn base_dir(&self) -> Result<PathBuf> {
        resolve_home_dir(&self.home_dir)
    }

    /// Lenient: deserialize a module's config into `T`, falling back to `T::default()`
    /// when the section is missing.
    pub fn module_config<T: DeserializeOwned + Default>(&self, module_name: &str) -> Result<T> {
        match self.modules.get(module_name) {
            Some(val) => serde_json::from_value::<T>(val.clone())
                .with_context(|| format!("invalid {module_name} config")),
            None => Ok(T::default()),
        }
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

fn resolve_home_dir(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return std::env::current_dir().context("Failed to read current directory");
    }
    if let Some(rest) = raw.strip_prefix('~') {
        let home = std::env::var_os("HOME").context("HOME is not set; cannot expand '~'")?;
        let rest = rest.trim_start_matches(['/', '\\']);
        return Ok(PathBuf::from(home).join(rest));
    }
    Ok(PathBuf::from(raw))
}

fn merge_module_files(
    bag: &mut HashMap<String, serde_json::Value>,
    dir: impl AsRef<Path>,
) -> Result<()> {
    use std::fs;
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if ext != "yml" && ext != "yaml" {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read module config {}", path.display()))?;
        let val: serde_yaml::Value = serde_yaml::from_str(&raw)?;
        let json = serde_json::to_value(val)?;
        bag.insert(name, json);
    }
    Ok(())
}
