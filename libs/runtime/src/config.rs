use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main application configuration with strongly-typed global sections
/// and a flexible per-module configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Core server configuration.
    pub server: ServerConfig,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
    /// Directory containing per-module YAML files (optional).
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// Per-module configuration bag: module_name → arbitrary JSON/YAML value.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub home_dir: String, // will be normalized to absolute path
    pub host: String,
    pub port: u16,
    /// Per-request timeout in seconds; 0 disables the timeout layer.
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/api.log", empty = console only
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_size_mb: Option<u64>, // Max size of the file in MB
}

/// Port used when neither the config file nor `PORT` selects one.
pub const DEFAULT_PORT: u16 = 5000;

fn default_timeout_sec() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty => current working directory
            home_dir: String::new(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            timeout_sec: default_timeout_sec(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `SocketAddr` parsing.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
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
            server: ServerConfig::default(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading:
    /// defaults → YAML file (if given) → `APP__*` environment → `PORT`.
    /// Also normalizes `server.home_dir` into an absolute path.
    pub fn load_layered<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        // Start from a base where logging is None, so it stays None unless
        // explicitly provided by YAML/ENV.
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let mut figment = Figment::new().merge(Serialized::defaults(base));

        if let Some(path) = config_path.as_ref() {
            let path = path.as_ref();
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        let figment = figment
            // Example: APP__SERVER__HOST=127.0.0.1 maps to server.host
            .merge(Env::prefixed("APP__").split("__"))
            // Hosting platforms hand the listening port over as plain PORT.
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment (yaml/env)".to_string())?;

        normalize_home_dir_inplace(&mut config.server)
            .context("Failed to resolve server.home_dir")?;

        if let Some(dir) = config.modules_dir.clone() {
            merge_module_files(&mut config.modules, dir)?;
        }

        Ok(config)
    }

    /// Load configuration from the optional file, always honoring the
    /// environment layers.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        Self::load_layered(config_path)
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        // Set logging level based on verbose flags for "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            default_section.console_level = match args.verbose {
                0 => default_section.console_level.clone(), // keep
                1 => "debug".to_string(),
                _ => "trace".to_string(),
            };
        }
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

/// Read access to the per-module configuration bag.
pub trait ConfigProvider: Send + Sync {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

/// `ConfigProvider` backed by a loaded `AppConfig`.
pub struct AppConfigProvider(AppConfig);

impl AppConfigProvider {
    pub fn new(config: AppConfig) -> Self {
        Self(config)
    }
}

impl ConfigProvider for AppConfigProvider {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.modules.get(module_name)
    }
}

/// Deserialize a module's section from the bag, falling back to `T::default()`
/// when the module has no section at all.
pub fn module_config_or_default<T>(provider: &dyn ConfigProvider, module_name: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match provider.get_module_config(module_name) {
        Some(value) => serde_json::from_value(value.clone())
            .with_context(|| format!("invalid configuration for module '{module_name}'")),
        None => Ok(T::default()),
    }
}

/// Turn `server.home_dir` into an absolute path; empty means the working directory.
fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let resolved: PathBuf = if server.home_dir.trim().is_empty() {
        cwd
    } else {
        let p = PathBuf::from(server.home_dir.trim());
        if p.is_absolute() {
            p
        } else {
            cwd.join(p)
        }
    };

    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
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
        let raw = fs::read_to_string(&path)?;
        let val: serde_yaml::Value = serde_yaml::from_str(&raw)?;
        let json = serde_json::to_value(val)?;
        bag.insert(name, json);
    }
    Ok(())
}
