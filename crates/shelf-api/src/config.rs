use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use shelf_core::{BackendConfig, TableSchema};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "shelf.toml";

/// Path segments the router claims for itself
const RESERVED_RESOURCE_NAMES: &[&str] = &["health"];

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Environment {
    pub env_type: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self { env_type: "default".to_string() }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LimitsConfig {
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_body_size_mb: default_max_body_size_mb() }
    }
}

impl LimitsConfig {
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_size_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => bail!("Unknown log format '{other}'"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    Sqlite,
}

/// One externally addressable collection, mounted at `/{name}`
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ResourceConfig {
    pub name: String,
    #[serde(default)]
    pub backend: BackendKind,
    /// SQLite connection URL, e.g. `sqlite:///tmp/db.sqlite` or `sqlite::memory:`
    #[serde(default)]
    pub database_url: Option<String>,
    /// Built-in table schema: `profiles` or `authors`
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl ResourceConfig {
    pub fn memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: BackendKind::Memory,
            database_url: None,
            schema: None,
            max_connections: default_max_connections(),
        }
    }

    pub fn sqlite(
        name: impl Into<String>,
        database_url: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            backend: BackendKind::Sqlite,
            database_url: Some(database_url.into()),
            schema: Some(schema.into()),
            max_connections: default_max_connections(),
        }
    }

    pub fn backend_config(&self) -> anyhow::Result<BackendConfig> {
        match self.backend {
            BackendKind::Memory => Ok(BackendConfig::memory()),
            BackendKind::Sqlite => {
                let database_url = self.database_url.clone().with_context(|| {
                    format!("Resource '{}' uses sqlite but sets no database_url", self.name)
                })?;
                let schema_name = self.schema.as_deref().with_context(|| {
                    format!("Resource '{}' uses sqlite but sets no schema", self.name)
                })?;
                let schema = TableSchema::builtin(schema_name)?;
                Ok(BackendConfig::Sqlite {
                    database_url,
                    schema,
                    max_connections: self.max_connections,
                })
            }
        }
    }
}

/// Where a loaded configuration came from
///
/// Loading runs before the subscriber is installed, so the outcome is
/// returned and reported with [`ConfigSource::log`] once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// The file was missing; built-in defaults are in use
    Defaults { missing: PathBuf },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => {
                info!(path = %path.display(), "Loaded configuration file");
            }
            ConfigSource::Defaults { missing } => warn!(
                "Configuration file '{}' not found. Using default configuration.",
                missing.display()
            ),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ShelfConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_resources")]
    pub resources: Vec<ResourceConfig>,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            server: ServerConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
            resources: default_resources(),
        }
    }
}

impl ShelfConfig {
    /// Load from `SHELF_CONFIG_PATH` (or `shelf.toml`), falling back to the
    /// built-in defaults when the file does not exist.
    pub fn load() -> anyhow::Result<(Self, ConfigSource)> {
        let config_path =
            std::env::var("SHELF_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<(Self, ConfigSource)> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults { missing: path.to_path_buf() }));
        }

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file '{}'", path.display()))?;
        let config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file '{}'", path.display()))?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    pub fn from_toml(config_str: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_profile(mut self) -> anyhow::Result<Self> {
        if let Ok(host) = std::env::var("SHELF_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SHELF_PORT") {
            self.server.port =
                port.parse().with_context(|| format!("Invalid SHELF_PORT value '{port}'"))?;
        }
        if let Ok(format) = std::env::var("SHELF_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        Ok(self)
    }

    /// Resource names must be unique path segments and not shadow built-in routes.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.resources.is_empty() {
            bail!("At least one resource must be configured");
        }
        let mut seen = HashSet::new();
        for resource in &self.resources {
            let name = resource.name.as_str();
            let valid = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !valid {
                bail!("Invalid resource name '{name}'");
            }
            if RESERVED_RESOURCE_NAMES.contains(&name) {
                bail!("Resource name '{name}' is reserved");
            }
            if !seen.insert(name) {
                bail!("Duplicate resource '{name}'");
            }
            resource.backend_config()?;
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_max_body_size_mb() -> usize {
    16
}
fn default_max_connections() -> u32 {
    5
}

fn default_resources() -> Vec<ResourceConfig> {
    vec![
        ResourceConfig::memory("list"),
        ResourceConfig::sqlite("profiles", "sqlite::memory:", "profiles"),
        ResourceConfig::sqlite("authors", "sqlite::memory:", "authors"),
    ]
}
