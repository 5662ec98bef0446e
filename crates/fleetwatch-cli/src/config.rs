//! CLI configuration

use std::collections::HashSet;
use std::path::PathBuf;

use fleetwatch_clients::DEFAULT_METRICS_URL;
use fleetwatch_health::CheckKind;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Fleetwatch configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transport settings shared by every client
    pub http: HttpConfig,

    /// Metrics service credentials
    pub metrics: MetricsConfig,

    /// Inventory scopes to evaluate
    pub scopes: Vec<ScopeConfig>,
}

/// Transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: 10 }
    }
}

/// Metrics service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_METRICS_URL.to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// One inventory scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Display name, unique across scopes
    pub name: String,

    /// Inventory instance URL
    pub instance_url: String,

    /// Space id; empty for the default space
    #[serde(default)]
    pub space: String,

    /// Inventory API key
    pub api_key: String,

    /// Project names gating which tenants are reported
    pub projects: Vec<String>,

    /// Checks to run; all when omitted
    #[serde(default)]
    pub checks: Option<Vec<CheckKind>>,
}

impl ScopeConfig {
    pub fn checks(&self) -> Vec<CheckKind> {
        self.checks
            .clone()
            .unwrap_or_else(|| CheckKind::ALL.to_vec())
    }
}

impl Config {
    /// Load configuration from file. A missing file yields the default.
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&contents)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn from_toml(contents: &str) -> CliResult<Self> {
        toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("fleetwatch").join("config.toml"))
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.scopes.is_empty() {
            return Err(CliError::Config("no scopes configured".into()));
        }
        if self.metrics.base_url.trim().is_empty() {
            return Err(CliError::Config("metrics.base_url is empty".into()));
        }

        let mut names = HashSet::new();
        for scope in &self.scopes {
            if scope.name.trim().is_empty() {
                return Err(CliError::Config("scope name is empty".into()));
            }
            if !names.insert(scope.name.as_str()) {
                return Err(CliError::Config(format!("duplicate scope '{}'", scope.name)));
            }
            if scope.instance_url.trim().is_empty() {
                return Err(CliError::Config(format!(
                    "scope '{}' has no instance_url",
                    scope.name
                )));
            }
            if scope.projects.is_empty() {
                return Err(CliError::Config(format!(
                    "scope '{}' has no projects",
                    scope.name
                )));
            }
        }

        Ok(())
    }

    /// Scopes to evaluate: all of them, or only the named ones in
    /// configuration order.
    pub fn select_scopes(&self, names: &[String]) -> CliResult<Vec<&ScopeConfig>> {
        if let Some(unknown) = names
            .iter()
            .find(|n| !self.scopes.iter().any(|s| &s.name == *n))
        {
            return Err(CliError::Config(format!("unknown scope '{}'", unknown)));
        }

        Ok(self
            .scopes
            .iter()
            .filter(|s| names.is_empty() || names.contains(&s.name))
            .collect())
    }
}
