use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ruleware.toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid ruleware.json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RulewareConfig {
    /// Directory scanned for `*.toml` rule files at startup.
    #[serde(default = "default_rules_dir")]
    pub rules_dir: String,
    #[serde(default)]
    pub middleware: MiddlewareConfig,
    /// Explicit route-pattern to name mapping, e.g.
    /// `"/docs/{product}" = "docs.show"`.
    #[serde(default)]
    pub routes: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MiddlewareConfig {
    /// Set to false to disable middleware installation entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Middleware groups to attach to.
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,
}

fn default_rules_dir() -> String {
    "rules".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_groups() -> Vec<String> {
    vec!["web".to_string()]
}

impl Default for RulewareConfig {
    fn default() -> Self {
        RulewareConfig {
            rules_dir: default_rules_dir(),
            middleware: MiddlewareConfig::default(),
            routes: HashMap::new(),
        }
    }
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        MiddlewareConfig {
            enabled: default_enabled(),
            groups: default_groups(),
        }
    }
}

impl RulewareConfig {
    /// Read `ruleware.toml`, falling back to `ruleware.json`, then to
    /// defaults when neither exists.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let toml_path = dir.join("ruleware.toml");
        if toml_path.exists() {
            let content = std::fs::read_to_string(&toml_path)?;
            return Ok(toml::from_str(&content)?);
        }

        let json_path = dir.join("ruleware.json");
        if json_path.exists() {
            let content = std::fs::read_to_string(&json_path)?;
            return Ok(serde_json::from_str(&content)?);
        }

        Ok(RulewareConfig::default())
    }

    pub fn group_enabled(&self, group: &str) -> bool {
        self.middleware.enabled && self.middleware.groups.iter().any(|g| g == group)
    }

    pub fn route_name(&self, pattern: &str) -> Option<&str> {
        self.routes.get(pattern).map(String::as_str)
    }
}
