use crate::rule::Rule;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("invalid rule file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<Rule>,
}

/// Parse a `[[rules]]` document.
pub fn rules_from_toml(content: &str) -> Result<Vec<Rule>, LoadError> {
    let file: RuleFile = toml::from_str(content)?;
    Ok(file.rules)
}

pub fn rules_from_file(path: &Path) -> Result<Vec<Rule>, LoadError> {
    let content = std::fs::read_to_string(path)?;
    rules_from_toml(&content)
}
