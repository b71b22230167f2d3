//! Configuration loading and parsing for Cyclone
//!
//! Provides functionality to load and parse `cyclone.toml` configuration files.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::cycles::AnalysisOptions;
use crate::rules::Severity;

pub const CONFIG_FILENAME: &str = "cyclone.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["rules", "analysis"];
const KNOWN_RULES_KEYS: &[&str] = &["disabled", "severity", "security"];
const KNOWN_ANALYSIS_KEYS: &[&str] = &["parallel", "computed_properties"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub disabled: Vec<String>,
    pub severity: HashMap<String, SeverityValue>,
    pub security: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub parallel: Option<bool>,
    pub computed_properties: Option<bool>,
}

impl From<&AnalysisConfig> for AnalysisOptions {
    fn from(config: &AnalysisConfig) -> Self {
        let defaults = AnalysisOptions::default();
        AnalysisOptions {
            parallel: config.parallel.unwrap_or(defaults.parallel),
            computed_properties: config
                .computed_properties
                .unwrap_or(defaults.computed_properties),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityValue {
    Error,
    Warning,
    Info,
    Hint,
}

impl From<SeverityValue> for Severity {
    fn from(value: SeverityValue) -> Self {
        match value {
            SeverityValue::Error => Severity::Error,
            SeverityValue::Warning => Severity::Warning,
            SeverityValue::Info => Severity::Info,
            SeverityValue::Hint => Severity::Hint,
        }
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn read_config(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    Ok((config, content))
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    read_config(path).map(|(config, _)| config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let (config, content) = read_config(path)?;
    let warnings = detect_unknown_keys(&content);

    Ok(ConfigResult { config, warnings })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    for (section, known) in [("rules", KNOWN_RULES_KEYS), ("analysis", KNOWN_ANALYSIS_KEYS)] {
        if let Some(toml::Value::Table(entries)) = table.get(section) {
            for key in entries.keys() {
                if !known.contains(&key.as_str()) {
                    warnings.push(format!("Unknown config option in [{}]: '{}'", section, key));
                }
            }
        }
    }

    warnings
}

pub fn load_config_or_default(start_dir: &Path) -> Config {
    find_config_file(start_dir)
        .and_then(|path| load_config(&path).ok())
        .unwrap_or_default()
}

pub fn load_config_or_default_with_warnings(start_dir: &Path) -> ConfigResult {
    match find_config_file(start_dir) {
        Some(path) => match load_config_with_warnings(&path) {
            Ok(result) => result,
            Err(err) => ConfigResult {
                config: Config::default(),
                warnings: vec![err.to_string()],
            },
        },
        None => ConfigResult::default(),
    }
}
