//! `.pyexplain.toml` configuration

use super::logging::{parse_level, LogConfig, LogFormat, LogOutput};
use crate::analysis::variables::MAX_LENGTH;
use crate::errors::{ExplainError, Result};
use crate::session::Include;
use crate::source::cache::DEFAULT_CONTEXT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = ".pyexplain.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub variables: VariablesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default)]
    pub include: Include,

    #[serde(default = "default_formatter")]
    pub formatter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Lines shown before the line of an error
    #[serde(default = "default_context")]
    pub context: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariablesConfig {
    /// Longest value representation shown before it is shortened
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Log to daily files in this directory instead of stderr
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { lang: default_lang(), include: Include::default(), formatter: default_formatter() }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { context: default_context() }
    }
}

impl Default for VariablesConfig {
    fn default() -> Self {
        Self { max_length: default_max_length() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level(), format: LogFormat::default(), directory: None }
    }
}

fn default_lang() -> String {
    "en".to_string()
}
fn default_formatter() -> String {
    "repl".to_string()
}
fn default_context() -> usize {
    DEFAULT_CONTEXT
}
fn default_max_length() -> usize {
    MAX_LENGTH
}
fn default_level() -> String {
    "warn".to_string()
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        let mut config = LogConfig::new().with_format(self.format);
        if let Some(level) = parse_level(&self.level) {
            config = config.with_level(level);
        }
        if let Some(directory) = &self.directory {
            config = config.with_output(LogOutput::File { directory: directory.clone(), prefix: "pyexplain".to_string() });
        }
        config
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ExplainError::io(path, e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Path of the nearest `.pyexplain.toml`, from `start` upwards.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start.ancestors().map(|dir| dir.join(CONFIG_FILE)).find(|path| path.is_file())
    }

    /// Configuration found from the current directory upwards, or the
    /// defaults. A file that cannot be read or parsed is skipped.
    pub fn discover() -> Self {
        let Some(path) = std::env::current_dir().ok().and_then(|dir| Self::find(&dir)) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "configuration loaded");
                config
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring configuration");
                Self::default()
            }
        }
    }

    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_else(|_| String::from("# cannot generate configuration\n"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ExplainError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.session.lang, "en");
        assert_eq!(config.session.include, Include::Explain);
        assert_eq!(config.source.context, DEFAULT_CONTEXT);
        assert_eq!(config.variables.max_length, MAX_LENGTH);
    }

    #[test]
    fn test_parse_partial() {
        let config = Config::parse(
            r#"
[session]
lang = "fr"
include = "why"

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.session.lang, "fr");
        assert_eq!(config.session.include, Include::Why);
        assert_eq!(config.session.formatter, "repl");
        let log = config.logging.to_log_config();
        assert_eq!(log.level, tracing::Level::DEBUG);
        assert_eq!(log.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(Config::parse("[session]\ninclude = \"all\"\n"), Err(ExplainError::Toml(_))));
    }

    #[test]
    fn test_save_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let mut config = Config::default();
        config.variables.max_length = 40;
        config.save(&dir.path().join(CONFIG_FILE)).unwrap();

        let found = Config::find(&nested).unwrap();
        assert_eq!(Config::load(&found).unwrap(), config);
    }

    #[test]
    fn test_generated_default_parses() {
        assert_eq!(Config::parse(&Config::generate_default()).unwrap(), Config::default());
    }
}
