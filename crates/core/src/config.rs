use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Default number of memos requested per page
pub const DEFAULT_MEMO_LIMIT: usize = 20;

/// How checkbox ids for task items are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TodoIdMode {
    /// Fresh random id per task item (default)
    #[default]
    Random,
    /// Derived from the content and item index; identical across renders
    Stable,
}

impl TodoIdMode {
    pub const VALUES: &[TodoIdMode] = &[TodoIdMode::Random, TodoIdMode::Stable];

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoIdMode::Random => "random",
            TodoIdMode::Stable => "stable",
        }
    }
}

impl std::fmt::Display for TodoIdMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TodoIdMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(TodoIdMode::Random),
            "stable" => Ok(TodoIdMode::Stable),
            _ => Err(crate::Error::Config(ConfigError::InvalidTodoIdMode(s.to_string()).to_string())),
        }
    }
}

/// Markdown renderer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Fenced code language handed to the diagram engine
    pub diagram_language: String,

    /// Checkbox id generation for task items
    pub todo_ids: TodoIdMode,

    /// Attributes allowed through the sanitizer on top of the built-in allowlist
    pub extra_allowed_attributes: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { diagram_language: default_diagram_language(), todo_ids: TodoIdMode::default(), extra_allowed_attributes: Vec::new() }
    }
}

fn default_diagram_language() -> String {
    "mermaid".to_string()
}

/// Memo feed (pagination) configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Memos requested per page; a shorter page ends the feed
    pub page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { page_size: DEFAULT_MEMO_LIMIT }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level directive for stderr output
    pub level: String,
    /// `pretty`, `json` or `compact`
    pub format: String,
    /// `[logging.file]`
    pub file: FileLoggingConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: "pretty".to_string(), file: FileLoggingConfig::default() }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: "debug".to_string() }
    }
}

/// Root configuration structure for memos.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub render: RenderConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "config not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        use crate::Error;

        if self.render.diagram_language.trim().is_empty() {
            return Err(Error::Config(ConfigError::EmptyValue("render.diagram_language".to_string()).to_string()));
        }

        if self.feed.page_size == 0 {
            return Err(Error::Config(ConfigError::InvalidPageSize(self.feed.page_size).to_string()));
        }

        if crate::logging::LogFormat::parse_str(&self.logging.format).is_none() {
            return Err(Error::Config(ConfigError::InvalidLogFormat(self.logging.format.clone()).to_string()));
        }

        for attribute in &self.render.extra_allowed_attributes {
            if attribute.trim().is_empty() || attribute.to_lowercase().starts_with("on") {
                return Err(Error::Config(ConfigError::UnsafeAttribute(attribute.clone()).to_string()));
            }
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# memos configuration example
# Copy this file to memos.toml and customize as needed

[render]
# Fenced code language rendered by the diagram engine
diagram_language = "mermaid"
# Checkbox ids for task items: "random" or "stable"
todo_ids = "random"
# Extra attributes allowed through the HTML sanitizer (event handlers are refused)
extra_allowed_attributes = []

[feed]
# Memos requested per page; a shorter page means there is nothing more to fetch
page_size = 20

[logging]
# Level directive for stderr (MEMOS_LOG / RUST_LOG take precedence)
level = "warn"
# "pretty", "json" or "compact"
format = "pretty"

[logging.file]
# Daily rolling JSON log under ~/.memos/logs (or MEMOS_LOG_DIR)
enabled = false
level = "debug"
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid todo id mode
    #[error("invalid todo id mode: {0}")]
    InvalidTodoIdMode(String),

    /// Page size must be positive
    #[error("invalid page size: {0} (must be at least 1)")]
    InvalidPageSize(usize),

    /// Unknown log format
    #[error("invalid log format: {0}")]
    InvalidLogFormat(String),

    /// Required value is empty
    #[error("value must not be empty: {0}")]
    EmptyValue(String),

    /// Attribute that cannot be allowlisted
    #[error("attribute cannot be allowed through the sanitizer: {0}")]
    UnsafeAttribute(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
