//! Matchlight configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[derive(Serialize, Deserialize)]` generates the TOML mapping for every
//! section. `#[serde(default)]` fills missing fields from `Default`, so a
//! config file only has to name what it changes:
//!
//! ```toml
//! [ui]
//! theme = "light"
//!
//! [languages.erb]
//! pairs = [["<%", "%>"]]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use matchlight_syntax::{DelimiterPair, Matcher, SyntaxError, TagStrategy, Theme};

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing and highlighting behaviour
    pub editor: EditorConfig,

    /// Appearance
    pub ui: UiConfig,

    /// Find-in-files settings
    pub search: SearchConfig,

    /// Per-extension settings, keyed by extension without the dot
    pub languages: HashMap<String, LanguageConfig>,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "using default configuration");
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded configuration");
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("matchlight").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns config for an extension (`"erb"`, `".erb"` and `"view.erb"`
    /// all resolve to the same entry).
    pub fn language(&self, extension: &str) -> LanguageConfig {
        let key = matchlight_syntax::file_type::normalize_hint(extension);
        self.languages.get(&key).cloned().unwrap_or_default()
    }

    /// Builds a matcher with the configured tag strategy and extra pairs.
    pub fn matcher(&self) -> Result<Matcher, ConfigError> {
        let mut matcher = Matcher::new().with_tag_strategy(self.editor.tag_strategy);
        for (extension, language) in &self.languages {
            let pairs = language
                .pairs
                .iter()
                .map(|(open, close)| DelimiterPair::new(open.as_str(), close.as_str()))
                .collect::<Result<Vec<_>, _>>()?;
            if !pairs.is_empty() {
                matcher = matcher.with_extra_pairs(extension, pairs);
            }
        }
        Ok(matcher)
    }
}

/// Editing and highlighting behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Indent width added after a block opener
    pub tab_size: usize,

    /// Copy indentation on newline
    pub auto_indent: bool,

    /// Highlight the cursor line
    pub highlight_current_line: bool,

    /// Highlight the delimiter pair at the cursor
    pub match_delimiters: bool,

    /// Colour keywords, strings, comments and friends (dark theme only)
    pub syntax_highlighting: bool,

    /// How markup tag counterparts are searched
    pub tag_strategy: TagStrategy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            auto_indent: true,
            highlight_current_line: true,
            match_delimiters: true,
            syntax_highlighting: true,
            tag_strategy: TagStrategy::Nested,
        }
    }
}

/// UI appearance configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Colour theme
    pub theme: Theme,
}

/// Find-in-files configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Extensions searched, without the dot
    pub extensions: Vec<String>,

    /// Skip files and directories starting with `.`
    pub skip_hidden: bool,

    /// Directory names never descended into
    pub ignored_dirs: Vec<String>,

    /// Maximum directory depth below each root
    pub max_depth: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        };
        Self {
            extensions: strings(&["py", "txt", "md", "json", "xml", "html", "css", "js"]),
            skip_hidden: true,
            ignored_dirs: strings(&["node_modules", "target", "__pycache__"]),
            max_depth: 32,
        }
    }
}

impl SearchConfig {
    /// Returns true if files with this extension are searched.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

/// Language-specific configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Extra `(open, close)` delimiter pairs
    pub pairs: Vec<(String, String)>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid delimiter pair: {0}")]
    Delimiter(#[from] SyntaxError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchlight_buffer::TextBuffer;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.tab_size, 4);
        assert!(config.editor.auto_indent);
        assert!(config.editor.syntax_highlighting);
        assert_eq!(config.editor.tag_strategy, TagStrategy::Nested);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.search.max_depth, 32);
        assert!(config.search.accepts_extension(".py"));
        assert!(!config.search.accepts_extension("rs"));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.languages.insert(
            "erb".to_string(),
            LanguageConfig {
                pairs: vec![("<%".to_string(), "%>".to_string())],
            },
        );
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [ui]
            theme = "light"

            [editor]
            tag_strategy = "nearest"

            [languages.erb]
            pairs = [["<%", "%>"]]
            "#,
        )
        .unwrap();

        assert_eq!(config.ui.theme, Theme::Light);
        assert_eq!(config.editor.tag_strategy, TagStrategy::Nearest);
        assert!(config.editor.match_delimiters);
        assert_eq!(config.search, SearchConfig::default());
        assert_eq!(config.language(".erb").pairs.len(), 1);
        assert!(config.language("py").pairs.is_empty());
    }

    #[test]
    fn test_matcher_uses_configured_pairs() {
        let config: Config = toml::from_str("[languages.erb]\npairs = [[\"<%\", \"%>\"]]").unwrap();
        let matcher = config.matcher().unwrap();
        let buffer = TextBuffer::from("<% x %>");
        let result = matcher.find_match(&buffer, 0, "index.erb").unwrap();
        assert!(result.is_match());
    }

    #[test]
    fn test_markup_pairs_are_not_applied() {
        let config: Config =
            toml::from_str("[languages.html]\npairs = [[\"{{\", \"}}\"]]").unwrap();
        let matcher = config.matcher().unwrap();
        assert_eq!(
            matcher.table_for(".html"),
            matchlight_syntax::resolve(".html")
        );
    }

    #[test]
    fn test_matcher_rejects_empty_tokens() {
        let config: Config = toml::from_str("[languages.erb]\npairs = [[\"\", \"%>\"]]").unwrap();
        assert!(matches!(config.matcher(), Err(ConfigError::Delimiter(_))));
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.editor.tab_size = 2;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.editor.tab_size, 2);
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor\ntab_size = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
