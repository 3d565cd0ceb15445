//! File-type hints.
//!
//! Hosts pass whatever they know about the file: an extension with or
//! without the dot (`".py"`, `"py"`), a file name, or nothing at all.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The file types with their own delimiter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Fallback: only the common bracket pairs
    #[default]
    Common,
    Python,
    JavaScript,
    Java,
    Cpp,
    Php,
    Html,
    Xml,
}

impl FileType {
    /// Resolves a hint to a file type. Unknown or empty hints yield `Common`.
    pub fn from_hint(hint: &str) -> Self {
        match normalize_hint(hint).as_str() {
            "py" => FileType::Python,
            "js" => FileType::JavaScript,
            "java" => FileType::Java,
            "cpp" => FileType::Cpp,
            "php" => FileType::Php,
            "html" => FileType::Html,
            "xml" => FileType::Xml,
            _ => FileType::Common,
        }
    }

    /// Resolves a file path by its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_hint)
            .unwrap_or_default()
    }

    /// Returns true for markup languages, which use tag matching.
    pub fn is_markup(self) -> bool {
        matches!(self, FileType::Html | FileType::Xml)
    }

    /// Returns the canonical extension (with dot), empty for `Common`.
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Common => "",
            FileType::Python => ".py",
            FileType::JavaScript => ".js",
            FileType::Java => ".java",
            FileType::Cpp => ".cpp",
            FileType::Php => ".php",
            FileType::Html => ".html",
            FileType::Xml => ".xml",
        }
    }
}

/// Reduces a hint to a lowercase extension without the dot.
///
/// `".PY"`, `"py"` and `"src/main.py"` all become `"py"`.
pub fn normalize_hint(hint: &str) -> String {
    let hint = hint.trim();
    let ext = match hint.rfind('.') {
        Some(idx) => &hint[idx + 1..],
        None => hint,
    };
    ext.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_forms() {
        assert_eq!(FileType::from_hint(".py"), FileType::Python);
        assert_eq!(FileType::from_hint("py"), FileType::Python);
        assert_eq!(FileType::from_hint(".HTML"), FileType::Html);
        assert_eq!(FileType::from_hint("templates/index.html"), FileType::Html);
        assert_eq!(FileType::from_hint(""), FileType::Common);
        assert_eq!(FileType::from_hint(".rs"), FileType::Common);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(FileType::from_path("a/b/App.java"), FileType::Java);
        assert_eq!(FileType::from_path("Makefile"), FileType::Common);
    }

    #[test]
    fn test_markup() {
        assert!(FileType::Xml.is_markup());
        assert!(!FileType::Php.is_markup());
        assert_eq!(FileType::Cpp.extension(), ".cpp");
    }
}
