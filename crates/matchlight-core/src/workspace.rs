//! Find-in-files over directory trees.
//!
//! Results are rendered as `path:line: content`, one per matching line, and
//! can be parsed back into a location with [`FileMatch::parse`].

use std::path::{Path, PathBuf};

use matchlight_buffer::Searcher;
use regex::Regex;

use crate::config::SearchConfig;
use crate::{CoreError, CoreResult};

/// One matching line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// Line content with surrounding whitespace trimmed
    pub line: String,
}

impl FileMatch {
    /// Parses a `path:line: content` result line.
    ///
    /// The path ends at the first `:<digits>:`, so drive letters and colons
    /// inside file names survive.
    pub fn parse(result_line: &str) -> CoreResult<Self> {
        let pattern = Regex::new(r"^(.+?):(\d+): ?(.*)$")?;
        let invalid = || CoreError::InvalidResultLine(result_line.to_string());

        let caps = pattern.captures(result_line).ok_or_else(invalid)?;
        let line_number: usize = caps[2].parse().map_err(|_| invalid())?;
        if line_number == 0 {
            return Err(invalid());
        }

        Ok(Self {
            path: PathBuf::from(&caps[1]),
            line_number,
            line: caps[3].to_string(),
        })
    }
}

impl std::fmt::Display for FileMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.line_number, self.line)
    }
}

/// A set of search roots.
#[derive(Debug, Clone)]
pub struct Workspace {
    roots: Vec<PathBuf>,
    config: SearchConfig,
}

impl Workspace {
    /// Opens a workspace over one or more directories.
    pub fn open(
        roots: impl IntoIterator<Item = impl AsRef<Path>>,
        config: SearchConfig,
    ) -> CoreResult<Self> {
        let mut dirs = Vec::new();
        for root in roots {
            let root = root.as_ref();
            if !root.is_dir() {
                return Err(CoreError::FileNotFound(root.display().to_string()));
            }
            dirs.push(root.to_path_buf());
        }
        Ok(Self {
            roots: dirs,
            config,
        })
    }

    /// Returns the search roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Lists searchable files, sorted per directory.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for root in &self.roots {
            self.collect_files(root, 0, &mut files);
        }
        files
    }

    fn collect_files(&self, dir: &Path, depth: usize, files: &mut Vec<PathBuf>) {
        if depth > self.config.max_depth {
            return;
        }
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(dir = %dir.display(), %err, "skipping unreadable directory");
                return;
            }
        };

        let mut entries: Vec<_> = entries.flatten().collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            if self.config.skip_hidden && name.starts_with('.') {
                continue;
            }

            if path.is_dir() {
                if self.config.ignored_dirs.iter().any(|d| *d == name) {
                    continue;
                }
                self.collect_files(&path, depth + 1, files);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| self.config.accepts_extension(e))
            {
                files.push(path);
            }
        }
    }

    /// Returns every line matching `searcher` in the workspace files.
    ///
    /// Files that are not valid UTF-8 or cannot be read are skipped.
    pub fn find_in_files(&self, searcher: &Searcher) -> Vec<FileMatch> {
        let mut results = Vec::new();
        for path in self.files() {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    tracing::debug!(path = %path.display(), %err, "skipping file");
                    continue;
                }
            };

            for (idx, line) in content.lines().enumerate() {
                if searcher.is_match(line) {
                    results.push(FileMatch {
                        path: path.clone(),
                        line_number: idx + 1,
                        line: line.trim().to_string(),
                    });
                }
            }
        }
        tracing::info!(matches = results.len(), "find in files finished");
        results
    }
}
