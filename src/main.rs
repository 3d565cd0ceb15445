//! # Matchlight
//!
//! Delimiter matching and editor text tools from the command line.
//!
//! ## Quick Start
//!
//! ```bash
//! # Which bracket pairs with the one at offset 3?
//! cargo run -- match src/app.py --offset 3
//!
//! # Same, by 1-based line and column, as JSON
//! cargo run -- match index.html --line 4 --column 7 --json
//!
//! # Search a project
//! cargo run -- grep TODO src docs --ext py --ext md
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchlight_buffer::{Direction, Position, SearchOptions, Searcher, TextBuffer};
use matchlight_core::{Config, Document, FileMatch, Workspace};
use matchlight_syntax::{Span, Theme};

/// Matchlight - bracket and tag matching for code editors
#[derive(Parser, Debug)]
#[command(name = "matchlight")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the delimiter touching a cursor and its partner
    Match {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Cursor as a character offset
        #[arg(long, conflicts_with_all = ["line", "column"], required_unless_present = "line")]
        offset: Option<usize>,

        /// Cursor line (1-based)
        #[arg(long, requires = "column")]
        line: Option<NonZeroUsize>,

        /// Cursor column (1-based)
        #[arg(long, requires = "line")]
        column: Option<NonZeroUsize>,

        /// Highlight theme (dark or light)
        #[arg(long)]
        theme: Option<Theme>,

        /// File-type hint overriding the file's extension
        #[arg(long, value_name = "EXT")]
        hint: Option<String>,

        /// Print the result and highlight spans as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find the next occurrence of a pattern
    Find {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        pattern: String,

        /// Character offset to search from
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Search towards the start of the file
        #[arg(long)]
        backward: bool,

        #[command(flatten)]
        search: SearchFlags,
    },

    /// Replace the first (or every) occurrence of a pattern
    Replace {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        pattern: String,
        replacement: String,

        /// Replace every occurrence
        #[arg(long)]
        all: bool,

        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,

        #[command(flatten)]
        search: SearchFlags,
    },

    /// Search files below one or more directories
    Grep {
        pattern: String,

        #[arg(value_name = "DIR", default_value = ".")]
        dirs: Vec<PathBuf>,

        /// Only search these extensions (repeatable)
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,

        #[command(flatten)]
        search: SearchFlags,
    },

    /// Resolve a `path:line: content` result line
    Open {
        #[arg(value_name = "RESULT_LINE")]
        result_line: String,
    },

    /// Count total and code lines
    Stats {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct SearchFlags {
    /// Compare case-sensitively
    #[arg(long)]
    match_case: bool,

    /// Only match whole words
    #[arg(long)]
    whole_word: bool,
}

impl SearchFlags {
    fn options(self, direction: Direction) -> SearchOptions {
        SearchOptions {
            match_case: self.match_case,
            whole_word: self.whole_word,
            direction,
            wrap: true,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Matchlight v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    let stdout = std::io::stdout();
    run(args.command, &config, &mut stdout.lock())
}

fn run(command: Command, config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Match {
            file,
            offset,
            line,
            column,
            theme,
            hint,
            json,
        } => {
            let mut doc = open_document(&file, config)?;
            if let Some(theme) = theme {
                doc = doc.with_theme(theme);
            }
            if let Some(hint) = hint {
                doc = doc.with_hint(hint);
            }

            let cursor = match (offset, line, column) {
                (Some(offset), _, _) => offset,
                (None, Some(line), Some(column)) => doc.buffer().position_to_char_idx(
                    Position::new(line.get() - 1, column.get() - 1),
                )?,
                _ => bail!("either --offset or --line with --column is required"),
            };
            doc.set_cursor(cursor)?;

            let result = config.matcher()?.find_match(doc.buffer(), cursor, doc.hint())?;

            if json {
                let report = serde_json::json!({
                    "cursor": cursor,
                    "match": result,
                    "highlights": doc.highlights(),
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                match result.spans() {
                    Some((anchor, partner)) => {
                        writeln!(out, "anchor   {}", describe(doc.buffer(), anchor)?)?;
                        writeln!(out, "partner  {}", describe(doc.buffer(), partner)?)?;
                    }
                    None => writeln!(out, "no match")?,
                }
            }
        }

        Command::Find {
            file,
            pattern,
            from,
            backward,
            search,
        } => {
            let mut doc = open_document(&file, config)?;
            doc.set_cursor(from)?;
            let direction = if backward {
                Direction::Backward
            } else {
                Direction::Forward
            };

            match doc.find(&pattern, search.options(direction))? {
                Some(m) => {
                    let span = Span::new(m.start, m.end);
                    writeln!(out, "{}", describe(doc.buffer(), span)?)?;
                }
                None => writeln!(out, "not found")?,
            }
        }

        Command::Replace {
            file,
            pattern,
            replacement,
            all,
            write,
            search,
        } => {
            let mut doc = open_document(&file, config)?;
            let options = search.options(Direction::Forward);

            let count = if all {
                doc.replace_all(&pattern, &replacement, options)?
            } else if doc.find(&pattern, options)?.is_some() {
                usize::from(doc.replace(&pattern, &replacement, options)?)
            } else {
                0
            };
            tracing::info!(count, "replacements made");

            if write {
                if count > 0 {
                    doc.save()
                        .with_context(|| format!("failed to write {}", file.display()))?;
                }
                writeln!(out, "replaced {count} occurrence(s) in {}", file.display())?;
            } else {
                write!(out, "{}", doc.text())?;
            }
        }

        Command::Grep {
            pattern,
            dirs,
            extensions,
            search,
        } => {
            let mut search_config = config.search.clone();
            if !extensions.is_empty() {
                search_config.extensions = extensions;
            }
            let searcher = Searcher::new(&pattern, search.options(Direction::Forward))?;
            let workspace = Workspace::open(&dirs, search_config)?;

            for result in workspace.find_in_files(&searcher) {
                writeln!(out, "{result}")?;
            }
        }

        Command::Open { result_line } => {
            let location = FileMatch::parse(&result_line)?;
            let doc = Document::from_file(&location.path)
                .with_context(|| format!("failed to open {}", location.path.display()))?;
            let line = doc
                .buffer()
                .line_text(location.line_number - 1)
                .with_context(|| {
                    format!(
                        "{} has no line {}",
                        location.path.display(),
                        location.line_number
                    )
                })?;
            writeln!(
                out,
                "{}:{}: {}",
                location.path.display(),
                location.line_number,
                line
            )?;
        }

        Command::Stats { file, json } => {
            let doc = open_document(&file, config)?;
            let stats = doc.stats();
            if json {
                writeln!(out, "{}", serde_json::to_string(&stats)?)?;
            } else {
                writeln!(out, "{stats}")?;
            }
        }
    }

    Ok(())
}

fn open_document(file: &Path, config: &Config) -> anyhow::Result<Document> {
    let doc = Document::from_file(file)
        .with_context(|| format!("failed to open {}", file.display()))?
        .with_config(config)?;
    Ok(doc)
}

/// Renders a span as `line:col-line:col offsets "text"` (1-based lines and columns).
fn describe(buffer: &TextBuffer, span: Span) -> anyhow::Result<String> {
    let start = buffer.char_idx_to_position(span.start)?;
    let end = buffer.char_idx_to_position(span.end)?;
    let text = buffer.slice(span.range())?;
    Ok(format!(
        "{start}-{end} [{}, {}) {:?}",
        span.start, span.end, text
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run_to_string(command: Command) -> String {
        let mut out = Vec::new();
        run(command, &Config::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["matchlight", "match", "a.py", "--offset", "3"]);
        assert_eq!(args.verbose, 0);
        assert!(args.config.is_none());
        assert!(matches!(
            args.command,
            Command::Match {
                offset: Some(3),
                json: false,
                ..
            }
        ));
    }

    #[test]
    fn test_args_global_flags_after_subcommand() {
        let args = Args::parse_from(["matchlight", "stats", "a.py", "-vv", "--config", "c.toml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn test_match_requires_a_cursor() {
        assert!(Args::try_parse_from(["matchlight", "match", "a.py"]).is_err());
        assert!(Args::try_parse_from(["matchlight", "match", "a.py", "--line", "2"]).is_err());
        assert!(
            Args::try_parse_from(["matchlight", "match", "a.py", "--offset", "1", "--line", "1", "--column", "1"])
                .is_err()
        );
        assert!(
            Args::try_parse_from(["matchlight", "match", "a.py", "--line", "0", "--column", "1"])
                .is_err()
        );
        let args = Args::try_parse_from([
            "matchlight", "match", "a.html", "--line", "2", "--column", "4", "--theme", "light",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Match {
                theme: Some(Theme::Light),
                ..
            }
        ));
    }

    #[test]
    fn test_grep_defaults_to_current_dir() {
        let args = Args::parse_from(["matchlight", "grep", "TODO", "--ext", "py", "--match-case"]);
        match args.command {
            Command::Grep {
                dirs,
                extensions,
                search,
                ..
            } => {
                assert_eq!(dirs, vec![PathBuf::from(".")]);
                assert_eq!(extensions, vec!["py".to_string()]);
                assert!(search.match_case);
                assert!(!search.whole_word);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_match_by_line_and_column() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("app.py");
        std::fs::write(&file, "x = 1\nfoo(bar(baz))\n").unwrap();

        let output = run_to_string(Command::Match {
            file,
            offset: None,
            line: NonZeroUsize::new(2),
            column: NonZeroUsize::new(4),
            theme: None,
            hint: None,
            json: false,
        });
        assert_eq!(
            output,
            "anchor   2:4-2:5 [9, 10) \"(\"\npartner  2:13-2:14 [18, 19) \")\"\n"
        );
    }

    #[test]
    fn test_run_match_json() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("page.txt");
        std::fs::write(&file, "(a)").unwrap();

        let output = run_to_string(Command::Match {
            file,
            offset: Some(1),
            line: None,
            column: None,
            theme: Some(Theme::Light),
            hint: None,
            json: true,
        });
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["match"]["result"], "matched");
        assert_eq!(value["match"]["partner"]["start"], 2);
        // current line plus both delimiters
        assert_eq!(value["highlights"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_run_replace_and_stats() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.py");
        std::fs::write(&file, "# a\nvalue = old\nold()\n").unwrap();

        let output = run_to_string(Command::Replace {
            file: file.clone(),
            pattern: "old".to_string(),
            replacement: "new".to_string(),
            all: true,
            write: true,
            search: SearchFlags {
                match_case: false,
                whole_word: true,
            },
        });
        assert!(output.starts_with("replaced 2 occurrence(s)"));
        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "# a\nvalue = new\nnew()\n"
        );

        let stats = run_to_string(Command::Stats { file, json: false });
        assert_eq!(stats, "Lines: 4 | Code Lines: 2\n");
    }

    #[test]
    fn test_run_grep_then_open() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "intro\n  see TODO here\n").unwrap();

        let output = run_to_string(Command::Grep {
            pattern: "todo".to_string(),
            dirs: vec![dir.path().to_path_buf()],
            extensions: Vec::new(),
            search: SearchFlags {
                match_case: false,
                whole_word: false,
            },
        });
        let line = output.lines().next().unwrap().to_string();
        assert!(line.ends_with("a.md:2: see TODO here"));

        let opened = run_to_string(Command::Open { result_line: line });
        assert!(opened.ends_with(":2:   see TODO here\n"));
    }
}
