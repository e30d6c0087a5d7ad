//! Source structure analysis
//!
//! This module handles:
//! - Language detection from file extensions
//! - Symbol extraction (classes, functions, methods)
//! - Import/dependency extraction
//!
//! Analyzers are line-scanners, not full parsers. They are deliberately
//! tolerant: an empty or declaration-free file yields an empty symbol set
//! rather than an error.

mod python;
mod rust;

pub use python::PythonAnalyzer;
pub use rust::RustAnalyzer;

use crate::error::{Error, Result};
use crate::models::{Import, Symbol};
use std::path::Path;

/// Languages we can analyze
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Rust,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("py") | Some("pyi") => Language::Python,
            Some("rs") => Language::Rust,
            _ => Language::Unknown,
        }
    }

    /// Parse a configured language name ("python", "rust")
    pub fn from_name(name: &str) -> Self {
        match name {
            "python" => Language::Python,
            "rust" => Language::Rust,
            _ => Language::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Unknown => "unknown",
        }
    }
}

/// Extracted structure of a single source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileStructure {
    pub total_lines: usize,
    pub symbols: Vec<Symbol>,
    pub imports: Vec<Import>,
}

/// A pluggable source-structure analyzer for one language
pub trait StructureAnalyzer: Send + Sync {
    /// Language name this analyzer handles
    fn language(&self) -> &'static str;

    /// Extract symbols and imports from file content
    fn analyze(&self, content: &str) -> Result<FileStructure>;
}

impl std::fmt::Debug for dyn StructureAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StructureAnalyzer({})", self.language())
    }
}

/// Get the analyzer for a source file. An extensionless file falls back
/// to the configured default language; an unrecognized extension is
/// UnsupportedFormat.
pub fn analyzer_for(path: &Path, default_language: &str) -> Result<Box<dyn StructureAnalyzer>> {
    let language = match Language::from_extension(path) {
        Language::Unknown if path.extension().is_none() => Language::from_name(default_language),
        detected => detected,
    };
    match language {
        Language::Python => Ok(Box::new(PythonAnalyzer)),
        Language::Rust => Ok(Box::new(RustAnalyzer)),
        Language::Unknown => Err(Error::UnsupportedFormat(format!(
            "no analyzer for '{}'",
            path.display()
        ))),
    }
}

/// Lines that matter most when deciding what to test: branch points,
/// error paths, and declarations.
pub fn is_critical_line(line: &str) -> bool {
    const CRITICAL_PATTERNS: &[&str] = &[
        "raise ", "return ", "assert ", "except ", "finally:", "with ", "def ", "class ", "if ",
        "match ", "panic!", "unwrap", "?;", "fn ",
    ];
    let trimmed = line.trim();
    CRITICAL_PATTERNS.iter().any(|p| trimmed.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_detection() {
        assert_eq!(
            Language::from_extension(Path::new("src/calculator.py")),
            Language::Python
        );
        assert_eq!(Language::from_extension(Path::new("lib.rs")), Language::Rust);
        assert_eq!(
            Language::from_extension(Path::new("app.js")),
            Language::Unknown
        );
        assert_eq!(Language::from_extension(Path::new("Makefile")), Language::Unknown);
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = analyzer_for(Path::new("data.csv"), "python").unwrap_err();
        assert_eq!(err.kind(), "unsupported_format");
    }

    #[test]
    fn test_extensionless_file_uses_default_language() {
        let analyzer = analyzer_for(Path::new("scripts/migrate"), "python").unwrap();
        assert_eq!(analyzer.language(), "python");

        let err = analyzer_for(Path::new("scripts/migrate"), "cobol").unwrap_err();
        assert_eq!(err.kind(), "unsupported_format");
    }

    #[test]
    fn test_critical_line_detection() {
        assert!(is_critical_line("    raise ValueError(x)"));
        assert!(is_critical_line("return total"));
        assert!(!is_critical_line("x = 1"));
        assert!(!is_critical_line(""));
    }
}
