//! Analysis payload types shared between the CLI and the MCP server.
//!
//! Every entity here is transient: it is built for a single request and
//! serialized straight back to the caller. Nothing is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A structured query identifying the files to analyze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Source file under analysis (must exist)
    pub source_file: PathBuf,

    /// Companion test file; required for coverage, test-structure,
    /// and validation operations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_file: Option<PathBuf>,

    /// Project root (must exist); coverage reports are located relative to it
    pub project_root: PathBuf,
}

impl AnalysisRequest {
    pub fn new(source_file: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            test_file: None,
            project_root: project_root.into(),
        }
    }

    pub fn with_test_file(mut self, test_file: impl Into<PathBuf>) -> Self {
        self.test_file = Some(test_file.into());
        self
    }
}

/// Kind of a declared symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Function,
    Method,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Class => write!(f, "class"),
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Method => write!(f, "method"),
        }
    }
}

/// A declared symbol in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// 1-based line of the declaration
    pub line: usize,
}

/// An import/dependency edge recorded at its declaration site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// 1-based line of the import
    pub line: usize,
    /// The import statement as written
    pub statement: String,
}

/// Structural description of a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeContext {
    pub source_file: PathBuf,
    pub language: String,
    pub total_lines: usize,
    pub symbols: Vec<Symbol>,
    pub imports: Vec<Import>,
    /// Related files discovered near the source (existing tests, siblings)
    pub context_files: Vec<PathBuf>,
    pub suggestions: Vec<String>,
}

/// Priority signal attached to a coverage gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPriority {
    /// Contains branch points, raises, returns, or declarations
    Critical,
    Normal,
}

/// A single uncovered line with its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapLine {
    pub line: usize,
    pub content: String,
}

/// A contiguous range of source lines lacking test execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGap {
    /// Inclusive 1-based start line
    pub start_line: usize,
    /// Inclusive 1-based end line
    pub end_line: usize,
    pub priority: GapPriority,
    pub lines: Vec<GapLine>,
}

/// Aggregate coverage numbers for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub percent: f64,
    pub covered_lines: usize,
    pub uncovered_lines: usize,
}

/// Result of a coverage-gap query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub source_file: PathBuf,
    pub test_file: PathBuf,
    pub summary: CoverageSummary,
    pub gaps: Vec<CoverageGap>,
    /// When the underlying report was produced, if the reader knows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_at: Option<DateTime<Utc>>,
    pub suggestions: Vec<String>,
}

/// A single test case found in a test file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub line: usize,
}

/// A fixture/setup helper found in a test file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub name: String,
    pub line: usize,
}

/// Rough quality metrics for an existing test file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestQuality {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// code_lines / total_lines; 0 for an empty file
    pub test_density: f64,
}

/// Description of an existing test file's organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStructure {
    pub test_file: PathBuf,
    /// Source file this test file appears to cover, if discoverable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    pub test_cases: Vec<TestCase>,
    pub test_classes: Vec<Symbol>,
    pub fixtures: Vec<Fixture>,
    pub assertion_count: usize,
    pub quality: TestQuality,
    pub suggestions: Vec<String>,
}

/// One section of an aggregate context; degrades gracefully instead of
/// failing the whole request when a sub-analysis is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Available { data: T },
    Unavailable { kind: String, reason: String },
}

impl<T> Section<T> {
    pub fn available(data: T) -> Self {
        Section::Available { data }
    }

    pub fn unavailable(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Section::Unavailable {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Section::Available { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Available { data } => Some(data),
            Section::Unavailable { .. } => None,
        }
    }
}

/// Guidance assembled from whichever sections were available
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationGuidance {
    /// Uncovered lines worth targeting first
    pub focus_areas: Vec<String>,
    /// Symbols that still need tests
    pub test_priorities: Vec<String>,
    /// Existing test names, to avoid generating duplicates
    pub existing_tests: Vec<String>,
}

/// Merged payload handed to the test-generation assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub source_file: PathBuf,
    pub code_context: Section<CodeContext>,
    pub coverage_gaps: Section<GapReport>,
    pub test_structure: Section<TestStructure>,
    pub guidance: GenerationGuidance,
}

/// Direction of a coverage delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageVerdict {
    Improved,
    Unchanged,
    Regressed,
}

impl fmt::Display for CoverageVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageVerdict::Improved => write!(f, "improved"),
            CoverageVerdict::Unchanged => write!(f, "unchanged"),
            CoverageVerdict::Regressed => write!(f, "regressed"),
        }
    }
}

/// Outcome of comparing a before/after coverage measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub source_file: PathBuf,
    pub test_file: PathBuf,
    pub before: CoverageSummary,
    pub after: CoverageSummary,
    pub delta_percent: f64,
    pub newly_covered_lines: Vec<usize>,
    pub newly_uncovered_lines: Vec<usize>,
    pub verdict: CoverageVerdict,
    pub suggestions: Vec<String>,
}
