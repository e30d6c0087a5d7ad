//! Coverage report reading
//!
//! This module handles:
//! - Locating a coverage report under the project root
//! - Parsing it through a pluggable `CoverageReader` backend
//! - Turning uncovered lines into contiguous, prioritized gaps
//!
//! The service never produces coverage data itself; it only reads reports
//! an external test run left behind. A missing report is `DataUnavailable`,
//! which callers must keep distinct from a file that does not exist.

mod cobertura;
mod lcov;

pub use cobertura::CoberturaReader;
pub use lcov::LcovReader;

use crate::analyze::is_critical_line;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{CoverageGap, CoverageSummary, GapLine, GapPriority};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One coverage measurement for a single source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageData {
    /// Sorted, deduplicated covered line numbers (1-based)
    pub covered_lines: Vec<usize>,
    /// Sorted, deduplicated uncovered line numbers (1-based)
    pub uncovered_lines: Vec<usize>,
    /// When the measurement was taken, if the report records it
    pub measured_at: Option<DateTime<Utc>>,
}

impl CoverageData {
    pub fn percent(&self) -> f64 {
        let total = self.covered_lines.len() + self.uncovered_lines.len();
        if total == 0 {
            return 0.0;
        }
        self.covered_lines.len() as f64 * 100.0 / total as f64
    }

    pub fn summary(&self) -> CoverageSummary {
        CoverageSummary {
            percent: self.percent(),
            covered_lines: self.covered_lines.len(),
            uncovered_lines: self.uncovered_lines.len(),
        }
    }
}

/// A pluggable reader for one coverage report format
#[async_trait]
pub trait CoverageReader: Send + Sync {
    /// Report format name ("cobertura", "lcov")
    fn format(&self) -> &'static str;

    /// Extract the measurement for `source_file` from a report on disk
    async fn read(
        &self,
        report: &Path,
        source_file: &Path,
        project_root: &Path,
    ) -> Result<CoverageData>;
}

impl std::fmt::Debug for dyn CoverageReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CoverageReader({})", self.format())
    }
}

/// Locate the coverage report under the project root, probing the
/// configured file names in order
pub fn find_report(config: &Config, project_root: &Path) -> Result<PathBuf> {
    for name in &config.coverage.report_files {
        let candidate = project_root.join(name);
        if candidate.exists() {
            debug!("Found coverage report at {:?}", candidate);
            check_report_age(config, &candidate)?;
            return Ok(candidate);
        }
    }
    Err(Error::DataUnavailable(format!(
        "no coverage report ({}) found under {}",
        config.coverage.report_files.join(", "),
        project_root.display()
    )))
}

/// Sibling path holding the previous measurement used by validation:
/// coverage.xml -> coverage.baseline.xml
pub fn baseline_report_path(report: &Path, suffix: &str) -> PathBuf {
    let stem = report
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("coverage");
    let name = match report.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}.{}", stem, suffix, ext),
        None => format!("{}.{}", stem, suffix),
    };
    report.with_file_name(name)
}

/// Get the reader for a report path, honoring the configured format
pub fn reader_for(config: &Config, report: &Path) -> Result<Box<dyn CoverageReader>> {
    match config.coverage.format.as_str() {
        "cobertura" => Ok(Box::new(CoberturaReader)),
        "lcov" => Ok(Box::new(LcovReader)),
        _ => match report.extension().and_then(|e| e.to_str()) {
            Some("xml") => Ok(Box::new(CoberturaReader)),
            Some("info") | Some("lcov") => Ok(Box::new(LcovReader)),
            _ => Err(Error::UnsupportedFormat(format!(
                "cannot infer coverage format of '{}'",
                report.display()
            ))),
        },
    }
}

/// Read the measurement for a source file from a specific report
pub async fn read_report(
    config: &Config,
    report: &Path,
    source_file: &Path,
    project_root: &Path,
) -> Result<CoverageData> {
    let reader = reader_for(config, report)?;
    debug!("Reading {:?} as {}", report, reader.format());
    let mut data = reader.read(report, source_file, project_root).await?;
    if data.measured_at.is_none() {
        data.measured_at = report_mtime(report);
    }
    Ok(data)
}

/// Group uncovered lines into contiguous gaps, attaching source content
/// and a priority signal
pub fn build_gaps(source_content: &str, uncovered: &[usize], max_lines: usize) -> Vec<CoverageGap> {
    let lines: Vec<&str> = source_content.lines().collect();
    let mut gaps = Vec::new();
    let mut echoed = 0usize;

    let mut iter = uncovered.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            iter.next();
            end += 1;
        }

        let mut gap_lines = Vec::new();
        let mut critical = false;
        for lineno in start..=end {
            let content = lineno
                .checked_sub(1)
                .and_then(|i| lines.get(i))
                .map(|l| l.trim().to_string())
                .unwrap_or_default();
            if is_critical_line(&content) {
                critical = true;
            }
            if !content.is_empty() && echoed < max_lines {
                gap_lines.push(GapLine {
                    line: lineno,
                    content,
                });
                echoed += 1;
            }
        }

        gaps.push(CoverageGap {
            start_line: start,
            end_line: end,
            priority: if critical {
                GapPriority::Critical
            } else {
                GapPriority::Normal
            },
            lines: gap_lines,
        });
    }

    gaps
}

/// True when `candidate` (a path recorded in a report) refers to
/// `source_file` as requested, comparing trailing path components so that
/// absolute and root-relative spellings still match
pub fn paths_refer_to_same_file(candidate: &Path, source_file: &Path, project_root: &Path) -> bool {
    let normalize = |p: &Path| -> Vec<String> {
        p.components()
            .filter_map(|c| match c {
                std::path::Component::Normal(s) => s.to_str().map(String::from),
                _ => None,
            })
            .collect()
    };

    let requested = source_file
        .strip_prefix(project_root)
        .unwrap_or(source_file);

    let a = normalize(candidate);
    let b = normalize(requested);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let n = a.len().min(b.len());
    a[a.len() - n..] == b[b.len() - n..]
}

fn check_report_age(config: &Config, report: &Path) -> Result<()> {
    let max_age = config.coverage.max_report_age_secs;
    if max_age == 0 {
        return Ok(());
    }
    if let Some(mtime) = report_mtime(report) {
        let age = Utc::now().signed_duration_since(mtime);
        if age.num_seconds() > max_age as i64 {
            return Err(Error::DataUnavailable(format!(
                "coverage report {} is stale ({}s old, limit {}s)",
                report.display(),
                age.num_seconds(),
                max_age
            )));
        }
    }
    Ok(())
}

fn report_mtime(report: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(report)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_report_is_data_unavailable() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let err = find_report(&config, tmp.path()).unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
    }

    #[test]
    fn test_report_probe_order() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("lcov.info"), "TN:\nend_of_record\n").unwrap();
        let config = Config::default();
        let found = find_report(&config, tmp.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "lcov.info");
    }

    #[test]
    fn test_reader_selection_by_extension() {
        let config = Config::default();
        assert_eq!(
            reader_for(&config, Path::new("coverage.xml")).unwrap().format(),
            "cobertura"
        );
        assert_eq!(
            reader_for(&config, Path::new("lcov.info")).unwrap().format(),
            "lcov"
        );
        let err = reader_for(&config, Path::new("coverage.json")).unwrap_err();
        assert_eq!(err.kind(), "unsupported_format");
    }

    #[test]
    fn test_baseline_path() {
        assert_eq!(
            baseline_report_path(Path::new("/p/coverage.xml"), "baseline"),
            PathBuf::from("/p/coverage.baseline.xml")
        );
        assert_eq!(
            baseline_report_path(Path::new("/p/lcov.info"), "baseline"),
            PathBuf::from("/p/lcov.baseline.info")
        );
    }

    #[test]
    fn test_gap_grouping() {
        let source = (1..=20).map(|i| format!("line {}\n", i)).collect::<String>();
        let gaps = build_gaps(&source, &[10, 11, 12, 13, 14, 15, 18], 200);
        assert_eq!(gaps.len(), 2);
        assert_eq!((gaps[0].start_line, gaps[0].end_line), (10, 15));
        assert_eq!((gaps[1].start_line, gaps[1].end_line), (18, 18));
        assert_eq!(gaps[0].lines.len(), 6);
    }

    #[test]
    fn test_gap_priority_marks_critical_lines() {
        let source = "x = 1\nreturn x\ny = 2\n";
        let gaps = build_gaps(source, &[2], 200);
        assert_eq!(gaps[0].priority, GapPriority::Critical);

        let gaps = build_gaps(source, &[3], 200);
        assert_eq!(gaps[0].priority, GapPriority::Normal);
    }

    #[test]
    fn test_path_matching() {
        let root = Path::new("/work/project");
        assert!(paths_refer_to_same_file(
            Path::new("src/calculator.py"),
            Path::new("/work/project/src/calculator.py"),
            root
        ));
        assert!(paths_refer_to_same_file(
            Path::new("calculator.py"),
            Path::new("src/calculator.py"),
            root
        ));
        assert!(!paths_refer_to_same_file(
            Path::new("src/other.py"),
            Path::new("src/calculator.py"),
            root
        ));
    }

    #[test]
    fn test_percent_empty_data() {
        let data = CoverageData::default();
        assert_eq!(data.percent(), 0.0);
    }
}
