//! Coverage gap analysis

use super::{require_file, require_project_root};
use crate::config::Config;
use crate::coverage::{build_gaps, find_report, read_report};
use crate::error::{Error, Result};
use crate::models::{GapPriority, GapReport};
use std::path::Path;
use tracing::debug;

/// Report the uncovered line ranges of a source file, per the coverage
/// report found under the project root
pub async fn cmd_coverage_gaps(
    config: &Config,
    source_file: &Path,
    test_file: &Path,
    project_root: &Path,
) -> Result<GapReport> {
    require_file(source_file)?;
    require_file(test_file)?;
    require_project_root(project_root)?;

    let report = find_report(config, project_root)?;
    debug!("Reading coverage for {:?} from {:?}", source_file, report);
    let data = read_report(config, &report, source_file, project_root).await?;

    let content = tokio::fs::read_to_string(source_file)
        .await
        .map_err(|e| Error::AnalysisFailure(format!("failed to read {}: {}", source_file.display(), e)))?;
    let gaps = build_gaps(&content, &data.uncovered_lines, config.analyze.max_gap_lines);

    let summary = data.summary();
    let mut suggestions = Vec::new();
    if summary.percent < config.analyze.low_coverage_threshold {
        suggestions.push(format!(
            "Coverage is low ({:.1}%). Focus on critical uncovered lines.",
            summary.percent
        ));
    }
    let critical = gaps
        .iter()
        .filter(|g| g.priority == GapPriority::Critical)
        .count();
    if critical > 0 {
        suggestions.push(format!("Found {} critical uncovered ranges", critical));
    }

    Ok(GapReport {
        source_file: source_file.to_path_buf(),
        test_file: test_file.to_path_buf(),
        summary,
        gaps,
        measured_at: data.measured_at,
        suggestions,
    })
}

/// Human-readable rendering for the CLI
pub fn print_gap_report(report: &GapReport) {
    println!("Coverage gaps: {}", report.source_file.display());
    println!(
        "  Coverage: {:.1}% ({} covered, {} uncovered)",
        report.summary.percent, report.summary.covered_lines, report.summary.uncovered_lines
    );
    for gap in &report.gaps {
        let priority = match gap.priority {
            GapPriority::Critical => " [critical]",
            GapPriority::Normal => "",
        };
        if gap.start_line == gap.end_line {
            println!("  Line {}{}", gap.start_line, priority);
        } else {
            println!("  Lines {}-{}{}", gap.start_line, gap.end_line, priority);
        }
        for line in &gap.lines {
            println!("    {}: {}", line.line, line.content);
        }
    }
    for suggestion in &report.suggestions {
        println!("  - {}", suggestion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_project(tmp: &TempDir, with_report: bool) -> (std::path::PathBuf, std::path::PathBuf) {
        let source = tmp.path().join("src/calculator.py");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        let body: String = (1..=20).map(|i| format!("x{} = {}\n", i, i)).collect();
        std::fs::write(&source, body).unwrap();

        let test = tmp.path().join("tests/test_calculator.py");
        std::fs::create_dir_all(test.parent().unwrap()).unwrap();
        std::fs::write(&test, "def test_x():\n    assert True\n").unwrap();

        if with_report {
            let tracefile = "SF:src/calculator.py\nDA:1,1\nDA:2,1\nDA:10,0\nDA:11,0\nDA:12,0\nDA:13,0\nDA:14,0\nDA:15,0\nend_of_record\n";
            std::fs::write(tmp.path().join("lcov.info"), tracefile).unwrap();
        }
        (source, test)
    }

    #[tokio::test]
    async fn test_gap_range_from_report() {
        let tmp = TempDir::new().unwrap();
        let (source, test) = write_project(&tmp, true);

        let config = Config::default();
        let report = cmd_coverage_gaps(&config, &source, &test, tmp.path())
            .await
            .unwrap();

        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].start_line, 10);
        assert_eq!(report.gaps[0].end_line, 15);
        assert!(report.summary.percent < 80.0);
        assert!(!report.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_report_is_data_unavailable_not_empty() {
        let tmp = TempDir::new().unwrap();
        let (source, test) = write_project(&tmp, false);

        let config = Config::default();
        let err = cmd_coverage_gaps(&config, &source, &test, tmp.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
    }

    #[tokio::test]
    async fn test_missing_source_distinct_from_missing_report() {
        let tmp = TempDir::new().unwrap();
        let (_, test) = write_project(&tmp, false);

        let config = Config::default();
        let err = cmd_coverage_gaps(&config, &tmp.path().join("gone.py"), &test, tmp.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "file_not_found");
    }

    #[tokio::test]
    async fn test_idempotent() {
        let tmp = TempDir::new().unwrap();
        let (source, test) = write_project(&tmp, true);

        let config = Config::default();
        let first = cmd_coverage_gaps(&config, &source, &test, tmp.path())
            .await
            .unwrap();
        let second = cmd_coverage_gaps(&config, &source, &test, tmp.path())
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
