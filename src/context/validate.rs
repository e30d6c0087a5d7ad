//! Coverage validation
//!
//! Compares the current coverage report against its baseline sibling
//! (coverage.xml vs coverage.baseline.xml) and reports the delta. With
//! only one measurement on disk the operation reports insufficient data
//! instead of guessing.

use super::{require_file, require_project_root};
use crate::config::Config;
use crate::coverage::{baseline_report_path, find_report, read_report};
use crate::error::{Error, Result};
use crate::models::{CoverageVerdict, ValidationResult};
use std::path::Path;
use tracing::debug;

/// Validate test coverage by comparing before/after measurements
pub async fn cmd_validate_coverage(
    config: &Config,
    source_file: &Path,
    test_file: &Path,
    project_root: &Path,
) -> Result<ValidationResult> {
    require_file(source_file)?;
    require_file(test_file)?;
    require_project_root(project_root)?;

    let report = find_report(config, project_root)?;
    let baseline = baseline_report_path(&report, &config.coverage.baseline_suffix);
    if !baseline.exists() {
        return Err(Error::InsufficientData(format!(
            "validation needs two measurements; baseline report {} not found",
            baseline.display()
        )));
    }

    debug!("Comparing {:?} against baseline {:?}", report, baseline);

    // A baseline that exists but lacks this file still means only one
    // measurement is available
    let before = read_report(config, &baseline, source_file, project_root)
        .await
        .map_err(|e| match e {
            Error::DataUnavailable(reason) => Error::InsufficientData(format!(
                "baseline report has no measurement for {}: {}",
                source_file.display(),
                reason
            )),
            other => other,
        })?;
    let after = read_report(config, &report, source_file, project_root).await?;

    let newly_covered_lines: Vec<usize> = before
        .uncovered_lines
        .iter()
        .copied()
        .filter(|l| after.covered_lines.binary_search(l).is_ok())
        .collect();
    let newly_uncovered_lines: Vec<usize> = before
        .covered_lines
        .iter()
        .copied()
        .filter(|l| after.uncovered_lines.binary_search(l).is_ok())
        .collect();

    let delta_percent = after.percent() - before.percent();
    let verdict = if delta_percent > 0.0 {
        CoverageVerdict::Improved
    } else if delta_percent < 0.0 {
        CoverageVerdict::Regressed
    } else {
        CoverageVerdict::Unchanged
    };

    let mut suggestions = Vec::new();
    if after.percent() < config.analyze.target_coverage {
        suggestions.push(format!(
            "Increase coverage from {:.1}% to {:.0}%+",
            after.percent(),
            config.analyze.target_coverage
        ));
    }
    if !newly_uncovered_lines.is_empty() {
        suggestions.push(format!(
            "{} previously covered lines lost coverage",
            newly_uncovered_lines.len()
        ));
    }

    Ok(ValidationResult {
        source_file: source_file.to_path_buf(),
        test_file: test_file.to_path_buf(),
        before: before.summary(),
        after: after.summary(),
        delta_percent,
        newly_covered_lines,
        newly_uncovered_lines,
        verdict,
        suggestions,
    })
}

/// Human-readable rendering for the CLI
pub fn print_validation_result(result: &ValidationResult) {
    println!("Coverage validation: {}", result.source_file.display());
    println!(
        "  Before: {:.1}%  After: {:.1}%  Delta: {:+.1}%",
        result.before.percent, result.after.percent, result.delta_percent
    );
    println!("  Verdict: {}", result.verdict);
    if !result.newly_covered_lines.is_empty() {
        println!("  Newly covered: {:?}", result.newly_covered_lines);
    }
    if !result.newly_uncovered_lines.is_empty() {
        println!("  Newly uncovered: {:?}", result.newly_uncovered_lines);
    }
    for suggestion in &result.suggestions {
        println!("  - {}", suggestion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_project(tmp: &TempDir) -> (PathBuf, PathBuf) {
        let source = tmp.path().join("calculator.py");
        std::fs::write(&source, "a = 1\nb = 2\nc = 3\nd = 4\n").unwrap();
        let test = tmp.path().join("test_calculator.py");
        std::fs::write(&test, "def test_a():\n    assert True\n").unwrap();
        (source, test)
    }

    fn tracefile(covered: &[usize], uncovered: &[usize]) -> String {
        let mut out = String::from("SF:calculator.py\n");
        for l in covered {
            out.push_str(&format!("DA:{},1\n", l));
        }
        for l in uncovered {
            out.push_str(&format!("DA:{},0\n", l));
        }
        out.push_str("end_of_record\n");
        out
    }

    #[tokio::test]
    async fn test_identical_measurements_report_zero_delta() {
        let tmp = TempDir::new().unwrap();
        let (source, test) = write_project(&tmp);
        let trace = tracefile(&[1, 2], &[3, 4]);
        std::fs::write(tmp.path().join("lcov.info"), &trace).unwrap();
        std::fs::write(tmp.path().join("lcov.baseline.info"), &trace).unwrap();

        let config = Config::default();
        let result = cmd_validate_coverage(&config, &source, &test, tmp.path())
            .await
            .unwrap();

        assert_eq!(result.delta_percent, 0.0);
        assert_eq!(result.verdict, CoverageVerdict::Unchanged);
        assert!(result.newly_covered_lines.is_empty());
        assert!(result.newly_uncovered_lines.is_empty());
    }

    #[tokio::test]
    async fn test_improvement_detected() {
        let tmp = TempDir::new().unwrap();
        let (source, test) = write_project(&tmp);
        std::fs::write(
            tmp.path().join("lcov.baseline.info"),
            tracefile(&[1, 2], &[3, 4]),
        )
        .unwrap();
        std::fs::write(tmp.path().join("lcov.info"), tracefile(&[1, 2, 3], &[4])).unwrap();

        let config = Config::default();
        let result = cmd_validate_coverage(&config, &source, &test, tmp.path())
            .await
            .unwrap();

        assert_eq!(result.verdict, CoverageVerdict::Improved);
        assert_eq!(result.newly_covered_lines, vec![3]);
        assert!(result.delta_percent > 0.0);
    }

    #[tokio::test]
    async fn test_regression_detected() {
        let tmp = TempDir::new().unwrap();
        let (source, test) = write_project(&tmp);
        std::fs::write(
            tmp.path().join("lcov.baseline.info"),
            tracefile(&[1, 2, 3], &[4]),
        )
        .unwrap();
        std::fs::write(tmp.path().join("lcov.info"), tracefile(&[1], &[2, 3, 4])).unwrap();

        let config = Config::default();
        let result = cmd_validate_coverage(&config, &source, &test, tmp.path())
            .await
            .unwrap();

        assert_eq!(result.verdict, CoverageVerdict::Regressed);
        assert_eq!(result.newly_uncovered_lines, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_single_measurement_is_insufficient_data() {
        let tmp = TempDir::new().unwrap();
        let (source, test) = write_project(&tmp);
        std::fs::write(tmp.path().join("lcov.info"), tracefile(&[1, 2], &[3, 4])).unwrap();

        let config = Config::default();
        let err = cmd_validate_coverage(&config, &source, &test, tmp.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "insufficient_data");
    }

    #[tokio::test]
    async fn test_baseline_without_source_section_is_insufficient_data() {
        let tmp = TempDir::new().unwrap();
        let (source, test) = write_project(&tmp);
        std::fs::write(tmp.path().join("lcov.info"), tracefile(&[1, 2], &[3, 4])).unwrap();
        std::fs::write(
            tmp.path().join("lcov.baseline.info"),
            "SF:other.py\nDA:1,1\nend_of_record\n",
        )
        .unwrap();

        let config = Config::default();
        let err = cmd_validate_coverage(&config, &source, &test, tmp.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "insufficient_data");
    }

    #[tokio::test]
    async fn test_no_report_at_all_is_data_unavailable() {
        let tmp = TempDir::new().unwrap();
        let (source, test) = write_project(&tmp);

        let config = Config::default();
        let err = cmd_validate_coverage(&config, &source, &test, tmp.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
    }
}
