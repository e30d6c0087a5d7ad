//! Cobertura XML coverage reader
//!
//! Extracts per-line hit counts for one source file from a Cobertura
//! report (the format `pytest --cov --cov-report=xml` emits). The report
//! is scanned with regular expressions over `<class>` blocks; Cobertura
//! writers emit attribute-quoted, element-per-line XML, so a full XML
//! parser is not required.

use super::{paths_refer_to_same_file, CoverageData, CoverageReader};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<class\b[^>]*filename="([^"]+)"[^>]*>(.*?)</class>"#).unwrap()
    })
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<line\b([^>]*?)/?>").unwrap())
}

fn attr_re(name: &'static str, slot: &'static OnceLock<Regex>) -> &'static Regex {
    slot.get_or_init(|| Regex::new(&format!(r#"{}="(\d+)""#, name)).unwrap())
}

fn number_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    attr_re("number", &RE)
}

fn hits_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    attr_re("hits", &RE)
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<coverage\b[^>]*timestamp="(\d+)""#).unwrap())
}

pub struct CoberturaReader;

#[async_trait]
impl CoverageReader for CoberturaReader {
    fn format(&self) -> &'static str {
        "cobertura"
    }

    async fn read(
        &self,
        report: &Path,
        source_file: &Path,
        project_root: &Path,
    ) -> Result<CoverageData> {
        let content = tokio::fs::read_to_string(report).await.map_err(|e| {
            Error::DataUnavailable(format!("cannot read {}: {}", report.display(), e))
        })?;
        parse_cobertura(&content, source_file, project_root)
    }
}

fn parse_cobertura(content: &str, source_file: &Path, project_root: &Path) -> Result<CoverageData> {
    let mut data = CoverageData::default();
    let mut matched = false;

    for caps in class_re().captures_iter(content) {
        let filename = Path::new(&caps[1]);
        if !paths_refer_to_same_file(filename, source_file, project_root) {
            continue;
        }
        matched = true;

        for line_caps in line_re().captures_iter(&caps[2]) {
            let attrs = &line_caps[1];
            let number = number_attr_re()
                .captures(attrs)
                .and_then(|c| c[1].parse::<usize>().ok());
            let hits = hits_attr_re()
                .captures(attrs)
                .and_then(|c| c[1].parse::<u64>().ok());
            if let (Some(number), Some(hits)) = (number, hits) {
                if hits > 0 {
                    data.covered_lines.push(number);
                } else {
                    data.uncovered_lines.push(number);
                }
            }
        }
    }

    if !matched {
        return Err(Error::DataUnavailable(format!(
            "report has no coverage entry for {}",
            source_file.display()
        )));
    }

    data.covered_lines.sort_unstable();
    data.covered_lines.dedup();
    data.uncovered_lines.sort_unstable();
    data.uncovered_lines.dedup();
    // A line both covered and uncovered across <class> entries counts as covered
    data.uncovered_lines
        .retain(|l| data.covered_lines.binary_search(l).is_err());
    data.measured_at = parse_timestamp(content);
    Ok(data)
}

/// Cobertura timestamps are milliseconds since the epoch
fn parse_timestamp(content: &str) -> Option<DateTime<Utc>> {
    let millis = timestamp_re()
        .captures(content)
        .and_then(|c| c[1].parse::<i64>().ok())?;
    DateTime::<Utc>::from_timestamp_millis(millis)
}
