//! LCOV tracefile coverage reader
//!
//! Reads `SF:`/`DA:` records from an lcov.info tracefile. Only the section
//! whose `SF:` path refers to the requested source file is consulted.

use super::{paths_refer_to_same_file, CoverageData, CoverageReader};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;

pub struct LcovReader;

#[async_trait]
impl CoverageReader for LcovReader {
    fn format(&self) -> &'static str {
        "lcov"
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
        parse_lcov(&content, source_file, project_root)
    }
}

fn parse_lcov(content: &str, source_file: &Path, project_root: &Path) -> Result<CoverageData> {
    let mut data = CoverageData::default();
    let mut in_target_section = false;
    let mut matched = false;

    for line in content.lines() {
        let line = line.trim();

        if let Some(path) = line.strip_prefix("SF:") {
            in_target_section =
                paths_refer_to_same_file(Path::new(path.trim()), source_file, project_root);
            matched |= in_target_section;
        } else if line == "end_of_record" {
            in_target_section = false;
        } else if in_target_section {
            if let Some(record) = line.strip_prefix("DA:") {
                let mut parts = record.splitn(3, ',');
                let number = parts.next().and_then(|v| v.trim().parse::<usize>().ok());
                let hits = parts.next().and_then(|v| v.trim().parse::<u64>().ok());
                if let (Some(number), Some(hits)) = (number, hits) {
                    if hits > 0 {
                        data.covered_lines.push(number);
                    } else {
                        data.uncovered_lines.push(number);
                    }
                }
            }
        }
    }

    if !matched {
        return Err(Error::DataUnavailable(format!(
            "tracefile has no section for {}",
            source_file.display()
        )));
    }

    data.covered_lines.sort_unstable();
    data.covered_lines.dedup();
    data.uncovered_lines.sort_unstable();
    data.uncovered_lines.dedup();
    data.uncovered_lines
        .retain(|l| data.covered_lines.binary_search(l).is_err());
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TRACEFILE: &str = "\
TN:
SF:src/calculator.py
DA:1,5
DA:2,5
DA:10,0
DA:11,0
LF:4
LH:2
end_of_record
SF:src/other.py
DA:1,0
end_of_record
";

    #[test]
    fn test_parse_target_section() {
        let data = parse_lcov(
            TRACEFILE,
            &PathBuf::from("src/calculator.py"),
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(data.covered_lines, vec![1, 2]);
        assert_eq!(data.uncovered_lines, vec![10, 11]);
    }

    #[test]
    fn test_other_sections_ignored() {
        let data = parse_lcov(
            TRACEFILE,
            &PathBuf::from("src/calculator.py"),
            Path::new("/work"),
        )
        .unwrap();
        // line 1 of other.py is uncovered but must not leak in
        assert!(!data.uncovered_lines.contains(&1));
    }

    #[test]
    fn test_missing_section_is_data_unavailable() {
        let err = parse_lcov(TRACEFILE, &PathBuf::from("src/absent.py"), Path::new("/work"))
            .unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
    }

    #[test]
    fn test_checksum_field_tolerated() {
        let tracefile = "SF:a.py\nDA:3,1,abcdef\nDA:4,0\nend_of_record\n";
        let data = parse_lcov(tracefile, &PathBuf::from("a.py"), Path::new("/")).unwrap();
        assert_eq!(data.covered_lines, vec![3]);
        assert_eq!(data.uncovered_lines, vec![4]);
    }
}
