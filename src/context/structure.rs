//! Test structure analysis

use super::{require_file, require_project_root};
use crate::discovery::find_source_file_for_test;
use crate::error::{Error, Result};
use crate::models::TestStructure;
use crate::testscan::scan_test_file;
use std::path::Path;
use tracing::debug;

/// Describe an existing test file's organization
pub async fn cmd_test_structure(test_file: &Path, project_root: &Path) -> Result<TestStructure> {
    require_file(test_file)?;
    require_project_root(project_root)?;

    debug!("Analyzing test structure of {:?}", test_file);

    let content = tokio::fs::read_to_string(test_file)
        .await
        .map_err(|e| Error::AnalysisFailure(format!("failed to read {}: {}", test_file.display(), e)))?;
    let scan = scan_test_file(test_file, &content)?;

    let source_file = find_source_file_for_test(test_file, project_root);

    let mut suggestions = Vec::new();
    if scan.test_cases.len() < 3 {
        suggestions.push(
            "Very few tests found. Consider adding more comprehensive test cases.".to_string(),
        );
    }
    if scan.assertion_count < scan.test_cases.len() {
        suggestions.push("Some test cases appear to have no assertions.".to_string());
    }

    Ok(TestStructure {
        test_file: test_file.to_path_buf(),
        source_file,
        test_cases: scan.test_cases,
        test_classes: scan.test_classes,
        fixtures: scan.fixtures,
        assertion_count: scan.assertion_count,
        quality: scan.quality,
        suggestions,
    })
}

/// Human-readable rendering for the CLI
pub fn print_test_structure(structure: &TestStructure) {
    println!("Test structure: {}", structure.test_file.display());
    if let Some(source) = &structure.source_file {
        println!("  Covers: {}", source.display());
    }
    println!("  Test cases ({}):", structure.test_cases.len());
    for case in &structure.test_cases {
        println!("    {}: {}", case.line, case.name);
    }
    if !structure.fixtures.is_empty() {
        println!("  Fixtures:");
        for fixture in &structure.fixtures {
            println!("    {}: {}", fixture.line, fixture.name);
        }
    }
    println!("  Assertions: {}", structure.assertion_count);
    println!(
        "  Density: {:.2} ({} code / {} total lines)",
        structure.quality.test_density, structure.quality.code_lines, structure.quality.total_lines
    );
    for suggestion in &structure.suggestions {
        println!("  - {}", suggestion);
    }
}
