//! Aggregate generation context
//!
//! Combines code context, coverage gaps, and test structure into one
//! payload. Sections degrade per-field: a missing coverage report or
//! absent test file leaves that section unavailable with a reason while
//! the rest of the context is still returned.

use super::{
    cmd_analyze_code_context, cmd_coverage_gaps, cmd_test_structure, require_file,
    require_project_root,
};
use crate::config::Config;
use crate::discovery::find_test_file;
use crate::error::Result;
use crate::models::{
    CodeContext, GapPriority, GapReport, GenerationContext, GenerationGuidance, Section,
    TestStructure,
};
use std::path::{Path, PathBuf};
use tracing::debug;

fn section_from<T>(result: Result<T>) -> Section<T> {
    match result {
        Ok(data) => Section::available(data),
        Err(e) => Section::unavailable(e.kind(), e.to_string()),
    }
}

/// Assemble the full context handed to a test-generation assistant
pub async fn cmd_generation_context(
    config: &Config,
    source_file: &Path,
    test_file: Option<&Path>,
    project_root: &Path,
) -> Result<GenerationContext> {
    require_file(source_file)?;
    require_project_root(project_root)?;

    let code_context = section_from(cmd_analyze_code_context(config, source_file, project_root).await);

    // Fall back to discovery when the caller did not name a test file
    let resolved_test_file: Option<PathBuf> = match test_file {
        Some(t) => Some(t.to_path_buf()),
        None => {
            let discovered = find_test_file(source_file, project_root);
            if let Some(found) = &discovered {
                debug!("Discovered test file {:?}", found);
            }
            discovered
        }
    };

    let (coverage_gaps, test_structure) = match &resolved_test_file {
        Some(test) => (
            section_from(cmd_coverage_gaps(config, source_file, test, project_root).await),
            section_from(cmd_test_structure(test, project_root).await),
        ),
        None => {
            let reason = "no test file provided or discovered";
            (
                Section::unavailable("file_not_found", reason),
                Section::unavailable("file_not_found", reason),
            )
        }
    };

    let guidance = build_guidance(&code_context, &coverage_gaps, &test_structure);

    Ok(GenerationContext {
        source_file: source_file.to_path_buf(),
        code_context,
        coverage_gaps,
        test_structure,
        guidance,
    })
}

fn build_guidance(
    code_context: &Section<CodeContext>,
    coverage_gaps: &Section<GapReport>,
    test_structure: &Section<TestStructure>,
) -> GenerationGuidance {
    let mut guidance = GenerationGuidance::default();

    if let Some(report) = coverage_gaps.data() {
        for gap in report
            .gaps
            .iter()
            .filter(|g| g.priority == GapPriority::Critical)
        {
            for line in &gap.lines {
                guidance
                    .focus_areas
                    .push(format!("Line {}: {}", line.line, line.content));
            }
        }
    }

    if let Some(context) = code_context.data() {
        let tested: Vec<&str> = test_structure
            .data()
            .map(|s| s.test_cases.iter().map(|t| t.name.as_str()).collect())
            .unwrap_or_default();
        for symbol in &context.symbols {
            // Skip symbols that already have an obviously-named test
            let candidate = format!("test_{}", symbol.name.to_lowercase());
            if tested.iter().any(|t| t.starts_with(&candidate)) {
                continue;
            }
            guidance
                .test_priorities
                .push(format!("Test {}: {}", symbol.kind, symbol.name));
        }
    }

    if let Some(structure) = test_structure.data() {
        guidance.existing_tests = structure.test_cases.iter().map(|t| t.name.clone()).collect();
    }

    guidance
}

/// Human-readable rendering for the CLI
pub fn print_generation_context(context: &GenerationContext) {
    println!("Generation context: {}", context.source_file.display());

    match &context.code_context {
        Section::Available { data } => {
            println!("  Code context: {} symbols", data.symbols.len())
        }
        Section::Unavailable { reason, .. } => println!("  Code context: unavailable ({})", reason),
    }
    match &context.coverage_gaps {
        Section::Available { data } => println!(
            "  Coverage: {:.1}%, {} gaps",
            data.summary.percent,
            data.gaps.len()
        ),
        Section::Unavailable { reason, .. } => println!("  Coverage: unavailable ({})", reason),
    }
    match &context.test_structure {
        Section::Available { data } => {
            println!("  Existing tests: {}", data.test_cases.len())
        }
        Section::Unavailable { reason, .. } => {
            println!("  Existing tests: unavailable ({})", reason)
        }
    }

    if !context.guidance.focus_areas.is_empty() {
        println!("  Focus areas:");
        for area in &context.guidance.focus_areas {
            println!("    {}", area);
        }
    }
    if !context.guidance.test_priorities.is_empty() {
        println!("  Priorities:");
        for priority in &context.guidance.test_priorities {
            println!("    {}", priority);
        }
    }
}
