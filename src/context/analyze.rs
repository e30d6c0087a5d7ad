//! Code context analysis

use super::{require_file, require_project_root};
use crate::analyze::analyzer_for;
use crate::config::Config;
use crate::discovery::find_context_files;
use crate::error::{Error, Result};
use crate::models::CodeContext;
use std::path::Path;
use tracing::debug;

/// Analyze the structure of a source file and collect related files
pub async fn cmd_analyze_code_context(
    config: &Config,
    source_file: &Path,
    project_root: &Path,
) -> Result<CodeContext> {
    require_file(source_file)?;
    require_project_root(project_root)?;

    debug!("Analyzing code context for {:?}", source_file);

    let analyzer = analyzer_for(source_file, &config.language)?;
    let content = tokio::fs::read_to_string(source_file)
        .await
        .map_err(|e| Error::AnalysisFailure(format!("failed to read {}: {}", source_file.display(), e)))?;
    let structure = analyzer.analyze(&content)?;

    let context_files =
        find_context_files(source_file, project_root, config.analyze.max_context_files);

    let mut suggestions = Vec::new();
    let class_count = structure
        .symbols
        .iter()
        .filter(|s| s.kind == crate::models::SymbolKind::Class)
        .count();
    let callable_count = structure.symbols.len() - class_count;
    if class_count > 0 {
        suggestions.push(format!("Found {} classes that need testing", class_count));
    }
    if callable_count > 0 {
        suggestions.push(format!(
            "Found {} functions/methods that need testing",
            callable_count
        ));
    }
    if !context_files.is_empty() {
        suggestions.push(format!(
            "Found {} related files for context",
            context_files.len()
        ));
    }

    Ok(CodeContext {
        source_file: source_file.to_path_buf(),
        language: analyzer.language().to_string(),
        total_lines: structure.total_lines,
        symbols: structure.symbols,
        imports: structure.imports,
        context_files,
        suggestions,
    })
}

/// Human-readable rendering for the CLI
pub fn print_code_context(context: &CodeContext) {
    println!("Code context: {}", context.source_file.display());
    println!("  Language: {}", context.language);
    println!("  Lines: {}", context.total_lines);
    println!("  Symbols ({}):", context.symbols.len());
    for symbol in &context.symbols {
        println!("    {}:{} {} ({})", context.source_file.display(), symbol.line, symbol.name, symbol.kind);
    }
    if !context.imports.is_empty() {
        println!("  Imports: {}", context.imports.len());
    }
    if !context.context_files.is_empty() {
        println!("  Related files:");
        for file in &context.context_files {
            println!("    {}", file.display());
        }
    }
    for suggestion in &context.suggestions {
        println!("  - {}", suggestion);
    }
}
