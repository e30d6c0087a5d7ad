//! Python source structure analyzer
//!
//! Line-based scanner for class/def declarations and imports. Indented
//! `def`s that follow a class at a shallower indent are reported as methods.

use super::{FileStructure, StructureAnalyzer};
use crate::error::Result;
use crate::models::{Import, Symbol, SymbolKind};
use regex::Regex;
use std::sync::OnceLock;

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^class\s+([A-Za-z_][A-Za-z0-9_]*)\s*[:(\s]").unwrap())
}

fn def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap())
}

pub struct PythonAnalyzer;

impl StructureAnalyzer for PythonAnalyzer {
    fn language(&self) -> &'static str {
        "python"
    }

    fn analyze(&self, content: &str) -> Result<FileStructure> {
        let mut structure = FileStructure::default();

        // Indent column of the innermost enclosing class, if any
        let mut class_indent: Option<usize> = None;

        for (i, line) in content.lines().enumerate() {
            let lineno = i + 1;
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let indent = line.len() - trimmed.len();

            // A statement at or left of the class indent ends the class body
            if let Some(ci) = class_indent {
                if indent <= ci {
                    class_indent = None;
                }
            }

            if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
                structure.imports.push(Import {
                    line: lineno,
                    statement: trimmed.trim_end().to_string(),
                });
                continue;
            }

            if let Some(caps) = class_re().captures(trimmed) {
                structure.symbols.push(Symbol {
                    name: caps[1].to_string(),
                    kind: SymbolKind::Class,
                    line: lineno,
                });
                class_indent = Some(indent);
                continue;
            }

            if let Some(caps) = def_re().captures(trimmed) {
                let kind = match class_indent {
                    Some(ci) if indent > ci => SymbolKind::Method,
                    _ => SymbolKind::Function,
                };
                structure.symbols.push(Symbol {
                    name: caps[1].to_string(),
                    kind,
                    line: lineno,
                });
            }
        }

        structure.total_lines = content.lines().count();
        Ok(structure)
    }
}
