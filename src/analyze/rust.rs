//! Rust source structure analyzer
//!
//! Scans for `use` imports, type declarations, and functions. Functions
//! inside `impl` blocks are reported as methods; brace depth is tracked
//! with a simple counter, which is enough for rustfmt-shaped code.

use super::{FileStructure, StructureAnalyzer};
use crate::error::Result;
use crate::models::{Import, Symbol, SymbolKind};
use regex::Regex;
use std::sync::OnceLock;

fn type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait)\s+([A-Za-z_][A-Za-z0-9_]*)")
            .unwrap()
    })
}

fn fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+([A-Za-z_][A-Za-z0-9_]*)",
        )
        .unwrap()
    })
}

pub struct RustAnalyzer;

impl StructureAnalyzer for RustAnalyzer {
    fn language(&self) -> &'static str {
        "rust"
    }

    fn analyze(&self, content: &str) -> Result<FileStructure> {
        let mut structure = FileStructure::default();

        let mut depth: i64 = 0;
        // Depth at which the current impl block was opened
        let mut impl_depth: Option<i64> = None;

        for (i, line) in content.lines().enumerate() {
            let lineno = i + 1;
            let trimmed = line.trim();

            if trimmed.starts_with("//") {
                continue;
            }

            if trimmed.starts_with("use ") && trimmed.ends_with(';') {
                structure.imports.push(Import {
                    line: lineno,
                    statement: trimmed.to_string(),
                });
            } else if trimmed.starts_with("impl ") || trimmed == "impl" {
                impl_depth = Some(depth);
            } else if let Some(caps) = type_re().captures(trimmed) {
                structure.symbols.push(Symbol {
                    name: caps[1].to_string(),
                    kind: SymbolKind::Class,
                    line: lineno,
                });
            } else if let Some(caps) = fn_re().captures(trimmed) {
                let kind = if impl_depth.is_some() {
                    SymbolKind::Method
                } else {
                    SymbolKind::Function
                };
                structure.symbols.push(Symbol {
                    name: caps[1].to_string(),
                    kind,
                    line: lineno,
                });
            }

            for ch in line.chars() {
                match ch {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if let Some(d) = impl_depth {
                            if depth <= d {
                                impl_depth = None;
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        structure.total_lines = content.lines().count();
        Ok(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_with_methods() {
        let source = "\
use std::fmt;

pub struct Counter {
    count: u64,
}

impl Counter {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    fn bump(&mut self) {
        self.count += 1;
    }
}

fn helper() {}
";
        let structure = RustAnalyzer.analyze(source).unwrap();
        let names: Vec<(&str, SymbolKind)> = structure
            .symbols
            .iter()
            .map(|s| (s.name.as_str(), s.kind))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Counter", SymbolKind::Class),
                ("new", SymbolKind::Method),
                ("bump", SymbolKind::Method),
                ("helper", SymbolKind::Function),
            ]
        );
        assert_eq!(structure.imports.len(), 1);
    }

    #[test]
    fn test_enum_and_trait_are_types() {
        let source = "pub enum Mode { A, B }\ntrait Runner {}\n";
        let structure = RustAnalyzer.analyze(source).unwrap();
        assert_eq!(structure.symbols.len(), 2);
        assert!(structure.symbols.iter().all(|s| s.kind == SymbolKind::Class));
    }

    #[test]
    fn test_empty_file() {
        let structure = RustAnalyzer.analyze("").unwrap();
        assert!(structure.symbols.is_empty());
        assert_eq!(structure.total_lines, 0);
    }

    #[test]
    fn test_function_after_impl_block_closes() {
        let source = "impl Foo {\n    fn a(&self) {}\n}\nfn b() {}\n";
        let structure = RustAnalyzer.analyze(source).unwrap();
        let b = structure.symbols.iter().find(|s| s.name == "b").unwrap();
        assert_eq!(b.kind, SymbolKind::Function);
    }
}
