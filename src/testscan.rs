//! Existing-test structure scanning
//!
//! Describes how a test file is organized (cases, classes, fixtures,
//! assertion counts) so the consuming assistant can extend the suite
//! instead of duplicating it.

use crate::analyze::Language;
use crate::error::{Error, Result};
use crate::models::{Fixture, Symbol, SymbolKind, TestCase, TestQuality};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Raw scan result, before the request-level fields are attached
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestScan {
    pub test_cases: Vec<TestCase>,
    pub test_classes: Vec<Symbol>,
    pub fixtures: Vec<Fixture>,
    pub assertion_count: usize,
    pub quality: TestQuality,
}

fn py_test_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^class\s+(Test[A-Za-z0-9_]*)\s*[:(\s]").unwrap())
}

fn py_test_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:async\s+)?def\s+(test_[A-Za-z0-9_]*)\s*\(").unwrap())
}

fn py_def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap())
}

fn rust_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?fn\s+([A-Za-z_][A-Za-z0-9_]*)")
            .unwrap()
    })
}

/// Scan a test file's content for its organization
pub fn scan_test_file(path: &Path, content: &str) -> Result<TestScan> {
    match Language::from_extension(path) {
        Language::Python => Ok(scan_python(content)),
        Language::Rust => Ok(scan_rust(content)),
        Language::Unknown => Err(Error::UnsupportedFormat(format!(
            "'{}' is not a recognized test file format",
            path.display()
        ))),
    }
}

fn scan_python(content: &str) -> TestScan {
    let mut scan = TestScan::default();
    let mut pending_fixture = false;

    for (i, line) in content.lines().enumerate() {
        let lineno = i + 1;
        let trimmed = line.trim();

        if trimmed.starts_with("@pytest.fixture") || trimmed.starts_with("@fixture") {
            pending_fixture = true;
            continue;
        }

        if let Some(caps) = py_test_class_re().captures(trimmed) {
            scan.test_classes.push(Symbol {
                name: caps[1].to_string(),
                kind: SymbolKind::Class,
                line: lineno,
            });
            pending_fixture = false;
        } else if let Some(caps) = py_def_re().captures(trimmed) {
            let name = caps[1].to_string();
            if pending_fixture || name == "setUp" || name == "tearDown" {
                scan.fixtures.push(Fixture { name, line: lineno });
            } else if py_test_fn_re().is_match(trimmed) {
                scan.test_cases.push(TestCase { name, line: lineno });
            }
            pending_fixture = false;
        }

        if trimmed.starts_with("assert ")
            || trimmed.starts_with("assert(")
            || trimmed.contains("self.assert")
            || trimmed.contains("pytest.raises")
        {
            scan.assertion_count += 1;
        }
    }

    scan.quality = quality_metrics(content, "#");
    scan
}

fn scan_rust(content: &str) -> TestScan {
    let mut scan = TestScan::default();
    let mut pending_test_attr = false;

    for (i, line) in content.lines().enumerate() {
        let lineno = i + 1;
        let trimmed = line.trim();

        if trimmed.starts_with("#[test]") || trimmed.starts_with("#[tokio::test]") {
            pending_test_attr = true;
            continue;
        }
        if trimmed.starts_with("#[") {
            // Other attributes (cfg, ignore) between #[test] and fn
            continue;
        }

        if let Some(caps) = rust_fn_re().captures(trimmed) {
            let name = caps[1].to_string();
            if pending_test_attr {
                scan.test_cases.push(TestCase { name, line: lineno });
            } else if name.starts_with("setup") || name.starts_with("fixture") {
                scan.fixtures.push(Fixture { name, line: lineno });
            }
            pending_test_attr = false;
        }

        if trimmed.contains("assert!")
            || trimmed.contains("assert_eq!")
            || trimmed.contains("assert_ne!")
        {
            scan.assertion_count += 1;
        }
    }

    scan.quality = quality_metrics(content, "//");
    scan
}

fn quality_metrics(content: &str, comment_prefix: &str) -> TestQuality {
    let mut quality = TestQuality::default();
    for line in content.lines() {
        quality.total_lines += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            quality.blank_lines += 1;
        } else if trimmed.starts_with(comment_prefix) {
            quality.comment_lines += 1;
        } else {
            quality.code_lines += 1;
        }
    }
    if quality.total_lines > 0 {
        quality.test_density = quality.code_lines as f64 / quality.total_lines as f64;
    }
    quality
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_pytest_file() {
        let content = "\
import pytest

from src.calculator import Calculator

@pytest.fixture
def calc():
    return Calculator()

class TestCalculator:
    def test_add(self, calc):
        assert calc.add(1, 2) == 3

    def test_subtract(self, calc):
        assert calc.subtract(5, 2) == 3

    def helper(self):
        pass
";
        let scan = scan_test_file(Path::new("test_calculator.py"), content).unwrap();
        assert_eq!(scan.test_classes.len(), 1);
        assert_eq!(scan.test_classes[0].name, "TestCalculator");
        assert_eq!(
            scan.test_cases.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["test_add", "test_subtract"]
        );
        assert_eq!(scan.fixtures.len(), 1);
        assert_eq!(scan.fixtures[0].name, "calc");
        assert_eq!(scan.assertion_count, 2);
        assert!(scan.quality.test_density > 0.5);
    }

    #[test]
    fn test_scan_unittest_setup() {
        let content = "\
class TestThing:
    def setUp(self):
        self.x = 1

    def test_x(self):
        self.assertEqual(self.x, 1)
";
        let scan = scan_test_file(Path::new("test_thing.py"), content).unwrap();
        assert_eq!(scan.fixtures[0].name, "setUp");
        assert_eq!(scan.assertion_count, 1);
    }

    #[test]
    fn test_scan_rust_tests() {
        let content = "\
use super::*;

fn setup_store() -> Store {
    Store::new()
}

#[test]
fn test_insert() {
    let s = setup_store();
    assert_eq!(s.len(), 0);
}

#[tokio::test]
async fn test_async_fetch() {
    assert!(fetch().await.is_ok());
}
";
        let scan = scan_test_file(Path::new("store_test.rs"), content).unwrap();
        assert_eq!(
            scan.test_cases.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["test_insert", "test_async_fetch"]
        );
        assert_eq!(scan.fixtures[0].name, "setup_store");
        assert_eq!(scan.assertion_count, 2);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = scan_test_file(Path::new("spec.rb"), "describe do end").unwrap_err();
        assert_eq!(err.kind(), "unsupported_format");
    }

    #[test]
    fn test_empty_file() {
        let scan = scan_test_file(Path::new("test_empty.py"), "").unwrap();
        assert!(scan.test_cases.is_empty());
        assert_eq!(scan.quality.total_lines, 0);
        assert_eq!(scan.quality.test_density, 0.0);
    }
}
