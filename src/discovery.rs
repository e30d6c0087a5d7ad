//! Related-file discovery
//!
//! Finds the files a test-generation assistant wants alongside a source
//! file: existing test files for it, siblings in the same module, and the
//! source file a test file appears to cover. Walks are gitignore-aware so
//! build output never shows up as context.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File name stems that mark a file as a test file
pub fn looks_like_test_file(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    stem.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with("_tests")
        || stem.ends_with("Test")
        || path
            .components()
            .any(|c| matches!(c.as_os_str().to_str(), Some("tests") | Some("test")))
}

/// Candidate test file names for a source file stem
fn test_name_candidates(stem: &str, ext: &str) -> Vec<String> {
    vec![
        format!("test_{}.{}", stem, ext),
        format!("{}_test.{}", stem, ext),
        format!("{}_tests.{}", stem, ext),
    ]
}

/// Find an existing test file covering `source_file`, if any
pub fn find_test_file(source_file: &Path, project_root: &Path) -> Option<PathBuf> {
    let stem = source_file.file_stem()?.to_str()?;
    let ext = source_file.extension()?.to_str()?;
    let candidates = test_name_candidates(stem, ext);

    let walker = WalkBuilder::new(project_root)
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .build();

    for entry in walker.flatten() {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(name) = entry.path().file_name().and_then(|n| n.to_str()) {
            if candidates.iter().any(|c| c == name) {
                debug!("Found test file {:?} for {:?}", entry.path(), source_file);
                return Some(entry.path().to_path_buf());
            }
        }
    }
    None
}

/// Find the source file a test file appears to cover
pub fn find_source_file_for_test(test_file: &Path, project_root: &Path) -> Option<PathBuf> {
    let stem = test_file.file_stem()?.to_str()?;
    let ext = test_file.extension()?.to_str()?;

    let mut names = Vec::new();
    if let Some(rest) = stem.strip_prefix("test_") {
        names.push(rest.to_string());
    }
    for suffix in ["_test", "_tests"] {
        if let Some(rest) = stem.strip_suffix(suffix) {
            names.push(rest.to_string());
        }
    }
    if names.is_empty() {
        return None;
    }

    let walker = WalkBuilder::new(project_root)
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .build();

    for entry in walker.flatten() {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if looks_like_test_file(path) {
            continue;
        }
        let (Some(s), Some(e)) = (
            path.file_stem().and_then(|v| v.to_str()),
            path.extension().and_then(|v| v.to_str()),
        ) else {
            continue;
        };
        if e == ext && names.iter().any(|n| n == s) {
            return Some(path.to_path_buf());
        }
    }
    None
}

/// Collect related files reported alongside a code context: the matching
/// test file first, then same-extension siblings in the source directory
pub fn find_context_files(source_file: &Path, project_root: &Path, max: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();

    if let Some(test_file) = find_test_file(source_file, project_root) {
        found.push(test_file);
    }

    let ext = source_file.extension().and_then(|e| e.to_str());
    if let (Some(dir), Some(ext)) = (source_file.parent(), ext) {
        for entry in WalkDir::new(dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .flatten()
        {
            if found.len() >= max {
                break;
            }
            let path = entry.path();
            if !entry.file_type().is_file() || path == source_file {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) == Some(ext)
                && !found.iter().any(|f| f == path)
            {
                found.push(path.to_path_buf());
            }
        }
    }

    found.truncate(max);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "x = 1\n").unwrap();
    }

    #[test]
    fn test_looks_like_test_file() {
        assert!(looks_like_test_file(Path::new("tests/test_calculator.py")));
        assert!(looks_like_test_file(Path::new("src/parser_test.rs")));
        assert!(!looks_like_test_file(Path::new("src/calculator.py")));
    }

    #[test]
    fn test_find_test_file() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src/calculator.py");
        let test = tmp.path().join("tests/test_calculator.py");
        touch(&source);
        touch(&test);

        let found = find_test_file(&source, tmp.path()).unwrap();
        assert_eq!(found, test);
    }

    #[test]
    fn test_find_source_for_test() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src/calculator.py");
        let test = tmp.path().join("tests/test_calculator.py");
        touch(&source);
        touch(&test);

        let found = find_source_file_for_test(&test, tmp.path()).unwrap();
        assert_eq!(found, source);
    }

    #[test]
    fn test_no_test_file_returns_none() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src/calculator.py");
        touch(&source);
        assert!(find_test_file(&source, tmp.path()).is_none());
    }

    #[test]
    fn test_context_files_include_siblings() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src/calculator.py");
        touch(&source);
        touch(&tmp.path().join("src/helpers.py"));
        touch(&tmp.path().join("src/notes.txt"));

        let files = find_context_files(&source, tmp.path(), 10);
        assert!(files.iter().any(|f| f.ends_with("helpers.py")));
        assert!(!files.iter().any(|f| f.ends_with("notes.txt")));
        assert!(!files.iter().any(|f| f == &source));
    }
}
