//! The five context operations
//!
//! Each operation is a stateless read-compute-respond unit: it validates
//! the request paths, consults the analyzer/coverage collaborators, and
//! returns a serializable payload. Repeated calls with identical inputs
//! and unchanged files return structurally equal results.

pub mod analyze;
pub mod gaps;
pub mod generation;
pub mod setup;
pub mod structure;
pub mod validate;

pub use analyze::*;
pub use gaps::*;
pub use generation::*;
pub use setup::*;
pub use structure::*;
pub use validate::*;

use crate::error::{Error, Result};
use std::path::Path;

/// Reject a request early when a required file is absent
pub(crate) fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Reject a request early when the project root is absent
pub(crate) fn require_project_root(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(Error::InvalidPath(format!(
            "project root is not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_require_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.py");
        std::fs::write(&file, "").unwrap();
        assert!(require_file(&file).is_ok());

        let err = require_file(&tmp.path().join("missing.py")).unwrap_err();
        assert_eq!(err.kind(), "file_not_found");
    }

    #[test]
    fn test_require_project_root() {
        let tmp = TempDir::new().unwrap();
        assert!(require_project_root(tmp.path()).is_ok());
        assert!(require_project_root(&PathBuf::from("/no/such/dir")).is_err());
    }
}
