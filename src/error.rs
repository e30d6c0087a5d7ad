//! Custom error types for coverctx

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for coverctx operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Coverage data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailure(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("MCP protocol error: {0}")]
    McpProtocol(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl Error {
    /// Stable machine-readable kind, returned to MCP callers so they can
    /// distinguish a typed failure from a successful-but-empty result.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::FileNotFound(_) => "file_not_found",
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::DataUnavailable(_) => "data_unavailable",
            Error::InsufficientData(_) => "insufficient_data",
            Error::AnalysisFailure(_) => "analysis_failure",
            Error::InvalidPath(_) => "invalid_path",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::TomlParse(_) | Error::TomlSerialize(_) => "toml",
            Error::McpProtocol(_) => "mcp_protocol",
            Error::Other(_) => "other",
        }
    }
}

/// Result type alias for coverctx
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        let missing = Error::FileNotFound(PathBuf::from("src/calculator.py"));
        let unavailable = Error::DataUnavailable("no coverage report".to_string());
        assert_ne!(missing.kind(), unavailable.kind());
        assert_eq!(missing.kind(), "file_not_found");
        assert_eq!(unavailable.kind(), "data_unavailable");
    }
}
