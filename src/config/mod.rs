//! Configuration management for coverctx
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable enabling verbose diagnostics for the whole tool
pub const COVER_AGENT_DEBUG_ENV: &str = "COVER_AGENT_DEBUG";

/// Environment variable enabling verbose diagnostics for the MCP transport
pub const MCP_DEBUG_ENV: &str = "MCP_DEBUG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default project language when a request does not imply one
    #[serde(default = "default_language")]
    pub language: String,

    /// Coverage report configuration
    #[serde(default)]
    pub coverage: CoverageConfig,

    /// Analyzer configuration
    #[serde(default)]
    pub analyze: AnalyzeConfig,

    /// MCP server configuration
    #[serde(default)]
    pub mcp: McpConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Coverage report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Report file names probed under project_root, in order
    #[serde(default = "default_report_files")]
    pub report_files: Vec<String>,

    /// Report format: "auto", "cobertura", or "lcov"
    #[serde(default = "default_report_format")]
    pub format: String,

    /// Suffix of the baseline report used by coverage validation
    /// (e.g. coverage.baseline.xml next to coverage.xml)
    #[serde(default = "default_baseline_suffix")]
    pub baseline_suffix: String,

    /// Reports older than this are treated as unavailable (0 = no limit)
    #[serde(default = "default_max_report_age_secs")]
    pub max_report_age_secs: u64,
}

/// Analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeConfig {
    /// Maximum related files reported alongside a source file
    #[serde(default = "default_max_context_files")]
    pub max_context_files: usize,

    /// Maximum uncovered lines echoed back per gap report
    #[serde(default = "default_max_gap_lines")]
    pub max_gap_lines: usize,

    /// Below this percentage, suggestions flag coverage as low
    #[serde(default = "default_low_coverage_threshold")]
    pub low_coverage_threshold: f64,

    /// Validation suggests raising coverage up to this percentage
    #[serde(default = "default_target_coverage")]
    pub target_coverage: f64,
}

/// MCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Name the server registers under in editor settings
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for coverctx data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            coverage: CoverageConfig::default(),
            analyze: AnalyzeConfig::default(),
            mcp: McpConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            report_files: default_report_files(),
            format: default_report_format(),
            baseline_suffix: default_baseline_suffix(),
            max_report_age_secs: default_max_report_age_secs(),
        }
    }
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            max_context_files: default_max_context_files(),
            max_gap_lines: default_max_gap_lines(),
            low_coverage_threshold: default_low_coverage_threshold(),
            target_coverage: default_target_coverage(),
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
        }
    }
}

impl Config {
    /// Get the default base directory for coverctx (~/.coverctx)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".coverctx")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory, falling back to
    /// defaults when no config file exists yet
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
            config.validate()?;
        } else {
            debug!("No config file found, using defaults");
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Whether either documented debug env var is set
    pub fn debug_env_enabled() -> bool {
        std::env::var_os(COVER_AGENT_DEBUG_ENV).is_some()
            || std::env::var_os(MCP_DEBUG_ENV).is_some()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.coverage.report_files.is_empty() {
            return Err(Error::Config(
                "coverage.report_files must list at least one file name".to_string(),
            ));
        }

        match self.coverage.format.as_str() {
            "auto" | "cobertura" | "lcov" => {}
            other => {
                return Err(Error::Config(format!(
                    "coverage.format must be auto, cobertura, or lcov (got '{}')",
                    other
                )));
            }
        }

        if self.coverage.baseline_suffix.is_empty() {
            return Err(Error::Config(
                "coverage.baseline_suffix must not be empty".to_string(),
            ));
        }

        if !(0.0..=100.0).contains(&self.analyze.low_coverage_threshold) {
            return Err(Error::Config(
                "analyze.low_coverage_threshold must be between 0 and 100".to_string(),
            ));
        }

        if !(0.0..=100.0).contains(&self.analyze.target_coverage) {
            return Err(Error::Config(
                "analyze.target_coverage must be between 0 and 100".to_string(),
            ));
        }

        if self.mcp.server_name.is_empty() {
            return Err(Error::Config("mcp.server_name must not be empty".to_string()));
        }

        Ok(())
    }
}
