//! coverctx - a code-analysis context server for test generation
//!
//! This crate provides:
//! - Structure analysis of source files (classes, functions, imports)
//! - Coverage gap extraction from Cobertura and LCOV reports
//! - Test file scanning (test cases, fixtures, assertion counts)
//! - An MCP server over stdio exposing these as tools for editor
//!   integrations and test-generation assistants

pub mod analyze;
pub mod config;
pub mod context;
pub mod coverage;
pub mod discovery;
pub mod error;
pub mod mcp;
pub mod models;
pub mod testscan;

pub use config::Config;
pub use error::{Error, Result};
