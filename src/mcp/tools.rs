//! MCP tool definitions and handlers

use super::types::{ToolDefinition, ToolResult};
use crate::config::Config;
use crate::context::{
    cmd_analyze_code_context, cmd_coverage_gaps, cmd_generation_context, cmd_test_structure,
    cmd_validate_coverage,
};
use crate::models::AnalysisRequest;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    let source_file = json!({
        "type": "string",
        "description": "Path to the source file to analyze"
    });
    let test_file = json!({
        "type": "string",
        "description": "Path to the companion test file"
    });
    let project_root = json!({
        "type": "string",
        "description": "Project root directory; coverage reports are located relative to it"
    });

    vec![
        ToolDefinition {
            name: "analyze_code_context".to_string(),
            description: "Analyze code structure (classes, functions, imports, related files) and provide insights for test generation.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "source_file": source_file,
                    "project_root": project_root,
                },
                "required": ["source_file", "project_root"]
            }),
        },
        ToolDefinition {
            name: "get_coverage_gaps".to_string(),
            description: "Get uncovered line ranges for a source file from the project's coverage report, prioritized for test generation.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "source_file": source_file,
                    "test_file": test_file,
                    "project_root": project_root,
                },
                "required": ["source_file", "test_file", "project_root"]
            }),
        },
        ToolDefinition {
            name: "analyze_test_structure".to_string(),
            description: "Analyze an existing test file's organization (test cases, fixtures, assertions) to avoid duplicate generation.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "test_file": test_file,
                    "project_root": project_root,
                },
                "required": ["test_file", "project_root"]
            }),
        },
        ToolDefinition {
            name: "get_test_generation_context".to_string(),
            description: "Get comprehensive context for test generation: code structure, coverage gaps, and existing tests. Sections degrade gracefully when data is unavailable.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "source_file": source_file,
                    "test_file": test_file,
                    "project_root": project_root,
                },
                "required": ["source_file", "project_root"]
            }),
        },
        ToolDefinition {
            name: "validate_test_coverage".to_string(),
            description: "Compare current coverage against the baseline report and report the delta after test generation.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "source_file": source_file,
                    "test_file": test_file,
                    "project_root": project_root,
                },
                "required": ["source_file", "test_file", "project_root"]
            }),
        },
    ]
}

fn path_arg(arguments: &HashMap<String, Value>, name: &str) -> Option<PathBuf> {
    arguments
        .get(name)
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

/// Parse the flat path arguments into a request, reporting which
/// required parameter is missing
fn parse_request(
    arguments: &HashMap<String, Value>,
    test_file_required: bool,
) -> Result<AnalysisRequest, ToolResult> {
    let source_file = path_arg(arguments, "source_file")
        .ok_or_else(|| ToolResult::error("invalid_params", "Missing required parameter: source_file"))?;
    let project_root = path_arg(arguments, "project_root")
        .ok_or_else(|| ToolResult::error("invalid_params", "Missing required parameter: project_root"))?;

    let test_file = path_arg(arguments, "test_file");
    if test_file_required && test_file.is_none() {
        return Err(ToolResult::error(
            "invalid_params",
            "Missing required parameter: test_file",
        ));
    }

    let mut request = AnalysisRequest::new(source_file, project_root);
    request.test_file = test_file;
    Ok(request)
}

/// Handle a tool call; every operation error is converted into a typed
/// error payload so the server loop never sees a failure
pub async fn handle_tool_call(
    name: &str,
    arguments: &HashMap<String, Value>,
    config: &Config,
) -> ToolResult {
    debug!("Tool call: {}", name);
    match name {
        "analyze_code_context" => {
            let request = match parse_request(arguments, false) {
                Ok(r) => r,
                Err(e) => return e,
            };
            match cmd_analyze_code_context(config, &request.source_file, &request.project_root)
                .await
            {
                Ok(context) => ToolResult::json(&context),
                Err(e) => ToolResult::error(e.kind(), e.to_string()),
            }
        }
        "get_coverage_gaps" => {
            let request = match parse_request(arguments, true) {
                Ok(r) => r,
                Err(e) => return e,
            };
            let Some(test_file) = request.test_file.as_deref() else {
                return ToolResult::error("invalid_params", "Missing required parameter: test_file");
            };
            match cmd_coverage_gaps(config, &request.source_file, test_file, &request.project_root)
                .await
            {
                Ok(report) => ToolResult::json(&report),
                Err(e) => ToolResult::error(e.kind(), e.to_string()),
            }
        }
        "analyze_test_structure" => {
            let Some(test_file) = path_arg(arguments, "test_file") else {
                return ToolResult::error("invalid_params", "Missing required parameter: test_file");
            };
            let Some(project_root) = path_arg(arguments, "project_root") else {
                return ToolResult::error(
                    "invalid_params",
                    "Missing required parameter: project_root",
                );
            };
            match cmd_test_structure(&test_file, &project_root).await {
                Ok(structure) => ToolResult::json(&structure),
                Err(e) => ToolResult::error(e.kind(), e.to_string()),
            }
        }
        "get_test_generation_context" => {
            let request = match parse_request(arguments, false) {
                Ok(r) => r,
                Err(e) => return e,
            };
            match cmd_generation_context(
                config,
                &request.source_file,
                request.test_file.as_deref(),
                &request.project_root,
            )
            .await
            {
                Ok(context) => ToolResult::json(&context),
                Err(e) => ToolResult::error(e.kind(), e.to_string()),
            }
        }
        "validate_test_coverage" => {
            let request = match parse_request(arguments, true) {
                Ok(r) => r,
                Err(e) => return e,
            };
            let Some(test_file) = request.test_file.as_deref() else {
                return ToolResult::error("invalid_params", "Missing required parameter: test_file");
            };
            match cmd_validate_coverage(
                config,
                &request.source_file,
                test_file,
                &request.project_root,
            )
            .await
            {
                Ok(result) => ToolResult::json(&result),
                Err(e) => ToolResult::error(e.kind(), e.to_string()),
            }
        }
        _ => ToolResult::error("unknown_tool", format!("Unknown tool: {}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::types::ToolContent;
    use tempfile::TempDir;

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    fn payload(result: &ToolResult) -> Value {
        let ToolContent::Text { text } = &result.content[0];
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_five_tools_advertised() {
        let tools = get_tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "analyze_code_context",
                "get_coverage_gaps",
                "analyze_test_structure",
                "get_test_generation_context",
                "validate_test_coverage",
            ]
        );
        for tool in &tools {
            assert_eq!(tool.input_schema["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_analyze_tool_returns_symbols() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("calculator.py");
        std::fs::write(&source, "class Calculator:\n    def add(self):\n        pass\n").unwrap();

        let config = Config::default();
        let result = handle_tool_call(
            "analyze_code_context",
            &args(&[
                ("source_file", source.to_str().unwrap()),
                ("project_root", tmp.path().to_str().unwrap()),
            ]),
            &config,
        )
        .await;

        assert!(result.is_error.is_none());
        let body = payload(&result);
        assert_eq!(body["symbols"][0]["name"], "Calculator");
    }

    #[tokio::test]
    async fn test_missing_parameter_is_invalid_params() {
        let config = Config::default();
        let result = handle_tool_call(
            "get_coverage_gaps",
            &args(&[("source_file", "a.py"), ("project_root", "/tmp")]),
            &config,
        )
        .await;

        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["error_kind"], "invalid_params");
    }

    #[tokio::test]
    async fn test_error_payload_carries_kind() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("calculator.py");
        let test = tmp.path().join("test_calculator.py");
        std::fs::write(&source, "x = 1\n").unwrap();
        std::fs::write(&test, "def test_x():\n    assert True\n").unwrap();

        let config = Config::default();
        let result = handle_tool_call(
            "get_coverage_gaps",
            &args(&[
                ("source_file", source.to_str().unwrap()),
                ("test_file", test.to_str().unwrap()),
                ("project_root", tmp.path().to_str().unwrap()),
            ]),
            &config,
        )
        .await;

        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["error_kind"], "data_unavailable");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let config = Config::default();
        let result = handle_tool_call("delete_everything", &HashMap::new(), &config).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["error_kind"], "unknown_tool");
    }

    #[tokio::test]
    async fn test_generation_context_partial_over_mcp() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("calculator.py");
        std::fs::write(&source, "def run():\n    pass\n").unwrap();

        let config = Config::default();
        let result = handle_tool_call(
            "get_test_generation_context",
            &args(&[
                ("source_file", source.to_str().unwrap()),
                ("project_root", tmp.path().to_str().unwrap()),
            ]),
            &config,
        )
        .await;

        assert!(result.is_error.is_none());
        let body = payload(&result);
        assert_eq!(body["code_context"]["status"], "available");
        assert_eq!(body["coverage_gaps"]["status"], "unavailable");
    }
}
