//! JSON-RPC 2.0 message types for the MCP transport

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// JSON-RPC 2.0 error codes
#[derive(Debug, Clone, Copy)]
pub enum ErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
}

/// Protocol-level error returned in a response's `error` field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for McpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MCP Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for McpError {}

impl From<std::io::Error> for McpError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCode::InternalError, e.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorCode::ParseError, e.to_string())
    }
}

impl McpError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
        }
    }
}

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 notification (request without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: McpError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Union type for parsing incoming messages
#[derive(Debug, Clone)]
pub enum McpMessage {
    Request(McpRequest),
    Notification(McpNotification),
    Response(McpResponse),
}

impl<'de> Deserialize<'de> for McpMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        if value.get("error").is_some() || value.get("result").is_some() {
            let resp: McpResponse =
                serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            return Ok(McpMessage::Response(resp));
        }

        if value.get("id").is_some() {
            let req: McpRequest = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            Ok(McpMessage::Request(req))
        } else {
            let notif: McpNotification =
                serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            Ok(McpMessage::Notification(notif))
        }
    }
}

/// Tool definition advertised by tools/list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool content entry (only text content is emitted)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Tool call result returned under tools/call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    /// Successful result carrying a serialized payload
    pub fn json<T: Serialize>(payload: &T) -> Self {
        let text = serde_json::to_string_pretty(payload)
            .unwrap_or_else(|e| format!(r#"{{"error": "serialization failed: {}"}}"#, e));
        Self {
            content: vec![ToolContent::Text { text }],
            is_error: None,
        }
    }

    /// Typed error payload; `kind` lets the caller distinguish a missing
    /// file from missing coverage data and react accordingly
    pub fn error(kind: &str, message: impl Into<String>) -> Self {
        let body = json!({
            "status": "error",
            "error_kind": kind,
            "error": message.into(),
        });
        Self {
            content: vec![ToolContent::Text {
                text: body.to_string(),
            }],
            is_error: Some(true),
        }
    }
}
