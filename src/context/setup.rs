//! Editor registration
//!
//! Writes (or merges into) the settings document an editor integration
//! reads to launch the MCP server:
//!
//! `{ "mcpServers": { "<name>": { "command", "args", "env" } } }`

use crate::config::Config;
use crate::error::{Error, Result};
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::info;

/// Register the server in an editor settings file, preserving any
/// entries already present
pub async fn cmd_setup(
    config: &Config,
    settings_path: &Path,
    command: Option<String>,
    env: Vec<(String, String)>,
) -> Result<()> {
    let command = match command {
        Some(c) => c,
        None => std::env::current_exe()
            .ok()
            .and_then(|p| p.to_str().map(String::from))
            .unwrap_or_else(|| "coverctx".to_string()),
    };

    let mut env_map = Map::new();
    for (key, value) in env {
        env_map.insert(key, Value::String(value));
    }

    let entry = json!({
        "command": command,
        "args": ["serve"],
        "env": Value::Object(env_map),
    });

    let mut settings: Value = if settings_path.exists() {
        let content = tokio::fs::read_to_string(settings_path).await?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("existing settings file is not valid JSON: {}", e)))?
    } else {
        json!({})
    };

    let root = settings
        .as_object_mut()
        .ok_or_else(|| Error::Config("settings file root must be a JSON object".to_string()))?;
    let servers = root
        .entry("mcpServers")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| Error::Config("mcpServers must be a JSON object".to_string()))?;
    servers.insert(config.mcp.server_name.clone(), entry);

    if let Some(parent) = settings_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(&settings)?;
    tokio::fs::write(settings_path, content).await?;

    info!(
        "Registered MCP server '{}' in {:?}",
        config.mcp.server_name, settings_path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_setup_writes_expected_schema() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("settings.json");

        let config = Config::default();
        cmd_setup(
            &config,
            &settings,
            Some("/usr/local/bin/coverctx".to_string()),
            vec![("MCP_DEBUG".to_string(), "1".to_string())],
        )
        .await
        .unwrap();

        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(&settings).unwrap()).unwrap();
        let server = &value["mcpServers"]["coverctx"];
        assert_eq!(server["command"], "/usr/local/bin/coverctx");
        assert_eq!(server["args"][0], "serve");
        assert_eq!(server["env"]["MCP_DEBUG"], "1");
    }

    #[tokio::test]
    async fn test_setup_preserves_existing_servers() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("settings.json");
        std::fs::write(
            &settings,
            r#"{"mcpServers": {"other": {"command": "other-bin", "args": [], "env": {}}}, "theme": "dark"}"#,
        )
        .unwrap();

        let config = Config::default();
        cmd_setup(&config, &settings, Some("coverctx".to_string()), vec![])
            .await
            .unwrap();

        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(&settings).unwrap()).unwrap();
        assert_eq!(value["mcpServers"]["other"]["command"], "other-bin");
        assert_eq!(value["mcpServers"]["coverctx"]["command"], "coverctx");
        assert_eq!(value["theme"], "dark");
    }

    #[tokio::test]
    async fn test_setup_rejects_non_object_settings() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("settings.json");
        std::fs::write(&settings, "[1, 2, 3]").unwrap();

        let config = Config::default();
        let err = cmd_setup(&config, &settings, None, vec![]).await.unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
