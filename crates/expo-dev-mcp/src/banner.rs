//! Connection instructions printed when the HTTP transport starts.

use serde_json::{json, Value};

use expo_dev_mcp_core::AuthToken;

use crate::http::MCP_PATH;

/// Key under `mcpServers` in the generated client configuration.
pub const CLIENT_SERVER_KEY: &str = "expo-dev";

/// Client configuration pointing at `base_url` with the bearer token.
pub fn connection_config(base_url: &str, token: &AuthToken) -> Value {
    json!({
        "mcpServers": {
            CLIENT_SERVER_KEY: {
                "type": "http",
                "url": format!("{}{}", base_url.trim_end_matches('/'), MCP_PATH),
                "headers": {
                    "Authorization": format!("Bearer {}", token.as_str())
                }
            }
        }
    })
}

/// Startup banner for HTTP mode.
pub fn startup_banner(host: &str, port: u16, token: &AuthToken) -> String {
    let rule = "=".repeat(60);
    let thin = "-".repeat(60);
    let config = connection_config("https://YOUR-NGROK-URL", token);
    let snippet = serde_json::to_string_pretty(&config).unwrap_or_default();

    format!(
        "{rule}\n\
         Expo Dev MCP Server (HTTP Mode)\n\
         {rule}\n\n\
         Server running on http://{host}:{port}\n\n\
         Auth Token: {token}\n\n\
         {thin}\n\
         To expose via ngrok, run in another terminal:\n  \
         ngrok http {port}\n\n\
         Then configure your MCP client with the ngrok URL:\n\n\
         {snippet}\n\
         {thin}\n\
         {rule}",
        token = token.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_shape() {
        let token = AuthToken::new("abc123").unwrap();
        let config = connection_config("https://example.ngrok.app/", &token);
        let server = &config["mcpServers"]["expo-dev"];
        assert_eq!(server["type"], "http");
        assert_eq!(server["url"], "https://example.ngrok.app/mcp");
        assert_eq!(server["headers"]["Authorization"], "Bearer abc123");
    }

    #[test]
    fn test_banner_mentions_port_and_token() {
        let token = AuthToken::new("tok-42").unwrap();
        let banner = startup_banner("0.0.0.0", 9000, &token);
        assert!(banner.contains("Server running on http://0.0.0.0:9000"));
        assert!(banner.contains("Auth Token: tok-42"));
        assert!(banner.contains("ngrok http 9000"));
        assert!(banner.contains("\"Authorization\": \"Bearer tok-42\""));
        assert!(banner.contains("https://YOUR-NGROK-URL/mcp"));
    }
}
