//! HTTP transport with bearer authentication.
//!
//! Serves the MCP endpoint through rmcp's streamable HTTP service (responses
//! are SSE-framed) behind an `Authorization: Bearer <token>` check. The
//! health endpoint stays open so tunnels and probes can reach it.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use expo_dev_mcp_core::AuthToken;

use crate::protocol::{ExpoDevMcpServer, SERVER_NAME};

/// Path of the MCP endpoint.
pub const MCP_PATH: &str = "/mcp";

/// Path of the unauthenticated health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Build the HTTP router: health, authenticated MCP endpoint, CORS, tracing.
pub fn router(server: ExpoDevMcpServer, token: AuthToken) -> Router {
    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let protected = Router::new()
        .nest_service(MCP_PATH, mcp_service)
        .layer(middleware::from_fn_with_state(
            Arc::new(token),
            require_bearer,
        ));

    Router::new()
        .route(HEALTH_PATH, get(health))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(
    server: ExpoDevMcpServer,
    token: AuthToken,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("HTTP transport listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(server, token))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP transport stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "server": SERVER_NAME,
        "transport": "http",
    }))
}

/// Token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

async fn require_bearer(
    State(token): State<Arc<AuthToken>>,
    request: Request,
    next: Next,
) -> Response {
    let rejection = match bearer_token(request.headers()) {
        None => Some((StatusCode::UNAUTHORIZED, "Missing Bearer token")),
        Some(presented) if !token.verify(presented) => {
            Some((StatusCode::FORBIDDEN, "Invalid token"))
        }
        Some(_) => None,
    };

    if let Some((status, message)) = rejection {
        warn!(
            "Rejected {} {}: {}",
            request.method(),
            request.uri().path(),
            message
        );
        return (status, Json(json!({ "error": message }))).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    use expo_dev_mcp_core::ServerConfig;
    use expo_dev_mcp_device::testing::FakeRunner;
    use expo_dev_mcp_device::DeviceClient;

    fn app() -> Router {
        let client = DeviceClient::new(Arc::new(FakeRunner::new()), &ServerConfig::default());
        router(
            ExpoDevMcpServer::with_client(client),
            AuthToken::new("test-token").unwrap(),
        )
    }

    fn mcp_post(auth: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder()
            .method("POST")
            .uri(MCP_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json, text/event-stream");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder
            .body(Body::from(
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"test","version":"0.0.0"}}}"#,
            ))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri(HEALTH_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["server"], SERVER_NAME);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let response = app().oneshot(mcp_post(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "Missing Bearer token");
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let response = app()
            .oneshot(mcp_post(Some("Basic dGVzdC10b2tlbg==")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_token_is_forbidden() {
        let response = app()
            .oneshot(mcp_post(Some("Bearer nope")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_valid_token_reaches_mcp_service() {
        let response = app()
            .oneshot(mcp_post(Some("Bearer test-token")))
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
        assert_ne!(response.status(), StatusCode::FORBIDDEN);
    }
}
