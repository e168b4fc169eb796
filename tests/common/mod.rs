//! Common test utilities and helpers.

#![allow(dead_code)]

use axum::Json;
use cms_routes::{
    config::{AuthConfig, Config, CredentialConfig, LoggingConfig, RateLimitConfig, ServerConfig},
    create_router, routes, ActionContext, ActionRegistry, AppState,
};
use serde_json::{json, Map, Value};
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;
use tokio::net::TcpListener as TokioTcpListener;

pub const ADMIN_TOKEN: &str = "alice-admin-token";
pub const EDITOR_TOKEN: &str = "bob-editor-token";

/// Test server instance
pub struct TestServer {
    pub base_url: String,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a test server with an echo action for every handler
    pub async fn start() -> Self {
        Self::start_with_actions(echo_actions(&[])).await
    }

    /// Start a test server with the given actions
    pub async fn start_with_actions(actions: ActionRegistry) -> Self {
        let port = get_available_port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(create_test_config(port, &base_url), actions)
            .expect("Failed to create app state");
        let app = create_router(state);

        let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();
        let listener = TokioTcpListener::bind(addr)
            .await
            .expect("Failed to bind listener");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            tokio::select! {
                _ = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()) => {}
                _ = shutdown_rx => {}
            }
        });

        // Give the server time to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get HTTP client
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap()
    }

    /// Absolute URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Create test configuration
fn create_test_config(port: u16, base_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            base_url: base_url.to_string(),
            request_timeout: 30,
            max_body_size: 1024 * 1024,
        },
        auth: AuthConfig {
            admin_role: "admin".to_string(),
            credentials: vec![
                CredentialConfig {
                    user: "alice".to_string(),
                    token: ADMIN_TOKEN.to_string(),
                    roles: vec!["admin".to_string()],
                },
                CredentialConfig {
                    user: "bob".to_string(),
                    token: EDITOR_TOKEN.to_string(),
                    roles: vec!["editor".to_string()],
                },
            ],
        },
        rate_limit: RateLimitConfig::default(),
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Find an available TCP port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to random port")
        .local_addr()
        .expect("Failed to get local address")
        .port()
}

/// Describes the dispatched route instead of doing controller work
pub async fn echo(ctx: ActionContext) -> Json<Value> {
    let params: Map<String, Value> = ctx
        .params
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();

    let pairs: Vec<(&str, &str)> = ctx.params.iter().collect();
    let url = ctx
        .route
        .name
        .as_deref()
        .and_then(|name| ctx.url_for(name, &pairs).ok());

    Json(json!({
        "route": ctx.route.name,
        "handler": ctx.route.handler.to_string(),
        "params": params,
        "user": ctx.identity().map(|identity| identity.user.clone()),
        "url": url,
    }))
}

/// Echo actions for every handler in the route table except `skip`
/// (given as `namespace::Controller@action`)
pub fn echo_actions(skip: &[&str]) -> ActionRegistry {
    let table = routes::load().expect("route table should build");
    let mut actions = ActionRegistry::new();

    for route in table.routes() {
        if !skip.contains(&route.handler.to_string().as_str()) {
            actions.register(route.handler.clone(), echo);
        }
    }

    actions
}
