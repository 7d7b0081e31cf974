//! # scm-hook HTTP Service
//!
//! HTTP server receiving GitLab merge request and note webhooks and driving
//! them through the scm-hook pipeline:
//!
//! 1. Authenticate the `X-Gitlab-Token` header
//! 2. Require `Content-Type: application/json` and a non-empty body
//! 3. Decode and route the event to a merge request and commit
//! 4. Build the request context and its tracing span
//! 5. Resolve the rule configuration
//! 6. Hand everything to the merge request processor
//!
//! A static `GET /_status` endpoint is served alongside the webhook route.

pub mod config;
pub mod errors;

pub use config::{
    GitLabConfig, LoggingConfig, RulesConfig, ServerConfig, ServiceConfig, WebhookConfig,
    STATUS_PATH,
};
pub use errors::{ConfigError, ServiceError, WebhookHandlerError};

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    routing::{get, post},
    Router,
};
use scm_hook_core::{
    AuthGate, ConfigResolver, MergeRequestProcessor, RequestContext, RuleConfig, ScmClient,
    WebhookEnvelope, GITLAB_TOKEN_HEADER,
};
use std::{future::IntoFuture, sync::Arc, time::Duration};
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn, Instrument};

/// Body returned for a fully processed delivery
pub const SUCCESS_BODY: &str = "OK";

/// Body returned by the status endpoint
pub const STATUS_BODY: &str =
    "scm-hook status: OK\n\nNOTE: this is a static 'OK', no actual checks are being made";

const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
///
/// Built once at startup. Cloning is cheap; every handle is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: Arc<ServiceConfig>,

    pub auth: AuthGate,

    /// Hosting platform client shared by every request
    pub client: Arc<dyn ScmClient>,

    pub resolver: Arc<ConfigResolver>,

    /// Rule engine entry point
    pub processor: Arc<dyn MergeRequestProcessor>,
}

impl AppState {
    /// Create new application state
    ///
    /// `global` is the process-wide fallback rule configuration, loaded by
    /// the caller from `rules.global_config_file_path`.
    pub fn new(
        config: ServiceConfig,
        client: Arc<dyn ScmClient>,
        processor: Arc<dyn MergeRequestProcessor>,
        global: Option<Arc<RuleConfig>>,
    ) -> Self {
        let auth = AuthGate::new(config.webhooks.secret.clone());
        let resolver = ConfigResolver::new(config.rules.config_file_path.clone(), global);

        Self {
            config: Arc::new(config),
            auth,
            client,
            resolver: Arc::new(resolver),
            processor,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with the webhook and status endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(&state.config.webhooks.endpoint_path, post(handle_webhook))
        .route(STATUS_PATH, get(handle_status))
        // Error responses are logged once, by `WebhookHandlerError`.
        .layer(TraceLayer::new_for_http().on_failure(()))
        .with_state(state)
}

/// Start HTTP server
///
/// Runs until SIGINT or SIGTERM. In-flight requests get
/// `server.shutdown_timeout_seconds` to finish after the signal.
pub async fn start_server(
    config: ServiceConfig,
    client: Arc<dyn ScmClient>,
    processor: Arc<dyn MergeRequestProcessor>,
    global: Option<Arc<RuleConfig>>,
) -> Result<(), ServiceError> {
    config.validate()?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);

    let state = AppState::new(config, client, processor, global);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!("Starting HTTP server on {}", address);

    let shutdown_started = Arc::new(Notify::new());
    let signal_notify = Arc::clone(&shutdown_started);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal(shutdown_timeout).await;
            signal_notify.notify_one();
        })
        .into_future();
    tokio::pin!(server);

    let drain_deadline = async {
        shutdown_started.notified().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = &mut server => {
            result.map_err(|e| ServiceError::ServerFailed {
                message: e.to_string(),
            })?;
        }
        _ = drain_deadline => {
            warn!(
                timeout_seconds = shutdown_timeout.as_secs(),
                "Graceful shutdown timed out, abandoning in-flight requests"
            );
        }
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal(shutdown_timeout: Duration) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
        },
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle GitLab webhook requests
///
/// Protocol-tier failures return early with a 4xx/5xx status. Once the
/// request context exists, failures are business-tier: logged inside the
/// context span and answered with `200 OK` and the error text.
#[instrument(skip(state, headers, body))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<&'static str, WebhookHandlerError> {
    let token = headers
        .get(GITLAB_TOKEN_HEADER)
        .map(|value| value.as_bytes());
    state.auth.check(token)?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    if content_type != Some(JSON_CONTENT_TYPE) {
        return Err(WebhookHandlerError::UnsupportedContentType);
    }

    // No size cap; GitLab bounds its own payloads.
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| WebhookHandlerError::UnreadableBody {
            message: e.to_string(),
        })?;
    if body.is_empty() {
        return Err(WebhookHandlerError::EmptyBody);
    }

    let envelope =
        WebhookEnvelope::from_slice(&body).map_err(WebhookHandlerError::MalformedPayload)?;
    let target = envelope.target()?;
    // Routable kinds always carry a project.
    let project = envelope
        .project()
        .map(|project| project.path_with_namespace.clone())
        .unwrap_or_default();
    let ctx = RequestContext::enrich(project, target);

    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(WebhookHandlerError::UntypedPayload)?;

    let span = ctx.span();
    process_event(&state, &ctx, payload).instrument(span).await
}

async fn process_event(
    state: &AppState,
    ctx: &RequestContext,
    payload: serde_json::Value,
) -> Result<&'static str, WebhookHandlerError> {
    info!("Received merge request event");

    let resolved = match state.resolver.resolve(ctx, state.client.as_ref()).await {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(error = %e, "Could not resolve rule configuration");
            return Err(e.into());
        }
    };
    debug!(config_source = resolved.source(), "Rule configuration resolved");

    if let Err(e) = state
        .processor
        .process(ctx, Arc::clone(&state.client), resolved, payload)
        .await
    {
        warn!(error = %e, "Processing merge request event failed");
        return Err(e.into());
    }

    info!("Merge request event processed");
    Ok(SUCCESS_BODY)
}

/// Static liveness endpoint; performs no checks
async fn handle_status() -> &'static str {
    STATUS_BODY
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
