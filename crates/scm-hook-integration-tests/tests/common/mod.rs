//! Common test utilities for scm-hook integration tests
//!
//! The pipeline runs for real: a `GitLabClient` pointed at a wiremock GitLab,
//! the `ConfigCheckProcessor`, and the router from `scm-hook-api`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gitlab_client::{ClientConfig, GitLabClient};
use scm_hook_api::{create_router, AppState, ServiceConfig};
use scm_hook_core::{ConfigCheckProcessor, RuleConfig};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

pub const WEBHOOK_SECRET: &str = "integration-secret";
pub const GITLAB_TOKEN: &str = "glpat-integration";
#[allow(dead_code)]
pub const PROJECT: &str = "acme/widgets";
#[allow(dead_code)]
pub const COMMIT_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Path of `.scm-engine.yml` for [`PROJECT`] on the mock GitLab
#[allow(dead_code)]
pub const CONFIG_FILE_PATH: &str =
    "/api/v4/projects/acme%2Fwidgets/repository/files/.scm-engine.yml/raw";

#[allow(dead_code)]
pub const VALID_RULES: &str = r#"
label:
  - name: needs-review
    script: merge_request.state_is("opened")
actions:
  - name: greet
    if: "true"
    then:
      - action: comment
        message: Thanks!
"#;

/// Build a router backed by a real GitLab client talking to `gitlab`.
pub fn build_router(gitlab: &MockServer, global: Option<Arc<RuleConfig>>) -> Router {
    let mut config = ServiceConfig::default();
    config.webhooks.secret = WEBHOOK_SECRET.to_string();
    config.gitlab.base_url = format!("{}/api/v4", gitlab.uri());
    config.gitlab.token = GITLAB_TOKEN.to_string();

    let client = GitLabClient::builder(config.gitlab.token.clone())
        .config(ClientConfig::default().with_base_url(config.gitlab.base_url.clone()))
        .build()
        .expect("client must build against the mock server");

    let processor = Arc::new(ConfigCheckProcessor::new(
        config.rules.config_file_path.clone(),
    ));

    create_router(AppState::new(config, Arc::new(client), processor, global))
}

#[allow(dead_code)]
pub fn merge_request_payload() -> String {
    serde_json::json!({
        "object_kind": "merge_request",
        "event_type": "merge_request",
        "user": { "username": "octo" },
        "project": { "id": 1, "path_with_namespace": PROJECT },
        "object_attributes": {
            "iid": 101,
            "action": "open",
            "state": "opened",
            "last_commit": { "id": COMMIT_SHA, "message": "Initial" }
        }
    })
    .to_string()
}

#[allow(dead_code)]
pub fn note_payload() -> String {
    serde_json::json!({
        "object_kind": "note",
        "event_type": "note",
        "project": { "id": 1, "path_with_namespace": PROJECT },
        "object_attributes": { "note": "please re-run", "noteable_type": "MergeRequest" },
        "merge_request": {
            "iid": 101,
            "last_commit": { "id": COMMIT_SHA }
        }
    })
    .to_string()
}

/// POST `body` to the default endpoint with the correct token and content type.
#[allow(dead_code)]
pub fn webhook_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/gitlab")
        .header("X-Gitlab-Token", WEBHOOK_SECRET)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
