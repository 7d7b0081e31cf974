//! Tests for [`ServiceConfig`] defaults, deserialization and validation.

use super::*;

#[test]
fn test_defaults() {
    let config = ServiceConfig::default();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.shutdown_timeout_seconds, 30);
    assert_eq!(config.webhooks.endpoint_path, "/gitlab");
    assert!(config.webhooks.secret.is_empty());
    assert_eq!(config.gitlab.base_url, "https://gitlab.com/api/v4");
    assert_eq!(config.gitlab.timeout_seconds, 30);
    assert_eq!(config.rules.config_file_path, ".scm-engine.yml");
    assert!(config.rules.global_config_file_path.is_none());
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json_format);

    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_yaml_fills_defaults() {
    let yaml = r#"
server:
  port: 9090
webhooks:
  secret: s3cret
rules:
  global_config_file_path: /etc/scm-hook/global.yml
"#;
    let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.webhooks.secret, "s3cret");
    assert_eq!(config.webhooks.endpoint_path, "/gitlab");
    assert_eq!(
        config.rules.global_config_file_path,
        Some(PathBuf::from("/etc/scm-hook/global.yml"))
    );
    assert_eq!(config.rules.config_file_path, ".scm-engine.yml");
}

#[test]
fn test_zero_port_is_rejected() {
    let mut config = ServiceConfig::default();
    config.server.port = 0;

    assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_endpoint_path_rules() {
    for bad in ["", "gitlab", STATUS_PATH] {
        let mut config = ServiceConfig::default();
        config.webhooks.endpoint_path = bad.to_string();

        assert!(
            config.validate().is_err(),
            "endpoint path {:?} should be rejected",
            bad
        );
    }

    let mut config = ServiceConfig::default();
    config.webhooks.endpoint_path = "/hooks/gitlab".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_gitlab_base_url_is_rejected() {
    let mut config = ServiceConfig::default();
    config.gitlab.base_url = " ".to_string();

    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("gitlab.base_url"));
}

#[test]
fn test_client_config_follows_gitlab_section() {
    let mut config = ServiceConfig::default();
    config.gitlab.base_url = "https://gitlab.internal/api/v4".to_string();
    config.gitlab.timeout_seconds = 5;
    config.gitlab.user_agent = "scm-hook-test".to_string();

    let client = config.gitlab.client_config();

    assert_eq!(client.base_url, "https://gitlab.internal/api/v4");
    assert_eq!(client.timeout, Duration::from_secs(5));
    assert_eq!(client.user_agent, "scm-hook-test");
}

#[test]
fn test_debug_output_redacts_secrets() {
    let mut config = ServiceConfig::default();
    config.webhooks.secret = "webhook-secret-value".to_string();
    config.gitlab.token = "glpat-token-value".to_string();

    let debug_str = format!("{:?}", config);

    assert!(!debug_str.contains("webhook-secret-value"), "{debug_str}");
    assert!(!debug_str.contains("glpat-token-value"), "{debug_str}");
    assert!(debug_str.contains("REDACTED"));
}
