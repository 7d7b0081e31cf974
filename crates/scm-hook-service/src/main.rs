//! # scm-hook Service
//!
//! Binary entry point for the scm-hook HTTP service.
//!
//! This executable:
//! - Loads configuration from files and environment
//! - Initializes logging
//! - Builds the shared GitLab client and the optional global rule configuration
//! - Starts the HTTP server from scm-hook-api

use gitlab_client::GitLabClient;
use scm_hook_api::{start_server, LoggingConfig, ServiceConfig, ServiceError};
use scm_hook_core::{ConfigCheckProcessor, RuleConfig};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CONFIG_FILE_ENV: &str = "SCM_HOOK_CONFIG_FILE";

#[tokio::main]
async fn main() {
    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order, later sources override earlier ones):
    //  1. /etc/scm-hook/service.yaml      system-wide defaults
    //  2. ./config/service.yaml           deployment-local override
    //  3. Path given by SCM_HOOK_CONFIG_FILE
    //  4. Environment variables prefixed SCM_HOOK (double-underscore separator)
    //     e.g. SCM_HOOK__SERVER__PORT=9090 sets server.port = 9090
    //
    // Every field has a serde default, so no files at all is valid. A
    // malformed file or an uncoercible variable is a hard error.
    // -------------------------------------------------------------------------
    let loaded = load_configuration();

    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);

    info!("Starting scm-hook service");

    let service_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(
                error = %e,
                "Could not load service configuration; aborting. \
                 Fix the configuration and restart."
            );
            std::process::exit(3);
        }
    };

    if let Ok(explicit_path) = std::env::var(CONFIG_FILE_ENV) {
        if !explicit_path.is_empty() {
            info!(path = %explicit_path, "Loaded configuration from explicit path");
        }
    }

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    // -------------------------------------------------------------------------
    // Shared GitLab client
    //
    // Built once; every request reuses its connection pool.
    // -------------------------------------------------------------------------
    let client = match GitLabClient::builder(service_config.gitlab.token.clone())
        .config(service_config.gitlab.client_config())
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to construct GitLab client; aborting");
            std::process::exit(4);
        }
    };

    // -------------------------------------------------------------------------
    // Global rule configuration
    //
    // Loaded once. A configured file that does not load stops startup rather
    // than silently running without the fallback.
    // -------------------------------------------------------------------------
    let global = match &service_config.rules.global_config_file_path {
        Some(path) => match RuleConfig::load_from_file(path) {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    labels = config.labels.len(),
                    actions = config.actions.len(),
                    "Loaded global rule configuration"
                );
                Some(Arc::new(config))
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load global rule configuration; aborting"
                );
                std::process::exit(5);
            }
        },
        None => None,
    };

    if service_config.webhooks.secret.is_empty() {
        warn!(
            "No webhook secret configured; every delivery will be accepted. \
             Do not use in production."
        );
    }

    let processor = Arc::new(ConfigCheckProcessor::new(
        service_config.rules.config_file_path.clone(),
    ));

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        endpoint = %service_config.webhooks.endpoint_path,
        gitlab = %client.base_url(),
        "Starting HTTP server"
    );

    if let Err(e) = start_server(service_config, Arc::new(client), processor, global).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }
}

fn load_configuration() -> Result<ServiceConfig, config::ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/scm-hook/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    if let Ok(explicit_path) = std::env::var(CONFIG_FILE_ENV) {
        if !explicit_path.is_empty() {
            builder = builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }
    }

    builder
        .add_source(config::Environment::with_prefix("SCM_HOOK").separator("__"))
        .build()?
        .try_deserialize()
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &logging.level;
        EnvFilter::new(format!(
            "scm_hook_service={level},scm_hook_api={level},scm_hook_core={level},tower_http=debug"
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
