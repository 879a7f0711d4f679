//! Orgfin API Server
//!
//! Main entry point for the student organization finance service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orgfin_api::{AppState, create_router};
use orgfin_core::storage::{StorageConfig, StorageProvider, StorageService};
use orgfin_db::connect_with_pool;
use orgfin_shared::config::{StorageBackend, StorageSettings};
use orgfin_shared::{AppConfig, EmailService, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orgfin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.session.secret.clone(),
        session_expires_minutes: config.session.ttl_minutes,
    });

    let storage = match &config.storage {
        Some(settings) => {
            let service = StorageService::from_config(storage_config(settings)?)?;
            info!(
                provider = service.provider_name(),
                bucket = service.bucket(),
                "Object storage configured"
            );
            Some(Arc::new(service))
        }
        None => {
            warn!("No object storage configured; receipt and picture uploads are disabled");
            None
        }
    };

    let report_template = match tokio::fs::read(&config.report.template_path).await {
        Ok(bytes) => {
            info!(path = %config.report.template_path, "Report template loaded");
            Some(Arc::new(bytes))
        }
        Err(e) => {
            warn!(
                path = %config.report.template_path,
                error = %e,
                "Report template unavailable; DOCX downloads are disabled"
            );
            None
        }
    };

    let email_service = config.email.clone().map(|email| {
        info!(
            smtp_host = %email.smtp_host,
            smtp_port = %email.smtp_port,
            "Email service configured"
        );
        Arc::new(EmailService::new(email))
    });

    if config.session.expose_reset_token {
        warn!(
            "Password reset tokens are returned to the caller; anyone who knows an OSAS \
             username can reset that password. Set ORGFIN__SESSION__EXPOSE_RESET_TOKEN=false \
             once email is configured"
        );
    }

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        email_service,
        storage,
        report_template,
        secure_cookies: config.session.secure_cookies,
        expose_reset_token: config.session.expose_reset_token,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn storage_config(settings: &StorageSettings) -> anyhow::Result<StorageConfig> {
    let provider = match settings.backend {
        StorageBackend::S3 => StorageProvider::s3(
            settings
                .endpoint
                .clone()
                .context("storage.endpoint is required for the s3 backend")?,
            settings.bucket.clone(),
            settings.access_key_id.clone().unwrap_or_default(),
            settings.secret_access_key.clone().unwrap_or_default(),
            settings.region.clone(),
        ),
        StorageBackend::LocalFs => {
            StorageProvider::local_fs(settings.local_root.clone(), settings.bucket.clone())
        }
    };

    let mut config = StorageConfig::new(provider).with_max_file_size(settings.max_upload_bytes);
    if let Some(url) = &settings.public_base_url {
        config = config.with_public_base_url(url.clone());
    }
    Ok(config)
}
