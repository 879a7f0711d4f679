//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Cookie session configuration.
    pub session: SessionConfig,
    /// Object storage for receipts and profile pictures.
    #[serde(default)]
    pub storage: Option<StorageSettings>,
    /// Report document settings.
    #[serde(default)]
    pub report: ReportConfig,
    /// Outgoing email. Password reset emails are skipped when absent.
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Cookie session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Secret key for signing session tokens.
    pub secret: String,
    /// Session lifetime in minutes.
    #[serde(default = "default_session_ttl")]
    pub ttl_minutes: i64,
    /// Sets the `Secure` attribute on session cookies.
    #[serde(default)]
    pub secure_cookies: bool,
    /// Returns OSAS password reset tokens in the response body.
    #[serde(default = "default_expose_reset_token")]
    pub expose_reset_token: bool,
}

fn default_expose_reset_token() -> bool {
    true
}

fn default_session_ttl() -> i64 {
    720 // 12 hours
}

/// Which object store backs uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// S3-compatible endpoint (Supabase Storage, R2, AWS).
    S3,
    /// Local directory, development only.
    LocalFs,
}

/// Object storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage backend.
    pub backend: StorageBackend,
    /// Bucket that holds receipt images.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// S3 endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// S3 region.
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 access key ID.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// S3 secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Root directory for the local backend.
    #[serde(default = "default_local_root")]
    pub local_root: String,
    /// Base URL of the public object endpoint, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: u64,
}

fn default_bucket() -> String {
    "Receipts".to_string()
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_local_root() -> String {
    "./storage".to_string()
}

fn default_max_upload() -> u64 {
    10 * 1024 * 1024
}

/// Report document settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Path of the DOCX template used for liquidation reports.
    #[serde(default = "default_template_path")]
    pub template_path: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
        }
    }
}

fn default_template_path() -> String {
    "templates/financial_report.docx".to_string()
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP server host.
    pub smtp_host: String,
    /// SMTP server port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Frontend base URL used in emailed links.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "osas@localhost".to_string(),
            from_name: default_from_name(),
            frontend_url: default_frontend_url(),
        }
    }
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_name() -> String {
    "OSAS".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ORGFIN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("ORGFIN__DATABASE__URL", Some("postgres://localhost/orgfin")),
                ("ORGFIN__SESSION__SECRET", Some("secret")),
                ("ORGFIN__SERVER__PORT", Some("9000")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/orgfin");
                assert_eq!(config.session.secret, "secret");
                assert_eq!(config.session.ttl_minutes, 720);
                assert!(config.session.expose_reset_token);
                assert_eq!(config.server.port, 9000);
                assert_eq!(config.server.host, "0.0.0.0");
                assert!(config.storage.is_none());
                assert!(config.email.is_none());
                assert_eq!(
                    config.report.template_path,
                    "templates/financial_report.docx"
                );
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("ORGFIN__DATABASE__URL", None::<&str>),
                ("ORGFIN__SESSION__SECRET", Some("secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
