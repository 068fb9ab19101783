use serde::Deserialize;

/// Credentials and target folder for the Cloudinary image host.
#[derive(Clone, Debug, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_folder")]
    pub folder: String,
}

/// Configuration options for the quiz bank service.
///
/// Loaded once at start-up and shared with handlers as `web::Data`.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Path to the SQLite database file.
    pub database_url: String,
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
    /// Enables `Secure` session cookies.
    #[serde(default)]
    pub production: bool,
    pub cors_origin: String,
    /// Root directory for day-partitioned error records.
    pub error_log_dir: String,
    pub cloudinary: CloudinaryConfig,
}

fn default_folder() -> String {
    "user_profiles".to_string()
}

fn default_token_ttl() -> i64 {
    3600
}

impl ServerConfig {
    /// Builds the configuration from `config/default.yaml`, an optional
    /// `config/<APP_ENV>.yaml` overlay and `APP_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
