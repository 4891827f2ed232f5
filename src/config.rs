use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docsum server.
///
/// The blob, extraction, and completion settings are required at startup.
/// The search settings are optional here and validated when the search
/// backend is actually used, so a missing setting surfaces as a request-time
/// error naming the offending variable rather than a boot failure.
#[derive(Debug)]
pub struct Config {
    /// Base URL of the object store holding uploaded documents.
    pub blob_endpoint: String,
    /// Shared account key; signs read handles and authenticates uploads.
    pub blob_account_key: String,
    /// Container uploaded documents are written into.
    pub blob_container: String,
    /// Base URL of the content-extraction service.
    pub extraction_endpoint: String,
    /// API key for the content-extraction service.
    pub extraction_api_key: String,
    /// Base URL of the chat-completion service used for summarization.
    pub completion_endpoint: String,
    /// API key for the chat-completion service.
    pub completion_api_key: String,
    /// Model or deployment name sent with each completion request.
    pub completion_deployment: String,
    /// Base URL of the search service, if configured.
    pub search_endpoint: Option<String>,
    /// API key for the search service, if configured.
    pub search_api_key: Option<String>,
    /// Name of the search index summaries are written to, if configured.
    pub search_index_name: Option<String>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            blob_endpoint: load_env("BLOB_ENDPOINT")?,
            blob_account_key: load_env("BLOB_ACCOUNT_KEY")?,
            blob_container: load_env("BLOB_CONTAINER")?,
            extraction_endpoint: load_env("EXTRACTION_ENDPOINT")?,
            extraction_api_key: load_env("EXTRACTION_API_KEY")?,
            completion_endpoint: load_env("COMPLETION_ENDPOINT")?,
            completion_api_key: load_env("COMPLETION_API_KEY")?,
            completion_deployment: load_env("COMPLETION_DEPLOYMENT")?,
            search_endpoint: load_env_optional("SEARCH_ENDPOINT"),
            search_api_key: load_env_optional("SEARCH_API_KEY"),
            search_index_name: load_env_optional("SEARCH_INDEX_NAME"),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        blob_endpoint = %config.blob_endpoint,
        container = %config.blob_container,
        extraction_endpoint = %config.extraction_endpoint,
        completion_deployment = %config.completion_deployment,
        search_configured = config.search_endpoint.is_some(),
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
