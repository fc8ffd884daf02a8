use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};

use crate::data_dir::DataDir;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub pgvector: PgVectorConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub action_runner: ActionRunnerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub dir: String,
}

impl DataConfig {
    pub fn data_dir(&self) -> DataDir {
        DataDir::new(&self.dir)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "fallback".to_string(),
            model: None,
            dimensions: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PgVectorConfig {
    pub url: String,
}

impl PgVectorConfig {
    pub fn with_env_overrides(&self) -> Self {
        let url = env::var("PGVECTOR_URL").unwrap_or_else(|_| self.url.clone());
        Self { url }
    }
}

impl Default for PgVectorConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of memoized retrieval tools kept alive at once.
    pub cache_capacity: usize,
    /// Documents returned per query.
    pub search_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 5,
            search_limit: 4,
        }
    }
}

/// Object storage provider the upload tool talks to.
///
/// Both providers speak the S3 protocol; they differ in endpoint host and in
/// which environment variables carry the credentials.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Wasabi,
}

impl StorageBackend {
    pub fn access_key_env(&self) -> &'static str {
        match self {
            StorageBackend::S3 => "AWS_ACCESS_KEY_ID",
            StorageBackend::Wasabi => "WASABI_ACCESS_KEY",
        }
    }

    pub fn secret_key_env(&self) -> &'static str {
        match self {
            StorageBackend::S3 => "AWS_SECRET_ACCESS_KEY",
            StorageBackend::Wasabi => "WASABI_SECRET_KEY",
        }
    }

    /// Region-scoped service host, without the bucket prefix.
    pub fn service_host(&self, region: &str) -> String {
        match self {
            StorageBackend::S3 => format!("s3.{region}.amazonaws.com"),
            StorageBackend::Wasabi => format!("s3.{region}.wasabisys.com"),
        }
    }

    pub fn endpoint(&self, region: &str) -> String {
        format!("https://{}", self.service_host(region))
    }

    pub fn public_url(&self, bucket: &str, region: &str, key: &str) -> String {
        format!("https://{bucket}.{}/{key}", self.service_host(region))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub region: String,
    /// Overrides the backend's endpoint, e.g. a local MinIO. Objects are then
    /// addressed path-style under this URL.
    pub endpoint: Option<String>,
}

impl StorageConfig {
    pub fn with_env_overrides(&self) -> Self {
        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => StorageBackend::from_str(&value).unwrap_or_else(|_| {
                tracing::warn!("Ignoring unknown STORAGE_BACKEND '{}'", value);
                self.backend
            }),
            Err(_) => self.backend,
        };
        Self {
            backend,
            ..self.clone()
        }
    }

    /// Endpoint handed to the S3 client; `None` lets the SDK resolve the AWS
    /// endpoint for the region.
    pub fn endpoint_url(&self) -> Option<String> {
        match (&self.endpoint, self.backend) {
            (Some(endpoint), _) => Some(endpoint.trim_end_matches('/').to_string()),
            (None, StorageBackend::S3) => None,
            (None, StorageBackend::Wasabi) => Some(self.backend.endpoint(&self.region)),
        }
    }

    /// Deterministic public URL of an uploaded object.
    pub fn public_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key),
            None => self.backend.public_url(&self.bucket, &self.region, key),
        }
    }

    /// Reads the access key pair for the selected backend from the environment.
    pub fn credentials(&self) -> Result<StorageCredentials, ConfigError> {
        let access_key_id = require_env(self.backend.access_key_env())?;
        let secret_access_key = require_env(self.backend.secret_key_env())?;
        Ok(StorageCredentials {
            access_key_id,
            secret_access_key,
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            bucket: "tesa-medication-schedules".to_string(),
            region: "ap-southeast-1".to_string(),
            endpoint: None,
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Names of the environment variables holding the action runner's endpoint
/// and API key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionRunnerConfig {
    pub url_env: String,
    pub api_key_env: String,
}

impl ActionRunnerConfig {
    pub fn credentials(&self) -> Result<ActionRunnerCredentials, ConfigError> {
        Ok(ActionRunnerCredentials {
            runner_url: require_env(&self.url_env)?,
            api_key: require_env(&self.api_key_env)?,
        })
    }
}

impl Default for ActionRunnerConfig {
    fn default() -> Self {
        Self {
            url_env: "CONNERY_RUNNER_URL".to_string(),
            api_key_env: "CONNERY_RUNNER_API_KEY".to_string(),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct ActionRunnerCredentials {
    pub runner_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for ActionRunnerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRunnerCredentials")
            .field("runner_url", &self.runner_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl ServerConfig {
    pub fn with_env_overrides(&self) -> Self {
        let bind = env::var("SERVER_BIND").unwrap_or_else(|_| self.bind.clone());
        Self { bind }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name.to_string())),
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_from_env() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| Self::default_config_path());
        Self::load(Path::new(&config_path))
    }

    pub fn default_config_path() -> String {
        "./config.toml".to_string()
    }

    /// Applies `DATA_DIR`, `PGVECTOR_URL`, `STORAGE_BACKEND` and `SERVER_BIND`.
    pub fn with_env_overrides(self) -> Self {
        let data = DataConfig {
            dir: env::var("DATA_DIR").unwrap_or(self.data.dir),
        };
        Self {
            data,
            pgvector: self.pgvector.with_env_overrides(),
            storage: self.storage.with_env_overrides(),
            server: self.server.with_env_overrides(),
            ..self
        }
    }

    pub fn development() -> Self {
        Self {
            data: DataConfig::default(),
            embedding: EmbeddingConfig::default(),
            pgvector: PgVectorConfig::default(),
            retrieval: RetrievalConfig::default(),
            storage: StorageConfig::default(),
            action_runner: ActionRunnerConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
