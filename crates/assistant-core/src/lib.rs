pub mod config;
pub mod data_dir;
pub mod error;

pub use config::{
    ActionRunnerConfig, ActionRunnerCredentials, Config, DataConfig, EmbeddingConfig,
    PgVectorConfig, RetrievalConfig, ServerConfig, StorageBackend, StorageConfig,
    StorageCredentials,
};
pub use data_dir::DataDir;
pub use error::ConfigError;
