use assistant_core::{ConfigError, DataDir, StorageConfig, StorageCredentials};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

pub const UPLOAD_CSV_TOOL_NAME: &str = "upload_csv";

/// Every way an upload can fail, whichever backend is selected.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Storage credentials unavailable: {0}")]
    MissingCredentials(#[from] ConfigError),

    #[error("Cannot read local file {path}: {source}")]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot derive an object key from '{0}'")]
    InvalidKey(String),

    #[error("Object store rejected upload: {0}")]
    Store(String),
}

/// Pushes files from the data directory to a public-read bucket.
#[derive(Debug, Clone)]
pub struct ObjectUploader {
    storage: StorageConfig,
    data_dir: DataDir,
    credentials: Option<StorageCredentials>,
}

impl ObjectUploader {
    /// Credentials are read from the backend's environment variables on every
    /// upload.
    pub fn new(storage: StorageConfig, data_dir: DataDir) -> Self {
        Self {
            storage,
            data_dir,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: StorageCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Uploads `file_name` from the data directory and returns its public URL.
    ///
    /// Any failure is logged and reported as `None`; a `None` means the object
    /// may not exist.
    pub async fn upload_file(&self, file_name: &str) -> Option<String> {
        match self.try_upload(file_name).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    backend = %self.storage.backend,
                    bucket = %self.storage.bucket,
                    file_name,
                    "Upload failed: {}",
                    e
                );
                None
            }
        }
    }

    pub async fn try_upload(&self, file_name: &str) -> Result<String, UploadError> {
        let key = object_key(file_name)?;
        let credentials = match &self.credentials {
            Some(credentials) => credentials.clone(),
            None => self.storage.credentials()?,
        };

        let path = self.data_dir.resolve(file_name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| UploadError::LocalFile {
                path: path.clone(),
                source,
            })?;

        let client = self.client(credentials).await;
        client
            .put_object()
            .bucket(&self.storage.bucket)
            .key(&key)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| UploadError::Store(DisplayErrorContext(&e).to_string()))?;

        let url = self.storage.public_url(&key);
        tracing::info!("Uploaded {} to {}", path.display(), url);
        Ok(url)
    }

    async fn client(&self, credentials: StorageCredentials) -> Client {
        let provider = Credentials::new(
            credentials.access_key_id,
            credentials.secret_access_key,
            None,
            None,
            "assistant-storage",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.storage.region.clone()))
            .credentials_provider(provider)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = self.storage.endpoint_url() {
            builder = builder.endpoint_url(endpoint);
        }
        if self.storage.endpoint.is_some() {
            builder = builder.force_path_style(true);
        }
        Client::from_conf(builder.build())
    }
}

/// The object key is the last path component of the caller's file name.
fn object_key(file_name: &str) -> Result<String, UploadError> {
    Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| UploadError::InvalidKey(file_name.to_string()))
}

pub struct UploadCsvTool {
    uploader: ObjectUploader,
}

impl UploadCsvTool {
    pub fn new(uploader: ObjectUploader) -> Self {
        Self { uploader }
    }
}

#[async_trait]
impl Tool for UploadCsvTool {
    fn name(&self) -> &str {
        UPLOAD_CSV_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Upload a CSV file to cloud storage and return its public URL."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_name": {
                    "type": "string",
                    "description": "The file name of the CSV file"
                }
            },
            "required": ["file_name"]
        })
    }

    /// A failed upload is not an error for the agent: the result is `null`.
    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;

        let file_name: String = input
            .get_argument("file_name")
            .map_err(|e| ToolError::invalid_arguments(self.name(), e))?;

        let url = self.uploader.upload_file(&file_name).await;
        ToolOutput::success(url).map_err(|e| ToolError::new(self.name(), e.to_string(), false))
    }
}
