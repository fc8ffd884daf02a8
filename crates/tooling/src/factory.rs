use assistant_core::{ActionRunnerConfig, DataDir};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use vector_store::{NamespaceFilter, VectorStore};

use crate::connery::{ConneryService, ConneryToolkit};
use crate::csv_file::CreateCsvTool;
use crate::error::ToolboxError;
use crate::list_files::ListFilesTool;
use crate::registry::AvailableTool;
use crate::retrieval::{RetrievalTool, RetrieverCache, RETRIEVAL_DESCRIPTION};
use crate::tool::Tool;
use crate::upload::{ObjectUploader, UploadCsvTool};

const STARTUP_NAMESPACE: &str = "__startup_check__";

/// Per-session inputs some factories need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub assistant_id: Option<String>,
    pub description: Option<String>,
}

impl ToolRequest {
    pub fn for_assistant(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: Some(assistant_id.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

pub(crate) type SharedToolkit = Arc<OnceCell<Vec<Arc<dyn Tool>>>>;

/// How to construct the tools behind one [`AvailableTool`], with the
/// configuration that construction needs.
pub enum ToolFactory {
    ActionRunner {
        config: ActionRunnerConfig,
        toolkit: SharedToolkit,
    },
    Retrieval {
        store: VectorStore,
        cache: Arc<RetrieverCache>,
        search_limit: usize,
    },
    CreateCsv {
        data_dir: DataDir,
    },
    UploadCsv {
        uploader: ObjectUploader,
    },
    ListFiles {
        data_dir: DataDir,
    },
}

impl ToolFactory {
    pub fn kind(&self) -> AvailableTool {
        match self {
            ToolFactory::ActionRunner { .. } => AvailableTool::Connery,
            ToolFactory::Retrieval { .. } => AvailableTool::Retrieval,
            ToolFactory::CreateCsv { .. } => AvailableTool::CreateCsv,
            ToolFactory::UploadCsv { .. } => AvailableTool::UploadCsv,
            ToolFactory::ListFiles { .. } => AvailableTool::GetAllFiles,
        }
    }

    /// Constructs the tools. The action runner yields one tool per remote
    /// action; every other factory yields exactly one.
    pub async fn build(&self, request: &ToolRequest) -> Result<Vec<Arc<dyn Tool>>, ToolboxError> {
        match self {
            ToolFactory::ActionRunner { config, toolkit } => load_action_tools(config, toolkit).await,
            ToolFactory::Retrieval {
                store,
                cache,
                search_limit,
            } => {
                let assistant_id = request
                    .assistant_id
                    .as_deref()
                    .ok_or(ToolboxError::MissingParameter("assistant_id"))?;
                let description = request.description.as_deref().unwrap_or(RETRIEVAL_DESCRIPTION);
                let tool = cache.get_or_insert_with(assistant_id, description, || {
                    RetrievalTool::new(store, assistant_id, description, *search_limit)
                });
                Ok(vec![tool as Arc<dyn Tool>])
            }
            ToolFactory::CreateCsv { data_dir } => {
                Ok(vec![Arc::new(CreateCsvTool::new(data_dir.clone())) as Arc<dyn Tool>])
            }
            ToolFactory::UploadCsv { uploader } => {
                Ok(vec![Arc::new(UploadCsvTool::new(uploader.clone())) as Arc<dyn Tool>])
            }
            ToolFactory::ListFiles { data_dir } => {
                Ok(vec![Arc::new(ListFilesTool::new(data_dir.clone())) as Arc<dyn Tool>])
            }
        }
    }

    /// Exercises construction once. Upload credentials are read per call and
    /// are not checked here.
    pub async fn validate(&self) -> Result<(), ToolboxError> {
        match self {
            ToolFactory::ActionRunner { config, toolkit } => {
                load_action_tools(config, toolkit).await?;
            }
            ToolFactory::Retrieval {
                store,
                search_limit,
                ..
            } => {
                store
                    .index()
                    .document_count(&NamespaceFilter::tag(STARTUP_NAMESPACE))
                    .await
                    .map_err(ToolboxError::VectorStore)?;
                let _tool =
                    RetrievalTool::new(store, STARTUP_NAMESPACE, RETRIEVAL_DESCRIPTION, *search_limit);
            }
            ToolFactory::CreateCsv { data_dir } | ToolFactory::ListFiles { data_dir } => {
                data_dir.ensure().await?;
            }
            ToolFactory::UploadCsv { .. } => {
                self.build(&ToolRequest::default()).await?;
            }
        }
        Ok(())
    }
}

/// Lists the runner's actions on first use; later calls reuse that list.
async fn load_action_tools(
    config: &ActionRunnerConfig,
    toolkit: &SharedToolkit,
) -> Result<Vec<Arc<dyn Tool>>, ToolboxError> {
    let tools = toolkit
        .get_or_try_init(|| async {
            let credentials = config.credentials()?;
            let service = Arc::new(ConneryService::new(credentials)?);
            let toolkit = ConneryToolkit::create_instance(service).await?;
            Ok::<_, ToolboxError>(toolkit.get_tools())
        })
        .await?;
    Ok(tools.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use embeddings::FallbackEmbeddingProvider;
    use tempfile::TempDir;

    fn retrieval_factory(cache: Arc<RetrieverCache>) -> ToolFactory {
        ToolFactory::Retrieval {
            store: VectorStore::in_memory(Arc::new(FallbackEmbeddingProvider::new(32))),
            cache,
            search_limit: 4,
        }
    }

    #[tokio::test]
    async fn should_require_assistant_id_for_retrieval() {
        let factory = retrieval_factory(Arc::new(RetrieverCache::new(5)));

        let error = factory.build(&ToolRequest::default()).await.err().unwrap();

        assert!(matches!(error, ToolboxError::MissingParameter("assistant_id")));
    }

    #[tokio::test]
    async fn should_default_retrieval_description() {
        let cache = Arc::new(RetrieverCache::new(5));
        let factory = retrieval_factory(Arc::clone(&cache));

        let tools = factory.build(&ToolRequest::for_assistant("a-1")).await.unwrap();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "Retriever");
        assert_eq!(tools[0].description(), RETRIEVAL_DESCRIPTION);
        assert!(cache.contains("a-1", RETRIEVAL_DESCRIPTION));
    }

    #[tokio::test]
    async fn should_validate_retrieval_without_touching_cache() {
        let cache = Arc::new(RetrieverCache::new(5));
        let factory = retrieval_factory(Arc::clone(&cache));

        factory.validate().await.unwrap();

        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn should_create_data_dir_when_validating_file_tools() {
        let temp = TempDir::new().unwrap();
        let data_dir = DataDir::new(temp.path().join("data"));
        let factory = ToolFactory::ListFiles {
            data_dir: data_dir.clone(),
        };

        factory.validate().await.unwrap();

        assert!(data_dir.path().is_dir());
        assert_eq!(factory.kind(), AvailableTool::GetAllFiles);
    }

    #[tokio::test]
    async fn should_fail_action_runner_without_env() {
        let factory = ToolFactory::ActionRunner {
            config: ActionRunnerConfig {
                url_env: "TEST_FACTORY_RUNNER_URL_UNSET".to_string(),
                api_key_env: "TEST_FACTORY_RUNNER_KEY_UNSET".to_string(),
            },
            toolkit: SharedToolkit::default(),
        };

        let error = factory.build(&ToolRequest::default()).await.err().unwrap();

        assert!(matches!(error, ToolboxError::MissingEnv(_)));
        assert!(error.is_configuration_error());
    }
}
