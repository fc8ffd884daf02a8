use anyhow::{Context as _, Result};
use assistant_core::{ActionRunnerConfig, Config, DataDir, StorageConfig};
use embeddings::create_embedding_provider;
use std::sync::Arc;
use vector_store::VectorStore;

use crate::error::ToolboxError;
use crate::factory::{SharedToolkit, ToolFactory};
use crate::registry::AvailableTool;
use crate::retrieval::{RetrievalTool, RetrieverCache};
use crate::upload::ObjectUploader;

/// Application-wide state the tool factories draw on.
pub struct ToolContext {
    data_dir: DataDir,
    store: VectorStore,
    storage: StorageConfig,
    action_runner: ActionRunnerConfig,
    search_limit: usize,
    retrievers: Arc<RetrieverCache>,
    action_tools: SharedToolkit,
}

impl ToolContext {
    pub fn new(config: &Config, store: VectorStore) -> Self {
        Self {
            data_dir: config.data.data_dir(),
            store,
            storage: config.storage.clone(),
            action_runner: config.action_runner.clone(),
            search_limit: config.retrieval.search_limit,
            retrievers: Arc::new(RetrieverCache::new(config.retrieval.cache_capacity)),
            action_tools: SharedToolkit::default(),
        }
    }

    /// Connects the embedding provider and vector store named in `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let embedder: Arc<dyn embeddings::EmbeddingProvider> =
            Arc::from(create_embedding_provider(&config.embedding)?);
        let store = VectorStore::connect(&config.pgvector, embedder)
            .await
            .context("Failed to open vector store")?;
        Ok(Self::new(config, store))
    }

    pub fn data_dir(&self) -> &DataDir {
        &self.data_dir
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn retriever_cache(&self) -> &RetrieverCache {
        &self.retrievers
    }

    pub fn get_tool(&self, tool: AvailableTool) -> ToolFactory {
        match tool {
            AvailableTool::Connery => ToolFactory::ActionRunner {
                config: self.action_runner.clone(),
                toolkit: Arc::clone(&self.action_tools),
            },
            AvailableTool::Retrieval => ToolFactory::Retrieval {
                store: self.store.clone(),
                cache: Arc::clone(&self.retrievers),
                search_limit: self.search_limit,
            },
            AvailableTool::CreateCsv => ToolFactory::CreateCsv {
                data_dir: self.data_dir.clone(),
            },
            AvailableTool::UploadCsv => ToolFactory::UploadCsv {
                uploader: ObjectUploader::new(self.storage.clone(), self.data_dir.clone()),
            },
            AvailableTool::GetAllFiles => ToolFactory::ListFiles {
                data_dir: self.data_dir.clone(),
            },
        }
    }

    pub fn get_tool_by_label(&self, label: &str) -> Result<ToolFactory, ToolboxError> {
        Ok(self.get_tool(AvailableTool::from_label(label)?))
    }

    pub fn get_retrieval_tool(&self, assistant_id: &str, description: &str) -> Arc<RetrievalTool> {
        self.retrievers.get_or_insert_with(assistant_id, description, || {
            RetrievalTool::new(&self.store, assistant_id, description, self.search_limit)
        })
    }
}
