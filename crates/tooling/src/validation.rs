use strum::IntoEnumIterator;

use crate::context::ToolContext;
use crate::error::ToolboxError;
use crate::registry::AvailableTool;

/// Runs every factory once, in declaration order.
///
/// Stops at the first failure and returns it; the list of available tools is
/// only produced when every factory succeeded.
pub async fn validate_startup(context: &ToolContext) -> Result<Vec<AvailableTool>, ToolboxError> {
    let mut available = Vec::new();
    for tool in AvailableTool::iter() {
        if let Err(e) = context.get_tool(tool).validate().await {
            tracing::error!("Startup validation failed for {}: {}", tool, e);
            return Err(e);
        }
        tracing::info!("Validated tool: {}", tool);
        available.push(tool);
    }
    Ok(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::{ActionRunnerConfig, Config};
    use embeddings::FallbackEmbeddingProvider;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;
    use vector_store::VectorStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(data_dir: &std::path::Path, action_runner: ActionRunnerConfig) -> ToolContext {
        let mut config = Config::development();
        config.data.dir = data_dir.to_string_lossy().into_owned();
        config.action_runner = action_runner;
        ToolContext::new(
            &config,
            VectorStore::in_memory(Arc::new(FallbackEmbeddingProvider::new(16))),
        )
    }

    #[tokio::test]
    async fn should_halt_when_action_runner_key_is_missing() {
        std::env::set_var("TEST_VALIDATION_MISSING_KEY_URL", "http://127.0.0.1:9");
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("data");
        let context = context(
            &data_dir,
            ActionRunnerConfig {
                url_env: "TEST_VALIDATION_MISSING_KEY_URL".to_string(),
                api_key_env: "TEST_VALIDATION_MISSING_KEY_UNSET".to_string(),
            },
        );

        let error = validate_startup(&context).await.unwrap_err();

        assert_eq!(
            error.to_string(),
            "Required environment variable 'TEST_VALIDATION_MISSING_KEY_UNSET' is not set"
        );
        // Later factories never ran.
        assert!(!data_dir.exists());
    }

    #[tokio::test]
    async fn should_halt_when_runner_rejects_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/actions"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "status": "error",
                "error": {"message": "Forbidden"}
            })))
            .mount(&server)
            .await;
        std::env::set_var("TEST_VALIDATION_REJECTED_URL", server.uri());
        std::env::set_var("TEST_VALIDATION_REJECTED_KEY", "wrong");
        let temp = TempDir::new().unwrap();
        let context = context(
            temp.path(),
            ActionRunnerConfig {
                url_env: "TEST_VALIDATION_REJECTED_URL".to_string(),
                api_key_env: "TEST_VALIDATION_REJECTED_KEY".to_string(),
            },
        );

        let error = validate_startup(&context).await.unwrap_err();

        assert!(matches!(error, ToolboxError::ActionRunner(_)));
    }

    #[tokio::test]
    async fn should_mark_every_tool_available_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/actions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": []
            })))
            .expect(1)
            .mount(&server)
            .await;
        std::env::set_var("TEST_VALIDATION_OK_URL", server.uri());
        std::env::set_var("TEST_VALIDATION_OK_KEY", "runner-key");
        let temp = TempDir::new().unwrap();
        let context = context(
            temp.path(),
            ActionRunnerConfig {
                url_env: "TEST_VALIDATION_OK_URL".to_string(),
                api_key_env: "TEST_VALIDATION_OK_KEY".to_string(),
            },
        );

        let available = validate_startup(&context).await.unwrap();

        assert_eq!(available, AvailableTool::iter().collect::<Vec<_>>());
        // The toolkit listed during validation is reused afterwards.
        let tools = context
            .get_tool(AvailableTool::Connery)
            .build(&Default::default())
            .await
            .unwrap();
        assert!(tools.is_empty());
    }
}
