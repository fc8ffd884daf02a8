use assistant_core::{ActionRunnerConfig, Config};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use embeddings::FallbackEmbeddingProvider;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;
use tooling::{validate_startup, AvailableTool, ToolContext};
use tower::ServiceExt;
use vector_store::VectorStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(data_dir: &std::path::Path, action_runner: ActionRunnerConfig) -> Arc<ToolContext> {
    let mut config = Config::development();
    config.data.dir = data_dir.to_string_lossy().into_owned();
    config.action_runner = action_runner;
    let store = VectorStore::in_memory(Arc::new(FallbackEmbeddingProvider::new(128)));
    Arc::new(ToolContext::new(&config, store))
}

async fn call(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tools/invoke")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn should_create_then_list_medication_schedules() {
    let temp = TempDir::new().unwrap();
    let app = server::create_app(context(temp.path(), ActionRunnerConfig::default()));

    for file_name in ["a.csv", "b.csv"] {
        let (status, _) = call(
            &app,
            json!({
                "tool": "Create CSV",
                "arguments": {
                    "header": ["medication", "time"],
                    "data": [["Aspirin", "08:00"]],
                    "file_name": file_name
                }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(
        &app,
        json!({
            "tool": "Get all files in data folder",
            "arguments": {"folder_path": "/etc"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let names: HashSet<String> = serde_json::from_value(body["result"].clone()).unwrap();
    assert_eq!(names, HashSet::from(["a.csv".to_string(), "b.csv".to_string()]));
}

#[tokio::test]
async fn should_keep_retrieval_scoped_to_assistant() {
    let temp = TempDir::new().unwrap();
    let context = context(temp.path(), ActionRunnerConfig::default());
    context
        .store()
        .add_texts(
            "alice",
            "schedule.txt",
            vec!["Alice takes metformin after dinner".to_string()],
        )
        .await
        .unwrap();
    context
        .store()
        .add_texts(
            "bob",
            "schedule.txt",
            vec!["Bob takes metformin before breakfast".to_string()],
        )
        .await
        .unwrap();
    let app = server::create_app(Arc::clone(&context));

    let (status, body) = call(
        &app,
        json!({
            "tool": "Retrieval",
            "assistant_id": "bob",
            "arguments": {"query": "when is metformin taken"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "Bob takes metformin before breakfast");
    assert_eq!(context.retriever_cache().len(), 1);
}

#[tokio::test]
async fn should_return_null_url_when_upload_source_is_missing() {
    let temp = TempDir::new().unwrap();
    let app = server::create_app(context(temp.path(), ActionRunnerConfig::default()));

    let (status, body) = call(
        &app,
        json!({"tool": "Upload CSV", "arguments": {"file_name": "missing.csv"}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["result"], Value::Null);
}

#[tokio::test]
async fn should_validate_and_run_connery_action() {
    let runner = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/actions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": [{
                "id": "A1",
                "key": "notifyCaregiver",
                "title": "Notify caregiver",
                "description": "Send a reminder to the caregiver",
                "inputParameters": [
                    {"key": "message", "title": "Message", "type": "string", "validation": {"required": true}}
                ],
                "outputParameters": []
            }]
        })))
        .expect(1)
        .mount(&runner)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/actions/A1/run"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"output": {"delivered": "true"}}
        })))
        .mount(&runner)
        .await;
    std::env::set_var("SERVER_TEST_RUNNER_URL", runner.uri());
    std::env::set_var("SERVER_TEST_RUNNER_KEY", "key");

    let temp = TempDir::new().unwrap();
    let context = context(
        temp.path(),
        ActionRunnerConfig {
            url_env: "SERVER_TEST_RUNNER_URL".to_string(),
            api_key_env: "SERVER_TEST_RUNNER_KEY".to_string(),
        },
    );
    let available = validate_startup(&context).await.unwrap();
    assert_eq!(available.first(), Some(&AvailableTool::Connery));

    let app = server::create_app(context);
    let (status, body) = call(
        &app,
        json!({
            "tool": "\"AI Action Runner\" by Connery",
            "arguments": {"message": "Evening dose due"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!({"delivered": "true"}));
}

#[tokio::test]
async fn should_refuse_startup_without_runner_key() {
    let temp = TempDir::new().unwrap();
    let context = context(
        temp.path(),
        ActionRunnerConfig {
            url_env: "SERVER_TEST_UNSET_URL".to_string(),
            api_key_env: "SERVER_TEST_UNSET_KEY".to_string(),
        },
    );

    assert!(validate_startup(&context).await.is_err());
}
