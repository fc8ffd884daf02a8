//! Client for a Connery action runner and the tools it exposes.
//!
//! The runner publishes a list of actions, each with typed string inputs.
//! Every action becomes one [`ActionTool`] whose schema is derived from the
//! action's input parameters.

use assistant_core::ActionRunnerCredentials;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Error, Debug)]
pub enum ConneryError {
    #[error("HTTP request to action runner failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Action runner rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected action runner response: {0}")]
    Decode(String),

    #[error("Action '{action}' failed: {message}")]
    ActionFailed { action: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConneryAction {
    pub id: String,
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub plugin_id: Option<String>,
    #[serde(default)]
    pub input_parameters: Vec<InputParameter>,
    #[serde(default)]
    pub output_parameters: Vec<OutputParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputParameter {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub validation: Option<Validation>,
}

impl InputParameter {
    pub fn is_required(&self) -> bool {
        self.validation
            .as_ref()
            .and_then(|validation| validation.required)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(default)]
    pub required: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputParameter {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RunOutput {
    output: HashMap<String, serde_json::Value>,
}

pub struct ConneryService {
    client: reqwest::Client,
    runner_url: String,
    api_key: String,
}

impl std::fmt::Debug for ConneryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConneryService")
            .field("runner_url", &self.runner_url)
            .finish_non_exhaustive()
    }
}

impl ConneryService {
    pub fn new(credentials: ActionRunnerCredentials) -> Result<Self, ConneryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            runner_url: credentials.runner_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key,
        })
    }

    pub fn runner_url(&self) -> &str {
        &self.runner_url
    }

    pub async fn list_actions(&self) -> Result<Vec<ConneryAction>, ConneryError> {
        let response = self
            .client
            .get(format!("{}/v1/actions", self.runner_url))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        unwrap_envelope(response).await
    }

    pub async fn get_action(&self, action_id: &str) -> Result<ConneryAction, ConneryError> {
        let response = self
            .client
            .get(format!("{}/v1/actions/{}", self.runner_url, action_id))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        unwrap_envelope(response).await
    }

    /// Runs an action and returns its output parameters.
    pub async fn run_action(
        &self,
        action_id: &str,
        input: HashMap<String, String>,
    ) -> Result<HashMap<String, serde_json::Value>, ConneryError> {
        tracing::info!("Running action {} on {}", action_id, self.runner_url);

        let response = self
            .client
            .post(format!("{}/v1/actions/{}/run", self.runner_url, action_id))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "input": input }))
            .send()
            .await?;

        let run: RunOutput = unwrap_envelope(response).await.map_err(|e| match e {
            ConneryError::Rejected { message, .. } => ConneryError::ActionFailed {
                action: action_id.to_string(),
                message,
            },
            other => other,
        })?;
        Ok(run.output)
    }
}

async fn unwrap_envelope<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ConneryError> {
    let status = response.status();
    let body = response.text().await?;

    let envelope: Envelope<T> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(ConneryError::Rejected {
                status: status.as_u16(),
                message: body,
            })
        }
        Err(e) => return Err(ConneryError::Decode(e.to_string())),
    };

    if !status.is_success() || envelope.status != "success" {
        let message = envelope
            .error
            .map(|error| error.message)
            .unwrap_or_else(|| format!("status '{}'", envelope.status));
        return Err(ConneryError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    envelope
        .data
        .ok_or_else(|| ConneryError::Decode("response has no data".to_string()))
}

/// One remote action exposed as a tool.
pub struct ActionTool {
    action: ConneryAction,
    description: String,
    service: Arc<ConneryService>,
}

impl ActionTool {
    pub fn new(action: ConneryAction, service: Arc<ConneryService>) -> Self {
        let description = match &action.description {
            Some(description) if !description.is_empty() => {
                format!("{}: {}", action.title, description)
            }
            _ => action.title.clone(),
        };
        Self {
            action,
            description,
            service,
        }
    }

    fn collect_input(&self, input: &ToolInput) -> Result<HashMap<String, String>, ToolError> {
        let mut values = HashMap::new();
        for parameter in &self.action.input_parameters {
            match input.arguments.get(&parameter.key) {
                Some(serde_json::Value::Null) | None if parameter.is_required() => {
                    return Err(ToolError::invalid_arguments(
                        self.name(),
                        format!("missing required input '{}'", parameter.key),
                    ))
                }
                Some(serde_json::Value::Null) | None => {}
                Some(serde_json::Value::String(value)) => {
                    values.insert(parameter.key.clone(), value.clone());
                }
                Some(other) => {
                    values.insert(parameter.key.clone(), other.to_string());
                }
            }
        }
        Ok(values)
    }
}

#[async_trait]
impl Tool for ActionTool {
    fn name(&self) -> &str {
        &self.action.key
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for parameter in &self.action.input_parameters {
            let description = parameter
                .description
                .clone()
                .unwrap_or_else(|| parameter.title.clone());
            properties.insert(
                parameter.key.clone(),
                json!({"type": "string", "title": parameter.title, "description": description}),
            );
            if parameter.is_required() {
                required.push(parameter.key.clone());
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;
        let values = self.collect_input(&input)?;

        let output = self
            .service
            .run_action(&self.action.id, values)
            .await
            .map_err(|e| {
                let recoverable = matches!(e, ConneryError::Http(_));
                ToolError::new(self.name(), e.to_string(), recoverable)
            })?;

        ToolOutput::success(output).map_err(|e| ToolError::new(self.name(), e.to_string(), false))
    }
}

/// The set of tools published by one runner, fetched once at construction.
pub struct ConneryToolkit {
    tools: Vec<Arc<ActionTool>>,
}

impl ConneryToolkit {
    /// Lists the runner's actions. A wrong URL or rejected key fails here.
    pub async fn create_instance(service: Arc<ConneryService>) -> Result<Self, ConneryError> {
        let actions = service.list_actions().await?;
        tracing::info!(
            "Loaded {} actions from runner {}",
            actions.len(),
            service.runner_url()
        );
        let tools = actions
            .into_iter()
            .map(|action| Arc::new(ActionTool::new(action, Arc::clone(&service))))
            .collect();
        Ok(Self { tools })
    }

    pub fn get_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools
            .iter()
            .map(|tool| Arc::clone(tool) as Arc<dyn Tool>)
            .collect()
    }
}
