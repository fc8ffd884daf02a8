use assistant_core::DataDir;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io;
use std::path::PathBuf;

use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

pub const CREATE_CSV_TOOL_NAME: &str = "create_csv";

/// Arguments accepted by [`CreateCsvTool`].
///
/// Rows are written as given; their length is not checked against the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRequest {
    pub header: Vec<String>,
    pub data: Vec<Vec<String>>,
    pub file_name: String,
}

fn encode(request: &CsvRequest) -> io::Result<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .flexible(true)
        .terminator(::csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(&request.header)?;
    for row in &request.data {
        writer.write_record(row)?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())
}

/// Writes the header followed by every row to `file_name` inside the data
/// directory, creating the directory when it is missing.
///
/// Returns the path written. Filesystem errors are returned as-is and a failed
/// write may leave a truncated file behind.
pub async fn create_csv(data_dir: &DataDir, request: &CsvRequest) -> io::Result<PathBuf> {
    data_dir.ensure().await?;

    let path = data_dir.resolve(&request.file_name);
    let bytes = encode(request)?;
    tokio::fs::write(&path, bytes).await?;

    tracing::info!(
        "Wrote {} rows to {}",
        request.data.len(),
        path.display()
    );
    Ok(path)
}

pub struct CreateCsvTool {
    data_dir: DataDir,
}

impl CreateCsvTool {
    pub fn new(data_dir: DataDir) -> Self {
        Self { data_dir }
    }
}

#[async_trait]
impl Tool for CreateCsvTool {
    fn name(&self) -> &str {
        CREATE_CSV_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Create a CSV file with the given header and data."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "header": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "The header of the CSV file"
                },
                "data": {
                    "type": "array",
                    "items": {"type": "array", "items": {"type": "string"}},
                    "description": "The data of the CSV file"
                },
                "file_name": {
                    "type": "string",
                    "description": "The file name of the CSV file"
                }
            },
            "required": ["header", "data", "file_name"]
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;

        let request: CsvRequest = input
            .parse_arguments()
            .map_err(|e| ToolError::invalid_arguments(self.name(), e))?;

        let path = create_csv(&self.data_dir, &request).await.map_err(|e| {
            ToolError::new(
                self.name(),
                format!("Failed to write '{}': {}", request.file_name, e),
                false,
            )
        })?;

        ToolOutput::success(path.to_string_lossy())
            .map_err(|e| ToolError::new(self.name(), e.to_string(), false))
    }
}
