use assistant_core::DataDir;
use async_trait::async_trait;
use serde_json::json;
use std::io;
use std::path::Path;

use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

pub const LIST_FILES_TOOL_NAME: &str = "get_files_medication_schedules_in_data_folder";

/// Names of the entries in `folder`, in whatever order the filesystem yields
/// them.
pub async fn list_files(folder: &Path) -> io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(folder).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Lists the data directory. The `folder_path` argument is accepted but
/// ignored.
pub struct ListFilesTool {
    data_dir: DataDir,
}

impl ListFilesTool {
    pub fn new(data_dir: DataDir) -> Self {
        Self { data_dir }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        LIST_FILES_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get all files / generated medication schedules in the data folder."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "folder_path": {
                    "type": "string",
                    "description": "The folder path to get the files from"
                }
            }
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;

        if let Some(requested) = input.arguments.get("folder_path") {
            tracing::debug!(
                "Ignoring folder_path {} and listing {}",
                requested,
                self.data_dir.path().display()
            );
        }

        let names = list_files(self.data_dir.path()).await.map_err(|e| {
            ToolError::new(
                self.name(),
                format!("Failed to list {}: {}", self.data_dir.path().display(), e),
                false,
            )
        })?;

        ToolOutput::success(names).map_err(|e| ToolError::new(self.name(), e.to_string(), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn data_dir_with(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            std::fs::write(temp.path().join(file), b"x").unwrap();
        }
        temp
    }

    fn as_set(value: &serde_json::Value) -> HashSet<String> {
        serde_json::from_value(value.clone()).unwrap()
    }

    #[tokio::test]
    async fn should_list_entries_of_given_folder() {
        let temp = data_dir_with(&["a.csv", "b.csv"]);

        let names: HashSet<String> = list_files(temp.path()).await.unwrap().into_iter().collect();

        assert_eq!(names, HashSet::from(["a.csv".to_string(), "b.csv".to_string()]));
    }

    #[tokio::test]
    async fn should_fail_for_missing_folder() {
        let temp = TempDir::new().unwrap();
        assert!(list_files(&temp.path().join("missing")).await.is_err());
    }

    #[tokio::test]
    async fn should_list_data_dir_regardless_of_folder_argument() {
        let data = data_dir_with(&["a.csv", "b.csv"]);
        let elsewhere = data_dir_with(&["secret.txt"]);
        let tool = ListFilesTool::new(DataDir::new(data.path()));
        let expected = HashSet::from(["a.csv".to_string(), "b.csv".to_string()]);

        for folder in [
            Some(elsewhere.path().to_string_lossy().into_owned()),
            Some("/".to_string()),
            None,
        ] {
            let mut input = ToolInput::new(LIST_FILES_TOOL_NAME);
            if let Some(folder) = folder {
                input = input.with_argument("folder_path", folder).unwrap();
            }

            let output = tool.execute(input).await.unwrap();

            assert!(output.success);
            assert_eq!(as_set(&output.result), expected);
        }
    }

    #[tokio::test]
    async fn should_report_missing_data_dir_as_tool_error() {
        let temp = TempDir::new().unwrap();
        let tool = ListFilesTool::new(DataDir::new(temp.path().join("missing")));

        let error = tool
            .execute(ToolInput::new(LIST_FILES_TOOL_NAME))
            .await
            .unwrap_err();

        assert_eq!(error.tool_name, LIST_FILES_TOOL_NAME);
        assert!(error.message.contains("Failed to list"));
    }
}
