pub mod connery;
pub mod context;
pub mod csv_file;
pub mod error;
pub mod factory;
pub mod list_files;
pub mod registry;
pub mod retrieval;
pub mod tool;
pub mod upload;
pub mod validation;

pub use connery::{ActionTool, ConneryAction, ConneryError, ConneryService, ConneryToolkit};
pub use context::ToolContext;
pub use csv_file::{create_csv, CreateCsvTool, CsvRequest};
pub use error::ToolboxError;
pub use factory::{ToolFactory, ToolRequest};
pub use list_files::{list_files, ListFilesTool};
pub use registry::{tool_options, AvailableTool, ToolRegistry};
pub use retrieval::{RetrievalTool, RetrieverCache, RETRIEVAL_DESCRIPTION};
pub use tool::{Tool, ToolError, ToolInput, ToolOutput};
pub use upload::{ObjectUploader, UploadCsvTool, UploadError};
pub use validation::validate_startup;
