pub mod index;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod retriever;
pub mod store;

pub use index::VectorIndex;
pub use memory::InMemoryVectorIndex;
pub use migrations::run_migrations;
pub use models::{Document, DocumentChunk, NamespaceFilter, SearchResult};
pub use retriever::{Retriever, VectorStore};
pub use store::PgVectorIndex;
