//! docqa - retrieval-backed question answering over API documentation.
//!
//! docqa splits paged documentation into overlapping chunks tagged with
//! page and section provenance, keeps them in an in-memory TF-IDF
//! index, and answers free-text queries by ranking chunks against the
//! query's sparse term vector. An injected generation capability turns
//! the retrieved passages into an explanation or integration code.
//!
//! # Quick start
//!
//! ```
//! use docqa::chunker::{self, ChunkerConfig};
//! use docqa::loader::Page;
//! use docqa::vector_store::VectorStore;
//!
//! let pages = vec![Page {
//!     page_number: 1,
//!     text: "## Authentication\nSend a bearer token with every call. \
//!            GET /users lists registered users."
//!         .to_string(),
//! }];
//!
//! let chunks = chunker::chunk_pages(&pages, &ChunkerConfig::default());
//! let mut store = VectorStore::new();
//! store.add_chunks(chunks);
//!
//! let results = store.retrieve("bearer token", 5);
//! assert_eq!(results[0].metadata.page_number, Some(1));
//! ```

pub mod chunker;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod prompts;
pub mod sections;
pub mod vector_store;

pub use chunker::{Chunk, ChunkMetadata, ChunkerConfig};
pub use error::{Error, Result};
pub use loader::Page;
pub use pipeline::{Generator, Pipeline, RagResponse};
pub use sections::SectionPatterns;
pub use vector_store::{Retrieved, VectorStore};
