//! # referencing
//!
//! Inline `$ref` targets into JSON Schema documents.
//!
//! ```rust
//! use referencing::Resolver;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "$defs": {"name": {"type": "string"}},
//!     "items": {"$ref": "#/$defs/name"}
//! });
//! let inlined = Resolver::new().inline(&schema)?;
//! assert_eq!(inlined, json!({"items": {"type": "string"}}));
//! # Ok::<(), referencing::Error>(())
//! ```
mod error;
pub mod pointer;
mod resolver;
mod retriever;

pub use error::Error;
pub use resolver::Resolver;
pub use retriever::{MemoryRetriever, NoRetriever, Retrieve};
