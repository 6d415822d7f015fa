use ahash::AHashMap;
use serde_json::Value;

/// Fetch external documents referenced by `$ref`.
pub trait Retrieve: Send + Sync {
    /// Retrieve the document identified by `uri`, without its fragment.
    ///
    /// # Errors
    ///
    /// Implementations report any failure to produce the document.
    fn retrieve(&self, uri: &str) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}

/// Refuses every retrieval: only references within the root document resolve.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetriever;

impl Retrieve for NoRetriever {
    fn retrieve(&self, uri: &str) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("Retrieving '{uri}' requires a retriever").into())
    }
}

/// Documents held in memory, keyed by URI.
#[derive(Debug, Clone, Default)]
pub struct MemoryRetriever {
    documents: AHashMap<String, Value>,
}

impl MemoryRetriever {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `document` under `uri`. A trailing empty fragment is ignored.
    #[must_use]
    pub fn with_document(mut self, uri: &str, document: Value) -> Self {
        self.documents
            .insert(uri.trim_end_matches('#').to_string(), document);
        self
    }
}

impl Retrieve for MemoryRetriever {
    fn retrieve(&self, uri: &str) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(value) = self.documents.get(uri) {
            Ok(value.clone())
        } else {
            Err(format!("Failed to find {uri}").into())
        }
    }
}
