use std::sync::Arc;

use ahash::AHashMap;
use serde_json::{Map, Value};

use crate::{pointer, retriever::NoRetriever, Error, Retrieve};

/// Replaces every `$ref` of a schema with its target.
///
/// Local references (`#/...`) resolve against the document they appear in.
/// Anything else names an external document, fetched once through the
/// configured [`Retrieve`] implementation and cached by URI.
#[derive(Clone)]
pub struct Resolver {
    retriever: Arc<dyn Retrieve>,
    siblings: bool,
    documents: AHashMap<String, Arc<Value>>,
    inlined: AHashMap<String, Value>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resolver")
            .field("siblings", &self.siblings)
            .field("documents", &self.documents.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// The document a schema node belongs to.
#[derive(Clone, Copy)]
struct Scope<'a> {
    uri: &'a str,
    document: &'a Value,
}

/// Keywords whose values are maps from names to schemas.
const SCHEMA_MAPS: [&str; 4] = [
    "properties",
    "patternProperties",
    "dependencies",
    "dependentSchemas",
];

/// Keywords holding plain JSON data.
const DATA: [&str; 4] = ["const", "enum", "default", "examples"];

impl Resolver {
    /// A resolver for references within the root document only.
    #[must_use]
    pub fn new() -> Self {
        Self {
            retriever: Arc::new(NoRetriever),
            siblings: false,
            documents: AHashMap::new(),
            inlined: AHashMap::new(),
        }
    }

    /// Retrieve external documents through `retriever`.
    #[must_use]
    pub fn with_retriever(mut self, retriever: impl Retrieve + 'static) -> Self {
        self.retriever = Arc::new(retriever);
        self
    }

    /// Keep the keywords next to `$ref` by combining them with the target.
    ///
    /// Draft 2019-09 and later apply these keywords, earlier drafts ignore them.
    #[must_use]
    pub fn with_sibling_keywords(mut self, enabled: bool) -> Self {
        self.siblings = enabled;
        self
    }

    /// Return a copy of `schema` with every `$ref` replaced by its target.
    ///
    /// Keywords next to `$ref` are dropped unless
    /// [`Resolver::with_sibling_keywords`] is enabled, in which case the node becomes
    /// `{"allOf": [<target>, <siblings>]}`. `definitions` and `$defs` are removed
    /// once their members are no longer needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference does not resolve, refers to itself, or
    /// names a document the retriever fails to provide.
    pub fn inline(&mut self, schema: &Value) -> Result<Value, Error> {
        self.inlined.clear();
        let mut stack = Vec::new();
        self.inline_node(
            schema,
            Scope {
                uri: "",
                document: schema,
            },
            &mut stack,
        )
    }

    fn inline_node(
        &mut self,
        node: &Value,
        scope: Scope<'_>,
        stack: &mut Vec<String>,
    ) -> Result<Value, Error> {
        match node {
            Value::Object(map) => {
                let Some(Value::String(reference)) = map.get("$ref") else {
                    return self.inline_members(map, scope, stack).map(Value::Object);
                };
                let target = self.inline_reference(reference, scope, stack)?;
                if !self.siblings {
                    return Ok(target);
                }
                let siblings = self.inline_members(map, scope, stack)?;
                if siblings.is_empty() {
                    return Ok(target);
                }
                let mut output = Map::new();
                output.insert(
                    "allOf".to_string(),
                    Value::Array(vec![target, Value::Object(siblings)]),
                );
                Ok(Value::Object(output))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.inline_node(item, scope, stack))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            _ => Ok(node.clone()),
        }
    }

    fn inline_members(
        &mut self,
        map: &Map<String, Value>,
        scope: Scope<'_>,
        stack: &mut Vec<String>,
    ) -> Result<Map<String, Value>, Error> {
        let mut output = Map::new();
        for (key, value) in map {
            let inlined = match (key.as_str(), value) {
                ("definitions" | "$defs", _) | ("$ref", Value::String(_)) => continue,
                (key, _) if DATA.contains(&key) => value.clone(),
                (key, Value::Object(schemas)) if SCHEMA_MAPS.contains(&key) => {
                    let mut members = Map::new();
                    for (name, schema) in schemas {
                        members.insert(name.clone(), self.inline_node(schema, scope, stack)?);
                    }
                    Value::Object(members)
                }
                _ => self.inline_node(value, scope, stack)?,
            };
            output.insert(key.clone(), inlined);
        }
        Ok(output)
    }

    fn inline_reference(
        &mut self,
        reference: &str,
        scope: Scope<'_>,
        stack: &mut Vec<String>,
    ) -> Result<Value, Error> {
        let (location, fragment) = reference.split_once('#').unwrap_or((reference, ""));
        let uri = if location.is_empty() {
            scope.uri
        } else {
            location
        };
        let key = format!("{uri}#{fragment}");
        if stack.contains(&key) {
            return Err(Error::cyclic(reference));
        }
        if let Some(inlined) = self.inlined.get(&key) {
            return Ok(inlined.clone());
        }
        tracing::debug!(reference, "Inlining reference");
        let external = if location.is_empty() {
            None
        } else {
            Some(self.retrieve(location)?)
        };
        let scope = match &external {
            Some(document) => Scope {
                uri: location,
                document,
            },
            None => scope,
        };
        let target = pointer::resolve(scope.document, fragment)?;
        stack.push(key);
        let result = self.inline_node(target, scope, stack);
        let key = stack.pop().unwrap_or_default();
        let inlined = result?;
        self.inlined.insert(key, inlined.clone());
        Ok(inlined)
    }

    fn retrieve(&mut self, uri: &str) -> Result<Arc<Value>, Error> {
        if let Some(document) = self.documents.get(uri) {
            return Ok(Arc::clone(document));
        }
        tracing::debug!(uri, "Retrieving document");
        let document = self
            .retriever
            .retrieve(uri)
            .map_err(|error| Error::unretrievable(uri, error))?;
        let document = Arc::new(document);
        self.documents.insert(uri.to_string(), Arc::clone(&document));
        Ok(document)
    }
}
