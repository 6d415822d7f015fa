//! Compile JSON Schemas into boolean predicates.
//!
//! A schema is translated once into an expression tree in which every
//! type-specific keyword is guarded by the right type test. Evaluating the tree
//! never fails and never allocates more than one slot per loop variable.
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({"type": "integer", "minimum": 0});
//! let predicate = jsonschema_predicate::validator_for(&schema)?;
//! assert!(predicate.is_valid(&json!(5)));
//! assert!(!predicate.is_valid(&json!(-1)));
//! assert!(!predicate.is_valid(&json!(5.5)));
//! # Ok::<(), jsonschema_predicate::CompileError>(())
//! ```
//!
//! # Options
//!
//! Semantic switches live in [`Options`] and can be set one by one through the
//! builder returned by [`options`]:
//!
//! ```rust
//! use serde_json::json;
//!
//! let predicate = jsonschema_predicate::options()
//!     .with_strict_string_width(true)
//!     .build(&json!({"maxLength": 1}))?;
//! assert!(predicate.is_valid(&json!("💩")));
//! # Ok::<(), jsonschema_predicate::CompileError>(())
//! ```
//!
//! # Inspecting the compiled form
//!
//! ```rust
//! use jsonschema_predicate::{KeywordTable, Options};
//! use serde_json::json;
//!
//! let source = jsonschema_predicate::inspect(
//!     &json!({"minLength": 3}),
//!     &KeywordTable::draft6(),
//!     Options::default(),
//! )?;
//! assert_eq!(source, "|x| !is_string(x) || len(x) >= 3");
//! # Ok::<(), jsonschema_predicate::CompileError>(())
//! ```
mod context;
mod equality;
mod error;
pub mod expr;
mod instance;
mod keywords;
mod number;
mod options;
mod pool;
mod predicate;
mod regex;
mod types;

pub use equality::equal;
pub use error::CompileError;
pub use keywords::{
    custom::{CustomFactory, CustomKeyword},
    Keyword, KeywordTable,
};
pub use number::{Decimal, Numeric};
pub use options::{compile, inspect, CompilerOptions, Options};
pub use pool::{Builtin, Declaration, Name, Routine};
pub use predicate::Predicate;
pub use referencing::{MemoryRetriever, Resolver, Retrieve};
pub use crate::regex::Pattern;
pub use types::{JsonType, JsonTypeSet};

use serde_json::Value;

/// Create a builder for compiling schemas with custom settings.
///
/// Defaults to the draft 2020-12 keyword table, every option disabled and no
/// reference inlining.
#[must_use]
pub fn options() -> CompilerOptions {
    CompilerOptions::default()
}

/// Compile `schema` with the draft 2020-12 keywords and default options,
/// inlining local `$ref`s first. Keywords next to a `$ref` still apply.
///
/// # Errors
///
/// Returns an error if the schema is malformed or a reference cannot be resolved.
pub fn validator_for(schema: &Value) -> Result<Predicate, CompileError> {
    options()
        .with_resolver(Resolver::new().with_sibling_keywords(true))
        .build(schema)
}

/// Validate `instance` against `schema`.
///
/// # Panics
///
/// This function panics if an invalid schema is passed.
#[must_use]
#[inline]
pub fn is_valid(schema: &Value, instance: &Value) -> bool {
    validator_for(schema)
        .expect("Invalid schema")
        .is_valid(instance)
}
