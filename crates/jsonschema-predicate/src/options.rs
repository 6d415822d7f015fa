use std::borrow::Cow;

use referencing::Resolver;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    context::RootContext,
    error::CompileError,
    expr::ValueRef,
    keywords::{custom::CustomKeyword, Keyword, KeywordTable},
    predicate::Predicate,
};

/// Semantic switches. Every flag is off unless set.
///
/// Loads from partial JSON records such as `{"strictStringWidth": true}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Numbers must be finite.
    pub no_non_finite_number: bool,
    /// Length keywords count Unicode code points instead of UTF-16 code units.
    pub strict_string_width: bool,
    /// Presence of a property is an own-property test instead of "value is not missing".
    pub strict_property_check: bool,
    /// Arrays never satisfy `type: "object"`.
    pub no_array_object: bool,
    /// `multipleOf` uses exact decimal arithmetic.
    pub accurate_multiple_of: bool,
    /// Patterns compile in Unicode mode: `\p{..}` escapes apply and a character
    /// outside the BMP is one unit. `\d`, `\w` and `\b` stay ASCII-only.
    pub unicode_aware_regex: bool,
    /// `enum` and `uniqueItems` use native equality instead of structural equality.
    pub fast_assertions: bool,
}

impl Options {
    /// Every flag enabled except `fast_assertions`.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            no_non_finite_number: true,
            strict_string_width: true,
            strict_property_check: true,
            no_array_object: true,
            accurate_multiple_of: true,
            unicode_aware_regex: true,
            fast_assertions: false,
        }
    }
}

/// Configuration of a compilation.
#[derive(Clone)]
pub struct CompilerOptions {
    options: Options,
    keywords: KeywordTable,
    resolver: Option<Resolver>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            options: Options::default(),
            keywords: KeywordTable::draft2020(),
            resolver: None,
        }
    }
}

impl CompilerOptions {
    /// Replace all semantic flags at once.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_no_non_finite_number(mut self, enabled: bool) -> Self {
        self.options.no_non_finite_number = enabled;
        self
    }

    #[must_use]
    pub fn with_strict_string_width(mut self, enabled: bool) -> Self {
        self.options.strict_string_width = enabled;
        self
    }

    #[must_use]
    pub fn with_strict_property_check(mut self, enabled: bool) -> Self {
        self.options.strict_property_check = enabled;
        self
    }

    #[must_use]
    pub fn with_no_array_object(mut self, enabled: bool) -> Self {
        self.options.no_array_object = enabled;
        self
    }

    #[must_use]
    pub fn with_accurate_multiple_of(mut self, enabled: bool) -> Self {
        self.options.accurate_multiple_of = enabled;
        self
    }

    #[must_use]
    pub fn with_unicode_aware_regex(mut self, enabled: bool) -> Self {
        self.options.unicode_aware_regex = enabled;
        self
    }

    #[must_use]
    pub fn with_fast_assertions(mut self, enabled: bool) -> Self {
        self.options.fast_assertions = enabled;
        self
    }

    /// Use another keyword table, e.g. [`KeywordTable::draft6`].
    #[must_use]
    pub fn with_keywords(mut self, keywords: KeywordTable) -> Self {
        self.keywords = keywords;
        self
    }

    /// Register a custom keyword, applied after the built-in keywords.
    ///
    /// ```rust
    /// use jsonschema_predicate::CustomKeyword;
    /// use serde_json::{json, Map, Value};
    ///
    /// struct Even;
    ///
    /// impl CustomKeyword for Even {
    ///     fn is_valid(&self, instance: &Value) -> bool {
    ///         instance.as_u64().map_or(true, |n| n % 2 == 0)
    ///     }
    /// }
    ///
    /// let predicate = jsonschema_predicate::options()
    ///     .with_keyword("even", |_: &Map<String, Value>, _: &Value| {
    ///         Ok(Box::new(Even) as Box<dyn CustomKeyword>)
    ///     })
    ///     .build(&json!({"even": true}))
    ///     .expect("Valid schema");
    /// assert!(predicate.is_valid(&json!(4)));
    /// assert!(!predicate.is_valid(&json!(5)));
    /// ```
    #[must_use]
    pub fn with_keyword<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&Map<String, Value>, &Value) -> Result<Box<dyn CustomKeyword>, CompileError>
            + Send
            + Sync
            + 'static,
    {
        let pass = self.keywords.passes().len();
        self.keywords = self.keywords.with_keyword(pass, Keyword::custom(name, factory));
        self
    }

    /// Inline `$ref`s through `resolver` before compiling.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Compile `schema` into a predicate.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is malformed or a reference cannot be resolved.
    pub fn build(&self, schema: &Value) -> Result<Predicate, CompileError> {
        let schema = self.prepare(schema)?;
        compile(&schema, &self.keywords, self.options)
    }

    /// Render the compiled form of `schema`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is malformed or a reference cannot be resolved.
    pub fn inspect(&self, schema: &Value) -> Result<String, CompileError> {
        Ok(self.build(schema)?.to_string())
    }

    fn prepare<'s>(&self, schema: &'s Value) -> Result<Cow<'s, Value>, CompileError> {
        match &self.resolver {
            Some(resolver) => Ok(Cow::Owned(resolver.clone().inline(schema)?)),
            None => Ok(Cow::Borrowed(schema)),
        }
    }
}

/// Compile `schema` with the given keyword table and options.
///
/// # Errors
///
/// Returns an error if the schema or any of its keyword values is malformed.
pub fn compile(
    schema: &Value,
    keywords: &KeywordTable,
    options: Options,
) -> Result<Predicate, CompileError> {
    let mut root = RootContext::new(keywords, options);
    let expr = root.compile_conditions(schema, &ValueRef::input())?;
    Ok(root.into_predicate(expr))
}

/// Render the compiled form of `schema` for diagnostics.
///
/// # Errors
///
/// Returns an error if the schema or any of its keyword values is malformed.
pub fn inspect(
    schema: &Value,
    keywords: &KeywordTable,
    options: Options,
) -> Result<String, CompileError> {
    Ok(compile(schema, keywords, options)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::Options;
    use serde_json::json;

    #[test]
    fn partial_records_default_to_false() {
        let options: Options =
            serde_json::from_value(json!({"strictStringWidth": true})).expect("Valid options");
        assert_eq!(
            options,
            Options {
                strict_string_width: true,
                ..Options::default()
            }
        );
    }

    #[test]
    fn serializes_in_camel_case() {
        let value = serde_json::to_value(Options::strict()).expect("Serializable");
        assert_eq!(value["noArrayObject"], json!(true));
        assert_eq!(value["fastAssertions"], json!(false));
    }

    #[test]
    fn builder_sets_flags() {
        let options = crate::options()
            .with_accurate_multiple_of(true)
            .with_fast_assertions(true);
        assert!(options.options.accurate_multiple_of);
        assert!(options.options.fast_assertions);
        assert!(!options.options.no_array_object);
    }
}
