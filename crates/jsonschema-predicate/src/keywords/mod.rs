//! Keyword handlers and the tables dispatching to them.
//!
//! A table is a list of passes. All keywords of one pass are applied to a schema
//! node before the next pass starts, so combinators in a later pass see every
//! `type` declaration of the node.
mod any;
mod array;
mod combinators;
pub(crate) mod custom;
mod numeric;
mod object;
mod string;

use ahash::AHashMap;
use serde_json::{Map, Value};

use crate::{
    context::{Context, RootContext},
    error::CompileError,
    expr::ValueRef,
    number::Numeric,
};
use custom::{CustomFactory, CustomKeyword};

/// Keywords with a built-in handler, plus user-defined ones.
#[derive(Debug, Clone)]
pub enum Keyword {
    Type,
    Enum,
    Const,
    MinLength,
    MaxLength,
    Pattern,
    MultipleOf,
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
    MinItems,
    MaxItems,
    UniqueItems,
    Items,
    PrefixItems,
    AdditionalItems,
    Contains,
    MinContains,
    MaxContains,
    PropertyNames,
    MinProperties,
    MaxProperties,
    Required,
    Properties,
    PatternProperties,
    AdditionalProperties,
    Dependencies,
    DependentRequired,
    DependentSchemas,
    AnyOf,
    OneOf,
    AllOf,
    Not,
    Custom(CustomFactory),
}

impl Keyword {
    /// A user-defined keyword compiled by `factory`.
    #[must_use]
    pub fn custom<F>(name: &str, factory: F) -> Keyword
    where
        F: Fn(&Map<String, Value>, &Value) -> Result<Box<dyn CustomKeyword>, CompileError>
            + Send
            + Sync
            + 'static,
    {
        Keyword::Custom(CustomFactory::new(name, factory))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Keyword::Type => "type",
            Keyword::Enum => "enum",
            Keyword::Const => "const",
            Keyword::MinLength => "minLength",
            Keyword::MaxLength => "maxLength",
            Keyword::Pattern => "pattern",
            Keyword::MultipleOf => "multipleOf",
            Keyword::Minimum => "minimum",
            Keyword::Maximum => "maximum",
            Keyword::ExclusiveMinimum => "exclusiveMinimum",
            Keyword::ExclusiveMaximum => "exclusiveMaximum",
            Keyword::MinItems => "minItems",
            Keyword::MaxItems => "maxItems",
            Keyword::UniqueItems => "uniqueItems",
            Keyword::Items => "items",
            Keyword::PrefixItems => "prefixItems",
            Keyword::AdditionalItems => "additionalItems",
            Keyword::Contains => "contains",
            Keyword::MinContains => "minContains",
            Keyword::MaxContains => "maxContains",
            Keyword::PropertyNames => "propertyNames",
            Keyword::MinProperties => "minProperties",
            Keyword::MaxProperties => "maxProperties",
            Keyword::Required => "required",
            Keyword::Properties => "properties",
            Keyword::PatternProperties => "patternProperties",
            Keyword::AdditionalProperties => "additionalProperties",
            Keyword::Dependencies => "dependencies",
            Keyword::DependentRequired => "dependentRequired",
            Keyword::DependentSchemas => "dependentSchemas",
            Keyword::AnyOf => "anyOf",
            Keyword::OneOf => "oneOf",
            Keyword::AllOf => "allOf",
            Keyword::Not => "not",
            Keyword::Custom(factory) => factory.name(),
        }
    }

    pub(crate) fn compile(
        &self,
        root: &mut RootContext<'_>,
        ctx: &mut Context,
        node: &Map<String, Value>,
        value: &ValueRef,
    ) -> Result<(), CompileError> {
        match self {
            Keyword::Type => any::compile_type(root, ctx, node, value),
            Keyword::Enum => any::compile_enum(root, ctx, node, value),
            Keyword::Const => any::compile_const(root, ctx, node, value),
            Keyword::MinLength => string::compile_min_length(root, ctx, node, value),
            Keyword::MaxLength => string::compile_max_length(root, ctx, node, value),
            Keyword::Pattern => string::compile_pattern(root, ctx, node, value),
            Keyword::MultipleOf => numeric::compile_multiple_of(root, ctx, node, value),
            Keyword::Minimum => numeric::compile_minimum(root, ctx, node, value),
            Keyword::Maximum => numeric::compile_maximum(root, ctx, node, value),
            Keyword::ExclusiveMinimum => numeric::compile_exclusive_minimum(root, ctx, node, value),
            Keyword::ExclusiveMaximum => numeric::compile_exclusive_maximum(root, ctx, node, value),
            Keyword::MinItems => array::compile_min_items(root, ctx, node, value),
            Keyword::MaxItems => array::compile_max_items(root, ctx, node, value),
            Keyword::UniqueItems => array::compile_unique_items(root, ctx, node, value),
            Keyword::Items => array::compile_items(root, ctx, node, value),
            Keyword::PrefixItems => array::compile_prefix_items(root, ctx, node, value),
            Keyword::AdditionalItems => array::compile_additional_items(root, ctx, node, value),
            Keyword::Contains => array::compile_contains(root, ctx, node, value),
            Keyword::MinContains => array::compile_min_contains(root, ctx, node, value),
            Keyword::MaxContains => array::compile_max_contains(root, ctx, node, value),
            Keyword::PropertyNames => object::compile_property_names(root, ctx, node, value),
            Keyword::MinProperties => object::compile_min_properties(root, ctx, node, value),
            Keyword::MaxProperties => object::compile_max_properties(root, ctx, node, value),
            Keyword::Required => object::compile_required(root, ctx, node, value),
            Keyword::Properties => object::compile_properties(root, ctx, node, value),
            Keyword::PatternProperties => {
                object::compile_pattern_properties(root, ctx, node, value)
            }
            Keyword::AdditionalProperties => {
                object::compile_additional_properties(root, ctx, node, value)
            }
            Keyword::Dependencies => object::compile_dependencies(root, ctx, node, value),
            Keyword::DependentRequired => {
                object::compile_dependent_required(root, ctx, node, value)
            }
            Keyword::DependentSchemas => object::compile_dependent_schemas(root, ctx, node, value),
            Keyword::AnyOf => combinators::compile_any_of(root, ctx, node, value),
            Keyword::OneOf => combinators::compile_one_of(root, ctx, node, value),
            Keyword::AllOf => combinators::compile_all_of(root, ctx, node, value),
            Keyword::Not => combinators::compile_not(root, ctx, node, value),
            Keyword::Custom(factory) => factory.compile(root, ctx, node, value),
        }
    }
}

/// Keywords applied together before the next pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct Pass {
    keywords: AHashMap<Box<str>, Keyword>,
}

impl Pass {
    #[inline]
    pub(crate) fn get(&self, name: &str) -> Option<&Keyword> {
        self.keywords.get(name)
    }

    fn insert(&mut self, keyword: Keyword) {
        self.keywords.insert(keyword.name().into(), keyword);
    }
}

/// The keywords a compilation understands, grouped into passes.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    passes: Vec<Pass>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        KeywordTable::draft2020()
    }
}

const COMBINATORS: [Keyword; 4] = [Keyword::AnyOf, Keyword::OneOf, Keyword::Not, Keyword::AllOf];

impl KeywordTable {
    /// A table without any keywords: every object schema accepts any present value.
    #[must_use]
    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    /// Draft 6 / draft 7 validation keywords.
    #[must_use]
    pub fn draft6() -> Self {
        Self::empty()
            .with_pass([
                Keyword::Type,
                Keyword::Enum,
                Keyword::Const,
                Keyword::MinLength,
                Keyword::MaxLength,
                Keyword::Pattern,
                Keyword::MultipleOf,
                Keyword::Minimum,
                Keyword::Maximum,
                Keyword::ExclusiveMinimum,
                Keyword::ExclusiveMaximum,
                Keyword::MinItems,
                Keyword::MaxItems,
                Keyword::UniqueItems,
                Keyword::Items,
                Keyword::AdditionalItems,
                Keyword::Contains,
                Keyword::PropertyNames,
                Keyword::MinProperties,
                Keyword::MaxProperties,
                Keyword::Required,
                Keyword::Properties,
                Keyword::PatternProperties,
                Keyword::AdditionalProperties,
                Keyword::Dependencies,
            ])
            .with_pass(COMBINATORS)
    }

    /// Draft 2020-12 validation keywords.
    #[must_use]
    pub fn draft2020() -> Self {
        Self::empty()
            .with_pass([
                Keyword::Type,
                Keyword::Enum,
                Keyword::Const,
                Keyword::MinLength,
                Keyword::MaxLength,
                Keyword::Pattern,
                Keyword::MultipleOf,
                Keyword::Minimum,
                Keyword::Maximum,
                Keyword::ExclusiveMinimum,
                Keyword::ExclusiveMaximum,
                Keyword::MinItems,
                Keyword::MaxItems,
                Keyword::UniqueItems,
                Keyword::PrefixItems,
                Keyword::Items,
                Keyword::Contains,
                Keyword::MinContains,
                Keyword::MaxContains,
                Keyword::PropertyNames,
                Keyword::MinProperties,
                Keyword::MaxProperties,
                Keyword::Required,
                Keyword::Properties,
                Keyword::PatternProperties,
                Keyword::AdditionalProperties,
                Keyword::DependentRequired,
                Keyword::DependentSchemas,
            ])
            .with_pass(COMBINATORS)
    }

    /// Append a pass.
    #[must_use]
    pub fn with_pass(mut self, keywords: impl IntoIterator<Item = Keyword>) -> Self {
        let mut pass = Pass::default();
        for keyword in keywords {
            pass.insert(keyword);
        }
        self.passes.push(pass);
        self
    }

    /// Add `keyword` to pass `pass`, creating empty passes up to it as needed.
    /// A keyword of the same name in that pass is replaced.
    #[must_use]
    pub fn with_keyword(mut self, pass: usize, keyword: Keyword) -> Self {
        while self.passes.len() <= pass {
            self.passes.push(Pass::default());
        }
        self.passes[pass].insert(keyword);
        self
    }

    /// Whether any pass handles `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.passes.iter().any(|pass| pass.get(name).is_some())
    }

    pub(crate) fn passes(&self) -> &[Pass] {
        &self.passes
    }
}

pub(crate) fn expect_object<'a>(
    keyword: &str,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, CompileError> {
    value
        .as_object()
        .ok_or_else(|| CompileError::invalid_keyword(keyword, value, "an object"))
}

pub(crate) fn expect_array<'a>(
    keyword: &str,
    value: &'a Value,
) -> Result<&'a [Value], CompileError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| CompileError::invalid_keyword(keyword, value, "an array"))
}

pub(crate) fn expect_non_empty_array<'a>(
    keyword: &str,
    value: &'a Value,
) -> Result<&'a [Value], CompileError> {
    match value.as_array() {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(CompileError::invalid_keyword(
            keyword,
            value,
            "a non-empty array",
        )),
    }
}

/// Non-negative integers, including integer-valued floats like `2.0`.
pub(crate) fn expect_limit(keyword: &str, value: &Value) -> Result<u64, CompileError> {
    if let Some(limit) = value.as_u64() {
        return Ok(limit);
    }
    match value.as_f64() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(limit) if limit >= 0.0 && limit.fract() == 0.0 && limit < 18_446_744_073_709_551_616.0 => {
            Ok(limit as u64)
        }
        _ => Err(CompileError::invalid_keyword(
            keyword,
            value,
            "a non-negative integer",
        )),
    }
}

pub(crate) fn expect_number(keyword: &str, value: &Value) -> Result<Numeric, CompileError> {
    match value {
        Value::Number(number) => Ok(Numeric::from(number)),
        _ => Err(CompileError::invalid_keyword(keyword, value, "a number")),
    }
}

/// Strings named by a string array, such as `required`.
pub(crate) fn expect_string_array<'a>(
    keyword: &str,
    value: &'a Value,
) -> Result<Vec<&'a str>, CompileError> {
    expect_array(keyword, value)?
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| CompileError::invalid_keyword(keyword, value, "an array of strings"))
        })
        .collect()
}
