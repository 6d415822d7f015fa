//! Compilation state.
//!
//! [`RootContext`] lives for one compilation and owns the declaration pool.
//! [`Context`] collects the conditions of a single schema node, grouped by the
//! JSON type they apply to, and [`Context::finalize`] turns them into one
//! expression with the right type guards.
use serde_json::Value;

use crate::{
    error::CompileError,
    expr::{Expr, Slot, SlotKind, TypeCheck, ValueRef},
    keywords::KeywordTable,
    options::Options,
    pool::{Builtin, Name, Pool, Routine},
    predicate::Predicate,
    types::{JsonType, JsonTypeSet},
};

/// Which group of conditions a keyword contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bucket {
    String,
    Number,
    Array,
    Object,
    /// Applies regardless of the value's type.
    Unconditional,
}

pub(crate) struct RootContext<'t> {
    options: Options,
    keywords: &'t KeywordTable,
    pool: Pool,
    slots: u32,
}

impl<'t> RootContext<'t> {
    pub(crate) fn new(keywords: &'t KeywordTable, options: Options) -> Self {
        tracing::debug!(?options, "Starting compilation");
        Self {
            options,
            keywords,
            pool: Pool::default(),
            slots: 0,
        }
    }

    #[inline]
    pub(crate) fn options(&self) -> &Options {
        &self.options
    }

    /// Whether the active keyword table handles `keyword`.
    pub(crate) fn supports(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    /// Hoist a literal table.
    pub(crate) fn add_declaration(&mut self, value: Value) -> Name {
        let name = self.pool.add_literal(value);
        tracing::trace!(%name, "Hoisted literal");
        name
    }

    pub(crate) fn add_pattern(&mut self, source: &str) -> Result<Name, CompileError> {
        let name = self
            .pool
            .add_pattern(source, self.options.unicode_aware_regex)?;
        tracing::trace!(%name, pattern = source, "Hoisted pattern");
        Ok(name)
    }

    /// Hoist a routine under a fresh name.
    pub(crate) fn add_func(&mut self, routine: Routine) -> Name {
        let name = self.pool.add_routine(routine);
        tracing::trace!(%name, "Hoisted routine");
        name
    }

    pub(crate) fn include_builtin(&mut self, builtin: Builtin) -> Name {
        self.pool.include_builtin(builtin)
    }

    /// A loop variable unique within this compilation.
    pub(crate) fn slot(&mut self, kind: SlotKind) -> Slot {
        let slot = Slot::new(self.slots, kind);
        self.slots += 1;
        slot
    }

    /// Compile a schema node into a condition on `value`.
    pub(crate) fn compile_conditions(
        &mut self,
        schema: &Value,
        value: &ValueRef,
    ) -> Result<Expr, CompileError> {
        match schema {
            Value::Bool(true) => Ok(Expr::Present(value.clone())),
            Value::Bool(false) => Ok(Expr::Absent(value.clone())),
            Value::Object(_) => {
                let mut ctx = Context::new();
                self.evaluate(&mut ctx, schema, value)?;
                Ok(ctx.finalize(value, &self.options))
            }
            _ => Err(CompileError::invalid_schema(schema)),
        }
    }

    /// Apply every keyword of `schema` to `ctx`, pass by pass.
    pub(crate) fn evaluate(
        &mut self,
        ctx: &mut Context,
        schema: &Value,
        value: &ValueRef,
    ) -> Result<(), CompileError> {
        let node = match schema {
            Value::Object(node) => node,
            Value::Bool(true) => return Ok(()),
            Value::Bool(false) => {
                ctx.push(Bucket::Unconditional, Expr::Absent(value.clone()));
                return Ok(());
            }
            _ => return Err(CompileError::invalid_schema(schema)),
        };
        let keywords = self.keywords;
        for pass in keywords.passes() {
            for name in node.keys() {
                if let Some(keyword) = pass.get(name) {
                    tracing::trace!(keyword = name.as_str(), %value, "Applying keyword");
                    keyword.compile(self, ctx, node, value)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn into_predicate(self, root: Expr) -> Predicate {
        tracing::debug!(
            declarations = self.pool.declarations().len(),
            "Finished compilation"
        );
        Predicate::new(root, self.pool, self.slots as usize)
    }
}

/// Conditions collected for one schema node.
#[derive(Debug, Default)]
pub(crate) struct Context {
    strings: Vec<Expr>,
    numbers: Vec<Expr>,
    arrays: Vec<Expr>,
    objects: Vec<Expr>,
    unconditional: Vec<Expr>,
    /// `None` until some `type` keyword applies to this scope.
    types: Option<JsonTypeSet>,
}

impl Context {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// An empty scope carrying only the declared types.
    pub(crate) fn fork(&self) -> Self {
        Self {
            types: self.types,
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, bucket: Bucket, expr: Expr) {
        if expr.is_true() {
            return;
        }
        let conditions = match bucket {
            Bucket::String => &mut self.strings,
            Bucket::Number => &mut self.numbers,
            Bucket::Array => &mut self.arrays,
            Bucket::Object => &mut self.objects,
            Bucket::Unconditional => &mut self.unconditional,
        };
        conditions.push(expr);
    }

    /// Narrow the accepted types. Declarations from merged schemas intersect.
    pub(crate) fn declare(&mut self, types: JsonTypeSet) {
        self.types = Some(match self.types {
            Some(declared) => declared.intersect(types),
            None => types,
        });
    }

    pub(crate) fn finalize(self, value: &ValueRef, options: &Options) -> Expr {
        let Context {
            strings,
            numbers,
            arrays,
            objects,
            unconditional,
            types,
        } = self;
        let number_check = if options.no_non_finite_number {
            TypeCheck::Finite
        } else {
            TypeCheck::Number
        };
        let object_check = if options.no_array_object {
            TypeCheck::PlainObject
        } else {
            TypeCheck::Object
        };
        let is = |check| Expr::Type(value.clone(), check);

        let Some(declared) = types else {
            // Every group is vacuous for values of other types
            let guards = [
                (TypeCheck::String, strings),
                (number_check, numbers),
                (TypeCheck::Array, arrays),
                (object_check, objects),
            ]
            .into_iter()
            .filter(|(_, conditions)| !conditions.is_empty())
            .map(|(check, conditions)| Expr::any([Expr::negate(is(check)), Expr::all(conditions)]))
            .collect::<Vec<_>>();
            if guards.is_empty() && unconditional.is_empty() {
                return Expr::Present(value.clone());
            }
            return Expr::all(guards.into_iter().chain(unconditional));
        };

        let mut clauses = Vec::new();
        if declared.contains(JsonType::String) {
            clauses.push(Expr::all([is(TypeCheck::String)].into_iter().chain(strings)));
        }
        if declared.contains(JsonType::Number) {
            clauses.push(Expr::all([is(number_check)].into_iter().chain(numbers)));
        } else if declared.contains(JsonType::Integer) {
            clauses.push(Expr::all([is(TypeCheck::Integer)].into_iter().chain(numbers)));
        }
        if declared.contains(JsonType::Array) {
            clauses.push(Expr::all([is(TypeCheck::Array)].into_iter().chain(arrays)));
        }
        if declared.contains(JsonType::Object) {
            clauses.push(Expr::all([is(object_check)].into_iter().chain(objects)));
        }
        if declared.contains(JsonType::Boolean) {
            clauses.push(is(TypeCheck::Boolean));
        }
        if declared.contains(JsonType::Null) {
            clauses.push(is(TypeCheck::Null));
        }
        // No declared type survived the intersection: `any([])` is `false`
        Expr::all([Expr::any(clauses)].into_iter().chain(unconditional))
    }
}
