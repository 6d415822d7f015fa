use serde_json::{Map, Value};

use super::expect_non_empty_array;
use crate::{
    context::{Bucket, Context, RootContext},
    error::CompileError,
    expr::{Expr, ValueRef},
};

/// Compile every branch in a fork of `ctx`, so branches see the declared types
/// but none of the sibling conditions.
fn compile_branches(
    root: &mut RootContext<'_>,
    ctx: &Context,
    schemas: &[Value],
    value: &ValueRef,
) -> Result<Vec<Expr>, CompileError> {
    schemas
        .iter()
        .map(|schema| {
            let mut branch = ctx.fork();
            root.evaluate(&mut branch, schema, value)?;
            Ok(branch.finalize(value, root.options()))
        })
        .collect()
}

pub(super) fn compile_any_of(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("anyOf") else {
        return Ok(());
    };
    let schemas = expect_non_empty_array("anyOf", schema)?;
    let branches = compile_branches(root, ctx, schemas, value)?;
    ctx.push(Bucket::Unconditional, Expr::any(branches));
    Ok(())
}

pub(super) fn compile_one_of(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("oneOf") else {
        return Ok(());
    };
    let schemas = expect_non_empty_array("oneOf", schema)?;
    let branches = compile_branches(root, ctx, schemas, value)?;
    ctx.push(Bucket::Unconditional, Expr::exactly_one(branches));
    Ok(())
}

pub(super) fn compile_all_of(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("allOf") else {
        return Ok(());
    };
    // Members merge into the current scope
    for member in expect_non_empty_array("allOf", schema)? {
        root.evaluate(ctx, member, value)?;
    }
    Ok(())
}

pub(super) fn compile_not(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if let Some(schema) = node.get("not") {
        let condition = root.compile_conditions(schema, value)?;
        ctx.push(Bucket::Unconditional, Expr::negate(condition));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{compile, KeywordTable, Options};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn check(schema: &Value, instance: &Value) -> bool {
        compile(schema, &KeywordTable::draft2020(), Options::default())
            .expect("Valid schema")
            .is_valid(instance)
    }

    #[test_case(&json!({"anyOf": [{"type": "string"}, {"minimum": 2}]}), &json!(1), false)]
    #[test_case(&json!({"anyOf": [{"type": "string"}, {"minimum": 2}]}), &json!(3), true)]
    #[test_case(&json!({"anyOf": [{"type": "string"}, {"minimum": 2}]}), &json!(null), true; "vacuous branch")]
    #[test_case(&json!({"type": "number", "anyOf": [{"type": "string"}, {"minimum": 2}]}), &json!("a"), false)]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3), false)]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1), true)]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5), true)]
    #[test_case(&json!({"oneOf": [true, false]}), &json!(1), true)]
    #[test_case(&json!({"oneOf": [true, true]}), &json!(1), false)]
    #[test_case(&json!({"allOf": [{"minimum": 1}, {"maximum": 3}]}), &json!(2), true)]
    #[test_case(&json!({"allOf": [{"minimum": 1}, {"maximum": 3}]}), &json!(4), false)]
    #[test_case(&json!({"allOf": [{"type": "string"}, {"type": "number"}]}), &json!(1), false; "disjoint types")]
    #[test_case(&json!({"allOf": [{"type": "number"}, {"type": "integer"}]}), &json!(1.5), false)]
    #[test_case(&json!({"allOf": [true, {"type": "null"}]}), &json!(null), true)]
    #[test_case(&json!({"allOf": [false]}), &json!(null), false)]
    #[test_case(&json!({"not": {"type": "string"}}), &json!("a"), false)]
    #[test_case(&json!({"not": {"type": "string"}}), &json!(1), true)]
    #[test_case(&json!({"not": {}}), &json!(1), false)]
    fn combinators(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(check(schema, instance), expected);
    }

    #[test_case(&json!({"anyOf": []}))]
    #[test_case(&json!({"oneOf": {}}))]
    #[test_case(&json!({"allOf": [1]}))]
    #[test_case(&json!({"not": "string"}))]
    fn invalid_values(schema: &Value) {
        assert!(compile(schema, &KeywordTable::draft2020(), Options::default()).is_err());
    }

    #[test]
    fn false_schema_accepts_only_absence() {
        let predicate = compile(
            &json!({"anyOf": [false]}),
            &KeywordTable::draft2020(),
            Options::default(),
        )
        .expect("Valid schema");
        assert!(!predicate.is_valid(&json!(1)));
        assert!(predicate.evaluate(None));
    }
}
