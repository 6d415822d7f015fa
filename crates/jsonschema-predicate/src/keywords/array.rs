use serde_json::{Map, Value};

use super::{expect_array, expect_limit};
use crate::{
    context::{Bucket, Context, RootContext},
    error::CompileError,
    expr::{CmpOp, Expr, Measure, SlotKind, ValueRef},
    pool::{Builtin, Routine},
};

pub(super) fn compile_min_items(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if let Some(schema) = node.get("minItems") {
        let limit = expect_limit("minItems", schema)?;
        if limit > 0 {
            ctx.push(
                Bucket::Array,
                Expr::size(value, Measure::Items, CmpOp::Ge, limit),
            );
        }
    }
    Ok(())
}

pub(super) fn compile_max_items(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if let Some(schema) = node.get("maxItems") {
        let limit = expect_limit("maxItems", schema)?;
        ctx.push(
            Bucket::Array,
            Expr::size(value, Measure::Items, CmpOp::Le, limit),
        );
    }
    Ok(())
}

pub(super) fn compile_unique_items(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    match node.get("uniqueItems") {
        None | Some(Value::Bool(false)) => Ok(()),
        Some(Value::Bool(true)) => {
            let helper = if root.options().fast_assertions {
                None
            } else {
                Some(root.include_builtin(Builtin::DeepEqual))
            };
            ctx.push(
                Bucket::Array,
                Expr::Unique {
                    value: value.clone(),
                    helper,
                },
            );
            Ok(())
        }
        Some(schema) => Err(CompileError::invalid_keyword(
            "uniqueItems",
            schema,
            "a boolean",
        )),
    }
}

/// Positional schemas: item `i` is only checked when the array is longer than `i`.
fn compile_tuple(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    schemas: &[Value],
    value: &ValueRef,
) -> Result<(), CompileError> {
    for (idx, schema) in schemas.iter().enumerate() {
        let condition = root.compile_conditions(schema, &value.index(idx))?;
        ctx.push(
            Bucket::Array,
            Expr::any([
                Expr::size(value, Measure::Items, CmpOp::Le, idx as u64),
                condition,
            ]),
        );
    }
    Ok(())
}

/// Every item from index `start` on satisfies `schema`.
fn compile_rest(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    schema: &Value,
    start: usize,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if start > 0 && schema == &Value::Bool(false) {
        ctx.push(
            Bucket::Array,
            Expr::size(value, Measure::Items, CmpOp::Le, start as u64),
        );
        return Ok(());
    }
    let item = root.slot(SlotKind::Item);
    let body = root.compile_conditions(schema, &ValueRef::slot(item))?;
    if start == 0 {
        ctx.push(Bucket::Array, Expr::all_items(value, item, body));
    } else if !body.is_true() {
        let routine = root.add_func(Routine::EveryFrom { start, item, body });
        ctx.push(
            Bucket::Array,
            Expr::Call {
                routine,
                value: value.clone(),
            },
        );
    }
    Ok(())
}

pub(super) fn compile_items(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("items") else {
        return Ok(());
    };
    if let Value::Array(schemas) = schema {
        return compile_tuple(root, ctx, schemas, value);
    }
    let start = if root.supports("prefixItems") {
        match node.get("prefixItems") {
            Some(Value::Array(prefix)) => prefix.len(),
            _ => 0,
        }
    } else {
        0
    };
    compile_rest(root, ctx, schema, start, value)
}

pub(super) fn compile_prefix_items(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("prefixItems") else {
        return Ok(());
    };
    let schemas = expect_array("prefixItems", schema)?;
    compile_tuple(root, ctx, schemas, value)
}

pub(super) fn compile_additional_items(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("additionalItems") else {
        return Ok(());
    };
    // Meaningless unless `items` is positional
    let Some(Value::Array(schemas)) = node.get("items") else {
        return Ok(());
    };
    compile_rest(root, ctx, schema, schemas.len(), value)
}

fn contains_bound(
    root: &RootContext<'_>,
    node: &Map<String, Value>,
    keyword: &str,
) -> Result<Option<u64>, CompileError> {
    if !root.supports(keyword) {
        return Ok(None);
    }
    node.get(keyword)
        .map(|schema| expect_limit(keyword, schema))
        .transpose()
}

pub(super) fn compile_contains(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("contains") else {
        return Ok(());
    };
    let min = contains_bound(root, node, "minContains")?;
    let max = contains_bound(root, node, "maxContains")?;
    let item = root.slot(SlotKind::Item);
    let body = root.compile_conditions(schema, &ValueRef::slot(item))?;
    let condition = if min.is_none() && max.is_none() {
        Expr::any_item(value, item, body)
    } else {
        let min = min.unwrap_or(1);
        if min == 0 && max.is_none() {
            Expr::Const(true)
        } else {
            let routine = root.add_func(Routine::Count {
                item,
                body,
                min,
                max,
            });
            Expr::Call {
                routine,
                value: value.clone(),
            }
        }
    };
    ctx.push(Bucket::Array, condition);
    Ok(())
}

/// Without `contains`, the bound applies to the array length.
fn compile_contains_bound(
    keyword: &'static str,
    op: CmpOp,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get(keyword) else {
        return Ok(());
    };
    let limit = expect_limit(keyword, schema)?;
    if !node.contains_key("contains") {
        ctx.push(Bucket::Array, Expr::size(value, Measure::Items, op, limit));
    }
    Ok(())
}

pub(super) fn compile_min_contains(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    compile_contains_bound("minContains", CmpOp::Ge, ctx, node, value)
}

pub(super) fn compile_max_contains(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    compile_contains_bound("maxContains", CmpOp::Le, ctx, node, value)
}

#[cfg(test)]
mod tests {
    use crate::{compile, inspect, KeywordTable, Options};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn check(schema: &Value, table: &KeywordTable, instance: &Value) -> bool {
        compile(schema, table, Options::default())
            .expect("Valid schema")
            .is_valid(instance)
    }

    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, 2]), true)]
    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, "2"]), false)]
    #[test_case(&json!({"items": [{"type": "integer"}, {"type": "string"}]}), &json!([1]), true)]
    #[test_case(&json!({"items": [{"type": "integer"}, {"type": "string"}]}), &json!([1, 2]), false)]
    #[test_case(&json!({"items": [{}], "additionalItems": false}), &json!([1, 2]), false)]
    #[test_case(&json!({"items": [{}], "additionalItems": false}), &json!([1]), true)]
    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "string"}}), &json!([1, "a"]), true)]
    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "string"}}), &json!([1, 2]), false)]
    #[test_case(&json!({"items": {}, "additionalItems": false}), &json!([1, 2]), true; "ignored without tuple")]
    #[test_case(&json!({"contains": {"const": 1}}), &json!([2, 1]), true)]
    #[test_case(&json!({"contains": {"const": 1}}), &json!([]), false)]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1.0]), false)]
    #[test_case(&json!({"uniqueItems": true}), &json!([[1], [2]]), true)]
    #[test_case(&json!({"uniqueItems": false}), &json!([1, 1]), true)]
    #[test_case(&json!({"maxItems": 1}), &json!("ab"), true; "ignores non-arrays")]
    fn draft6_array_keywords(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(check(schema, &KeywordTable::draft6(), instance), expected);
    }

    #[test_case(&json!({"prefixItems": [{"type": "integer"}], "items": false}), &json!([1]), true)]
    #[test_case(&json!({"prefixItems": [{"type": "integer"}], "items": false}), &json!([1, 2]), false)]
    #[test_case(&json!({"prefixItems": [{}], "items": {"type": "string"}}), &json!([1, "a"]), true)]
    #[test_case(&json!({"prefixItems": [{}], "items": {"type": "string"}}), &json!([1, 2]), false)]
    #[test_case(&json!({"contains": {"const": 1}, "minContains": 2}), &json!([1, 2, 1]), true)]
    #[test_case(&json!({"contains": {"const": 1}, "minContains": 2}), &json!([1, 2]), false)]
    #[test_case(&json!({"contains": {"const": 1}, "maxContains": 1}), &json!([1, 1]), false)]
    #[test_case(&json!({"contains": {"const": 1}, "maxContains": 1}), &json!([2]), false; "min defaults to one")]
    #[test_case(&json!({"contains": {"const": 1}, "minContains": 0}), &json!([]), true)]
    #[test_case(&json!({"minContains": 2}), &json!([1]), false; "degrades to length")]
    fn draft2020_array_keywords(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(check(schema, &KeywordTable::draft2020(), instance), expected);
    }

    #[test]
    fn tail_items_are_hoisted() {
        let source = inspect(
            &json!({"prefixItems": [{}], "items": {"type": "string"}}),
            &KeywordTable::draft2020(),
            Options::default(),
        )
        .expect("Valid schema");
        assert_eq!(
            source,
            "let f0 = |a| a.iter().skip(1).all(|v0| is_string(v0));\n\
             |x| !is_array(x) || (f0(x) && (len(x) <= 0 || x[0] != undefined))"
        );
    }

    #[test]
    fn invalid_unique_items() {
        let result = compile(
            &json!({"uniqueItems": 1}),
            &KeywordTable::draft2020(),
            Options::default(),
        );
        assert!(result.is_err());
    }
}
