use serde_json::{Map, Value};

use super::expect_array;
use crate::{
    context::{Bucket, Context, RootContext},
    error::CompileError,
    expr::{CmpOp, Expr, Measure, Scalar, TypeCheck, ValueRef},
    number::Numeric,
    types::{JsonType, JsonTypeSet},
};

pub(super) fn compile_type(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    _: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("type") else {
        return Ok(());
    };
    let parse = |name: &Value| {
        name.as_str()
            .and_then(|name| name.parse::<JsonType>().ok())
            .ok_or_else(|| CompileError::invalid_keyword("type", schema, "a known type name"))
    };
    let types = match schema {
        Value::String(_) => JsonTypeSet::new().insert(parse(schema)?),
        Value::Array(names) => names
            .iter()
            .map(parse)
            .collect::<Result<JsonTypeSet, _>>()?,
        _ => {
            return Err(CompileError::invalid_keyword(
                "type",
                schema,
                "a type name or an array of type names",
            ))
        }
    };
    ctx.declare(types);
    Ok(())
}

pub(super) fn compile_enum(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("enum") else {
        return Ok(());
    };
    let items = expect_array("enum", schema)?;
    let condition = if root.options().fast_assertions {
        let table = root.add_declaration(schema.clone());
        Expr::InTable {
            value: value.clone(),
            table,
        }
    } else {
        Expr::any(items.iter().map(|item| analyze_deep_equal(value, item)))
    };
    ctx.push(Bucket::Unconditional, condition);
    Ok(())
}

pub(super) fn compile_const(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if let Some(constant) = node.get("const") {
        ctx.push(Bucket::Unconditional, analyze_deep_equal(value, constant));
    }
    Ok(())
}

/// Structural equality with a literal, unrolled into the literal's shape.
pub(crate) fn analyze_deep_equal(value: &ValueRef, literal: &Value) -> Expr {
    match literal {
        Value::Null => Expr::Type(value.clone(), TypeCheck::Null),
        Value::Bool(b) => Expr::Equals {
            value: value.clone(),
            scalar: Scalar::Bool(*b),
        },
        Value::Number(n) => Expr::Equals {
            value: value.clone(),
            scalar: Scalar::Number(Numeric::from(n)),
        },
        Value::String(s) => Expr::Equals {
            value: value.clone(),
            scalar: Scalar::String(s.as_str().into()),
        },
        Value::Array(items) => Expr::all(
            [
                Expr::Type(value.clone(), TypeCheck::Array),
                Expr::size(value, Measure::Items, CmpOp::Eq, items.len() as u64),
            ]
            .into_iter()
            .chain(
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| analyze_deep_equal(&value.index(idx), item)),
            ),
        ),
        Value::Object(map) => Expr::all(
            [
                Expr::Type(value.clone(), TypeCheck::PlainObject),
                Expr::size(value, Measure::Keys, CmpOp::Eq, map.len() as u64),
            ]
            .into_iter()
            .chain(
                map.iter()
                    .map(|(key, item)| analyze_deep_equal(&value.property(key), item)),
            ),
        ),
    }
}
