use serde_json::{Map, Value};

use super::expect_number;
use crate::{
    context::{Bucket, Context, RootContext},
    error::CompileError,
    expr::{CmpOp, Divisor, Expr, ValueRef},
    number::{Decimal, Numeric},
};

fn compile_bound(
    keyword: &'static str,
    op: CmpOp,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if let Some(schema) = node.get(keyword) {
        let limit = expect_number(keyword, schema)?;
        ctx.push(
            Bucket::Number,
            Expr::Compare {
                value: value.clone(),
                op,
                limit,
            },
        );
    }
    Ok(())
}

pub(super) fn compile_minimum(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    compile_bound("minimum", CmpOp::Ge, ctx, node, value)
}

pub(super) fn compile_maximum(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    compile_bound("maximum", CmpOp::Le, ctx, node, value)
}

pub(super) fn compile_exclusive_minimum(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    compile_bound("exclusiveMinimum", CmpOp::Gt, ctx, node, value)
}

pub(super) fn compile_exclusive_maximum(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    compile_bound("exclusiveMaximum", CmpOp::Lt, ctx, node, value)
}

pub(super) fn compile_multiple_of(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("multipleOf") else {
        return Ok(());
    };
    let Value::Number(number) = schema else {
        return Err(CompileError::invalid_keyword(
            "multipleOf",
            schema,
            "a number",
        ));
    };
    let divisor = Numeric::from(number);
    if !divisor.is_positive() {
        return Err(CompileError::invalid_keyword(
            "multipleOf",
            schema,
            "a number greater than zero",
        ));
    }
    let exact = if root.options().accurate_multiple_of {
        Decimal::from_number(number)
    } else {
        None
    };
    ctx.push(
        Bucket::Number,
        Expr::MultipleOf {
            value: value.clone(),
            divisor: Divisor {
                value: divisor,
                exact,
            },
        },
    );
    Ok(())
}
