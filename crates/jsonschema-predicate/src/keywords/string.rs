use serde_json::{Map, Value};

use super::expect_limit;
use crate::{
    context::{Bucket, Context, RootContext},
    error::CompileError,
    expr::{CmpOp, Expr, Measure, ValueRef},
};

fn length_measure(root: &RootContext<'_>) -> Measure {
    if root.options().strict_string_width {
        Measure::CodePoints
    } else {
        Measure::CodeUnits
    }
}

pub(super) fn compile_min_length(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if let Some(schema) = node.get("minLength") {
        let limit = expect_limit("minLength", schema)?;
        // Every string is at least zero characters long
        if limit > 0 {
            ctx.push(
                Bucket::String,
                Expr::size(value, length_measure(root), CmpOp::Ge, limit),
            );
        }
    }
    Ok(())
}

pub(super) fn compile_max_length(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if let Some(schema) = node.get("maxLength") {
        let limit = expect_limit("maxLength", schema)?;
        ctx.push(
            Bucket::String,
            Expr::size(value, length_measure(root), CmpOp::Le, limit),
        );
    }
    Ok(())
}

pub(super) fn compile_pattern(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("pattern") else {
        return Ok(());
    };
    let Some(source) = schema.as_str() else {
        return Err(CompileError::invalid_keyword("pattern", schema, "a string"));
    };
    let pattern = root.add_pattern(source)?;
    ctx.push(
        Bucket::String,
        Expr::Matches {
            value: value.clone(),
            pattern,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{compile, inspect, KeywordTable, Options};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn check(schema: &Value, options: Options, instance: &Value) -> bool {
        compile(schema, &KeywordTable::draft2020(), options)
            .expect("Valid schema")
            .is_valid(instance)
    }

    #[test_case(&json!({"minLength": 2}), &json!("ab"), true)]
    #[test_case(&json!({"minLength": 2}), &json!("a"), false)]
    #[test_case(&json!({"minLength": 2}), &json!(1), true)]
    #[test_case(&json!({"maxLength": 2}), &json!("abc"), false)]
    #[test_case(&json!({"maxLength": 2.0}), &json!("ab"), true)]
    #[test_case(&json!({"pattern": "^a+$"}), &json!("aaa"), true)]
    #[test_case(&json!({"pattern": "^a+$"}), &json!("aab"), false)]
    #[test_case(&json!({"pattern": "b"}), &json!("abc"), true; "unanchored")]
    #[test_case(&json!({"pattern": "^a"}), &json!(["b"]), true; "ignores non-strings")]
    fn string_keywords(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(check(schema, Options::default(), instance), expected);
    }

    #[test]
    fn width_counts_code_units_by_default() {
        let schema = json!({"maxLength": 1});
        assert!(!check(&schema, Options::default(), &json!("💩")));
        let options = Options {
            strict_string_width: true,
            ..Options::default()
        };
        assert!(check(&schema, options, &json!("💩")));
    }

    #[test]
    fn zero_min_length_is_dropped() {
        let source = inspect(
            &json!({"type": "string", "minLength": 0}),
            &KeywordTable::draft2020(),
            Options::default(),
        )
        .expect("Valid schema");
        assert_eq!(source, "|x| is_string(x)");
    }

    #[test]
    fn invalid_patterns_fail_compilation() {
        let result = compile(
            &json!({"pattern": "(unclosed"}),
            &KeywordTable::draft2020(),
            Options::default(),
        );
        assert!(matches!(
            result,
            Err(crate::CompileError::InvalidPattern { .. })
        ));
    }
}
