use serde_json::{Map, Value};

use super::{expect_limit, expect_object, expect_string_array};
use crate::{
    context::{Bucket, Context, RootContext},
    error::CompileError,
    expr::{CmpOp, Expr, Measure, Scalar, SlotKind, ValueRef},
};

/// "`name` is present on `value`", honoring `strictPropertyCheck`.
fn has_property(root: &RootContext<'_>, value: &ValueRef, name: &str) -> Expr {
    if root.options().strict_property_check {
        Expr::HasOwn(value.clone(), name.into())
    } else {
        Expr::Present(value.property(name))
    }
}

pub(super) fn compile_min_properties(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if let Some(schema) = node.get("minProperties") {
        let limit = expect_limit("minProperties", schema)?;
        if limit > 0 {
            ctx.push(
                Bucket::Object,
                Expr::size(value, Measure::Keys, CmpOp::Ge, limit),
            );
        }
    }
    Ok(())
}

pub(super) fn compile_max_properties(
    _: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    if let Some(schema) = node.get("maxProperties") {
        let limit = expect_limit("maxProperties", schema)?;
        ctx.push(
            Bucket::Object,
            Expr::size(value, Measure::Keys, CmpOp::Le, limit),
        );
    }
    Ok(())
}

pub(super) fn compile_required(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("required") else {
        return Ok(());
    };
    for name in expect_string_array("required", schema)? {
        ctx.push(Bucket::Object, has_property(root, value, name));
    }
    Ok(())
}

pub(super) fn compile_properties(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("properties") else {
        return Ok(());
    };
    let properties = expect_object("properties", schema)?;
    let required: Vec<&str> = match node.get("required") {
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    for (name, subschema) in properties {
        let condition = root.compile_conditions(subschema, &value.property(name))?;
        if required.contains(&name.as_str()) {
            // Presence is asserted by `required`
            ctx.push(Bucket::Object, condition);
        } else {
            ctx.push(
                Bucket::Object,
                Expr::any([
                    Expr::negate(has_property(root, value, name)),
                    condition,
                ]),
            );
        }
    }
    Ok(())
}

pub(super) fn compile_pattern_properties(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("patternProperties") else {
        return Ok(());
    };
    let patterns = expect_object("patternProperties", schema)?;
    let key = root.slot(SlotKind::Key);
    let mut clauses = Vec::with_capacity(patterns.len());
    for (source, subschema) in patterns {
        let pattern = root.add_pattern(source)?;
        let condition = root.compile_conditions(subschema, &value.member(key))?;
        clauses.push(Expr::any([
            Expr::negate(Expr::Matches {
                value: ValueRef::slot(key),
                pattern,
            }),
            condition,
        ]));
    }
    ctx.push(Bucket::Object, Expr::all_keys(value, key, Expr::all(clauses)));
    Ok(())
}

pub(super) fn compile_additional_properties(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("additionalProperties") else {
        return Ok(());
    };
    let key = root.slot(SlotKind::Key);
    let name = ValueRef::slot(key);
    let mut known = Vec::new();
    if let Some(Value::Object(properties)) = node.get("properties") {
        known.extend(properties.keys().map(|property| Expr::Equals {
            value: name.clone(),
            scalar: Scalar::String(property.as_str().into()),
        }));
    }
    if let Some(Value::Object(patterns)) = node.get("patternProperties") {
        for source in patterns.keys() {
            let pattern = root.add_pattern(source)?;
            known.push(Expr::Matches {
                value: name.clone(),
                pattern,
            });
        }
    }
    let condition = match schema {
        Value::Bool(false) => Expr::Const(false),
        _ => root.compile_conditions(schema, &value.member(key))?,
    };
    ctx.push(
        Bucket::Object,
        Expr::all_keys(value, key, Expr::any(known.into_iter().chain([condition]))),
    );
    Ok(())
}

pub(super) fn compile_property_names(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("propertyNames") else {
        return Ok(());
    };
    let key = root.slot(SlotKind::Key);
    let condition = root.compile_conditions(schema, &ValueRef::slot(key))?;
    ctx.push(Bucket::Object, Expr::all_keys(value, key, condition));
    Ok(())
}

/// A dependency triggered by the presence of `trigger`.
fn push_dependency(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    keyword: &str,
    trigger: &str,
    dependency: &Value,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let condition = match dependency {
        Value::Array(_) => Expr::all(
            expect_string_array(keyword, dependency)?
                .into_iter()
                .map(|name| has_property(root, value, name)),
        ),
        _ => root.compile_conditions(dependency, value)?,
    };
    ctx.push(
        Bucket::Object,
        Expr::any([Expr::negate(has_property(root, value, trigger)), condition]),
    );
    Ok(())
}

pub(super) fn compile_dependencies(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("dependencies") else {
        return Ok(());
    };
    for (trigger, dependency) in expect_object("dependencies", schema)? {
        push_dependency(root, ctx, "dependencies", trigger, dependency, value)?;
    }
    Ok(())
}

pub(super) fn compile_dependent_required(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("dependentRequired") else {
        return Ok(());
    };
    for (trigger, dependency) in expect_object("dependentRequired", schema)? {
        if !dependency.is_array() {
            return Err(CompileError::invalid_keyword(
                "dependentRequired",
                dependency,
                "an array of strings",
            ));
        }
        push_dependency(root, ctx, "dependentRequired", trigger, dependency, value)?;
    }
    Ok(())
}

pub(super) fn compile_dependent_schemas(
    root: &mut RootContext<'_>,
    ctx: &mut Context,
    node: &Map<String, Value>,
    value: &ValueRef,
) -> Result<(), CompileError> {
    let Some(schema) = node.get("dependentSchemas") else {
        return Ok(());
    };
    for (trigger, dependency) in expect_object("dependentSchemas", schema)? {
        if dependency.is_array() {
            return Err(CompileError::invalid_keyword(
                "dependentSchemas",
                dependency,
                "a schema",
            ));
        }
        push_dependency(root, ctx, "dependentSchemas", trigger, dependency, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{compile, inspect, KeywordTable, Options};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn check(schema: &Value, options: Options, instance: &Value) -> bool {
        compile(schema, &KeywordTable::draft6(), options)
            .expect("Valid schema")
            .is_valid(instance)
    }

    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({}), true)]
    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"a": 1}), false)]
    #[test_case(&json!({"required": ["a"]}), &json!({"b": 1}), false)]
    #[test_case(&json!({"required": ["a"]}), &json!("a"), true; "ignores non-objects")]
    #[test_case(&json!({"patternProperties": {"^x-": {"type": "integer"}}}), &json!({"x-a": 1, "b": "c"}), true)]
    #[test_case(&json!({"patternProperties": {"^x-": {"type": "integer"}}}), &json!({"x-a": "1"}), false)]
    #[test_case(&json!({"properties": {"a": {}}, "additionalProperties": false}), &json!({"a": 1}), true)]
    #[test_case(&json!({"properties": {"a": {}}, "additionalProperties": false}), &json!({"a": 1, "b": 2}), false)]
    #[test_case(&json!({"patternProperties": {"^a": {}}, "additionalProperties": {"type": "null"}}), &json!({"ab": 1, "c": null}), true)]
    #[test_case(&json!({"additionalProperties": {"type": "null"}}), &json!({"c": 1}), false)]
    #[test_case(&json!({"propertyNames": {"maxLength": 2}}), &json!({"ab": 1}), true)]
    #[test_case(&json!({"propertyNames": {"maxLength": 2}}), &json!({"abc": 1}), false)]
    #[test_case(&json!({"propertyNames": false}), &json!({}), true)]
    #[test_case(&json!({"minProperties": 1}), &json!({}), false)]
    #[test_case(&json!({"maxProperties": 1}), &json!({"a": 1, "b": 2}), false)]
    #[test_case(&json!({"dependencies": {"a": ["b"]}}), &json!({"a": 1}), false)]
    #[test_case(&json!({"dependencies": {"a": ["b"]}}), &json!({"b": 1}), true)]
    #[test_case(&json!({"dependencies": {"a": {"required": ["b"]}}}), &json!({"a": 1, "b": 2}), true)]
    #[test_case(&json!({"dependencies": {"a": {"required": ["b"]}}}), &json!({"a": 1}), false)]
    fn object_keywords(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(check(schema, Options::default(), instance), expected);
    }

    #[test]
    fn arrays_act_as_objects_unless_disabled() {
        let schema = json!({"type": "object", "required": ["0"]});
        assert!(check(&schema, Options::default(), &json!(["a"])));
        assert!(!check(&schema, Options::default(), &json!([])));
        let options = Options {
            no_array_object: true,
            ..Options::default()
        };
        assert!(!check(&schema, options, &json!(["a"])));
    }

    #[test]
    fn required_properties_skip_the_absence_guard() {
        let source = inspect(
            &json!({"properties": {"a": {"type": "string"}}, "required": ["a"]}),
            &KeywordTable::draft6(),
            Options::default(),
        )
        .expect("Valid schema");
        assert_eq!(
            source,
            "|x| !is_object(x) || (is_string(x.a) && x.a != undefined)"
        );
    }

    #[test]
    fn strict_property_check_uses_own_properties() {
        let options = Options {
            strict_property_check: true,
            ..Options::default()
        };
        let source = inspect(
            &json!({"properties": {"my key": {"type": "null"}}}),
            &KeywordTable::draft6(),
            options,
        )
        .expect("Valid schema");
        assert_eq!(
            source,
            "|x| !is_object(x) || !has_own(x, \"my key\") || is_null(x[\"my key\"])"
        );
    }

    #[test]
    fn dependent_keywords_in_draft2020() {
        let table = KeywordTable::draft2020();
        let schema = json!({
            "dependentRequired": {"a": ["b"]},
            "dependentSchemas": {"c": {"required": ["d"]}}
        });
        let predicate = compile(&schema, &table, Options::default()).expect("Valid schema");
        assert!(predicate.is_valid(&json!({"a": 1, "b": 2})));
        assert!(!predicate.is_valid(&json!({"a": 1})));
        assert!(!predicate.is_valid(&json!({"c": 1})));
        assert!(compile(
            &json!({"dependentRequired": {"a": {}}}),
            &table,
            Options::default()
        )
        .is_err());
    }
}
