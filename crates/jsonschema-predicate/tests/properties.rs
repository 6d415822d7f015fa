use jsonschema_predicate::{compile, KeywordTable, Options, Predicate};
use serde_json::{json, Value};
use test_case::test_case;

fn predicate(schema: &Value) -> Predicate {
    compile(schema, &KeywordTable::draft2020(), Options::default()).expect("Valid schema")
}

fn corpus() -> Vec<Value> {
    vec![
        json!(null),
        json!(true),
        json!(false),
        json!(0),
        json!(-1),
        json!(5),
        json!(5.5),
        json!(""),
        json!("ab"),
        json!("abc"),
        json!("💩"),
        json!([]),
        json!([1, 2]),
        json!([1, "a"]),
        json!({}),
        json!({"a": "x"}),
        json!({"a": 1}),
    ]
}

#[test]
fn true_schema_accepts_every_present_value() {
    let predicate = predicate(&json!(true));
    for value in corpus() {
        assert!(predicate.is_valid(&value), "{value}");
    }
    assert!(!predicate.evaluate(None));
}

#[test]
fn false_schema_rejects_every_present_value() {
    let predicate = predicate(&json!(false));
    for value in corpus() {
        assert!(!predicate.is_valid(&value), "{value}");
    }
    assert!(predicate.evaluate(None));
}

#[test_case(&json!(5), true)]
#[test_case(&json!(null), true)]
#[test_case(&json!([1]), true)]
#[test_case(&json!("abc"), true)]
#[test_case(&json!("ab"), false)]
#[test_case(&json!(""), false)]
fn length_bounds_ignore_other_types(instance: &Value, expected: bool) {
    assert_eq!(predicate(&json!({"minLength": 3})).is_valid(instance), expected);
}

#[test_case(&json!(5), true)]
#[test_case(&json!(0), true)]
#[test_case(&json!(5.0), true)]
#[test_case(&json!(-1), false)]
#[test_case(&json!(5.5), false)]
#[test_case(&json!("5"), false)]
fn integer_with_minimum(instance: &Value, expected: bool) {
    let schema = json!({"type": "integer", "minimum": 0});
    assert_eq!(predicate(&schema).is_valid(instance), expected);
}

#[test_case(&json!([1, 2]), true)]
#[test_case(&json!([1.5]), true)]
#[test_case(&json!([]), false)]
#[test_case(&json!([1, "a"]), false)]
#[test_case(&json!({"0": 1}), false)]
fn typed_arrays(instance: &Value, expected: bool) {
    let schema = json!({"type": "array", "items": {"type": "number"}, "minItems": 1});
    assert_eq!(predicate(&schema).is_valid(instance), expected);
}

#[test_case(&json!(2), true)]
#[test_case(&json!(2.0), true)]
#[test_case(&json!(4), false)]
#[test_case(&json!("2"), false)]
fn enumerations(instance: &Value, expected: bool) {
    assert_eq!(
        predicate(&json!({"enum": [1, 2, 3]})).is_valid(instance),
        expected
    );
}

#[test_case(&json!({"a": "x"}), true)]
#[test_case(&json!({"a": "x", "b": 1}), true)]
#[test_case(&json!({}), false)]
#[test_case(&json!({"a": 1}), false)]
#[test_case(&json!("a"), false)]
fn required_properties(instance: &Value, expected: bool) {
    let schema = json!({
        "type": "object",
        "properties": {"a": {"type": "string"}},
        "required": ["a"]
    });
    assert_eq!(predicate(&schema).is_valid(instance), expected);
}

#[test_case(&json!("x"), true)]
#[test_case(&json!(5), true)]
#[test_case(&json!(5.5), true)]
#[test_case(&json!(true), false)]
#[test_case(&json!(null), false)]
fn alternatives(instance: &Value, expected: bool) {
    let schema = json!({"anyOf": [{"type": "string"}, {"type": "number"}]});
    assert_eq!(predicate(&schema).is_valid(instance), expected);
}

#[test]
fn string_width() {
    let schema = json!({"minLength": 2});
    let default = predicate(&schema);
    let strict = compile(
        &schema,
        &KeywordTable::draft2020(),
        Options {
            strict_string_width: true,
            ..Options::default()
        },
    )
    .expect("Valid schema");
    // A single code point outside the BMP is two UTF-16 code units.
    assert!(default.is_valid(&json!("💩")));
    assert!(!strict.is_valid(&json!("💩")));
    assert!(strict.is_valid(&json!("💩💩")));
}

#[test]
fn accurate_multiple_of() {
    let schema = json!({"multipleOf": 0.1});
    let accurate = compile(
        &schema,
        &KeywordTable::draft2020(),
        Options {
            accurate_multiple_of: true,
            ..Options::default()
        },
    )
    .expect("Valid schema");
    assert!(accurate.is_valid(&json!(0.3)));
    assert!(accurate.is_valid(&json!(7)));
    assert!(!accurate.is_valid(&json!(0.35)));
}

#[test]
fn array_objects() {
    let schema = json!({"type": "object"});
    let lenient = predicate(&schema);
    let strict = compile(
        &schema,
        &KeywordTable::draft2020(),
        Options {
            no_array_object: true,
            ..Options::default()
        },
    )
    .expect("Valid schema");
    assert!(lenient.is_valid(&json!([])));
    assert!(!strict.is_valid(&json!([])));
    assert!(strict.is_valid(&json!({})));
}

#[test]
fn fast_assertions_agree_on_plain_values() {
    let schema = json!({"enum": [1, "a", [true]], "uniqueItems": true});
    let structural = predicate(&schema);
    let fast = compile(
        &schema,
        &KeywordTable::draft2020(),
        Options {
            fast_assertions: true,
            ..Options::default()
        },
    )
    .expect("Valid schema");
    for value in corpus()
        .into_iter()
        .chain([json!([true]), json!("a"), json!([false])])
    {
        assert_eq!(structural.is_valid(&value), fast.is_valid(&value), "{value}");
    }
}

#[test_case(&json!({"type": "integer", "minimum": 0}))]
#[test_case(&json!({"properties": {"a": {"pattern": "^x"}}, "additionalProperties": false}))]
#[test_case(&json!({"oneOf": [{"multipleOf": 2}, {"multipleOf": 3}]}))]
#[test_case(&json!({"contains": {"type": "string"}, "maxContains": 1}))]
fn compilation_is_idempotent(schema: &Value) {
    let first = predicate(schema);
    let second = predicate(schema);
    assert_eq!(first.to_string(), second.to_string());
    for value in corpus() {
        assert_eq!(first.is_valid(&value), second.is_valid(&value), "{value}");
    }
}

#[test]
fn absent_values() {
    assert!(predicate(&json!({"not": true})).evaluate(None));
    assert!(predicate(&json!({"minimum": 1})).evaluate(None));
    assert!(!predicate(&json!({"type": "number"})).evaluate(None));
    assert!(!predicate(&json!({})).evaluate(None));
}
