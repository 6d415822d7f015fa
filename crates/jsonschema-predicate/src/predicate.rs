use core::fmt;

use serde_json::Value;

use crate::{
    equality::{equal, is_unique},
    expr::{Access, Expr, Measure, Scalar, TypeCheck, ValueRef},
    instance::Instance,
    number::{self, Decimal, Numeric},
    pool::{Builtin, Declaration, Name, Pool, Routine},
};

/// A compiled schema.
///
/// Evaluation never fails: values of unexpected shapes simply do not match.
/// The predicate is immutable and can be shared between threads.
#[derive(Debug)]
pub struct Predicate {
    root: Expr,
    pool: Pool,
    slots: usize,
}

impl Predicate {
    pub(crate) fn new(root: Expr, pool: Pool, slots: usize) -> Self {
        Self { root, pool, slots }
    }

    /// Run validation against `instance` and return a boolean result.
    #[must_use]
    #[inline]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.evaluate(Some(instance))
    }

    /// Evaluate against a value that may be missing altogether, as an absent
    /// property would be.
    #[must_use]
    pub fn evaluate(&self, instance: Option<&Value>) -> bool {
        let mut evaluator = Evaluator {
            pool: &self.pool,
            input: Instance::from_option(instance),
            slots: vec![Instance::Missing; self.slots],
        };
        evaluator.eval(&self.root)
    }

    /// The compiled expression.
    #[must_use]
    pub fn expression(&self) -> &Expr {
        &self.root
    }

    /// Hoisted declarations, in the order their names were assigned.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        self.pool.declarations()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, declaration) in self.declarations().iter().enumerate() {
            writeln!(f, "let f{idx} = {declaration};")?;
        }
        write!(f, "|x| {}", self.root)
    }
}

struct Evaluator<'p, 'a> {
    pool: &'p Pool,
    input: Instance<'a>,
    slots: Vec<Instance<'a>>,
}

impl<'p, 'a> Evaluator<'p, 'a> {
    fn resolve(&self, value: &ValueRef) -> Instance<'a> {
        match value.access() {
            Access::Input => self.input,
            Access::Slot(slot) => self.slots[slot.index()],
            Access::Property(base, name) => self.resolve(base).property(name),
            Access::Index(base, idx) => self.resolve(base).index(*idx),
            Access::Member(base, key) => self
                .resolve(base)
                .member(self.slots[key.index()]),
        }
    }

    fn eval(&mut self, expr: &'p Expr) -> bool {
        match expr {
            Expr::Const(value) => *value,
            Expr::Present(value) => self.resolve(value).is_present(),
            Expr::Absent(value) => !self.resolve(value).is_present(),
            Expr::HasOwn(value, key) => self
                .resolve(value)
                .as_entries()
                .is_some_and(|entries| entries.contains(key)),
            Expr::Type(value, check) => type_matches(self.resolve(value), *check),
            Expr::Not(inner) => !self.eval(inner),
            Expr::All(items) => items.iter().all(|item| self.eval(item)),
            Expr::Any(items) => items.iter().any(|item| self.eval(item)),
            Expr::ExactlyOne(items) => {
                let mut matched = 0_usize;
                for item in items {
                    if self.eval(item) {
                        matched += 1;
                        if matched > 1 {
                            return false;
                        }
                    }
                }
                matched == 1
            }
            Expr::Size {
                value,
                measure,
                op,
                limit,
            } => measure_of(self.resolve(value), *measure)
                .is_some_and(|size| op.holds(size.cmp(limit))),
            Expr::Compare { value, op, limit } => {
                self.resolve(value).as_number().is_some_and(|number| {
                    Numeric::from(number)
                        .compare(*limit)
                        .is_some_and(|ordering| op.holds(ordering))
                })
            }
            Expr::MultipleOf { value, divisor } => {
                self.resolve(value)
                    .as_number()
                    .is_some_and(|number| match &divisor.exact {
                        Some(exact) => Decimal::from_number(number)
                            .is_some_and(|decimal| decimal.is_multiple_of(exact)),
                        None => number::is_multiple_of(number, divisor.value),
                    })
            }
            Expr::Matches { value, pattern } => {
                let Declaration::Pattern(pattern) = self.pool.get(*pattern) else {
                    return false;
                };
                self.resolve(value)
                    .with_str(|text| pattern.is_match(text))
                    .unwrap_or(false)
            }
            Expr::Equals { value, scalar } => scalar_equals(self.resolve(value), scalar),
            Expr::InTable { value, table } => {
                let Declaration::Literal(Value::Array(items)) = self.pool.get(*table) else {
                    return false;
                };
                match self.resolve(value) {
                    Instance::Value(value) => items.contains(value),
                    Instance::Key(key) => key.with_str(|name| {
                        items
                            .iter()
                            .any(|item| item.as_str().is_some_and(|item| item == name))
                    }),
                    Instance::Missing => false,
                }
            }
            Expr::Unique { value, helper } => {
                let Some(items) = self.resolve(value).as_array() else {
                    return false;
                };
                match helper {
                    Some(helper) => {
                        if let Declaration::Builtin(Builtin::DeepEqual) = self.pool.get(*helper) {
                            is_unique(items, equal)
                        } else {
                            false
                        }
                    }
                    None => is_unique(items, |left, right| left == right),
                }
            }
            Expr::AllItems { value, item, body } => {
                let Some(items) = self.resolve(value).as_array() else {
                    return false;
                };
                let slot = item.index();
                items.iter().all(|element| {
                    self.slots[slot] = Instance::Value(element);
                    self.eval(body)
                })
            }
            Expr::AnyItem { value, item, body } => {
                let Some(items) = self.resolve(value).as_array() else {
                    return false;
                };
                let slot = item.index();
                items.iter().any(|element| {
                    self.slots[slot] = Instance::Value(element);
                    self.eval(body)
                })
            }
            Expr::AllKeys { value, key, body } => {
                let Some(entries) = self.resolve(value).as_entries() else {
                    return false;
                };
                let slot = key.index();
                entries.keys().all(|name| {
                    self.slots[slot] = Instance::Key(name);
                    self.eval(body)
                })
            }
            Expr::Call { routine, value } => self.call(*routine, value),
            Expr::Custom { value, check } => match self.resolve(value) {
                Instance::Missing => true,
                Instance::Value(instance) => check.check.is_valid(instance),
                Instance::Key(key) => {
                    let instance = key.with_str(|name| Value::String(name.to_string()));
                    check.check.is_valid(&instance)
                }
            },
        }
    }

    fn call(&mut self, routine: Name, value: &ValueRef) -> bool {
        let Declaration::Routine(routine) = self.pool.get(routine) else {
            return false;
        };
        let Some(items) = self.resolve(value).as_array() else {
            return false;
        };
        match routine {
            Routine::Count {
                item,
                body,
                min,
                max,
            } => {
                let slot = item.index();
                let mut count = 0_u64;
                for element in items {
                    self.slots[slot] = Instance::Value(element);
                    if self.eval(body) {
                        count += 1;
                        if max.is_some_and(|max| count > max) {
                            return false;
                        }
                    }
                }
                count >= *min
            }
            Routine::EveryFrom { start, item, body } => {
                let slot = item.index();
                items.iter().skip(*start).all(|element| {
                    self.slots[slot] = Instance::Value(element);
                    self.eval(body)
                })
            }
        }
    }
}

fn type_matches(instance: Instance<'_>, check: TypeCheck) -> bool {
    match (instance, check) {
        (Instance::Key(_), TypeCheck::String) => true,
        (Instance::Value(value), check) => match check {
            TypeCheck::String => value.is_string(),
            // `serde_json` numbers are always finite
            TypeCheck::Number | TypeCheck::Finite => value.is_number(),
            TypeCheck::Integer => value.as_number().is_some_and(number::is_integer),
            TypeCheck::Array => value.is_array(),
            TypeCheck::Object => value.is_object() || value.is_array(),
            TypeCheck::PlainObject => value.is_object(),
            TypeCheck::Boolean => value.is_boolean(),
            TypeCheck::Null => value.is_null(),
        },
        _ => false,
    }
}

fn measure_of(instance: Instance<'_>, measure: Measure) -> Option<u64> {
    let size = match measure {
        Measure::CodeUnits => instance.with_str(|text| text.encode_utf16().count())?,
        Measure::CodePoints => instance.with_str(|text| bytecount::num_chars(text.as_bytes()))?,
        Measure::Items => instance.as_array()?.len(),
        Measure::Keys => instance.as_entries()?.len(),
    };
    u64::try_from(size).ok()
}

fn scalar_equals(instance: Instance<'_>, scalar: &Scalar) -> bool {
    match (instance, scalar) {
        (Instance::Value(Value::Bool(value)), Scalar::Bool(expected)) => value == expected,
        (Instance::Value(Value::Number(value)), Scalar::Number(expected)) => {
            Numeric::from(value).equals(*expected)
        }
        (Instance::Value(Value::String(value)), Scalar::String(expected)) => {
            value.as_str() == &**expected
        }
        (Instance::Key(key), Scalar::String(expected)) => key.with_str(|name| name == &**expected),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{measure_of, type_matches};
    use crate::{
        expr::{Measure, TypeCheck},
        instance::{Instance, Key},
    };
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!("💩"), Measure::CodeUnits, 2)]
    #[test_case(&json!("💩"), Measure::CodePoints, 1)]
    #[test_case(&json!("héllo"), Measure::CodeUnits, 5)]
    #[test_case(&json!([1, 2, 3]), Measure::Items, 3)]
    #[test_case(&json!({"a": 1}), Measure::Keys, 1)]
    #[test_case(&json!(["a", "b"]), Measure::Keys, 2; "arrays as objects")]
    fn measures(value: &Value, measure: Measure, expected: u64) {
        assert_eq!(measure_of(Instance::Value(value), measure), Some(expected));
    }

    #[test]
    fn measures_of_other_types() {
        assert_eq!(measure_of(Instance::Value(&json!(5)), Measure::CodeUnits), None);
        assert_eq!(measure_of(Instance::Missing, Measure::Items), None);
    }

    #[test_case(&json!(1.0), TypeCheck::Integer, true)]
    #[test_case(&json!(1.5), TypeCheck::Integer, false)]
    #[test_case(&json!([]), TypeCheck::Object, true)]
    #[test_case(&json!([]), TypeCheck::PlainObject, false)]
    #[test_case(&json!(null), TypeCheck::Object, false)]
    #[test_case(&json!(null), TypeCheck::Null, true)]
    fn type_checks(value: &Value, check: TypeCheck, expected: bool) {
        assert_eq!(type_matches(Instance::Value(value), check), expected);
    }

    #[test]
    fn keys_are_strings() {
        assert!(type_matches(Instance::Key(Key::Index(0)), TypeCheck::String));
        assert!(!type_matches(Instance::Missing, TypeCheck::Null));
    }
}
