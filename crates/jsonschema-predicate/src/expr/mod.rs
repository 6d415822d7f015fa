//! The compiled form of a schema: a boolean expression tree over references to
//! the value under test.
//!
//! Trees are built through the folding constructors on [`Expr`], which keep
//! constant branches out of the final tree.
mod display;
mod value_ref;

use core::{cmp::Ordering, fmt};
use std::sync::Arc;

pub use value_ref::{Slot, SlotKind, ValueRef};
pub(crate) use value_ref::Access;

use crate::{
    keywords::custom::CustomKeyword,
    number::{Decimal, Numeric},
    pool::Name,
};

#[derive(Debug)]
pub enum Expr {
    Const(bool),
    /// The value exists.
    Present(ValueRef),
    /// The value does not exist.
    Absent(ValueRef),
    /// The object (or array viewed as an object) has its own entry under the key.
    HasOwn(ValueRef, Box<str>),
    Type(ValueRef, TypeCheck),
    Not(Box<Expr>),
    All(Vec<Expr>),
    Any(Vec<Expr>),
    /// Exactly one operand holds.
    ExactlyOne(Vec<Expr>),
    Size {
        value: ValueRef,
        measure: Measure,
        op: CmpOp,
        limit: u64,
    },
    Compare {
        value: ValueRef,
        op: CmpOp,
        limit: Numeric,
    },
    MultipleOf {
        value: ValueRef,
        divisor: Divisor,
    },
    Matches {
        value: ValueRef,
        pattern: Name,
    },
    Equals {
        value: ValueRef,
        scalar: Scalar,
    },
    /// Membership in a literal table from the declaration pool.
    InTable {
        value: ValueRef,
        table: Name,
    },
    /// All array items are distinct. Without a helper, native equality is used.
    Unique {
        value: ValueRef,
        helper: Option<Name>,
    },
    AllItems {
        value: ValueRef,
        item: Slot,
        body: Box<Expr>,
    },
    AnyItem {
        value: ValueRef,
        item: Slot,
        body: Box<Expr>,
    },
    AllKeys {
        value: ValueRef,
        key: Slot,
        body: Box<Expr>,
    },
    /// Apply a pooled routine.
    Call {
        routine: Name,
        value: ValueRef,
    },
    Custom {
        value: ValueRef,
        check: CustomCheck,
    },
}

/// Runtime type tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCheck {
    String,
    /// Any number.
    Number,
    /// Any number other than NaN and the infinities.
    Finite,
    Integer,
    Array,
    /// Objects, and arrays viewed as objects.
    Object,
    /// Objects only.
    PlainObject,
    Boolean,
    Null,
}

impl TypeCheck {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            TypeCheck::String => "is_string",
            TypeCheck::Number => "is_number",
            TypeCheck::Finite => "is_finite",
            TypeCheck::Integer => "is_integer",
            TypeCheck::Array => "is_array",
            TypeCheck::Object => "is_object",
            TypeCheck::PlainObject => "is_plain_object",
            TypeCheck::Boolean => "is_boolean",
            TypeCheck::Null => "is_null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// UTF-16 code units of a string or key.
    CodeUnits,
    /// Unicode code points of a string or key.
    CodePoints,
    /// Array items.
    Items,
    /// Own entries of an object.
    Keys,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl CmpOp {
    #[inline]
    pub(crate) fn holds(self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Ge => ordering != Ordering::Less,
            CmpOp::Eq => ordering == Ordering::Equal,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
        }
    }
}

/// A `multipleOf` divisor: plain remainder, or exact decimal arithmetic.
#[derive(Debug, Clone)]
pub struct Divisor {
    pub(crate) value: Numeric,
    pub(crate) exact: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub enum Scalar {
    Bool(bool),
    Number(Numeric),
    String(Box<str>),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => write!(f, "{}", serde_json::Value::String(s.to_string())),
        }
    }
}

/// A user-supplied check bound to its keyword name.
#[derive(Clone)]
pub struct CustomCheck {
    pub(crate) keyword: Arc<str>,
    pub(crate) check: Arc<dyn CustomKeyword>,
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCheck")
            .field("keyword", &self.keyword)
            .finish_non_exhaustive()
    }
}

impl Expr {
    /// Conjunction, dropping `true` operands and short-circuiting on `false`.
    pub(crate) fn all(items: impl IntoIterator<Item = Expr>) -> Expr {
        let mut operands = Vec::new();
        for item in items {
            match item {
                Expr::Const(true) => {}
                Expr::Const(false) => return Expr::Const(false),
                Expr::All(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }
        collapse(operands, Expr::Const(true), Expr::All)
    }

    /// Disjunction, dropping `false` operands and short-circuiting on `true`.
    pub(crate) fn any(items: impl IntoIterator<Item = Expr>) -> Expr {
        let mut operands = Vec::new();
        for item in items {
            match item {
                Expr::Const(false) => {}
                Expr::Const(true) => return Expr::Const(true),
                Expr::Any(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }
        collapse(operands, Expr::Const(false), Expr::Any)
    }

    pub(crate) fn exactly_one(items: Vec<Expr>) -> Expr {
        let mut satisfied = 0_usize;
        let mut operands = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Expr::Const(true) => satisfied += 1,
                Expr::Const(false) => {}
                other => operands.push(other),
            }
        }
        match satisfied {
            0 => collapse(operands, Expr::Const(false), Expr::ExactlyOne),
            1 => Expr::all(operands.into_iter().map(Expr::negate)),
            _ => Expr::Const(false),
        }
    }

    pub(crate) fn negate(expr: Expr) -> Expr {
        match expr {
            Expr::Const(value) => Expr::Const(!value),
            Expr::Not(inner) => *inner,
            Expr::Present(value) => Expr::Absent(value),
            Expr::Absent(value) => Expr::Present(value),
            other => Expr::Not(Box::new(other)),
        }
    }

    pub(crate) fn size(value: &ValueRef, measure: Measure, op: CmpOp, limit: u64) -> Expr {
        Expr::Size {
            value: value.clone(),
            measure,
            op,
            limit,
        }
    }

    pub(crate) fn all_items(value: &ValueRef, item: Slot, body: Expr) -> Expr {
        match body {
            Expr::Const(true) => Expr::Const(true),
            // Only the empty array qualifies
            Expr::Const(false) => Expr::size(value, Measure::Items, CmpOp::Eq, 0),
            body => Expr::AllItems {
                value: value.clone(),
                item,
                body: Box::new(body),
            },
        }
    }

    pub(crate) fn any_item(value: &ValueRef, item: Slot, body: Expr) -> Expr {
        match body {
            Expr::Const(false) => Expr::Const(false),
            Expr::Const(true) => Expr::size(value, Measure::Items, CmpOp::Gt, 0),
            body => Expr::AnyItem {
                value: value.clone(),
                item,
                body: Box::new(body),
            },
        }
    }

    pub(crate) fn all_keys(value: &ValueRef, key: Slot, body: Expr) -> Expr {
        match body {
            Expr::Const(true) => Expr::Const(true),
            Expr::Const(false) => Expr::size(value, Measure::Keys, CmpOp::Eq, 0),
            body => Expr::AllKeys {
                value: value.clone(),
                key,
                body: Box::new(body),
            },
        }
    }

    /// Whether the expression holds for every input.
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Const(true))
    }
}

fn collapse(mut operands: Vec<Expr>, empty: Expr, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    match operands.pop() {
        None => empty,
        Some(only) if operands.is_empty() => only,
        Some(last) => {
            operands.push(last);
            wrap(operands)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CmpOp, Expr, Measure, TypeCheck, ValueRef};
    use core::cmp::Ordering;
    use test_case::test_case;

    fn is_string() -> Expr {
        Expr::Type(ValueRef::input(), TypeCheck::String)
    }

    #[test]
    fn conjunction_folds_constants() {
        assert!(Expr::all([]).is_true());
        assert!(matches!(
            Expr::all([Expr::Const(true), is_string()]),
            Expr::Type(_, TypeCheck::String)
        ));
        assert!(matches!(
            Expr::all([is_string(), Expr::Const(false)]),
            Expr::Const(false)
        ));
    }

    #[test]
    fn disjunction_folds_constants() {
        assert!(matches!(Expr::any([]), Expr::Const(false)));
        assert!(Expr::any([is_string(), Expr::Const(true)]).is_true());
        assert!(matches!(
            Expr::any([Expr::any([is_string(), is_string()]), is_string()]),
            Expr::Any(ref items) if items.len() == 3
        ));
    }

    #[test]
    fn negation_cancels_out() {
        let expr = Expr::negate(Expr::negate(is_string()));
        assert!(matches!(expr, Expr::Type(_, TypeCheck::String)));
        assert!(matches!(
            Expr::negate(Expr::Present(ValueRef::input())),
            Expr::Absent(_)
        ));
    }

    #[test]
    fn exactly_one_with_a_constant_branch() {
        let expr = Expr::exactly_one(vec![Expr::Const(true), is_string()]);
        assert!(matches!(expr, Expr::Not(_)));
        let expr = Expr::exactly_one(vec![Expr::Const(true), Expr::Const(true)]);
        assert!(matches!(expr, Expr::Const(false)));
    }

    #[test]
    fn iteration_over_constant_bodies() {
        let value = ValueRef::input();
        let slot = super::Slot::new(0, super::SlotKind::Item);
        assert!(Expr::all_items(&value, slot, Expr::Const(true)).is_true());
        assert!(matches!(
            Expr::all_items(&value, slot, Expr::Const(false)),
            Expr::Size {
                measure: Measure::Items,
                op: CmpOp::Eq,
                limit: 0,
                ..
            }
        ));
    }

    #[test_case(CmpOp::Lt, Ordering::Less, true)]
    #[test_case(CmpOp::Le, Ordering::Equal, true)]
    #[test_case(CmpOp::Gt, Ordering::Equal, false)]
    #[test_case(CmpOp::Ge, Ordering::Greater, true)]
    #[test_case(CmpOp::Eq, Ordering::Less, false)]
    fn comparison_operators(op: CmpOp, ordering: Ordering, expected: bool) {
        assert_eq!(op.holds(ordering), expected);
    }
}
