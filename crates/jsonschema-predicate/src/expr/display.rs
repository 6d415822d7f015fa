use core::fmt;

use super::{Divisor, Expr, Measure};

impl Expr {
    fn is_compound(&self) -> bool {
        matches!(self, Expr::All(_) | Expr::Any(_))
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if expr.is_compound() {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expr], separator: &str) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(separator)?;
        }
        write_operand(f, item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{value}"),
            Expr::Present(value) => write!(f, "{value} != undefined"),
            Expr::Absent(value) => write!(f, "{value} == undefined"),
            Expr::HasOwn(value, key) => write!(
                f,
                "has_own({value}, {})",
                serde_json::Value::String(key.to_string())
            ),
            Expr::Type(value, check) => write!(f, "{}({value})", check.as_str()),
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Type(..)
                | Expr::HasOwn(..)
                | Expr::Call { .. }
                | Expr::Custom { .. }
                | Expr::Unique { .. }
                | Expr::Matches { .. }
                | Expr::InTable { .. } => write!(f, "!{inner}"),
                _ => write!(f, "!({inner})"),
            },
            Expr::All(items) => write_joined(f, items, " && "),
            Expr::Any(items) => write_joined(f, items, " || "),
            Expr::ExactlyOne(items) => {
                f.write_str("count([")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]) == 1")
            }
            Expr::Size {
                value,
                measure,
                op,
                limit,
            } => {
                let function = match measure {
                    Measure::CodeUnits | Measure::Items => "len",
                    Measure::CodePoints => "chars",
                    Measure::Keys => "keys",
                };
                write!(f, "{function}({value}) {} {limit}", op.as_str())
            }
            Expr::Compare { value, op, limit } => write!(f, "{value} {} {limit}", op.as_str()),
            Expr::MultipleOf {
                value,
                divisor: Divisor { value: divisor, exact },
            } => {
                if exact.is_some() {
                    write!(f, "{value} / {divisor} % 1 == 0")
                } else {
                    write!(f, "{value} % {divisor} == 0")
                }
            }
            Expr::Matches { value, pattern } => write!(f, "{pattern}.is_match({value})"),
            Expr::Equals { value, scalar } => write!(f, "{value} == {scalar}"),
            Expr::InTable { value, table } => write!(f, "{table}.contains({value})"),
            Expr::Unique {
                value,
                helper: Some(helper),
            } => write!(f, "unique_by({value}, {helper})"),
            Expr::Unique {
                value,
                helper: None,
            } => write!(f, "unique({value})"),
            Expr::AllItems { value, item, body } => {
                write!(f, "{value}.iter().all(|{item}| {body})")
            }
            Expr::AnyItem { value, item, body } => {
                write!(f, "{value}.iter().any(|{item}| {body})")
            }
            Expr::AllKeys { value, key, body } => {
                write!(f, "{value}.keys().all(|{key}| {body})")
            }
            Expr::Call { routine, value } => write!(f, "{routine}({value})"),
            Expr::Custom { value, check } => write!(f, "{}({value})", check.keyword),
        }
    }
}
