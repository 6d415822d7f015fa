//! Numeric helpers: exact comparisons across JSON number representations and
//! `multipleOf` arithmetic.
use core::{cmp::Ordering, fmt};

use num_bigint::BigUint;
use num_cmp::NumCmp;
use num_traits::Zero;

/// A JSON number literal taken from a schema.
#[derive(Debug, Copy, Clone)]
pub enum Numeric {
    PositiveInteger(u64),
    NegativeInteger(i64),
    Float(f64),
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::PositiveInteger(n) => write!(f, "{n}"),
            Numeric::NegativeInteger(n) => write!(f, "{n}"),
            Numeric::Float(n) => write!(f, "{n}"),
        }
    }
}

impl From<&serde_json::Number> for Numeric {
    fn from(value: &serde_json::Number) -> Self {
        if let Some(u) = value.as_u64() {
            Numeric::PositiveInteger(u)
        } else if let Some(i) = value.as_i64() {
            Numeric::NegativeInteger(i)
        } else {
            // `serde_json` numbers are always representable as `f64` without the
            // `arbitrary_precision` feature
            Numeric::Float(value.as_f64().unwrap_or(f64::NAN))
        }
    }
}

macro_rules! num_cmp_dispatch {
    ($left:expr, $right:expr) => {
        match ($left, $right) {
            (Numeric::PositiveInteger(l), Numeric::PositiveInteger(r)) => NumCmp::num_cmp(l, r),
            (Numeric::PositiveInteger(l), Numeric::NegativeInteger(r)) => NumCmp::num_cmp(l, r),
            (Numeric::PositiveInteger(l), Numeric::Float(r)) => NumCmp::num_cmp(l, r),
            (Numeric::NegativeInteger(l), Numeric::PositiveInteger(r)) => NumCmp::num_cmp(l, r),
            (Numeric::NegativeInteger(l), Numeric::NegativeInteger(r)) => NumCmp::num_cmp(l, r),
            (Numeric::NegativeInteger(l), Numeric::Float(r)) => NumCmp::num_cmp(l, r),
            (Numeric::Float(l), Numeric::PositiveInteger(r)) => NumCmp::num_cmp(l, r),
            (Numeric::Float(l), Numeric::NegativeInteger(r)) => NumCmp::num_cmp(l, r),
            (Numeric::Float(l), Numeric::Float(r)) => NumCmp::num_cmp(l, r),
        }
    };
}

impl Numeric {
    /// Compare two numbers by mathematical value.
    #[must_use]
    pub fn compare(self, other: Numeric) -> Option<Ordering> {
        num_cmp_dispatch!(self, other)
    }

    #[must_use]
    pub fn equals(self, other: Numeric) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    pub(crate) fn is_positive(self) -> bool {
        match self {
            Numeric::PositiveInteger(n) => n > 0,
            Numeric::NegativeInteger(_) => false,
            Numeric::Float(f) => f > 0.0,
        }
    }

    fn as_integer(self) -> Option<i128> {
        match self {
            Numeric::PositiveInteger(n) => Some(i128::from(n)),
            Numeric::NegativeInteger(n) => Some(i128::from(n)),
            Numeric::Float(_) => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Numeric::PositiveInteger(n) => n as f64,
            Numeric::NegativeInteger(n) => n as f64,
            Numeric::Float(f) => f,
        }
    }
}

pub(crate) fn equal_numbers(left: &serde_json::Number, right: &serde_json::Number) -> bool {
    Numeric::from(left).equals(Numeric::from(right))
}

pub(crate) fn is_integer(value: &serde_json::Number) -> bool {
    value.is_u64() || value.is_i64() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// Divisibility through the plain remainder operator.
///
/// Integers divide exactly; anything involving a float uses `f64` remainder and
/// inherits its rounding error (`0.3 % 0.1 != 0`).
pub(crate) fn is_multiple_of(value: &serde_json::Number, divisor: Numeric) -> bool {
    let value = Numeric::from(value);
    if let (Some(value), Some(divisor)) = (value.as_integer(), divisor.as_integer()) {
        return value % divisor == 0;
    }
    value.as_f64() % divisor.as_f64() == 0.0
}

/// A finite decimal `digits * 10^exponent`, sign dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    digits: BigUint,
    exponent: i64,
}

impl Decimal {
    /// Parse the shortest round-trip text of a JSON number, e.g. `0.1`, `-12`, `1e-7`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Decimal> {
        let text = text.strip_prefix('-').unwrap_or(text);
        let (significand, exponent) = match text.find(['e', 'E']) {
            Some(idx) => (&text[..idx], text[idx + 1..].parse::<i64>().ok()?),
            None => (text, 0),
        };
        let (integral, fractional) = match significand.split_once('.') {
            Some((integral, fractional)) => (integral, fractional),
            None => (significand, ""),
        };
        if integral.is_empty() && fractional.is_empty() {
            return None;
        }
        let mut digits = String::with_capacity(integral.len() + fractional.len());
        digits.push_str(integral);
        digits.push_str(fractional);
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = BigUint::parse_bytes(digits.as_bytes(), 10)?;
        let scale = i64::try_from(fractional.len()).ok()?;
        Some(Decimal {
            digits,
            exponent: exponent.checked_sub(scale)?,
        })
    }

    pub(crate) fn from_number(value: &serde_json::Number) -> Option<Decimal> {
        Decimal::parse(&value.to_string())
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.digits.is_zero()
    }

    /// Exact divisibility: `self / divisor` is an integer.
    pub(crate) fn is_multiple_of(&self, divisor: &Decimal) -> bool {
        if divisor.is_zero() {
            return false;
        }
        if self.is_zero() {
            return true;
        }
        let exponent = self.exponent.min(divisor.exponent);
        let Some(value) = scale(&self.digits, self.exponent - exponent) else {
            return false;
        };
        let Some(divisor) = scale(&divisor.digits, divisor.exponent - exponent) else {
            return false;
        };
        (value % divisor).is_zero()
    }
}

fn scale(digits: &BigUint, shift: i64) -> Option<BigUint> {
    let shift = u32::try_from(shift).ok()?;
    Some(digits * BigUint::from(10_u8).pow(shift))
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}e{}", self.digits, self.exponent)
    }
}
