use core::fmt;
use std::str::FromStr;

/// JSON types that can be asserted by the `type` keyword.
///
/// `Integer` and `Number` occupy separate bits so `{"type": "integer"}` stays
/// distinguishable from `{"type": "number"}` until finalization.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum JsonType {
    Array = 1 << 0,
    Boolean = 1 << 1,
    Integer = 1 << 2,
    Null = 1 << 3,
    Number = 1 << 4,
    Object = 1 << 5,
    String = 1 << 6,
}

impl JsonType {
    pub(crate) fn from_repr(repr: u8) -> Option<Self> {
        match repr {
            1 => Some(JsonType::Array),
            2 => Some(JsonType::Boolean),
            4 => Some(JsonType::Integer),
            8 => Some(JsonType::Null),
            16 => Some(JsonType::Number),
            32 => Some(JsonType::Object),
            64 => Some(JsonType::String),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Array => "array",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Null => "null",
            JsonType::Number => "number",
            JsonType::Object => "object",
            JsonType::String => "string",
        }
    }
}

impl fmt::Debug for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "array" => Ok(JsonType::Array),
            "boolean" => Ok(JsonType::Boolean),
            "integer" => Ok(JsonType::Integer),
            "null" => Ok(JsonType::Null),
            "number" => Ok(JsonType::Number),
            "object" => Ok(JsonType::Object),
            "string" => Ok(JsonType::String),
            _ => Err(()),
        }
    }
}

/// Bitmask of declared JSON types.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct JsonTypeSet(u8);

impl JsonTypeSet {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn insert(mut self, ty: JsonType) -> Self {
        self.0 |= ty as u8;
        self
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, ty: JsonType) -> bool {
        self.0 & (ty as u8) != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Types accepted by both sets. Integers belong to `number`.
    #[must_use]
    pub const fn intersect(self, other: JsonTypeSet) -> Self {
        let result = JsonTypeSet(self.0 & other.0);
        if (self.contains(JsonType::Number) && other.contains(JsonType::Integer))
            || (self.contains(JsonType::Integer) && other.contains(JsonType::Number))
        {
            result.insert(JsonType::Integer)
        } else {
            result
        }
    }

    #[inline]
    #[must_use]
    pub fn iter(&self) -> JsonTypeSetIterator {
        JsonTypeSetIterator { set: *self }
    }
}

impl fmt::Debug for JsonTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<JsonType> for JsonTypeSet {
    fn from_iter<T: IntoIterator<Item = JsonType>>(iter: T) -> Self {
        iter.into_iter().fold(JsonTypeSet::new(), JsonTypeSet::insert)
    }
}

#[derive(Debug)]
pub struct JsonTypeSetIterator {
    set: JsonTypeSet,
}

impl Iterator for JsonTypeSetIterator {
    type Item = JsonType;

    fn next(&mut self) -> Option<Self::Item> {
        if self.set.0 == 0 {
            None
        } else {
            // Least significant bit first
            let lsb = self.set.0 & self.set.0.wrapping_neg();
            self.set.0 &= self.set.0 - 1;
            JsonType::from_repr(lsb)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.set.0.count_ones() as usize;
        (count, Some(count))
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonType, JsonTypeSet};
    use test_case::test_case;

    #[test_case("array", JsonType::Array)]
    #[test_case("boolean", JsonType::Boolean)]
    #[test_case("integer", JsonType::Integer)]
    #[test_case("null", JsonType::Null)]
    #[test_case("number", JsonType::Number)]
    #[test_case("object", JsonType::Object)]
    #[test_case("string", JsonType::String)]
    fn parse_type_names(name: &str, expected: JsonType) {
        assert_eq!(name.parse::<JsonType>(), Ok(expected));
        assert_eq!(expected.as_str(), name);
    }

    #[test]
    fn unknown_type_name() {
        assert!("float".parse::<JsonType>().is_err());
    }

    #[test]
    fn integer_and_number_are_distinct() {
        let set = JsonTypeSet::new().insert(JsonType::Integer);
        assert!(set.contains(JsonType::Integer));
        assert!(!set.contains(JsonType::Number));
    }

    #[test]
    fn intersection_narrows_number_to_integer() {
        let numbers = JsonTypeSet::new()
            .insert(JsonType::Number)
            .insert(JsonType::String);
        let integers = JsonTypeSet::new().insert(JsonType::Integer);
        let both = numbers.intersect(integers);
        assert!(both.contains(JsonType::Integer));
        assert!(!both.contains(JsonType::Number));
        assert!(!both.contains(JsonType::String));
        let disjoint = integers.intersect(JsonTypeSet::new().insert(JsonType::Null));
        assert!(disjoint.is_empty());
    }

    #[test]
    fn iterates_in_bit_order() {
        let set: JsonTypeSet = [JsonType::String, JsonType::Array, JsonType::Null]
            .into_iter()
            .collect();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![JsonType::Array, JsonType::Null, JsonType::String]
        );
        assert_eq!(set.iter().size_hint(), (3, Some(3)));
        assert_eq!(format!("{set:?}"), "{array, null, string}");
    }
}
