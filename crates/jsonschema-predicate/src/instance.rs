//! Runtime view of a value under test.
//!
//! Besides JSON values, predicates see two more shapes: a *missing* value (an
//! absent property or out-of-range index) and a *key* produced while iterating
//! an object or an array viewed as an object.
use core::ops::Range;

use referencing::pointer::parse_index;
use serde_json::{map::Keys, Map, Value};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum Instance<'a> {
    #[default]
    Missing,
    Value(&'a Value),
    Key(Key<'a>),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Key<'a> {
    Name(&'a str),
    Index(usize),
}

impl Key<'_> {
    pub(crate) fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        match self {
            Key::Name(name) => f(name),
            Key::Index(idx) => {
                let mut buffer = itoa::Buffer::new();
                f(buffer.format(idx))
            }
        }
    }
}

impl<'a> Instance<'a> {
    pub(crate) fn from_option(value: Option<&'a Value>) -> Self {
        value.map_or(Instance::Missing, Instance::Value)
    }

    pub(crate) fn is_present(self) -> bool {
        !matches!(self, Instance::Missing)
    }

    /// Run `f` on the textual content of a string or a key.
    pub(crate) fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> Option<R> {
        match self {
            Instance::Value(Value::String(s)) => Some(f(s)),
            Instance::Key(key) => Some(key.with_str(f)),
            _ => None,
        }
    }

    pub(crate) fn as_number(self) -> Option<&'a serde_json::Number> {
        match self {
            Instance::Value(Value::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub(crate) fn as_array(self) -> Option<&'a [Value]> {
        match self {
            Instance::Value(Value::Array(items)) => Some(items),
            _ => None,
        }
    }

    /// Objects, plus arrays viewed as objects keyed by their indices.
    pub(crate) fn as_entries(self) -> Option<Entries<'a>> {
        match self {
            Instance::Value(Value::Object(map)) => Some(Entries::Map(map)),
            Instance::Value(Value::Array(items)) => Some(Entries::Array(items)),
            _ => None,
        }
    }

    pub(crate) fn property(self, name: &str) -> Instance<'a> {
        self.as_entries()
            .map_or(Instance::Missing, |entries| entries.get(name))
    }

    pub(crate) fn index(self, idx: usize) -> Instance<'a> {
        Instance::from_option(self.as_array().and_then(|items| items.get(idx)))
    }

    pub(crate) fn member(self, key: Instance<'_>) -> Instance<'a> {
        let Some(entries) = self.as_entries() else {
            return Instance::Missing;
        };
        match key {
            Instance::Key(Key::Index(idx)) => match entries {
                Entries::Array(items) => Instance::from_option(items.get(idx)),
                Entries::Map(_) => {
                    let mut buffer = itoa::Buffer::new();
                    entries.get(buffer.format(idx))
                }
            },
            Instance::Key(Key::Name(name)) => entries.get(name),
            Instance::Value(Value::String(name)) => entries.get(name),
            _ => Instance::Missing,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Entries<'a> {
    Map(&'a Map<String, Value>),
    Array(&'a [Value]),
}

impl<'a> Entries<'a> {
    pub(crate) fn len(self) -> usize {
        match self {
            Entries::Map(map) => map.len(),
            Entries::Array(items) => items.len(),
        }
    }

    pub(crate) fn get(self, name: &str) -> Instance<'a> {
        match self {
            Entries::Map(map) => Instance::from_option(map.get(name)),
            Entries::Array(items) => {
                Instance::from_option(parse_index(name).and_then(|idx| items.get(idx)))
            }
        }
    }

    pub(crate) fn contains(self, name: &str) -> bool {
        self.get(name).is_present()
    }

    pub(crate) fn keys(self) -> EntryKeys<'a> {
        match self {
            Entries::Map(map) => EntryKeys::Map(map.keys()),
            Entries::Array(items) => EntryKeys::Array(0..items.len()),
        }
    }
}

pub(crate) enum EntryKeys<'a> {
    Map(Keys<'a>),
    Array(Range<usize>),
}

impl<'a> Iterator for EntryKeys<'a> {
    type Item = Key<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            EntryKeys::Map(keys) => keys.next().map(|key| Key::Name(key.as_str())),
            EntryKeys::Array(range) => range.next().map(Key::Index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Instance, Key};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test]
    fn missing_properties() {
        let value = json!({"a": 1});
        let instance = Instance::Value(&value);
        assert!(instance.property("a").is_present());
        assert!(!instance.property("b").is_present());
        assert!(!Instance::Missing.property("a").is_present());
    }

    #[test_case("0", true)]
    #[test_case("2", true)]
    #[test_case("3", false)]
    #[test_case("01", false)]
    #[test_case("-1", false)]
    fn arrays_project_canonical_indices(name: &str, expected: bool) {
        let value = json!(["a", "b", "c"]);
        assert_eq!(Instance::Value(&value).property(name).is_present(), expected);
    }

    #[test]
    fn keys_of_arrays_are_indices() {
        let value = json!([true, false]);
        let entries = Instance::Value(&value).as_entries().expect("Array entries");
        let keys: Vec<String> = entries.keys().map(|key| key.with_str(str::to_owned)).collect();
        assert_eq!(keys, vec!["0", "1"]);
        assert!(matches!(
            Instance::Value(&value).member(Instance::Key(Key::Index(1))),
            Instance::Value(Value::Bool(false))
        ));
    }
}
