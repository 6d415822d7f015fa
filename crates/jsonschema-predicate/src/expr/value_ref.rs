use core::fmt;
use std::sync::Arc;

/// A loop variable bound by an iteration node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    id: u32,
    kind: SlotKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Bound to array items.
    Item,
    /// Bound to object keys.
    Key,
}

impl Slot {
    pub(crate) fn new(id: u32, kind: SlotKind) -> Self {
        Self { id, kind }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.id as usize
    }

    #[must_use]
    pub fn kind(self) -> SlotKind {
        self.kind
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SlotKind::Item => write!(f, "v{}", self.id),
            SlotKind::Key => write!(f, "k{}", self.id),
        }
    }
}

/// A reference to the value being tested, as a path from the root input.
///
/// Cheap to clone; subpaths share their prefix.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ValueRef(Arc<Access>);

#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) enum Access {
    Input,
    Slot(Slot),
    Property(ValueRef, Box<str>),
    Index(ValueRef, usize),
    Member(ValueRef, Slot),
}

impl ValueRef {
    /// The predicate's argument.
    #[must_use]
    pub fn input() -> Self {
        ValueRef(Arc::new(Access::Input))
    }

    pub(crate) fn slot(slot: Slot) -> Self {
        ValueRef(Arc::new(Access::Slot(slot)))
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Self {
        ValueRef(Arc::new(Access::Property(self.clone(), name.into())))
    }

    #[must_use]
    pub fn index(&self, idx: usize) -> Self {
        ValueRef(Arc::new(Access::Index(self.clone(), idx)))
    }

    /// `self[key]`, where `key` is bound by an enclosing key iteration.
    pub(crate) fn member(&self, key: Slot) -> Self {
        ValueRef(Arc::new(Access::Member(self.clone(), key)))
    }

    pub(crate) fn access(&self) -> &Access {
        &self.0
    }
}

/// Whether `name` can be written as `x.name`.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.access() {
            Access::Input => f.write_str("x"),
            Access::Slot(slot) => write!(f, "{slot}"),
            Access::Property(base, name) if is_identifier(name) => write!(f, "{base}.{name}"),
            Access::Property(base, name) => write!(
                f,
                "{base}[{}]",
                serde_json::Value::String(name.to_string())
            ),
            Access::Index(base, idx) => write!(f, "{base}[{idx}]"),
            Access::Member(base, key) => write!(f, "{base}[{key}]"),
        }
    }
}

impl fmt::Debug for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueRef({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::{is_identifier, Slot, SlotKind, ValueRef};
    use test_case::test_case;

    #[test_case("name", true)]
    #[test_case("_private", true)]
    #[test_case("$ref", true)]
    #[test_case("a1", true)]
    #[test_case("1a", false)]
    #[test_case("", false)]
    #[test_case("foo bar", false)]
    #[test_case("ключ", false)]
    fn identifiers(name: &str, expected: bool) {
        assert_eq!(is_identifier(name), expected);
    }

    #[test]
    fn accessor_synthesis() {
        let root = ValueRef::input();
        assert_eq!(root.property("a").index(2).to_string(), "x.a[2]");
        assert_eq!(root.property("foo\"bar").to_string(), r#"x["foo\"bar"]"#);
        assert_eq!(root.property("0").to_string(), r#"x["0"]"#);
        let key = Slot::new(3, SlotKind::Key);
        assert_eq!(root.member(key).to_string(), "x[k3]");
        assert_eq!(
            ValueRef::slot(Slot::new(1, SlotKind::Item)).to_string(),
            "v1"
        );
    }
}
