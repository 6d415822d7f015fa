//! Declarations hoisted out of the expression tree: literal tables, compiled
//! patterns, routines and shared helpers, each bound to a unique `fN` name.
use core::fmt;

use ahash::AHashMap;
use serde_json::Value;

use crate::{
    error::CompileError,
    expr::{Expr, Slot},
    regex::Pattern,
};

/// Name of a pooled declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name(usize);

impl Name {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

#[derive(Debug)]
pub enum Declaration {
    Literal(Value),
    Pattern(Pattern),
    Routine(Routine),
    Builtin(Builtin),
}

/// Array routines too involved to inline as a single expression.
#[derive(Debug)]
pub enum Routine {
    /// Count items satisfying `body` and bound the count.
    Count {
        item: Slot,
        body: Expr,
        min: u64,
        max: Option<u64>,
    },
    /// `body` holds for every item from index `start` on.
    EveryFrom { start: usize, item: Slot, body: Expr },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Structural deep equality.
    DeepEqual,
}

#[derive(Debug, Default)]
pub(crate) struct Pool {
    declarations: Vec<Declaration>,
    literals: AHashMap<String, Name>,
    patterns: AHashMap<Box<str>, Name>,
    builtins: AHashMap<Builtin, Name>,
}

impl Pool {
    fn push(&mut self, declaration: Declaration) -> Name {
        let name = Name(self.declarations.len());
        self.declarations.push(declaration);
        name
    }

    /// Identical literals share one name.
    pub(crate) fn add_literal(&mut self, value: Value) -> Name {
        let key = value.to_string();
        if let Some(name) = self.literals.get(&key) {
            return *name;
        }
        let name = self.push(Declaration::Literal(value));
        self.literals.insert(key, name);
        name
    }

    pub(crate) fn add_pattern(&mut self, source: &str, unicode: bool) -> Result<Name, CompileError> {
        if let Some(name) = self.patterns.get(source) {
            return Ok(*name);
        }
        let pattern = Pattern::new(source, unicode)?;
        let name = self.push(Declaration::Pattern(pattern));
        self.patterns.insert(source.into(), name);
        Ok(name)
    }

    pub(crate) fn add_routine(&mut self, routine: Routine) -> Name {
        self.push(Declaration::Routine(routine))
    }

    /// Included at most once.
    pub(crate) fn include_builtin(&mut self, builtin: Builtin) -> Name {
        if let Some(name) = self.builtins.get(&builtin) {
            return *name;
        }
        let name = self.push(Declaration::Builtin(builtin));
        self.builtins.insert(builtin, name);
        name
    }

    #[inline]
    pub(crate) fn get(&self, name: Name) -> &Declaration {
        &self.declarations[name.index()]
    }

    pub(crate) fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Routine::Count {
                item,
                body,
                min,
                max,
            } => {
                write!(f, "|a| {{ let c = a.iter().filter(|{item}| {body}).count(); c >= {min}")?;
                if let Some(max) = max {
                    write!(f, " && c <= {max}")?;
                }
                f.write_str(" }")
            }
            Routine::EveryFrom { start, item, body } => {
                write!(f, "|a| a.iter().skip({start}).all(|{item}| {body})")
            }
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Literal(value) => write!(f, "{value}"),
            Declaration::Pattern(pattern) => write!(f, "{pattern}"),
            Declaration::Routine(routine) => write!(f, "{routine}"),
            Declaration::Builtin(Builtin::DeepEqual) => f.write_str("deep_equal"),
        }
    }
}
