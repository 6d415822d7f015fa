use core::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    context::{Bucket, Context, RootContext},
    error::CompileError,
    expr::{CustomCheck, Expr, ValueRef},
};

/// Trait that allows implementing custom validation for keywords.
pub trait CustomKeyword: Send + Sync {
    /// Whether the instance satisfies the keyword.
    ///
    /// Only called with present values: a missing value always satisfies a
    /// custom keyword.
    fn is_valid(&self, instance: &Value) -> bool;
}

pub(crate) trait KeywordFactory: Send + Sync {
    fn init(
        &self,
        parent: &Map<String, Value>,
        schema: &Value,
    ) -> Result<Box<dyn CustomKeyword>, CompileError>;
}

impl<F> KeywordFactory for F
where
    F: Fn(&Map<String, Value>, &Value) -> Result<Box<dyn CustomKeyword>, CompileError>
        + Send
        + Sync,
{
    fn init(
        &self,
        parent: &Map<String, Value>,
        schema: &Value,
    ) -> Result<Box<dyn CustomKeyword>, CompileError> {
        self(parent, schema)
    }
}

/// A named custom keyword registered in a [`crate::KeywordTable`].
#[derive(Clone)]
pub struct CustomFactory {
    name: Arc<str>,
    factory: Arc<dyn KeywordFactory>,
}

impl CustomFactory {
    pub(crate) fn new<F>(name: &str, factory: F) -> Self
    where
        F: Fn(&Map<String, Value>, &Value) -> Result<Box<dyn CustomKeyword>, CompileError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn compile(
        &self,
        _: &mut RootContext<'_>,
        ctx: &mut Context,
        node: &Map<String, Value>,
        value: &ValueRef,
    ) -> Result<(), CompileError> {
        let Some(schema) = node.get(self.name()) else {
            return Ok(());
        };
        let check = self.factory.init(node, schema)?;
        ctx.push(
            Bucket::Unconditional,
            Expr::Custom {
                value: value.clone(),
                check: CustomCheck {
                    keyword: Arc::clone(&self.name),
                    check: Arc::from(check),
                },
            },
        );
        Ok(())
    }
}

impl fmt::Debug for CustomFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomFactory").field(&self.name).finish()
    }
}
