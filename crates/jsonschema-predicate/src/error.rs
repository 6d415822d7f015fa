use serde_json::Value;

/// Errors raised while compiling a schema.
///
/// Compilation is all-or-nothing: no predicate is produced once any node fails.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A schema node is neither a boolean nor an object.
    #[error("{schema} is not a valid schema: expected an object or a boolean")]
    InvalidSchema { schema: Value },
    /// A keyword carries a value of the wrong shape.
    #[error("Invalid value for `{keyword}`: {value} is not {expected}")]
    InvalidKeyword {
        keyword: String,
        value: Value,
        expected: &'static str,
    },
    /// A `pattern` or `patternProperties` key is not a valid regular expression.
    #[error("`{pattern}` is not a valid regular expression: {message}")]
    InvalidPattern { pattern: String, message: String },
    /// A custom keyword factory rejected its input.
    #[error("Custom keyword `{keyword}` failed to compile: {message}")]
    Custom { keyword: String, message: String },
    /// Reference inlining failed before compilation started.
    #[error(transparent)]
    Referencing(#[from] referencing::Error),
}

impl CompileError {
    pub(crate) fn invalid_keyword(
        keyword: impl Into<String>,
        value: &Value,
        expected: &'static str,
    ) -> Self {
        CompileError::InvalidKeyword {
            keyword: keyword.into(),
            value: value.clone(),
            expected,
        }
    }

    pub(crate) fn invalid_schema(schema: &Value) -> Self {
        CompileError::InvalidSchema {
            schema: schema.clone(),
        }
    }

    /// A custom keyword error, for use from [`crate::CustomKeyword`] factories.
    pub fn custom(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::Custom {
            keyword: keyword.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompileError;
    use serde_json::json;

    #[test]
    fn messages_include_the_fragment() {
        let error = CompileError::invalid_keyword("minLength", &json!(-1), "a non-negative integer");
        assert_eq!(
            error.to_string(),
            "Invalid value for `minLength`: -1 is not a non-negative integer"
        );
        let error = CompileError::invalid_schema(&json!(42));
        assert_eq!(
            error.to_string(),
            "42 is not a valid schema: expected an object or a boolean"
        );
    }
}
