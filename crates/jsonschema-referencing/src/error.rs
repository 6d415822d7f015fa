use core::str::Utf8Error;

/// Errors that can occur during reference resolution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A JSON pointer leads to a part of a document that does not exist.
    #[error("Unresolvable JSON pointer: '{pointer}'")]
    Unresolvable { pointer: String },
    /// A pointer segment is not valid percent-encoded UTF-8.
    #[error("Invalid percent-encoding in JSON pointer '{pointer}'")]
    InvalidPointer {
        pointer: String,
        #[source]
        source: Utf8Error,
    },
    /// Resolving a reference leads back to itself.
    #[error("Reference '{reference}' refers to itself")]
    Cyclic { reference: String },
    /// An external document could not be retrieved.
    #[error("Resource '{uri}' is not present in a registry and retrieving it failed")]
    Retrieve {
        uri: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn unresolvable(pointer: impl Into<String>) -> Error {
        Error::Unresolvable {
            pointer: pointer.into(),
        }
    }

    pub(crate) fn invalid_pointer(pointer: impl Into<String>, source: Utf8Error) -> Error {
        Error::InvalidPointer {
            pointer: pointer.into(),
            source,
        }
    }

    pub(crate) fn cyclic(reference: impl Into<String>) -> Error {
        Error::Cyclic {
            reference: reference.into(),
        }
    }

    pub(crate) fn unretrievable(
        uri: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Error {
        Error::Retrieve {
            uri: uri.into(),
            source,
        }
    }
}
