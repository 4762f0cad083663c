//! Error types for group-policy operations

use crate::domain::ResourceKind;
use std::fmt;
use thiserror::Error;

/// Group-policy error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The backing service rejected the request or could not be reached
    #[error("{message}")]
    Remote {
        /// HTTP status, when the service answered at all
        status: Option<u16>,
        /// Human-readable cause
        message: String,
    },

    /// Requested object does not exist
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of the missing object
        kind: ResourceKind,
        /// Id that was looked up
        id: String,
    },

    /// Local field validation failed
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The service answered with a payload that does not describe the resource
    #[error("malformed {kind} payload: {message}")]
    Decode {
        /// Kind being decoded
        kind: ResourceKind,
        /// Decoder message
        message: String,
    },
}

impl PolicyError {
    /// Remote failure without an HTTP status (transport, DNS, TLS)
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for group-policy operations
pub type PolicyResult<T> = Result<T, PolicyError>;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as contributed to the workflow context
    pub field: String,
    /// Message shown next to the field
    pub message: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collected validation failures for one step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// True when nothing failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failures
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate failures in field order
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Failures reported against one field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |e| e.field == field)
    }

    /// `Ok(())` when empty, the collection otherwise
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
