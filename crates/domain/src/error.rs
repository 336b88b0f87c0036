//! Classified application errors.
//!
//! Every service operation fails with an [`AppError`]. Callers branch on
//! [`AppError::kind`]; the transport layer maps each kind onto a status code
//! and renders [`AppError::code`] in the response body.

use std::collections::BTreeMap;

use common::EntityId;
use record_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Message returned to clients in place of an internal failure.
pub const INTERNAL_MESSAGE: &str = "An unexpected internal error occurred.";

/// Coarse classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-field validation messages keyed by the JSON field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Fails with a `Validation` error if any message was recorded.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self))
        }
    }
}

/// Errors returned by the domain services.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request itself is malformed (bad id, bad filter).
    #[error("{0}")]
    BadRequest(String),

    /// One or more fields failed validation.
    #[error("{message}")]
    Validation {
        message: String,
        details: FieldErrors,
    },

    /// The addressed record does not exist.
    #[error("{entity} with ID '{id}' not found.")]
    NotFound { entity: &'static str, id: String },

    /// The request collides with existing state.
    #[error("{0}")]
    Conflict(String),

    /// The store failed. The cause is kept for logging only.
    #[error("{context}: {source}")]
    Internal {
        context: String,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    /// Validation failure with the default summary message.
    pub fn validation(details: FieldErrors) -> Self {
        Self::validation_with_message("Validation failed", details)
    }

    pub fn validation_with_message(message: impl Into<String>, details: FieldErrors) -> Self {
        AppError::Validation {
            message: message.into(),
            details,
        }
    }

    /// Validation failure on a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut details = FieldErrors::new();
        details.add(field, message);
        Self::validation(details)
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn internal(context: impl Into<String>, source: StoreError) -> Self {
        AppError::Internal {
            context: context.into(),
            source,
        }
    }

    /// Classifies a store failure while addressing `entity` by `id`.
    ///
    /// A missing record stays `NotFound`; every other store error is
    /// internal.
    pub fn from_store(entity: &'static str, id: &str, err: StoreError) -> Self {
        if err.is_not_found() {
            Self::not_found(entity, id)
        } else {
            Self::internal(format!("accessing {entity} {id}"), err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::BadRequest(_) => ErrorKind::BadRequest,
            AppError::Validation { .. } => ErrorKind::Validation,
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Message safe to show a client. Internal causes are never exposed.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal { .. } => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Field messages for a `Validation` error.
    pub fn details(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation { details, .. } => Some(details),
            _ => None,
        }
    }
}

/// Checks a path id, normalizing it to its canonical form.
pub(crate) fn parse_id(entity: &'static str, id: &str) -> Result<String, AppError> {
    EntityId::parse(id)
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {entity} ID format: {id}")))
}
