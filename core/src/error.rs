//! Error types for the library client.
//!
//! # Design
//! `ApiError` covers everything that can go wrong between building a request
//! and holding a parsed DTO. Non-2xx responses keep the status code and the
//! backend's optional `message` so the UI can show the server's own wording.
//! `FormError` and `NavError` are raised before any I/O happens.

use thiserror::Error;

/// Errors returned by `LibraryClient` and `Transport` implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Http {
        status: u16,
        message: Option<String>,
    },

    /// The exchange never completed (connection refused, broken body, ...).
    #[error("{0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text for a failed submission: the server's `message`, else the
    /// canonical reason phrase for the status.
    pub fn reason(&self) -> String {
        match self {
            ApiError::Http {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Http {
                status,
                message: None,
            } => reason_phrase(*status).to_string(),
            other => other.to_string(),
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown Status",
    }
}

/// Client-side form validation failures. None of these reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("All borrowing fields must be filled in correctly.")]
    IncompleteBorrowing,

    #[error("Borrowing ID must be a valid number.")]
    InvalidBorrowingId,
}

/// Navigation table and key errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("unknown section key `{0}`")]
    UnknownSection(String),

    #[error("unknown {axis} tab key `{key}`")]
    UnknownTab { axis: &'static str, key: String },

    #[error("no route for {axis} tab `{key}`")]
    MissingRoute { axis: &'static str, key: &'static str },

    #[error("empty route target for {axis} tab `{key}`")]
    EmptyRoute { axis: &'static str, key: &'static str },
}

/// Why a form submission did not go through. The application context has
/// already shown the matching message by the time a caller sees this.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
