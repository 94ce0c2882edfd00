//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Domain failures
//! (not found, already transitioned, authorization) carry enough context for
//! the HTTP layer to map them to a status code and a user-facing message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Unified error type for all GenBridge operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed length or profanity validation.
    #[error("{0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// The caller is not allowed to perform this action.
    #[error("Not authorized: {reason}")]
    NotAuthorized {
        /// Why the action was refused
        reason: String,
    },

    /// No profile exists with the given id.
    #[error("Profile {id} not found")]
    ProfileNotFound {
        /// Profile id that was looked up
        id: i64,
    },

    /// No question exists with the given id.
    #[error("Question {id} not found")]
    QuestionNotFound {
        /// Question id that was looked up
        id: i64,
    },

    /// No answer exists with the given id.
    #[error("Answer {id} not found")]
    AnswerNotFound {
        /// Answer id that was looked up
        id: i64,
    },

    /// The question has already left the `pending` state.
    #[error("Question {id} is not pending anymore")]
    QuestionAlreadyAnswered {
        /// Question id whose transition lost the race
        id: i64,
    },

    /// An answer on this question has already been selected.
    #[error("Question {id} already has a selected answer")]
    AnswerAlreadySelected {
        /// Question id whose selection lost the race
        id: i64,
    },

    /// Malformed request field (unknown role, rating, or topic).
    #[error("{message}")]
    BadRequest {
        /// What was wrong with the request
        message: String,
    },

    /// A write referenced a question or profile that does not exist.
    #[error("Invalid question or user reference")]
    InvalidReference,

    /// A point amount was zero or negative.
    #[error("Invalid point amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Using points would drive the cached balance negative.
    #[error("Insufficient points: have {current}, need {required}")]
    InsufficientPoints {
        /// Current cached balance
        current: i64,
        /// Points the operation required
        required: i64,
    },

    /// Database error from SeaORM.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Upstream AI API failure (chat completion or transcription).
    #[error("Upstream AI error: {message}")]
    Upstream {
        /// What the upstream call reported
        message: String,
    },

    /// Configuration error (missing or malformed settings).
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Upstream {
            message: value.to_string(),
        }
    }
}

impl Error {
    /// HTTP status code this error maps to at the API boundary.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_)
            | Error::InvalidAmount { .. }
            | Error::InvalidReference
            | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotAuthorized { .. } => StatusCode::FORBIDDEN,
            Error::ProfileNotFound { .. }
            | Error::QuestionNotFound { .. }
            | Error::AnswerNotFound { .. } => StatusCode::NOT_FOUND,
            Error::QuestionAlreadyAnswered { .. }
            | Error::AnswerAlreadySelected { .. }
            | Error::InsufficientPoints { .. } => StatusCode::CONFLICT,
            Error::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Error::Database(_) | Error::Config { .. } | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
