//! Defines the app level error type and its conversion to JSON responses.
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::database_id::RecordId;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A record was submitted with a description that is empty after trimming.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// A record was submitted with an amount that is not a number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// A record was submitted with a date that is not a calendar date.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A month reference could not be parsed.
    #[error("\"{0}\" is not a valid month, expected YYYY-MM")]
    InvalidMonth(String),

    /// The caller asked for a window kind that does not exist.
    ///
    /// This indicates a caller contract violation rather than dirty data.
    #[error("unknown window kind \"{0}\", expected \"day\" or \"month\"")]
    UnknownWindowKind(String),

    /// The request could not be read, e.g. the body was not valid JSON or had
    /// unexpected fields.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A session was requested for an empty owner ID.
    #[error("owner ID cannot be empty")]
    EmptyOwnerId,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a record that does not exist or belongs to someone else.
    #[error("tried to update record {0} which is not in the database")]
    UpdateMissingRecord(RecordId),

    /// Tried to delete a record that does not exist or belongs to someone else.
    #[error("tried to delete record {0} which is not in the database")]
    DeleteMissingRecord(RecordId),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The configured CORS origin is not a valid header value.
    #[error("invalid allowed origin \"{0}\"")]
    InvalidOrigin(String),

    /// A request to the record service failed or returned an error status.
    #[error("the record service request failed: {0}")]
    Remote(String),

    /// The local record cache could not be written.
    #[error("could not write the local record cache: {0}")]
    Cache(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

/// The body of every error response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// A human readable explanation of what went wrong.
    pub message: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyDescription
            | Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::InvalidMonth(_)
            | Error::UnknownWindowKind(_)
            | Error::InvalidRequest(_)
            | Error::EmptyOwnerId => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::UpdateMissingRecord(_) | Error::DeleteMissingRecord(_) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = match self {
            Error::UpdateMissingRecord(_) | Error::DeleteMissingRecord(_) => {
                "Record not found.".to_owned()
            }
            Error::InvalidTimezoneError(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
            error if status_code.is_client_error() => error.to_string(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                "Server error, check the server logs for more details.".to_owned()
            }
        };

        (status_code, Json(ErrorBody { message })).into_response()
    }
}
