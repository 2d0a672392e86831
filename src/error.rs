//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert,
    error_page::{InternalServerError, NotFoundError},
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A currency code other than BRL, USD or EUR was submitted.
    #[error("unknown currency \"{0}\"")]
    UnknownCurrency(String),

    /// A salary periodicity other than hourly, monthly or yearly was submitted.
    #[error("unknown salary periodicity \"{0}\"")]
    InvalidPeriodicity(String),

    /// The hours worked per week must be a whole number greater than zero.
    #[error("hours per week must be a whole number greater than zero, got \"{0}\"")]
    InvalidHoursPerWeek(String),

    /// A place rating outside of 1 to 5 stars was submitted.
    #[error("ratings must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a history record that does not exist.
    #[error("there is no history record at index {0}")]
    DeleteMissingRecord(usize),

    /// A calculation is already being recorded, the submission was dropped.
    #[error("a calculation is already in progress")]
    CalculationInProgress,

    /// The remote service could not be reached or sent a response that could
    /// not be read.
    #[error("remote request failed: {0}")]
    RemoteRequest(String),

    /// The remote service responded with an unexpected status code.
    #[error("remote service responded with status {0}")]
    RemoteStatus(u16),

    /// The remote service rejected the request because too many were sent
    /// (HTTP 429).
    #[error("too many requests, the remote service is rate limiting")]
    RateLimited,

    /// The remote service rejected the submitted place as incomplete (HTTP 400).
    #[error("the place is missing required fields")]
    InvalidPlace,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing or deserializing a value as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// A request or response body could not be read.
    #[error("could not read body: {0}")]
    BodyReadError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
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

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Error::RemoteStatus(status.as_u16()),
            None => Error::RemoteRequest(value.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::UnknownCurrency(code) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unknown currency".to_owned(),
                    details: format!("\"{code}\" is not one of BRL, USD or EUR."),
                },
            ),
            Error::InvalidPeriodicity(periodicity) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unknown salary periodicity".to_owned(),
                    details: format!("\"{periodicity}\" is not one of hourly, monthly or yearly."),
                },
            ),
            Error::InvalidHoursPerWeek(hours) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid hours per week".to_owned(),
                    details: format!(
                        "\"{hours}\" is not a valid number of hours. \
                        Enter a whole number greater than zero."
                    ),
                },
            ),
            Error::InvalidRating(rating) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid rating".to_owned(),
                    details: format!("Ratings go from 1 to 5 stars, got {rating}."),
                },
            ),
            Error::DeleteMissingRecord(index) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete record".to_owned(),
                    details: format!(
                        "There is no record number {}. \
                        Try refreshing the page to see if the record has already been deleted.",
                        index + 1
                    ),
                },
            ),
            Error::CalculationInProgress => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Already calculating".to_owned(),
                    details: "Wait for the current calculation to finish before trying again."
                        .to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
