//! Invoice Keeper is a small record-keeping service for personal finances.
//!
//! It accepts uploaded financial documents (invoices and receipts) together
//! with metadata submitted through a multipart web form, stores each upload
//! on disk under a generated unique name, and persists a metadata row in a
//! SQLite database. A read endpoint serializes every stored record as JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod expense;
mod file_store;
mod income;
mod invoices;
mod record;
mod routing;
mod submission;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use file_store::FileStore;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required form field was absent or empty in the submitted multipart
    /// form.
    #[error("missing required form field '{0}'")]
    MissingField(String),

    /// A form field was present but could not be parsed as the expected type
    /// (e.g., a non-numeric amount).
    #[error("field '{0}' has an invalid value: {1}")]
    InvalidField(String, String),

    /// An uploaded file had an extension outside the allow-list.
    ///
    /// The payload is the document label shown to the client, e.g. "invoice"
    /// or "receipt".
    #[error("invalid file type for {0}")]
    InvalidFileType(String),

    /// The multipart form could not be read.
    #[error("could not parse multipart form: {0}")]
    Multipart(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An uploaded file could not be written to the file store.
    ///
    /// The error string should only be logged for debugging on the server.
    /// Clients receive a generic internal server error.
    #[error("could not write uploaded file: {0}")]
    Storage(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,
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

/// The JSON body used for all error responses.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    /// A human-readable description of what went wrong.
    pub detail: String,
}

impl ErrorBody {
    pub(crate) fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Error::MissingField(ref field) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("missing required form field '{field}'"),
            ),
            Error::InvalidField(ref field, ref reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("field '{field}' has an invalid value: {reason}"),
            ),
            Error::InvalidFileType(ref document) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid file type for {document}. Allowed: PDF, JPG, PNG"),
            ),
            Error::Multipart(ref reason) => (
                StatusCode::BAD_REQUEST,
                format!("could not parse multipart form: {reason}"),
            ),
            Error::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_owned()),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_owned(),
                )
            }
        };

        (status, Json(ErrorBody::new(detail))).into_response()
    }
}
