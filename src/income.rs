//! The endpoint for recording income, optionally with an attached invoice.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    file_store::{DocumentCategory, FileStore},
    record::{NewRecord, RecordKind, insert_record},
    submission::Submission,
};

/// The state needed for creating income records.
#[derive(Debug, Clone)]
pub struct CreateIncomeState {
    /// The database connection for storing records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The file store for uploaded invoices.
    pub file_store: FileStore,
}

impl FromRef<AppState> for CreateIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            file_store: state.file_store.clone(),
        }
    }
}

/// The response body confirming a saved income record.
#[derive(Debug, Serialize)]
struct SaveConfirmation {
    message: &'static str,
    id: i64,
}

/// Route handler for creating an income record from a multipart form.
///
/// Required fields: `name`, `amount`, `date`, `source`. Optional: `notes` and
/// a file part named `invoice`. The invoice, if present, is written to the
/// file store before the record is inserted so that a stored filename always
/// references a file that exists.
pub async fn create_income_endpoint(
    State(state): State<CreateIncomeState>,
    multipart: Multipart,
) -> Result<Response, Error> {
    let submission = Submission::from_multipart(multipart, "invoice").await?;

    let name = submission.required("name")?.to_owned();
    let amount = submission.required_amount("amount")?;
    let date = submission.required("date")?.to_owned();
    let source = submission.required("source")?.to_owned();
    let notes = submission.optional("notes");

    let filename = match &submission.document {
        Some(document) => Some(state.file_store.store(
            DocumentCategory::Invoices,
            &document.original_filename,
            &document.bytes,
        )?),
        None => None,
    };

    let new_record = NewRecord {
        name,
        amount,
        date,
        kind: RecordKind::Income,
        source_or_category: source,
        payment_method: None,
        notes,
        filename,
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLock
    })?;
    let record = insert_record(new_record, &connection)?;

    tracing::info!("Saved income record {}", record.id);

    Ok((
        StatusCode::CREATED,
        Json(SaveConfirmation {
            message: "Income saved successfully",
            id: record.id,
        }),
    )
        .into_response())
}
