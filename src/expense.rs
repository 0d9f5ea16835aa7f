//! The endpoint for recording expenses, optionally with an attached receipt.

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

/// The state needed for creating expense records.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for storing records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The file store for uploaded receipts.
    pub file_store: FileStore,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            file_store: state.file_store.clone(),
        }
    }
}

/// The response body confirming a saved expense record.
#[derive(Debug, Serialize)]
struct SaveConfirmation {
    message: &'static str,
    id: i64,
}

/// Route handler for creating an expense record from a multipart form.
///
/// Required fields: `name`, `amount`, `date`, `category`, `payment`.
/// Optional: `notes` and a file part named `receipt`. The receipt, if
/// present, is written to the file store before the record is inserted so
/// that a stored filename always references a file that exists.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    multipart: Multipart,
) -> Result<Response, Error> {
    let submission = Submission::from_multipart(multipart, "receipt").await?;

    let name = submission.required("name")?.to_owned();
    let amount = submission.required_amount("amount")?;
    let date = submission.required("date")?.to_owned();
    let category = submission.required("category")?.to_owned();
    let payment = submission.required("payment")?.to_owned();
    let notes = submission.optional("notes");

    let filename = match &submission.document {
        Some(document) => Some(state.file_store.store(
            DocumentCategory::Receipts,
            &document.original_filename,
            &document.bytes,
        )?),
        None => None,
    };

    let new_record = NewRecord {
        name,
        amount,
        date,
        kind: RecordKind::Expense,
        source_or_category: category,
        payment_method: Some(payment),
        notes,
        filename,
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLock
    })?;
    let record = insert_record(new_record, &connection)?;

    tracing::info!("Saved expense record {}", record.id);

    Ok((
        StatusCode::CREATED,
        Json(SaveConfirmation {
            message: "Expense saved successfully",
            id: record.id,
        }),
    )
        .into_response())
}

#[cfg(test)]
mod create_expense_tests {
    use std::fs;

    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use rusqlite::Connection;
    use uuid::Uuid;

    use crate::{
        AppState, build_router, endpoints,
        file_store::DocumentCategory,
        record::{RecordKind, count_records, list_records},
    };

    fn get_test_server() -> (TestServer, AppState, std::path::PathBuf) {
        let conn = Connection::open_in_memory().expect("Could not open database in memory.");
        let uploads = std::env::temp_dir().join(format!("invoice_keeper_test_{}", Uuid::new_v4()));
        let state = AppState::new(conn, &uploads).expect("Could not create app state.");
        let server =
            TestServer::new(build_router(state.clone()));

        (server, state, uploads)
    }

    fn coffee_form() -> MultipartForm {
        MultipartForm::new()
            .add_text("name", "Coffee")
            .add_text("amount", "4.50")
            .add_text("date", "2024-01-01")
            .add_text("category", "food")
            .add_text("payment", "cash")
    }

    #[tokio::test]
    async fn expense_without_file_is_saved_and_listed() {
        let (server, _state, uploads) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .multipart(coffee_form())
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Expense saved successfully");
        let id = body["id"].as_i64().unwrap();

        let listed: serde_json::Value = server.get(endpoints::INVOICES).await.json();
        let records = listed.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], id);
        assert_eq!(records[0]["name"], "Coffee");
        assert_eq!(records[0]["type"], "expense");
        assert_eq!(records[0]["payment_method"], "cash");
        assert_eq!(records[0]["filename"], serde_json::Value::Null);

        fs::remove_dir_all(uploads).unwrap();
    }

    #[tokio::test]
    async fn receipt_is_stored_under_the_receipts_directory() {
        let (server, state, uploads) = get_test_server();
        let receipt_bytes = b"%PDF-1.4 receipt".to_vec();

        let response = server
            .post(endpoints::EXPENSES)
            .multipart(coffee_form().add_part(
                "receipt",
                Part::bytes(receipt_bytes.clone())
                    .file_name("coffee receipt.pdf")
                    .mime_type("application/pdf"),
            ))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);

        let records = {
            let connection = state.db_connection.lock().unwrap();
            list_records(&connection).unwrap()
        };
        assert_eq!(records[0].kind, RecordKind::Expense);
        let stored_filename = records[0].filename.as_deref().unwrap();

        let stored_path = state
            .file_store
            .path_of(DocumentCategory::Receipts, stored_filename);
        assert_eq!(fs::read(stored_path).unwrap(), receipt_bytes);

        fs::remove_dir_all(uploads).unwrap();
    }

    #[tokio::test]
    async fn non_numeric_amount_is_rejected() {
        let (server, state, uploads) = get_test_server();

        let form = MultipartForm::new()
            .add_text("name", "Coffee")
            .add_text("amount", "four fifty")
            .add_text("date", "2024-01-01")
            .add_text("category", "food")
            .add_text("payment", "cash");
        let response = server.post(endpoints::EXPENSES).multipart(form).await;

        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_records(&connection).unwrap(), 0);
        drop(connection);

        fs::remove_dir_all(uploads).unwrap();
    }

    #[tokio::test]
    async fn missing_payment_field_is_rejected() {
        let (server, state, uploads) = get_test_server();

        let form = MultipartForm::new()
            .add_text("name", "Coffee")
            .add_text("amount", "4.50")
            .add_text("date", "2024-01-01")
            .add_text("category", "food");
        let response = server.post(endpoints::EXPENSES).multipart(form).await;

        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = response.json();
        assert_eq!(body["detail"], "missing required form field 'payment'");

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_records(&connection).unwrap(), 0);
        drop(connection);

        fs::remove_dir_all(uploads).unwrap();
    }
}
