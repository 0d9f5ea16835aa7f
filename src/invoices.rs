//! The endpoint for listing every stored record.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    record::{Record, list_records},
};

/// The state needed for listing records.
#[derive(Debug, Clone)]
pub struct ListRecordsState {
    /// The database connection for reading records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListRecordsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for listing every stored record as JSON, newest upload
/// first. An empty store yields an empty array.
pub async fn get_invoices_endpoint(
    State(state): State<ListRecordsState>,
) -> Result<Json<Vec<Record>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLock
    })?;

    list_records(&connection).map(Json)
}
