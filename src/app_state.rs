//! Implements a struct that holds the state of the REST server.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{Error, db::initialize, file_store::FileStore};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The disk area holding uploaded invoice and receipt files.
    pub file_store: FileStore,
}

impl AppState {
    /// Create a new [AppState] from a SQLite database connection and the
    /// path of the uploads directory.
    ///
    /// This function will initialize the database by adding the table for
    /// the domain model, and create the upload directories if they do not
    /// exist. The connection is owned by the state for the lifetime of the
    /// server and is closed when the state is dropped.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the upload
    /// directories cannot be created.
    pub fn new(db_connection: Connection, uploads_path: &Path) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let file_store = FileStore::new(uploads_path)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            file_store,
        })
    }
}
