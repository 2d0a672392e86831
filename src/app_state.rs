//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, calculator::CalculationGuard, remote::RemoteClient, store::initialize};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,

    /// The database connection holding the history, salary config and language.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The client for the remote location, rating and message store.
    pub remote: RemoteClient,

    /// Tracks the calculation being recorded, if any.
    pub calculation_guard: CalculationGuard,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the key-value table.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "America/Sao_Paulo".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        remote: RemoteClient,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
            remote,
            calculation_guard: CalculationGuard::default(),
        })
    }
}
