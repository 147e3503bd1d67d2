use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Principal,
    record::{NewRecord, Record, create_record},
};

/// The state needed to create a record.
#[derive(Debug, Clone)]
pub struct CreateRecordState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new record owned by the caller.
///
/// Responds with the stored record, including its ID and timestamps.
pub async fn create_record_endpoint(
    State(state): State<CreateRecordState>,
    principal: Principal,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), Error> {
    let Json(new_record) = payload?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let record = create_record(&principal.owner_id(), new_record, &connection)?;
    tracing::debug!(
        "Created record {} for {} (signed in: {})",
        record.id,
        record.owner_id,
        principal.is_authenticated()
    );

    Ok((StatusCode::CREATED, Json(record)))
}
