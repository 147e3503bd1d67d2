use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::Principal,
    database_id::RecordId,
    record::delete_record,
};

/// The state needed to delete a record.
#[derive(Debug, Clone)]
pub struct DeleteRecordState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response to a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedRecord {
    /// A confirmation message.
    pub message: String,
    /// The ID of the deleted record.
    pub id: RecordId,
}

/// A route handler for deleting one of the caller's records.
pub async fn delete_record_endpoint(
    State(state): State<DeleteRecordState>,
    principal: Principal,
    record_id: Result<Path<RecordId>, PathRejection>,
) -> Result<Json<DeletedRecord>, Error> {
    let Path(record_id) = record_id?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_record(record_id, &principal.owner_id(), &connection)?;

    Ok(Json(DeletedRecord {
        message: "Record deleted successfully.".to_owned(),
        id: record_id,
    }))
}
