use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{
        FromRef, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Principal,
    database_id::RecordId,
    record::{Record, RecordPatch, update_record},
};

/// The state needed to edit a record.
#[derive(Debug, Clone)]
pub struct EditRecordState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for changing some of the fields of one of the caller's records.
///
/// Responds with the record as stored after the update. Records owned by
/// someone else are reported as missing.
pub async fn edit_record_endpoint(
    State(state): State<EditRecordState>,
    principal: Principal,
    record_id: Result<Path<RecordId>, PathRejection>,
    payload: Result<Json<RecordPatch>, JsonRejection>,
) -> Result<Json<Record>, Error> {
    let Path(record_id) = record_id?;
    let Json(patch) = payload?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let record = update_record(record_id, &principal.owner_id(), patch, &connection)?;

    Ok(Json(record))
}
