use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::Principal,
    record::{Record, RecordQuery, find_records, non_empty},
};

/// The state needed to list records.
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

/// Optional field equality filters. Empty values mean no constraint.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RecordFilterParams {
    /// Only list records with exactly this category.
    pub category: Option<String>,
    /// Only list records with exactly this payment method.
    pub payment_method: Option<String>,
}

/// A route handler that lists the caller's records, most recent first.
///
/// An owner without any records gets an empty list.
pub async fn list_records_endpoint(
    State(state): State<ListRecordsState>,
    principal: Principal,
    params: Result<Query<RecordFilterParams>, QueryRejection>,
) -> Result<Json<Vec<Record>>, Error> {
    let Query(params) = params?;
    let query = RecordQuery {
        owner_id: principal.owner_id(),
        category: non_empty(params.category),
        payment_method: non_empty(params.payment_method),
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let records = find_records(&query, &connection)?;

    Ok(Json(records))
}
