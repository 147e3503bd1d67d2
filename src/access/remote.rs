use std::future::Future;

use crate::{
    Error,
    database_id::RecordId,
    record::{NewRecord, Record, RecordPatch},
};

/// A store of records that lives somewhere else, usually the REST API.
///
/// Implementations act on behalf of a single owner.
pub trait RemoteRecords {
    /// All of the owner's records, most recent first.
    fn list(&self) -> impl Future<Output = Result<Vec<Record>, Error>> + Send;

    /// Store `new_record` and return the stored record with its assigned ID.
    fn create(&self, new_record: &NewRecord) -> impl Future<Output = Result<Record, Error>> + Send;

    /// Apply `patch` to the record `id` and return the updated record.
    fn update(
        &self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> impl Future<Output = Result<Record, Error>> + Send;

    /// Delete the record `id`.
    fn delete(&self, id: RecordId) -> impl Future<Output = Result<(), Error>> + Send;
}
