use time::OffsetDateTime;

use crate::{
    Error,
    access::{LocalCache, RemoteRecords},
    database_id::RecordId,
    record::{NewRecord, OwnerId, Record, RecordPatch},
};

/// Where [RecordAccess::load] got its records from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The remote store answered.
    Remote,
    /// The remote store failed so the local cache was used.
    Cache,
}

/// The result of a change that was applied locally and then sent to the remote store.
#[derive(Debug, PartialEq)]
pub enum SyncOutcome<T> {
    /// The remote store accepted the change. Holds the authoritative value.
    Synced(T),
    /// The remote store did not accept the change, but it was kept locally.
    LocalOnly {
        /// The value as it is held locally.
        value: T,
        /// Why the remote store did not accept the change.
        error: Error,
    },
}

impl<T> SyncOutcome<T> {
    /// The value, wherever it ended up.
    pub fn value(&self) -> &T {
        match self {
            SyncOutcome::Synced(value) | SyncOutcome::LocalOnly { value, .. } => value,
        }
    }

    /// Take the value, wherever it ended up.
    pub fn into_value(self) -> T {
        match self {
            SyncOutcome::Synced(value) | SyncOutcome::LocalOnly { value, .. } => value,
        }
    }

    /// Whether the remote store accepted the change.
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced(_))
    }
}

/// A change to a stored record that the remote store has not accepted yet.
#[derive(Debug, Clone, PartialEq)]
enum PendingChange {
    Update(RecordId, RecordPatch),
    Delete(RecordId),
}

/// An owner's records held locally and kept in step with a remote store.
///
/// Changes are applied to the local list and written to the cache before the
/// remote store is called, so a failing remote never loses anything. Changes
/// the remote store did not accept are sent again on the next [RecordAccess::load].
#[derive(Debug)]
pub struct RecordAccess<R> {
    remote: R,
    cache: LocalCache,
    owner_id: OwnerId,
    records: Vec<Record>,
    pending: Vec<PendingChange>,
}

impl<R: RemoteRecords> RecordAccess<R> {
    /// Create an access layer with no records loaded.
    ///
    /// Records created locally are given `owner_id`, or the anonymous owner if it is `None`.
    pub fn new(remote: R, cache: LocalCache, owner_id: Option<OwnerId>) -> Self {
        Self {
            remote,
            cache,
            owner_id: owner_id.unwrap_or_else(OwnerId::anonymous),
            records: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// The records as they are held locally.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Whether every local record and change has been accepted by the remote store.
    pub fn is_in_sync(&self) -> bool {
        self.pending.is_empty() && !self.records.iter().any(Record::is_provisional)
    }

    /// Replace the local records with the remote store's, or the cache's if
    /// the remote store cannot be reached.
    ///
    /// When the remote store answers, changes it has not accepted yet are
    /// sent again and provisional records are stored. Anything it still
    /// refuses is kept locally on top of the remote records.
    pub async fn load(&mut self) -> LoadSource {
        match self.remote.list().await {
            Ok(records) => {
                tracing::debug!("Loaded {} records from the remote store", records.len());
                let provisional: Vec<Record> = self
                    .records
                    .iter()
                    .filter(|record| record.is_provisional())
                    .cloned()
                    .collect();

                self.records = records;
                self.replay_pending().await;
                self.store_provisional(provisional).await;
                self.write_cache();
                LoadSource::Remote
            }
            Err(error) => {
                tracing::warn!("Could not load records, falling back to the local cache: {error}");
                self.records = self.cache.load();
                LoadSource::Cache
            }
        }
    }

    /// Add a record locally and then store it remotely.
    ///
    /// Until the remote store answers the record has a negative, provisional
    /// ID. On success it is replaced by the stored record.
    ///
    /// # Errors
    /// Returns a validation error as described in [NewRecord::validate]
    /// without changing anything.
    pub async fn add(&mut self, new_record: NewRecord) -> Result<SyncOutcome<Record>, Error> {
        let new_record = new_record.validate()?;
        let now = OffsetDateTime::now_utc();

        let provisional = Record {
            id: self.next_provisional_id(),
            owner_id: self.owner_id.clone(),
            occurred_on: new_record.occurred_on.clone(),
            description: new_record.description.clone(),
            amount: new_record.amount.clone(),
            category: new_record.category.clone(),
            payment_method: new_record.payment_method.clone(),
            created_at: now,
            updated_at: now,
        };

        self.records.insert(0, provisional.clone());
        self.write_cache();

        match self.remote.create(&new_record).await {
            Ok(stored) => {
                self.replace(provisional.id, stored.clone());
                Ok(SyncOutcome::Synced(stored))
            }
            Err(error) => {
                tracing::warn!("Record {} was only added locally: {error}", provisional.id);
                Ok(SyncOutcome::LocalOnly {
                    value: provisional,
                    error,
                })
            }
        }
    }

    /// Change a record locally and then remotely.
    ///
    /// A provisional record is only changed locally since the remote store
    /// does not know about it yet.
    ///
    /// # Errors
    /// Returns a validation error as described in [RecordPatch::validate] or
    /// [Error::NotFound] if there is no local record `id`. Nothing is changed
    /// in either case.
    pub async fn update(
        &mut self,
        id: RecordId,
        patch: RecordPatch,
    ) -> Result<SyncOutcome<Record>, Error> {
        patch.validate()?;

        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(Error::NotFound)?;
        record.apply(patch.clone());
        record.updated_at = OffsetDateTime::now_utc();
        let updated = record.clone();
        self.write_cache();

        if updated.is_provisional() {
            return Ok(SyncOutcome::LocalOnly {
                value: updated,
                error: Error::Remote(format!("record {id} has not been stored remotely yet")),
            });
        }

        match self.remote.update(id, &patch).await {
            Ok(stored) => {
                self.replace(id, stored.clone());
                Ok(SyncOutcome::Synced(stored))
            }
            Err(error) => {
                tracing::warn!("Record {id} was only updated locally: {error}");
                self.pending.push(PendingChange::Update(id, patch));
                Ok(SyncOutcome::LocalOnly {
                    value: updated,
                    error,
                })
            }
        }
    }

    /// Remove a record locally and then remotely.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no local record `id`.
    pub async fn delete(&mut self, id: RecordId) -> Result<SyncOutcome<RecordId>, Error> {
        let index = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or(Error::NotFound)?;
        let removed = self.records.remove(index);
        self.write_cache();

        if removed.is_provisional() {
            return Ok(SyncOutcome::Synced(id));
        }

        match self.remote.delete(id).await {
            Ok(()) => Ok(SyncOutcome::Synced(id)),
            Err(error) => {
                tracing::warn!("Record {id} was only deleted locally: {error}");
                self.pending.push(PendingChange::Delete(id));
                Ok(SyncOutcome::LocalOnly { value: id, error })
            }
        }
    }

    /// Send the changes the remote store has not accepted yet, in the order
    /// they were made, and apply them to the freshly loaded records.
    async fn replay_pending(&mut self) {
        for change in std::mem::take(&mut self.pending) {
            match change {
                PendingChange::Update(id, patch) => {
                    let Some(index) = self.position(id) else {
                        tracing::warn!(
                            "Dropping local change to record {id}, it is no longer stored remotely"
                        );
                        continue;
                    };

                    match self.remote.update(id, &patch).await {
                        Ok(stored) => self.records[index] = stored,
                        Err(error) => {
                            tracing::warn!("Record {id} is still only updated locally: {error}");
                            self.records[index].apply(patch.clone());
                            self.pending.push(PendingChange::Update(id, patch));
                        }
                    }
                }
                PendingChange::Delete(id) => {
                    let Some(index) = self.position(id) else {
                        continue;
                    };

                    if let Err(error) = self.remote.delete(id).await {
                        tracing::warn!("Record {id} is still only deleted locally: {error}");
                        self.pending.push(PendingChange::Delete(id));
                    }
                    self.records.remove(index);
                }
            }
        }
    }

    /// Store records that were added while the remote store was unreachable.
    ///
    /// `provisional` is newest first, the same order as the local list.
    async fn store_provisional(&mut self, provisional: Vec<Record>) {
        for record in provisional.into_iter().rev() {
            let new_record = NewRecord {
                occurred_on: record.occurred_on.clone(),
                description: record.description.clone(),
                amount: record.amount.clone(),
                category: record.category.clone(),
                payment_method: record.payment_method.clone(),
            };

            match self.remote.create(&new_record).await {
                Ok(stored) => self.records.insert(0, stored),
                Err(error) => {
                    tracing::warn!("Record {} is still only stored locally: {error}", record.id);
                    self.records.insert(0, record);
                }
            }
        }
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// One less than the smallest ID in use, and never more than -1.
    fn next_provisional_id(&self) -> RecordId {
        self.records
            .iter()
            .map(|record| record.id)
            .filter(|&id| id < 0)
            .min()
            .map_or(-1, |id| id - 1)
    }

    fn replace(&mut self, id: RecordId, record: Record) {
        if let Some(existing) = self.records.iter_mut().find(|existing| existing.id == id) {
            *existing = record;
            self.write_cache();
        }
    }

    fn write_cache(&self) {
        if let Err(error) = self.cache.save(&self.records) {
            tracing::warn!("Could not update the local record cache: {error}");
        }
    }
}
