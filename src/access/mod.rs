//! Client side access to an owner's records.
//!
//! [RecordAccess] keeps a local copy of the records, applies changes to it
//! straight away and then sends them to the server. If the server cannot be
//! reached the local copy, which is also written to a [LocalCache] file, is
//! kept so nothing the user entered is lost.

mod cache;
mod http;
mod records;
mod remote;

pub use cache::{DEFAULT_CACHE_FILE_NAME, LocalCache};
pub use http::HttpRecords;
pub use records::{LoadSource, RecordAccess, SyncOutcome};
pub use remote::RemoteRecords;
