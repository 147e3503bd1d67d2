//! Financial records and the store that keeps them.
//!
//! This module contains everything related to records:
//! - The `Record` model and the tolerant field types it is built from
//! - Database functions for storing, querying, and changing records
//! - The REST handlers for listing, creating, editing and deleting records

mod amount;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod occurred_on;
mod owner;

pub use amount::Amount;
pub use core::{
    NewRecord, Record, RecordPatch, RecordQuery, create_record, create_record_table, delete_record,
    find_records, get_record, get_records_by_owner, map_record_row, update_record,
};
pub use create_endpoint::{CreateRecordState, create_record_endpoint};
pub use delete_endpoint::{DeleteRecordState, DeletedRecord, delete_record_endpoint};
pub use edit_endpoint::{EditRecordState, edit_record_endpoint};
pub use list_endpoint::{ListRecordsState, RecordFilterParams, list_records_endpoint};
pub use occurred_on::OccurredOn;
pub use owner::OwnerId;

pub(crate) use amount::exact_decimal;
pub(crate) use core::non_empty;
