//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a [Record](crate::record::Record).
///
/// IDs assigned by the store are positive. Negative IDs mark provisional
/// records that only exist in a client's local state.
pub type RecordId = DatabaseId;
