//! Defines the core data models and database queries for financial records.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::RecordId,
    record::{Amount, OccurredOn, OwnerId},
};

// ============================================================================
// MODELS
// ============================================================================

/// One expense entry.
///
/// Fields that may be dirty in older data (date, description, amount) are
/// read leniently so that a bad record still shows up in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The ID of the record, assigned by the store.
    pub id: RecordId,
    /// The principal the record belongs to.
    pub owner_id: OwnerId,
    /// When the expense happened.
    #[serde(default)]
    pub occurred_on: OccurredOn,
    /// What the money was spent on.
    #[serde(default)]
    pub description: String,
    /// How much was spent.
    #[serde(default)]
    pub amount: Amount,
    /// A free text label such as "Food" or "Rent".
    #[serde(default)]
    pub category: Option<String>,
    /// How the expense was paid, e.g. "Cash" or "UPI".
    #[serde(default)]
    pub payment_method: Option<String>,
    /// When the record was stored.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Record {
    /// Whether the record only exists locally and has not been given an ID by the store.
    pub fn is_provisional(&self) -> bool {
        self.id < 0
    }

    /// Overwrite the fields set in `patch`.
    ///
    /// An empty category or payment method clears the field. The ID and owner
    /// never change.
    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(occurred_on) = patch.occurred_on {
            self.occurred_on = occurred_on;
        }

        if let Some(description) = patch.description {
            self.description = description.trim().to_owned();
        }

        if let Some(amount) = patch.amount {
            self.amount = amount;
        }

        if let Some(category) = patch.category {
            self.category = non_empty(Some(category));
        }

        if let Some(payment_method) = patch.payment_method {
            self.payment_method = non_empty(Some(payment_method));
        }
    }
}

/// The data needed to create a [Record].
///
/// The owner, ID and timestamps are assigned when the record is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    /// When the expense happened.
    #[serde(default)]
    pub occurred_on: OccurredOn,
    /// What the money was spent on.
    #[serde(default)]
    pub description: String,
    /// How much was spent.
    #[serde(default)]
    pub amount: Amount,
    /// An optional free text label.
    #[serde(default)]
    pub category: Option<String>,
    /// An optional payment method.
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl NewRecord {
    /// Start building a new record with the required fields.
    pub fn new(
        occurred_on: impl Into<OccurredOn>,
        description: &str,
        amount: impl Into<Amount>,
    ) -> Self {
        Self {
            occurred_on: occurred_on.into(),
            description: description.to_owned(),
            amount: amount.into(),
            category: None,
            payment_method: None,
        }
    }

    /// Set the category.
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    /// Set the payment method.
    pub fn payment_method(mut self, payment_method: &str) -> Self {
        self.payment_method = Some(payment_method.to_owned());
        self
    }

    /// Check the record is fit to be stored and normalise it.
    ///
    /// The description is trimmed and empty labels become `None`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyDescription] if the description is blank,
    /// - [Error::InvalidAmount] if the amount is not a number,
    /// - or [Error::InvalidDate] if the date cannot be read as a calendar date.
    pub fn validate(self) -> Result<Self, Error> {
        validate_description(&self.description)?;
        validate_amount(&self.amount)?;
        validate_date(&self.occurred_on)?;

        Ok(Self {
            description: self.description.trim().to_owned(),
            category: non_empty(self.category),
            payment_method: non_empty(self.payment_method),
            ..self
        })
    }
}

/// A partial update to a [Record].
///
/// Fields that are `None` are left unchanged. The ID and owner cannot be
/// changed, so payloads that try are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordPatch {
    /// A new date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurred_on: Option<OccurredOn>,
    /// A new description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A new amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// A new category, or an empty string to clear it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// A new payment method, or an empty string to clear it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl RecordPatch {
    /// Check that every field being set is valid.
    ///
    /// # Errors
    /// Returns the same errors as [NewRecord::validate] for the fields that are set.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(description) = &self.description {
            validate_description(description)?;
        }

        if let Some(amount) = &self.amount {
            validate_amount(amount)?;
        }

        if let Some(occurred_on) = &self.occurred_on {
            validate_date(occurred_on)?;
        }

        Ok(())
    }
}

fn validate_description(description: &str) -> Result<(), Error> {
    if description.trim().is_empty() {
        return Err(Error::EmptyDescription);
    }

    Ok(())
}

fn validate_amount(amount: &Amount) -> Result<(), Error> {
    match amount {
        Amount::Value(_) => Ok(()),
        Amount::Malformed(text) => Err(Error::InvalidAmount(text.clone())),
        Amount::Missing => Err(Error::InvalidAmount(String::new())),
    }
}

fn validate_date(occurred_on: &OccurredOn) -> Result<(), Error> {
    match occurred_on.calendar_date() {
        Some(_) => Ok(()),
        None => Err(Error::InvalidDate(occurred_on.to_string())),
    }
}

pub(crate) fn non_empty(label: Option<String>) -> Option<String> {
    label.filter(|label| !label.is_empty())
}

/// Field equality constraints for listing an owner's records.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    /// Only records belonging to this owner are returned.
    pub owner_id: OwnerId,
    /// If set, only records with exactly this category.
    pub category: Option<String>,
    /// If set, only records with exactly this payment method.
    pub payment_method: Option<String>,
}

impl RecordQuery {
    /// A query for all of `owner_id`'s records.
    pub fn owner(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            category: None,
            payment_method: None,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str = "id, owner_id, occurred_on, description, amount, category, \
    payment_method, created_at, updated_at";

/// Validate `new_record` and store it under `owner_id`.
///
/// # Errors
/// This function will return a validation error as described in
/// [NewRecord::validate], or [Error::SqlError] if there is an SQL error.
pub fn create_record(
    owner_id: &OwnerId,
    new_record: NewRecord,
    connection: &Connection,
) -> Result<Record, Error> {
    let new_record = new_record.validate()?;
    let now = OffsetDateTime::now_utc();

    let record = connection
        .prepare(&format!(
            "INSERT INTO financial_record \
                (owner_id, occurred_on, description, amount, category, payment_method, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            params![
                owner_id,
                new_record.occurred_on,
                new_record.description,
                new_record.amount,
                new_record.category,
                new_record.payment_method,
                now,
            ],
            map_record_row,
        )?;

    Ok(record)
}

/// Retrieve the record `id` belonging to `owner_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the owner's records,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_record(
    id: RecordId,
    owner_id: &OwnerId,
    connection: &Connection,
) -> Result<Record, Error> {
    let record = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM financial_record WHERE id = ?1 AND owner_id = ?2"
        ))?
        .query_row(params![id, owner_id], map_record_row)?;

    Ok(record)
}

/// List the records matching `query`, most recent first.
///
/// Records with the same date are ordered by ID, newest first. Records whose
/// date cannot be read come last. An owner with no records gets an empty list.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn find_records(query: &RecordQuery, connection: &Connection) -> Result<Vec<Record>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM financial_record \
             WHERE owner_id = ?1 \
                AND (?2 IS NULL OR category = ?2) \
                AND (?3 IS NULL OR payment_method = ?3) \
             ORDER BY date(substr(occurred_on, 1, 10)) IS NULL, occurred_on DESC, id DESC"
        ))?
        .query_map(
            params![query.owner_id, query.category, query.payment_method],
            map_record_row,
        )?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

/// List all of `owner_id`'s records, most recent first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_records_by_owner(
    owner_id: &OwnerId,
    connection: &Connection,
) -> Result<Vec<Record>, Error> {
    find_records(&RecordQuery::owner(owner_id.clone()), connection)
}

/// Apply `patch` to the record `id` belonging to `owner_id`.
///
/// # Errors
/// This function will return a:
/// - validation error as described in [RecordPatch::validate],
/// - [Error::UpdateMissingRecord] if `id` does not refer to one of the owner's records,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_record(
    id: RecordId,
    owner_id: &OwnerId,
    patch: RecordPatch,
    connection: &Connection,
) -> Result<Record, Error> {
    patch.validate()?;

    let mut record = get_record(id, owner_id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingRecord(id),
        error => error,
    })?;
    record.apply(patch);

    let record = connection
        .prepare(&format!(
            "UPDATE financial_record \
             SET occurred_on = ?1, description = ?2, amount = ?3, category = ?4, \
                payment_method = ?5, updated_at = ?6 \
             WHERE id = ?7 AND owner_id = ?8 \
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            params![
                record.occurred_on,
                record.description,
                record.amount,
                record.category,
                record.payment_method,
                OffsetDateTime::now_utc(),
                id,
                owner_id,
            ],
            map_record_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingRecord(id),
            error => error.into(),
        })?;

    Ok(record)
}

/// Delete the record `id` belonging to `owner_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingRecord] if `id` does not refer to one of the owner's records,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_record(
    id: RecordId,
    owner_id: &OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM financial_record WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRecord(id));
    }

    Ok(())
}

/// Create the record table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_record (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id TEXT NOT NULL,
                occurred_on TEXT NOT NULL,
                description TEXT NOT NULL,
                amount TEXT,
                category TEXT,
                payment_method TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    // Listing is always per owner, newest first.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_financial_record_owner_date \
         ON financial_record(owner_id, occurred_on);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Record.
pub fn map_record_row(row: &Row) -> Result<Record, rusqlite::Error> {
    Ok(Record {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        occurred_on: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        category: row.get(5)?,
        payment_method: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::OffsetDateTime;

    use crate::{
        Error,
        db::initialize,
        record::{
            Amount, NewRecord, OccurredOn, OwnerId, RecordPatch, RecordQuery, create_record,
            delete_record, find_records, get_record, get_records_by_owner, update_record,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn alice() -> OwnerId {
        OwnerId::new("alice")
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let record = create_record(
            &alice(),
            NewRecord::new("2024-03-01", "Groceries", dec!(100.50)).category("Food"),
            &conn,
        )
        .expect("could not create record");

        assert!(record.id > 0);
        assert_eq!(record.owner_id, alice());
        assert_eq!(record.amount, Amount::Value(dec!(100.50)));
        assert_eq!(record.category.as_deref(), Some("Food"));
        assert_eq!(record.payment_method, None);
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(get_record(record.id, &alice(), &conn), Ok(record));
    }

    #[test]
    fn create_rejects_invalid_record() {
        let conn = get_test_connection();

        let result = create_record(&alice(), NewRecord::new("2024-03-01", "", dec!(1)), &conn);

        assert_eq!(result, Err(Error::EmptyDescription));
        assert_eq!(get_records_by_owner(&alice(), &conn), Ok(vec![]));
    }

    #[test]
    fn lists_most_recent_first() {
        let conn = get_test_connection();
        let first = create_record(&alice(), NewRecord::new("2024-03-01", "a", dec!(1)), &conn)
            .unwrap();
        let second = create_record(&alice(), NewRecord::new("2024-03-02", "b", dec!(2)), &conn)
            .unwrap();
        let third = create_record(&alice(), NewRecord::new("2024-03-01", "c", dec!(3)), &conn)
            .unwrap();

        let records = get_records_by_owner(&alice(), &conn).unwrap();

        let ids: Vec<_> = records.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![second.id, third.id, first.id]);
    }

    #[test]
    fn lists_only_the_owners_records() {
        let conn = get_test_connection();
        create_record(&alice(), NewRecord::new("2024-03-01", "a", dec!(1)), &conn).unwrap();
        create_record(&OwnerId::new("bob"), NewRecord::new("2024-03-01", "b", dec!(2)), &conn)
            .unwrap();

        let records = get_records_by_owner(&alice(), &conn).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "a");
    }

    #[test]
    fn empty_listing_is_not_an_error() {
        let conn = get_test_connection();

        assert_eq!(get_records_by_owner(&alice(), &conn), Ok(vec![]));
    }

    #[test]
    fn find_filters_by_exact_field_values() {
        let conn = get_test_connection();
        create_record(
            &alice(),
            NewRecord::new("2024-03-01", "a", dec!(1))
                .category("Food")
                .payment_method("Cash"),
            &conn,
        )
        .unwrap();
        create_record(
            &alice(),
            NewRecord::new("2024-03-02", "b", dec!(2))
                .category("Food")
                .payment_method("UPI"),
            &conn,
        )
        .unwrap();
        create_record(
            &alice(),
            NewRecord::new("2024-03-03", "c", dec!(3)).category("food"),
            &conn,
        )
        .unwrap();

        let query = RecordQuery {
            owner_id: alice(),
            category: Some("Food".to_owned()),
            payment_method: None,
        };
        let descriptions: Vec<_> = find_records(&query, &conn)
            .unwrap()
            .into_iter()
            .map(|record| record.description)
            .collect();
        assert_eq!(descriptions, vec!["b", "a"]);

        let query = RecordQuery {
            payment_method: Some("Cash".to_owned()),
            ..query
        };
        let descriptions: Vec<_> = find_records(&query, &conn)
            .unwrap()
            .into_iter()
            .map(|record| record.description)
            .collect();
        assert_eq!(descriptions, vec!["a"]);
    }

    #[test]
    fn dirty_rows_are_still_listed() {
        let conn = get_test_connection();
        let now = OffsetDateTime::now_utc();
        conn.execute(
            "INSERT INTO financial_record \
                (owner_id, occurred_on, description, amount, created_at, updated_at) \
             VALUES ('alice', 'not-a-date', 'legacy', 'abc', ?1, ?1)",
            (now,),
        )
        .unwrap();

        let records = get_records_by_owner(&alice(), &conn).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].occurred_on, OccurredOn::new("not-a-date"));
        assert_eq!(records[0].amount, Amount::Malformed("abc".to_owned()));
    }

    #[test]
    fn undated_rows_are_listed_last() {
        let conn = get_test_connection();
        let now = OffsetDateTime::now_utc();
        conn.execute(
            "INSERT INTO financial_record \
                (owner_id, occurred_on, description, amount, created_at, updated_at) \
             VALUES ('alice', 'not-a-date', 'legacy', '5', ?1, ?1)",
            (now,),
        )
        .unwrap();
        create_record(&alice(), NewRecord::new("2024-03-01", "a", dec!(1)), &conn).unwrap();
        create_record(
            &alice(),
            NewRecord::new("2024-03-02T08:00:00Z", "b", dec!(2)),
            &conn,
        )
        .unwrap();

        let descriptions: Vec<_> = get_records_by_owner(&alice(), &conn)
            .unwrap()
            .into_iter()
            .map(|record| record.description)
            .collect();

        assert_eq!(descriptions, vec!["b", "a", "legacy"]);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let conn = get_test_connection();
        let record = create_record(
            &alice(),
            NewRecord::new("2024-03-01", "Lunch", dec!(120))
                .category("Food")
                .payment_method("Cash"),
            &conn,
        )
        .unwrap();

        let updated = update_record(
            record.id,
            &alice(),
            RecordPatch {
                amount: Some(Amount::Value(dec!(150))),
                category: Some(String::new()),
                ..Default::default()
            },
            &conn,
        )
        .expect("could not update record");

        assert_eq!(updated.id, record.id);
        assert_eq!(updated.description, "Lunch");
        assert_eq!(updated.amount, Amount::Value(dec!(150)));
        assert_eq!(updated.category, None);
        assert_eq!(updated.payment_method.as_deref(), Some("Cash"));
        assert!(updated.updated_at >= record.updated_at);
        assert_eq!(get_record(record.id, &alice(), &conn), Ok(updated));
    }

    #[test]
    fn update_is_scoped_to_owner() {
        let conn = get_test_connection();
        let record =
            create_record(&alice(), NewRecord::new("2024-03-01", "a", dec!(1)), &conn).unwrap();

        let result = update_record(
            record.id,
            &OwnerId::new("mallory"),
            RecordPatch {
                description: Some("pwned".to_owned()),
                ..Default::default()
            },
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingRecord(record.id)));
        assert_eq!(get_record(record.id, &alice(), &conn).unwrap().description, "a");
    }

    #[test]
    fn delete_succeeds() {
        let conn = get_test_connection();
        let record =
            create_record(&alice(), NewRecord::new("2024-03-01", "a", dec!(1)), &conn).unwrap();

        delete_record(record.id, &alice(), &conn).expect("could not delete record");

        assert_eq!(get_record(record.id, &alice(), &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_record_fails() {
        let conn = get_test_connection();
        let record =
            create_record(&alice(), NewRecord::new("2024-03-01", "a", dec!(1)), &conn).unwrap();

        assert_eq!(
            delete_record(record.id, &OwnerId::new("bob"), &conn),
            Err(Error::DeleteMissingRecord(record.id))
        );
        assert_eq!(
            delete_record(999, &alice(), &conn),
            Err(Error::DeleteMissingRecord(999))
        );
    }
}
