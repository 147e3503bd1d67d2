//! Sets up the application's SQLite database.

use rusqlite::Connection;

use crate::{Error, record::create_record_table};

/// Create the tables for the app's models.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_record_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
