#![allow(missing_docs)]

mod http;

use rusqlite::Connection;

use crate::{AppState, aggregation::CurrencyFormat, db::initialize};

pub(crate) use http::{assert_error_message, get_test_server, sign_in};

/// An in-memory database with the record table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

/// App state backed by an in-memory database, using UTC and the default currency format.
pub(crate) fn get_test_app_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(connection, "42", "Etc/UTC", CurrencyFormat::default())
        .expect("Could not create app state.")
}
