use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use expense_tracker::{
    initialize_db,
    record::{NewRecord, OwnerId, create_record},
};

/// A utility for creating a test database for the expense tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The owner to create the demo records for.
    #[arg(long, default_value = "anonymous")]
    owner_id: String,
}

/// Description, whole rupees, category, payment method and how many days ago.
const DEMO_RECORDS: [(&str, i64, &str, &str, i64); 12] = [
    ("Morning chai", 20, "Food", "Cash", 0),
    ("Metro card top up", 500, "Transport", "UPI", 0),
    ("Vegetables", 340, "Food", "UPI", 1),
    ("Electricity bill", 1850, "Utilities", "Net Banking", 2),
    ("Lunch with team", 760, "Food", "Card", 4),
    ("Auto rickshaw", 120, "Transport", "Cash", 6),
    ("Rent", 18000, "Housing", "Net Banking", 9),
    ("Movie tickets", 600, "Entertainment", "Card", 12),
    ("Pharmacy", 415, "Health", "UPI", 17),
    ("Groceries", 2230, "Food", "Card", 24),
    ("Mobile recharge", 299, "Utilities", "UPI", 33),
    ("Books", 950, "Education", "Card", 45),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let owner_id = OwnerId::new(args.owner_id.trim());
    println!("Creating demo records for {owner_id}...");

    let today = OffsetDateTime::now_utc().date();

    for (description, amount, category, payment_method, days_ago) in DEMO_RECORDS {
        let new_record = NewRecord::new(
            today - Duration::days(days_ago),
            description,
            Decimal::from(amount),
        )
        .category(category)
        .payment_method(payment_method);

        create_record(&owner_id, new_record, &conn)?;
    }

    println!("Success!");

    Ok(())
}
