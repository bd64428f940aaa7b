//! Basic wrapper usage example
//!
//! This example demonstrates:
//! - Connecting through the wrapper
//! - Inserting rows with insert_data
//! - Typed and record-shaped queries
//! - Update/delete outcomes and counts
//!
//! Run with: RUST_LOG=debug cargo run --example basic_usage

use rust_sql_wrapper::prelude::*;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    username: String,
    email: String,
    age: Option<i64>,
    balance: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Rust SQL Wrapper - Basic Usage Example ===\n");

    println!("1. Connecting to database...");
    let config = ConnectionBuilder::new(Backend::Sqlite)
        .database(":memory:")
        .build()?;
    let db = SqlClient::connect(SqliteDriver::new(), config).await?;
    println!("   ✓ Connected\n");

    println!("2. Creating table...");
    db.execute(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL,
            age INTEGER,
            balance REAL,
            created DATETIME,
            is_active INTEGER DEFAULT 1
        )",
    )
    .await?;
    println!("   ✓ Table created\n");

    println!("3. Inserting data...");
    let users = vec![
        ("alice", "alice@example.com", 30, 1500.50),
        ("bob", "bob@example.com", 25, 2300.75),
        ("o'brien", "obrien@example.com", 35, 980.25),
        ("diana", "diana@example.com", 28, 3200.00),
    ];

    for (username, email, age, balance) in users {
        let id = db
            .insert_data(
                "users",
                [
                    ("username", DatabaseValue::from(username)),
                    ("email", DatabaseValue::from(email)),
                    ("age", DatabaseValue::from(age)),
                    ("balance", DatabaseValue::from(balance)),
                    ("created", DatabaseValue::from("now()")),
                ],
            )
            .await?;
        println!("   ✓ Inserted {} as #{}", username, id.unwrap_or_default());
    }
    println!();

    println!("4. Querying all users...");
    let results = db.query("SELECT * FROM users ORDER BY id").await?;
    println!("   Found {} users:", db.num_rows());

    for row in &results {
        let id = row.try_get("id")?;
        let username = row.try_get("username")?;
        let balance = row.get("balance").and_then(DatabaseValue::as_f64).unwrap_or(0.0);
        println!("   - User #{}: {} - Balance: ${:.2}", id, username, balance);
    }
    println!();

    println!("5. Querying users with balance > $1000 as records...");
    let filter = FilterSpec::new().column("balance", "> 1000.0");
    let rich: Vec<User> = db
        .query_as(&format!("SELECT * FROM users {} ORDER BY balance DESC", filter))
        .await?;
    for user in &rich {
        println!(
            "   - #{} {} <{}> age {:?}: ${:.2}",
            user.id,
            user.username,
            user.email,
            user.age,
            user.balance.unwrap_or_default()
        );
    }
    println!();

    println!("6. Updating data...");
    db.update("UPDATE users SET balance = balance + 100.0 WHERE age < 30")
        .await?;
    println!("   ✓ Updated {} row(s)\n", db.affected_rows());

    println!("7. Deleting inactive users...");
    db.update("UPDATE users SET is_active = 0 WHERE balance < 1000.0")
        .await?;
    let deleted = db.delete("DELETE FROM users WHERE is_active = 0").await?;
    println!(
        "   ✓ Delete ran: {}, removed {} user(s)\n",
        deleted,
        db.affected_rows()
    );

    println!("8. Final user count...");
    let count = db
        .query_row("SELECT COUNT(*) AS count FROM users")
        .await?
        .and_then(|row| row.get("count").and_then(DatabaseValue::as_i64))
        .unwrap_or_default();
    println!("   Remaining users: {}\n", count);

    println!("9. Disconnecting...");
    db.close().await?;
    println!("   ✓ Disconnected");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
