//! Filters, escaping and HTML cleaning example
//!
//! Builds WHERE clauses from user-supplied values, escapes them with the
//! connection's rules and shows how cleaning and row hooks shape the output.
//!
//! Run with: cargo run --example filters_and_escaping

use rust_sql_wrapper::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
struct Search {
    name: String,
    city: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = ConnectionBuilder::new(Backend::Sqlite)
        .database(":memory:")
        .debug(true)
        .build()?;
    let db = SqlClient::connect(SqliteDriver::new(), config).await?;

    db.execute(
        "CREATE TABLE places (id INTEGER PRIMARY KEY, name TEXT, city TEXT, visits INTEGER);
         INSERT INTO places (name, city, visits) VALUES
            ('Café <Central>', 'Vienna', 12),
            ('Tom''s & Co', 'London', 3),
            ('Le Procope', 'Paris', NULL);",
    )
    .await?;

    println!("=== Escaping ===");
    let search = Search {
        name: "Tom's".to_string(),
        city: Some("London".to_string()),
    };
    let escaped = db.escape_record(&search)?;
    println!("record: {:?} -> {:?}", search, escaped);

    let mut values = BTreeMap::new();
    values.insert("a", "it's".to_string());
    values.insert("b", "plain".to_string());
    println!("map: {:?}", db.escape(values));

    println!("\n=== Filters ===");
    let mut filter = FilterSpec::new().operator(BoolOp::Or).enclose(true).lead(Lead::And);
    filter = filter.column("name", format!("LIKE '{}%'", escaped.name));
    if let Some(city) = &escaped.city {
        filter = filter.column("city", format!("= '{}'", city));
    }
    let sql = format!("SELECT name, city FROM places WHERE visits IS NOT NULL {}", filter);
    println!("{}", sql);
    for row in db.query(&sql).await? {
        println!("  {}", row.to_json());
    }

    let empty = FilterSpec::new();
    println!("empty filter renders as {:?}", empty.build());

    println!("\n=== Cleaning ===");
    for row in db.query("SELECT name FROM places ORDER BY id").await? {
        println!("  cleaned: {}", row.try_get("name")?);
    }
    for row in db
        .query_with("SELECT name FROM places ORDER BY id", FetchOptions::raw())
        .await?
    {
        println!("  raw:     {}", row.try_get("name")?);
    }

    println!("\n=== Row hook ===");
    let rows = db
        .each("SELECT name, visits FROM places ORDER BY id", |value, row, _clean| {
            if value.is_null() {
                return Some(DatabaseValue::from("never"));
            }
            let name = row.get("name")?.as_str()?;
            (value.as_i64().is_some() && name.starts_with("Caf"))
                .then(|| DatabaseValue::from(format!("{} (local favourite)", value)))
        })
        .await?;
    for row in rows {
        println!("  {}", row.to_json());
    }

    println!("\n=== Dates ===");
    println!("now:    {:?}", format_datetime(None, true));
    println!("parsed: {:?}", format_datetime(Some("03/15/2024"), false));

    println!("\n=== Errors ===");
    if let Err(err) = db.query("SELECT * FROM nowhere").await {
        println!("{}", err);
    }

    db.close().await
}
