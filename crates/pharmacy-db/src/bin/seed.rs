//! # Seed Data Generator
//!
//! Populates a database with demo stock for development.
//!
//! ## Usage
//! ```bash
//! # 3 batches per medicine (default)
//! cargo run -p pharmacy-db --bin seed
//!
//! # Custom batch count and database path
//! cargo run -p pharmacy-db --bin seed -- --batches 5 --db ./data/pharmacy.db
//!
//! # Also ring up a few sales so the profit report has rows
//! cargo run -p pharmacy-db --bin seed -- --with-sales
//! ```
//!
//! ## Generated Stock
//! Each medicine gets several batches whose expiries are spread from a
//! little in the past to about a year ahead, so every risk bucket
//! (expired, critical, warning, normal) shows up in the inventory view.
//! Quantities include a few low-stock batches.

use chrono::{Duration, Local};
use std::env;

use pharmacy_core::{Money, NewStock};
use pharmacy_db::{Database, DbConfig};

/// Demo medicines with (cost, sell) unit prices in whole đồng.
const MEDICINES: &[(&str, i64, i64)] = &[
    ("Paracetamol 500mg", 800, 1_500),
    ("Amoxicillin 250mg", 1_200, 2_500),
    ("Ibuprofen 400mg", 1_000, 2_000),
    ("Vitamin C 1000mg", 2_000, 3_500),
    ("Loratadine 10mg", 1_500, 3_000),
    ("Omeprazole 20mg", 2_500, 4_500),
    ("Oresol", 3_000, 5_000),
    ("Berberin", 500, 1_000),
    ("Salonpas", 12_000, 18_000),
    ("Efferalgan 500mg", 2_200, 3_800),
];

/// Expiry offsets in days from today, cycled per batch.
const EXPIRY_OFFSETS: &[i64] = &[-10, 2, 6, 45, 120, 365];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut batches_per_medicine: usize = 3;
    let mut db_path = String::from("./pharmacy_dev.db");
    let mut with_sales = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--batches" | "-b" => {
                if i + 1 < args.len() {
                    batches_per_medicine = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--with-sales" | "-s" => with_sales = true,
            "--help" | "-h" => {
                println!("Pharmacy Stock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -b, --batches <N>  Batches per medicine (default: 3)");
                println!("  -d, --db <PATH>    Database file path (default: ./pharmacy_dev.db)");
                println!("  -s, --with-sales   Record a few sales after stocking");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Pharmacy Stock Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!("Batches per medicine: {}", batches_per_medicine);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.batches().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} batches", existing);
        println!("  Skipping seed to avoid merging into real stock.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut pharmacy = db.load_state().await?;
    let now = Local::now().naive_local();
    let today = now.date();

    println!();
    println!("Generating batches...");

    let mut generated = 0;
    for (med_idx, (name, cost, sell)) in MEDICINES.iter().enumerate() {
        for batch_idx in 0..batches_per_medicine {
            let seed = med_idx * 7 + batch_idx * 3;
            let offset = EXPIRY_OFFSETS[seed % EXPIRY_OFFSETS.len()] + batch_idx as i64;

            // every fourth batch is low on stock
            let quantity = if seed % 4 == 0 {
                1 + (seed % 5) as i64
            } else {
                20 + ((seed * 13) % 180) as i64
            };

            let stock = NewStock {
                name: name.to_string(),
                expiry: today + Duration::days(offset),
                quantity,
                cost_price: Money::new(*cost),
                sell_price: Money::new(*sell),
            };

            match pharmacy.add_stock(stock, today) {
                Ok(upserted) => {
                    db.save_batch(&upserted.batch).await?;
                    generated += 1;
                }
                Err(e) => eprintln!("Failed to add {}: {}", name, e),
            }
        }
    }

    println!("✓ Generated {} batches", generated);

    if with_sales {
        println!();
        println!("Recording sales...");
        for (name, _, _) in MEDICINES.iter().step_by(2) {
            match pharmacy.sell(name, 7, now) {
                Ok(outcome) => {
                    db.commit_sale(&outcome, &pharmacy.touched_batches(&outcome))
                        .await?;
                    println!(
                        "  {}: sold {} across {} batch(es)",
                        name,
                        outcome.sold_total,
                        outcome.records.len()
                    );
                }
                Err(e) => eprintln!("  {}: {}", name, e),
            }
        }
    }

    let valuation = pharmacy.valuation();
    println!();
    println!("Stock on hand: {} units", valuation.units);
    println!("  Value at cost:  {}", valuation.cost_value);
    println!("  Value at price: {}", valuation.retail_value);

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
