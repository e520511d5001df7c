//! # Seed Data Generator
//!
//! Populates the database with a catalog and, optionally, some sales for
//! development.
//!
//! ## Usage
//! ```bash
//! # Catalog only
//! cargo run -p kasir-db --bin seed
//!
//! # Catalog plus 50 random checkouts
//! cargo run -p kasir-db --bin seed -- --sales 50
//!
//! # Specify database path
//! cargo run -p kasir-db --bin seed -- --db ./data/kasir.db
//! ```
//!
//! ## Generated Data
//! Every category gets its products in each pack size. Prices and stock
//! are derived from the product index, so reruns on a fresh database are
//! reproducible.

use std::env;

use kasir_core::{CartLineItem, NewCategory, NewProduct, StockPolicy};
use kasir_db::{Database, DbConfig};

/// Categories with their products and base price.
const CATALOG: &[(&str, &str, &[(&str, i64)])] = &[
    (
        "Makanan",
        "Mi instan, beras, dan bahan pokok",
        &[
            ("Indomie Goreng", 3_500),
            ("Indomie Soto", 3_500),
            ("Beras Pandan Wangi", 14_000),
            ("Gula Pasir", 15_000),
            ("Tepung Terigu", 12_000),
            ("Telur Ayam", 2_500),
        ],
    ),
    (
        "Minuman",
        "Air mineral, teh, dan kopi",
        &[
            ("Aqua", 4_000),
            ("Teh Botol Sosro", 5_000),
            ("Kopi Kapal Api", 2_500),
            ("Susu Ultra", 7_000),
            ("Pocari Sweat", 8_000),
        ],
    ),
    (
        "Kebutuhan Rumah",
        "Sabun, deterjen, dan perlengkapan",
        &[
            ("Sabun Lifebuoy", 4_500),
            ("Rinso Deterjen", 18_000),
            ("Sunlight", 12_500),
            ("Pepsodent", 9_000),
        ],
    ),
];

/// Pack sizes with their price multiplier.
const SIZES: &[(&str, i64)] = &[("Satuan", 1), ("Isi 5", 5), ("Isi 10", 9)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut sales: usize = 0;
    let mut db_path = String::from("./kasir_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasir POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Number of checkouts to simulate (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: ./kasir_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kasir POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating catalog...");

    let mut product_ids = Vec::new();
    for (category_name, description, products) in CATALOG {
        let category = db
            .categories()
            .insert(&NewCategory {
                name: category_name.to_string(),
                description: description.to_string(),
            })
            .await?;

        for (base_name, base_price) in products.iter() {
            for (size, multiplier) in SIZES {
                let seed = product_ids.len();
                let product = NewProduct {
                    name: format!("{} {}", base_name, size),
                    price: base_price * multiplier,
                    stock: 20 + (seed * 37 % 181) as i64,
                    category_id: Some(category.id),
                };

                match db.products().insert(&product).await {
                    Ok(created) => product_ids.push(created.id),
                    Err(e) => eprintln!("Failed to insert {}: {}", product.name, e),
                }
            }
        }

        println!("  {}: {} products", category_name, products.len() * SIZES.len());
    }

    println!("✓ Generated {} products", product_ids.len());

    if sales > 0 && !product_ids.is_empty() {
        println!();
        println!("Simulating {} checkouts...", sales);

        let checkout = db.checkout(StockPolicy::Enforce);
        let start = std::time::Instant::now();
        let mut committed = 0;

        for n in 0..sales {
            let lines = 1 + n % 4;
            let items: Vec<CartLineItem> = (0..lines)
                .map(|k| {
                    let id = product_ids[(n * 7 + k * 13) % product_ids.len()];
                    CartLineItem::new(id, 1 + ((n + k) % 3) as i64)
                })
                .collect();

            match checkout.checkout(&items).await {
                Ok(_) => committed += 1,
                Err(e) => eprintln!("  Checkout {} rejected: {}", n + 1, e),
            }
        }

        println!(
            "✓ Committed {} of {} checkouts in {:?}",
            committed,
            sales,
            start.elapsed()
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
