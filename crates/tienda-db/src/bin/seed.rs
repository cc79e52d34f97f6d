//! # Seed Data Generator
//!
//! Populates the database with a demo bodega catalog for development.
//!
//! ## Usage
//! ```bash
//! # Generate 60 products (default)
//! cargo run -p tienda-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tienda-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p tienda-db --bin seed -- --db ./tienda.db
//! ```
//!
//! ## Generated Data
//! - Products across categories (abarrotes, bebidas, lácteos, limpieza, snacks)
//! - Prices S/ 0.50 - S/ 30.00, cost 60-85% of price
//! - Roughly one product in seven starts at or below its minimum stock,
//!   so the dashboard and the assistant have alerts to show
//! - A company profile with a demo RUC, if none exists

use chrono::Utc;
use std::env;
use tienda_core::{CompanyProfile, Money, ProductDraft};
use tienda_db::{Database, DbConfig};

/// Product categories for realistic demo data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Abarrotes",
        &[
            "Arroz Costeño",
            "Arroz Faraón",
            "Azúcar Rubia",
            "Aceite Primor",
            "Fideos Don Vittorio",
            "Atún Florida",
            "Lentejas",
            "Harina Blanca Flor",
        ],
    ),
    (
        "Bebidas",
        &[
            "Inca Kola",
            "Coca-Cola",
            "Agua San Luis",
            "Gaseosa Guaraná",
            "Chicha Morada Gloria",
            "Cerveza Pilsen",
        ],
    ),
    (
        "Lácteos",
        &[
            "Leche Gloria",
            "Yogurt Laive",
            "Mantequilla Laive",
            "Queso Fresco",
        ],
    ),
    (
        "Limpieza",
        &[
            "Detergente Bolívar",
            "Jabón Camay",
            "Lejía Clorox",
            "Papel Higiénico Elite",
        ],
    ),
    (
        "Snacks",
        &[
            "Galletas Soda Field",
            "Papas Lay's",
            "Chocolate Sublime",
            "Galletas Casino",
            "Cheese Tris",
        ],
    ),
];

/// Size variants with a price addon in céntimos
const SIZES: &[(&str, i64)] = &[
    ("chico", 0),
    ("mediano", 150),
    ("grande", 400),
    ("familiar", 900),
];

const DEMO_TAX_ID: &str = "20601234567";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./tienda.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
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
                println!("Tienda POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./tienda.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tienda POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.company().get().await?.is_none() {
        db.company()
            .upsert(&CompanyProfile {
                tax_id: DEMO_TAX_ID.to_string(),
                business_name: "Bodega Demo S.A.C.".to_string(),
                historical_tax_debt: Money::ZERO,
                updated_at: Utc::now(),
            })
            .await?;
        println!("✓ Company profile created (RUC {})", DEMO_TAX_ID);
    }

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (_category, products)) in CATEGORIES.iter().enumerate() {
        for (product_idx, product_name) in products.iter().enumerate() {
            for (size_idx, (size_name, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let draft = generate_product(
                    product_name,
                    size_name,
                    *price_addon,
                    category_idx * 100 + product_idx * 10 + size_idx,
                );

                if let Err(e) = db.products().insert(&draft, Utc::now()).await {
                    eprintln!("Failed to insert {}: {}", draft.name, e);
                    continue;
                }

                generated += 1;

                if generated % 20 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    println!();
    println!("Verifying catalog...");
    let matches = db.products().search_by_name("arroz", 10).await?;
    println!("  Search 'arroz': {} results", matches.len());
    let low = db.products().count_low_stock().await?;
    println!("  Low stock: {} products", low);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(name: &str, size: &str, price_addon: i64, seed: usize) -> ProductDraft {
    let seed = seed as i64;

    // Base S/ 0.50 - S/ 20.49, plus the size addon
    let price_cents = 50 + (seed * 37) % 2000 + price_addon;

    // Cost is 60-85% of price
    let cost_pct = 60 + seed % 26;
    let cost_cents = price_cents * cost_pct / 100;

    let min_stock = 3 + seed % 8;
    let current_stock = if seed % 7 == 0 {
        seed % (min_stock + 1)
    } else {
        min_stock + 5 + (seed * 13) % 80
    };

    ProductDraft {
        name: format!("{} {}", name, size),
        unit_cost: Money::from_cents(cost_cents),
        sale_price: Money::from_cents(price_cents),
        current_stock,
        min_stock,
    }
}
