//! # Seed Data Generator
//!
//! Populates the database with a sample sign-shop quote for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (./signshop_dev.db)
//! cargo run -p signshop-db --bin seed
//!
//! # Specify database path
//! cargo run -p signshop-db --bin seed -- --db ./data/signshop.db
//!
//! # Price by billable area instead of rescaling
//! SIGNSHOP_AREA_PRICING=per_billable_area cargo run -p signshop-db --bin seed
//! ```
//!
//! ## Generated Quote
//! One budget for "Corporación ABC" with two lines:
//!
//! | # | Line               | Size (cm) | Qty | Unit price | Discount |
//! |---|--------------------|-----------|-----|------------|----------|
//! | 1 | Cartel Corporativo | 200 × 300 | 1   | 5.000.000  | 0%       |
//! | 2 | Letras Corpóreas   | 50 × 400  | 10  | 800.000    | 5%       |
//!
//! With 10% IVA the total is ₲13.860.000.

use std::env;

use signshop_core::{BudgetEditor, Category, LineField, NewBudget, QuoteSettings, TextField};
use signshop_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Sample lines: (description, category tag, height, width, quantity, unit price, discount)
const SAMPLE_LINES: &[(&str, &str, &str, &str, &str, &str, &str)] = &[
    ("Cartel Corporativo", "cartel", "200", "300", "1", "5000000", "0"),
    ("Letras Corpóreas", "corporeo", "50", "400", "10", "800000", "0.05"),
];

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=signshop=trace` - Show trace for signshop crates only
/// - Default: INFO level, DEBUG for signshop crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,signshop=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("SIGNSHOP_DB_PATH").unwrap_or_else(|_| String::from("./signshop_dev.db"));

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Signshop Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./signshop_dev.db)");
                println!("  -h, --help         Show this help message");
                println!();
                println!("Environment:");
                println!("  SIGNSHOP_DB_PATH, SIGNSHOP_CURRENCY_CODE, SIGNSHOP_CURRENCY_SYMBOL,");
                println!("  SIGNSHOP_DEFAULT_IVA_BPS, SIGNSHOP_AREA_PRICING");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let settings = QuoteSettings::from_lookup(|key| env::var(key).ok())?;

    println!("🌱 Signshop Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Area pricing: {:?}", settings.area_pricing);
    println!();

    // Connect to database
    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing budgets
    let existing = db.budgets().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} budgets", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let project_id = Uuid::new_v4().to_string();
    let doc = db
        .budgets()
        .create(
            &NewBudget::new(&project_id, "Señalética sede central", "Corporación ABC"),
            &settings,
        )
        .await?;
    info!(budget_id = %doc.id, "Created sample budget");

    // Lines go through the editor, exactly like keystrokes from a form
    let mut editor = BudgetEditor::new(doc);
    for (description, category, height, width, qty, price, discount) in SAMPLE_LINES {
        editor.add_line()?;
        editor.set_text(TextField::Description, description)?;
        editor.set_category(Category::from_tag(category))?;
        editor.edit_field(LineField::HeightCm, height)?;
        editor.edit_field(LineField::WidthCm, width)?;
        editor.edit_field(LineField::Quantity, qty)?;
        editor.edit_field(LineField::UnitPrice, price)?;
        editor.edit_field(LineField::DiscountPct, discount)?;

        let record = editor.save()?;
        db.items().upsert(&record).await?;
        println!("  + {} ({} m² billable) = {}", record.description, record.area_m2_rounded, record.line_total);
    }

    let doc_id = editor.document().id.clone();
    let loaded = db.budgets().load_document(&doc_id).await?;

    println!();
    for group in loaded.grouped() {
        println!("{} ({} lines): {}", group.label(), group.items.len(), group.subtotal()?);
    }

    let summary = loaded.summary()?;
    println!();
    println!("Subtotal:  {}", summary.subtotal);
    println!("Discount:  {}", summary.discount);
    println!("IVA:       {}", summary.tax);
    println!("Total:     {}", summary.total);
    println!();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
