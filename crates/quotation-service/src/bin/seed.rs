//! # Seed Data Generator
//!
//! Populates a development database with reference data and sample orders.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by QUOTATION_DB_PATH (default ./quotation.db)
//! cargo run -p quotation-service --bin seed
//!
//! # Create more sample orders
//! cargo run -p quotation-service --bin seed -- --orders 25
//!
//! # Specify database path
//! cargo run -p quotation-service --bin seed -- --db ./data/quotation.db
//! ```
//!
//! ## Generated Data
//! - Categories with a handful of building-material items each
//! - Customers and salespeople
//! - Orders created through `OrderService`, so they get real order
//!   numbers, line snapshots and totals

use std::env;
use std::path::PathBuf;

use quotation_core::{
    ActorRef, Money, NewCategory, NewCustomer, NewEmployee, NewItem, OrderLineRequest,
    OrderRequest,
};
use quotation_db::Database;
use quotation_service::{init_tracing, OrderService, ServiceConfig};
use tracing::{info, warn};

/// Categories and their items: (name, unit, price in paise)
const CATALOG: &[(&str, &[(&str, &str, i64)])] = &[
    (
        "Cement",
        &[
            ("OPC 53 Grade 50kg", "bag", 42_000),
            ("PPC 50kg", "bag", 38_500),
            ("White Cement 5kg", "bag", 9_500),
        ],
    ),
    (
        "Aggregates",
        &[
            ("River Sand", "ton", 180_000),
            ("M-Sand", "ton", 120_000),
            ("20mm Crushed Stone", "ton", 95_000),
        ],
    ),
    (
        "Masonry",
        &[
            ("Red Clay Brick", "pcs", 900),
            ("Fly Ash Brick", "pcs", 650),
            ("AAC Block 600x200x150", "pcs", 5_800),
        ],
    ),
    (
        "Steel",
        &[
            ("TMT Bar 8mm", "kg", 6_800),
            ("TMT Bar 12mm", "kg", 6_500),
            ("Binding Wire", "kg", 8_200),
        ],
    ),
];

/// (name, phone, GST number)
const CUSTOMERS: &[(&str, &str, Option<&str>)] = &[
    ("Sharma Constructions", "98200 11111", Some("27AAACS1234A1Z5")),
    ("Patel & Sons Builders", "98250 22222", Some("24AAFPP5678B1Z2")),
    ("Green Acres Housing", "98450 33333", None),
    ("R. K. Interiors", "98860 44444", None),
];

/// (name, position)
const EMPLOYEES: &[(&str, &str)] = &[("Ravi Kumar", "Sales"), ("Anita Desai", "Sales Manager")];

const SEED_ACTOR: &str = "seed@quotation.local";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = ServiceConfig::load()?;
    let mut order_count: usize = 10;

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if let Some(value) = args.get(i + 1) {
                    order_count = value.parse()?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    config.database_path = PathBuf::from(value);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Quotation Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of sample orders to create (default: 10)");
                println!("  -d, --db <PATH>    Database file path (default: $QUOTATION_DB_PATH or ./quotation.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), orders = order_count, "Seeding database");

    let db = Database::new(config.db_config()).await?;
    let service = OrderService::new(db.clone(), config.order_settings());

    let existing = service.count_orders().await?;
    if existing > 0 {
        warn!(existing, "Database already has orders; delete the file to regenerate");
        return Ok(());
    }

    // Reference data
    let mut item_ids = Vec::new();
    for &(category_name, items) in CATALOG {
        let category = db
            .catalog()
            .insert_category(&NewCategory {
                name: category_name.to_string(),
                description: None,
            })
            .await?;

        for &(name, unit, paise) in items {
            let item = db
                .catalog()
                .insert_item(&NewItem {
                    name: name.to_string(),
                    unit: Some(unit.to_string()),
                    price: Money::from_cents(paise),
                    category_id: Some(category.id),
                    description: None,
                })
                .await?;
            item_ids.push((item.id, item.current_price));
        }
    }

    let mut customer_ids = Vec::new();
    for &(name, phone, gst) in CUSTOMERS {
        let customer = db
            .customers()
            .insert(&NewCustomer {
                name: name.to_string(),
                phone: Some(phone.to_string()),
                gst: gst.map(str::to_string),
                address: None,
            })
            .await?;
        customer_ids.push(customer.id);
    }

    let mut employee_ids = Vec::new();
    for &(name, position) in EMPLOYEES {
        let employee = db
            .employees()
            .insert(&NewEmployee {
                name: name.to_string(),
                position: Some(position.to_string()),
                ..Default::default()
            })
            .await?;
        employee_ids.push(employee.id);
    }

    info!(
        items = item_ids.len(),
        customers = customer_ids.len(),
        employees = employee_ids.len(),
        "Reference data inserted"
    );

    // Sample orders
    let actor = ActorRef::new(SEED_ACTOR);
    for n in 0..order_count {
        let line_count = 1 + n % 4;
        let items = (0..line_count)
            .map(|k| {
                let (item_id, catalog_price) = item_ids[(n * 5 + k * 3) % item_ids.len()];
                OrderLineRequest::new(item_id, 1 + ((n + k) % 10) as i64, catalog_price)
            })
            .collect();

        let request = OrderRequest {
            customer_id: customer_ids[n % customer_ids.len()],
            employee_id: (n % 3 != 0).then(|| employee_ids[n % employee_ids.len()]),
            items,
            tax_enabled: n % 2 == 0,
            notes: None,
        };

        let order = service.create_order(&request, &actor).await?;
        info!(
            order_number = %order.order_number,
            customer = %order.customer_name,
            lines = order.line_count(),
            subtotal = %order.subtotal,
            tax = %order.tax_amount,
            total = %order.total,
            "Created order"
        );
    }

    info!(orders = service.count_orders().await?, "Seed complete");
    db.close().await;

    Ok(())
}
