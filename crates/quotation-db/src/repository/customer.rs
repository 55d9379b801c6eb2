//! # Customer Repository
//!
//! Insert and lookup for the customers an order is quoted for.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use super::{format_timestamp, now, parse_timestamp};
use crate::error::DbResult;
use quotation_core::{Customer, EntityId, NewCustomer};

#[derive(Debug, sqlx::FromRow)]
struct CustomerRecord {
    id: i64,
    name: String,
    phone: Option<String>,
    gst: Option<String>,
    address: Option<String>,
    created_at: String,
    updated_at: String,
}

impl CustomerRecord {
    fn into_customer(self) -> DbResult<Customer> {
        Ok(Customer {
            id: self.id,
            name: self.name,
            phone: self.phone,
            gst: self.gst,
            address: self.address,
            created_at: parse_timestamp("customers", &self.created_at)?,
            updated_at: parse_timestamp("customers", &self.updated_at)?,
        })
    }
}

const CUSTOMER_COLUMNS: &str = "id, name, phone, gst, address, created_at, updated_at";

/// Inserts a customer and returns the stored row.
pub async fn insert_customer<'e, E>(executor: E, customer: &NewCustomer) -> DbResult<Customer>
where
    E: SqliteExecutor<'e>,
{
    let stamp = format_timestamp(now());
    debug!(name = %customer.name, "Inserting customer");

    let record: CustomerRecord = sqlx::query_as(&format!(
        "INSERT INTO customers (name, phone, gst, address, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING {CUSTOMER_COLUMNS}"
    ))
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.gst)
    .bind(&customer.address)
    .bind(&stamp)
    .fetch_one(executor)
    .await?;

    record.into_customer()
}

/// Looks a customer up by id.
pub async fn fetch_customer<'e, E>(executor: E, id: EntityId) -> DbResult<Option<Customer>>
where
    E: SqliteExecutor<'e>,
{
    let record: Option<CustomerRecord> =
        sqlx::query_as(&format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

    record.map(CustomerRecord::into_customer).transpose()
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn insert(&self, customer: &NewCustomer) -> DbResult<Customer> {
        insert_customer(&self.pool, customer).await
    }

    pub async fn get_by_id(&self, id: EntityId) -> DbResult<Option<Customer>> {
        fetch_customer(&self.pool, id).await
    }
}
