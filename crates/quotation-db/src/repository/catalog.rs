//! # Catalog Repository
//!
//! Categories and the items that can be quoted on an order.
//!
//! An item's `price_cents` is its current catalog price. Order lines carry
//! their own quoted price, so nothing here is read when pricing an order.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use super::{format_timestamp, now, parse_timestamp};
use crate::error::DbResult;
use quotation_core::{Category, EntityId, Item, Money, NewCategory, NewItem};

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRecord {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: String,
    updated_at: String,
}

impl CategoryRecord {
    fn into_category(self) -> DbResult<Category> {
        Ok(Category {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at: parse_timestamp("categories", &self.created_at)?,
            updated_at: parse_timestamp("categories", &self.updated_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRecord {
    id: i64,
    name: String,
    unit: Option<String>,
    price_cents: i64,
    category_id: Option<i64>,
    description: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl ItemRecord {
    fn into_item(self) -> DbResult<Item> {
        Ok(Item {
            id: self.id,
            name: self.name,
            unit: self.unit,
            current_price: Money::from_cents(self.price_cents),
            category_id: self.category_id,
            description: self.description,
            is_active: self.is_active,
            created_at: parse_timestamp("items", &self.created_at)?,
            updated_at: parse_timestamp("items", &self.updated_at)?,
        })
    }
}

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, name, unit, price_cents, category_id, description, is_active, created_at, updated_at";

// =============================================================================
// Categories
// =============================================================================

/// Inserts a category. Names are unique.
pub async fn insert_category<'e, E>(executor: E, category: &NewCategory) -> DbResult<Category>
where
    E: SqliteExecutor<'e>,
{
    let stamp = format_timestamp(now());
    debug!(name = %category.name, "Inserting category");

    let record: CategoryRecord = sqlx::query_as(&format!(
        "INSERT INTO categories (name, description, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?3) RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(&category.name)
    .bind(&category.description)
    .bind(&stamp)
    .fetch_one(executor)
    .await?;

    record.into_category()
}

pub async fn fetch_category<'e, E>(executor: E, id: EntityId) -> DbResult<Option<Category>>
where
    E: SqliteExecutor<'e>,
{
    let record: Option<CategoryRecord> =
        sqlx::query_as(&format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

    record.map(CategoryRecord::into_category).transpose()
}

// =============================================================================
// Items
// =============================================================================

/// Inserts an active item.
pub async fn insert_item<'e, E>(executor: E, item: &NewItem) -> DbResult<Item>
where
    E: SqliteExecutor<'e>,
{
    let stamp = format_timestamp(now());
    debug!(name = %item.name, price = %item.price, "Inserting item");

    let record: ItemRecord = sqlx::query_as(&format!(
        "INSERT INTO items (name, unit, price_cents, category_id, description, is_active, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6) RETURNING {ITEM_COLUMNS}"
    ))
    .bind(&item.name)
    .bind(&item.unit)
    .bind(item.price.cents())
    .bind(item.category_id)
    .bind(&item.description)
    .bind(&stamp)
    .fetch_one(executor)
    .await?;

    record.into_item()
}

/// Looks an item up by id, active or not.
pub async fn fetch_item<'e, E>(executor: E, id: EntityId) -> DbResult<Option<Item>>
where
    E: SqliteExecutor<'e>,
{
    let record: Option<ItemRecord> =
        sqlx::query_as(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

    record.map(ItemRecord::into_item).transpose()
}

/// Renames an item. Used to show that order lines keep their snapshot.
pub async fn rename_item<'e, E>(executor: E, id: EntityId, name: &str) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE items SET name = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(name)
        .bind(format_timestamp(now()))
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for category and item database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    pub async fn insert_category(&self, category: &NewCategory) -> DbResult<Category> {
        insert_category(&self.pool, category).await
    }

    pub async fn get_category(&self, id: EntityId) -> DbResult<Option<Category>> {
        fetch_category(&self.pool, id).await
    }

    pub async fn insert_item(&self, item: &NewItem) -> DbResult<Item> {
        insert_item(&self.pool, item).await
    }

    pub async fn get_item(&self, id: EntityId) -> DbResult<Option<Item>> {
        fetch_item(&self.pool, id).await
    }

    pub async fn rename_item(&self, id: EntityId, name: &str) -> DbResult<bool> {
        rename_item(&self.pool, id, name).await
    }
}
