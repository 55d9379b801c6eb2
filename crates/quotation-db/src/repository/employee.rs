//! # Employee Repository
//!
//! Insert and lookup for salespeople attached to orders.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use super::{format_timestamp, now, parse_timestamp};
use crate::error::DbResult;
use quotation_core::{EntityId, Employee, NewEmployee};

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRecord {
    id: i64,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    position: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl EmployeeRecord {
    fn into_employee(self) -> DbResult<Employee> {
        Ok(Employee {
            id: self.id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            position: self.position,
            is_active: self.is_active,
            created_at: parse_timestamp("employees", &self.created_at)?,
            updated_at: parse_timestamp("employees", &self.updated_at)?,
        })
    }
}

const EMPLOYEE_COLUMNS: &str =
    "id, name, phone, email, position, is_active, created_at, updated_at";

/// Inserts an active employee and returns the stored row.
pub async fn insert_employee<'e, E>(executor: E, employee: &NewEmployee) -> DbResult<Employee>
where
    E: SqliteExecutor<'e>,
{
    let stamp = format_timestamp(now());
    debug!(name = %employee.name, "Inserting employee");

    let record: EmployeeRecord = sqlx::query_as(&format!(
        "INSERT INTO employees (name, phone, email, position, is_active, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5) RETURNING {EMPLOYEE_COLUMNS}"
    ))
    .bind(&employee.name)
    .bind(&employee.phone)
    .bind(&employee.email)
    .bind(&employee.position)
    .bind(&stamp)
    .fetch_one(executor)
    .await?;

    record.into_employee()
}

/// Looks an employee up by id, active or not.
pub async fn fetch_employee<'e, E>(executor: E, id: EntityId) -> DbResult<Option<Employee>>
where
    E: SqliteExecutor<'e>,
{
    let record: Option<EmployeeRecord> =
        sqlx::query_as(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

    record.map(EmployeeRecord::into_employee).transpose()
}

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    pub async fn insert(&self, employee: &NewEmployee) -> DbResult<Employee> {
        insert_employee(&self.pool, employee).await
    }

    pub async fn get_by_id(&self, id: EntityId) -> DbResult<Option<Employee>> {
        fetch_employee(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use quotation_core::NewEmployee;

    #[tokio::test]
    async fn test_new_employee_is_active() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let created = db
            .employees()
            .insert(&NewEmployee {
                name: "Ravi".into(),
                position: Some("Sales".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(created.is_active);
        let found = db.employees().get_by_id(created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }
}
