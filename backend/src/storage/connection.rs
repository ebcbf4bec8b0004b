use anyhow::{Context, Result};
use log::info;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::sync::Arc;

/// File name of the database inside the data directory
pub const DATABASE_FILE: &str = "property-manager.db";

/// Owned query parameter, bound positionally to `?` placeholders
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Integer(i64),
    Real(f64),
    Null,
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<&String> for SqlParam {
    fn from(value: &String) -> Self {
        SqlParam::Text(value.clone())
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Integer(value)
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        SqlParam::Real(value)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlParam::Null)
    }
}

/// Bind every parameter of `params` onto `query` in order
pub fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[SqlParam],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Text(value) => query.bind(value.clone()),
            SqlParam::Integer(value) => query.bind(*value),
            SqlParam::Real(value) => query.bind(*value),
            SqlParam::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if missing) the database file at `path`
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create data directory {:?}", parent))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        Self::setup_schema(&pool).await?;
        info!("Database ready at {:?}", path);

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Open a private in-memory database
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // A single long-lived connection, otherwise every connection gets its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;
        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a parameterized read and return every row
    pub async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<SqliteRow>> {
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(self.pool())
            .await
            .with_context(|| format!("Query failed: {}", sql.trim()))?;
        Ok(rows)
    }

    /// Run a parameterized read that matches at most one row
    pub async fn query_optional(&self, sql: &str, params: &[SqlParam]) -> Result<Option<SqliteRow>> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_optional(self.pool())
            .await
            .with_context(|| format!("Query failed: {}", sql.trim()))?;
        Ok(row)
    }

    /// Run an aggregate returning a single REAL in its first column
    pub async fn query_scalar_f64(&self, sql: &str, params: &[SqlParam]) -> Result<f64> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_one(self.pool())
            .await
            .with_context(|| format!("Query failed: {}", sql.trim()))?;
        Ok(row.try_get::<f64, _>(0)?)
    }

    /// Run an aggregate returning a single INTEGER in its first column
    pub async fn query_scalar_i64(&self, sql: &str, params: &[SqlParam]) -> Result<i64> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_one(self.pool())
            .await
            .with_context(|| format!("Query failed: {}", sql.trim()))?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    /// Run a parameterized write and return the number of affected rows
    pub async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        let result = bind_params(sqlx::query(sql), params)
            .execute(self.pool())
            .await
            .with_context(|| format!("Statement failed: {}", sql.trim()))?;
        Ok(result.rows_affected())
    }

    /// Run a parameterized INSERT and return the new row id
    pub async fn insert(&self, sql: &str, params: &[SqlParam]) -> Result<i64> {
        let result = bind_params(sqlx::query(sql), params)
            .execute(self.pool())
            .await
            .with_context(|| format!("Insert failed: {}", sql.trim()))?;
        Ok(result.last_insert_rowid())
    }

    /// Start a database transaction for multi-statement writes
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Drain and close the pool; later queries fail
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to apply schema statement: {}", statement.trim()))?;
        }
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS managers (
        manager_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT,
        phone TEXT NOT NULL,
        hire_date TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS properties (
        property_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        address TEXT NOT NULL,
        total_units INTEGER NOT NULL DEFAULT 0,
        property_type TEXT NOT NULL,
        status TEXT NOT NULL,
        last_inspection TEXT,
        manager_id INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY (manager_id) REFERENCES managers (manager_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blocks (
        block_id INTEGER PRIMARY KEY AUTOINCREMENT,
        block_name TEXT NOT NULL,
        property_id INTEGER NOT NULL,
        floor_count INTEGER,
        notes TEXT,
        FOREIGN KEY (property_id) REFERENCES properties (property_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS units (
        unit_id INTEGER PRIMARY KEY AUTOINCREMENT,
        unit_number TEXT NOT NULL,
        property_id INTEGER NOT NULL,
        block_id INTEGER,
        floor_number INTEGER,
        unit_status TEXT NOT NULL,
        unit_type TEXT NOT NULL,
        bedroom_count INTEGER NOT NULL DEFAULT 0,
        bathroom_count INTEGER NOT NULL DEFAULT 0,
        monthly_rent REAL NOT NULL DEFAULT 0,
        security_deposit REAL NOT NULL DEFAULT 0,
        tenant_id INTEGER,
        notes TEXT,
        FOREIGN KEY (property_id) REFERENCES properties (property_id),
        FOREIGN KEY (block_id) REFERENCES blocks (block_id),
        FOREIGN KEY (tenant_id) REFERENCES tenants (tenant_id) ON DELETE SET NULL
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_units_property_id
    ON units(property_id);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tenants (
        tenant_id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        phone_number TEXT,
        email TEXT,
        id_number TEXT,
        lease_start_date TEXT NOT NULL,
        lease_end_date TEXT,
        rent_amount REAL NOT NULL DEFAULT 0,
        deposit_amount REAL NOT NULL DEFAULT 0,
        unit_id INTEGER,
        status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'moving-out', 'inactive')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY (unit_id) REFERENCES units (unit_id)
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_tenants_unit_id
    ON tenants(unit_id);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        payment_id TEXT PRIMARY KEY,
        tenant_id INTEGER NOT NULL,
        unit_id INTEGER NOT NULL,
        property_id INTEGER NOT NULL,
        amount_paid REAL NOT NULL,
        payment_date TEXT NOT NULL,
        due_date TEXT NOT NULL,
        payment_month TEXT NOT NULL,
        payment_status TEXT NOT NULL CHECK (payment_status IN ('Paid', 'Pending', 'Overdue')),
        payment_method TEXT NOT NULL CHECK (payment_method IN ('Cash', 'Bank Transfer', 'Credit Card', 'Mobile Money', 'Check', 'Other')),
        payment_category TEXT NOT NULL CHECK (payment_category IN ('Rent', 'Utilities', 'Deposit', 'Other')),
        receipt_number TEXT UNIQUE,
        transaction_reference TEXT,
        remarks TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY (tenant_id) REFERENCES tenants (tenant_id),
        FOREIGN KEY (unit_id) REFERENCES units (unit_id),
        FOREIGN KEY (property_id) REFERENCES properties (property_id)
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_payments_tenant_id
    ON payments(tenant_id);
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_payments_property_month
    ON payments(property_id, payment_month);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS complaints (
        complaint_id INTEGER PRIMARY KEY AUTOINCREMENT,
        unit_id INTEGER NOT NULL,
        tenant_id INTEGER,
        description TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Open' CHECK (status IN ('Open', 'In Progress', 'Resolved')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY (unit_id) REFERENCES units (unit_id),
        FOREIGN KEY (tenant_id) REFERENCES tenants (tenant_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS expenses (
        expense_id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount REAL NOT NULL,
        category TEXT NOT NULL,
        description TEXT,
        expense_date TEXT NOT NULL,
        unit_id INTEGER,
        block_id INTEGER,
        property_id INTEGER,
        payment_method TEXT NOT NULL,
        vendor TEXT NOT NULL,
        invoice_number TEXT,
        paid_by TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY (unit_id) REFERENCES units (unit_id),
        FOREIGN KEY (block_id) REFERENCES blocks (block_id),
        FOREIGN KEY (property_id) REFERENCES properties (property_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recent_activities (
        recent_activity_id INTEGER PRIMARY KEY AUTOINCREMENT,
        activity_type TEXT NOT NULL,
        message TEXT NOT NULL,
        time TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        task_id INTEGER PRIMARY KEY AUTOINCREMENT,
        task_name TEXT NOT NULL UNIQUE,
        due_date TEXT NOT NULL,
        priority TEXT NOT NULL
    );
    "#,
];
