use super::RecordBackend;
use crate::error::{ShelfError, ShelfResult};
use crate::schema::{ColumnKind, ID_COLUMN, TableSchema};
use async_trait::async_trait;
use shelf_types::{FieldValue, Record};
use sqlx::{Row, Sqlite};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// SQLite-backed collection, one table per resource.
///
/// Rows are addressed by the auto-increment `Id` column rather than by
/// position: deleting a row leaves a gap and never renumbers the others.
/// Listed records carry their `Id` field.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
    schema: TableSchema,
    insert_sql: String,
    select_sql: String,
}

impl SqliteBackend {
    /// Connect and create the table if it does not exist yet.
    pub async fn connect(
        database_url: &str,
        schema: TableSchema,
        max_connections: u32,
    ) -> ShelfResult<Self> {
        schema.validate()?;
        if !database_url.starts_with("sqlite:") {
            return Err(ShelfError::storage(
                "connect",
                format!("Unsupported database URL '{database_url}', expected sqlite:"),
            ));
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| ShelfError::storage("connect", format!("{database_url}: {e}")))?
            .create_if_missing(true);

        // Every connection to `:memory:` opens its own database, so in-memory
        // URLs are pinned to a single connection that is never recycled.
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| ShelfError::storage("connect", format!("{database_url}: {e}")))?;

        let backend = Self {
            insert_sql: schema.insert_sql(),
            select_sql: schema.select_sql(),
            pool,
            schema,
        };
        backend.create_all().await?;

        info!(table = %backend.schema.table, in_memory, "SQLite backend ready");
        Ok(backend)
    }

    async fn create_all(&self) -> ShelfResult<()> {
        sqlx::query::<Sqlite>(&self.schema.create_table_sql())
            .execute(&self.pool)
            .await
            .map_err(|e| ShelfError::storage("create_table", e.to_string()))?;
        Ok(())
    }

    fn record_from_row(&self, row: &SqliteRow) -> ShelfResult<Record> {
        let id: i64 = row.try_get(ID_COLUMN)?;
        let mut record = Record::new().with_field(ID_COLUMN, id);
        for column in &self.schema.columns {
            let value = match column.kind {
                ColumnKind::Integer => {
                    FieldValue::from(row.try_get::<Option<i64>, _>(column.name.as_str())?)
                }
                ColumnKind::Text => {
                    FieldValue::from(row.try_get::<Option<String>, _>(column.name.as_str())?)
                }
            };
            record.insert(column.name.clone(), value);
        }
        Ok(record)
    }

    async fn count(&self) -> ShelfResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", self.schema.table);
        let count: i64 = sqlx::query_scalar::<Sqlite, i64>(&sql).fetch_one(&self.pool).await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[async_trait]
impl RecordBackend for SqliteBackend {
    fn label(&self) -> &'static str {
        "sqlite"
    }

    async fn insert(&self, record: Record) -> ShelfResult<i64> {
        self.schema.check_record(&record)?;

        let mut query = sqlx::query::<Sqlite>(&self.insert_sql);
        for column in &self.schema.columns {
            query = match record.get(&column.name) {
                Some(FieldValue::Integer(i)) => query.bind(*i),
                // `check_record` rejects these for INTEGER columns.
                Some(FieldValue::Unsigned(u)) => query.bind(i64::try_from(*u).ok()),
                Some(FieldValue::String(s)) => query.bind(s.clone()),
                Some(FieldValue::Float(f)) => query.bind(*f),
                Some(FieldValue::Boolean(b)) => query.bind(*b),
                Some(FieldValue::Null) | None => query.bind(None::<String>),
            };
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| ShelfError::storage("insert", e.to_string()))?;
        let id = result.last_insert_rowid();
        debug!(table = %self.schema.table, id, "Inserted row");
        Ok(id)
    }

    async fn list(&self) -> ShelfResult<Vec<Record>> {
        let sql = format!("{} ORDER BY \"{ID_COLUMN}\"", self.select_sql);
        let rows = sqlx::query::<Sqlite>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ShelfError::storage("select_all", e.to_string()))?;
        rows.iter().map(|row| self.record_from_row(row)).collect()
    }

    async fn get(&self, address: i64) -> ShelfResult<Record> {
        let sql = format!("{} WHERE \"{ID_COLUMN}\" = ?", self.select_sql);
        let row = sqlx::query::<Sqlite>(&sql)
            .bind(address)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ShelfError::storage("select", e.to_string()))?;
        match row {
            Some(row) => self.record_from_row(&row),
            None => Err(ShelfError::out_of_bounds(address, self.count().await?)),
        }
    }

    async fn remove(&self, address: i64) -> ShelfResult<Record> {
        let select = format!("{} WHERE \"{ID_COLUMN}\" = ?", self.select_sql);
        let delete = format!("DELETE FROM \"{}\" WHERE \"{ID_COLUMN}\" = ?", self.schema.table);

        let mut tx = self.pool.begin().await?;
        let Some(row) = sqlx::query::<Sqlite>(&select).bind(address).fetch_optional(&mut *tx).await? else {
            tx.rollback().await?;
            return Err(ShelfError::out_of_bounds(address, self.count().await?));
        };
        let record = self.record_from_row(&row)?;
        sqlx::query::<Sqlite>(&delete)
            .bind(address)
            .execute(&mut *tx)
            .await
            .map_err(|e| ShelfError::storage("delete", e.to_string()))?;
        tx.commit().await?;

        debug!(table = %self.schema.table, id = address, "Deleted row");
        Ok(record)
    }

    async fn len(&self) -> ShelfResult<usize> {
        self.count().await
    }
}
