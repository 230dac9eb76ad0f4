//! Generic persistence over schema descriptors: keyed and filtered reads,
//! inserts with default filling, keyed updates and deletes.

use crate::db;
use crate::error::AppError;
use crate::schema::EntityDescriptor;
use crate::sql::{self, Limit, SqlValue};
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::FromRow;

/// A persistable entity backed by a static descriptor. `value_of`/`assign`
/// are keyed by descriptor column names so the store stays generic without
/// runtime reflection.
pub trait Record: Sized + Send + Unpin + for<'r> FromRow<'r, MySqlRow> {
    fn descriptor() -> &'static EntityDescriptor;
    /// Current value of a column as a bind parameter.
    fn value_of(&self, column: &str) -> SqlValue;
    /// True when the column has not been assigned yet.
    fn is_unset(&self, column: &str) -> bool;
    /// Write a defaulted value produced by the column's policy back into the
    /// record, so the caller observes generated ids and timestamps.
    fn assign(&mut self, column: &str, value: SqlValue);
}

/// Fill every unset column from its default policy. Runs before insert.
pub fn apply_defaults<T: Record>(rec: &mut T) {
    for c in &T::descriptor().columns {
        if rec.is_unset(c.name) {
            if let Some(v) = c.default.produce() {
                tracing::debug!(column = c.name, "using default value");
                rec.assign(c.name, v);
            }
        }
    }
}

pub struct Store;

impl Store {
    /// Single-row lookup by primary key. `Ok(None)` when absent.
    pub async fn find<T: Record>(pool: &MySqlPool, pk: &str) -> Result<Option<T>, AppError> {
        let stmt = sql::select_by_pk(T::descriptor());
        db::fetch_optional(pool, &stmt, &[SqlValue::Text(pk.to_string())]).await
    }

    /// Filtered read. The WHERE fragment and ORDER BY are statement text with
    /// `?` markers; values arrive in `args`. LIMIT arguments bind last.
    pub async fn find_all<T: Record>(
        pool: &MySqlPool,
        where_clause: Option<&str>,
        mut args: Vec<SqlValue>,
        order_by: Option<&str>,
        limit: Option<Limit>,
    ) -> Result<Vec<T>, AppError> {
        let (stmt, extra) = sql::select_where(T::descriptor(), where_clause, order_by, limit.as_ref());
        args.extend(extra);
        db::fetch_all(pool, &stmt, &args).await
    }

    /// Single scalar aggregate, e.g. `count(id)`. `Ok(None)` when no row.
    pub async fn find_number<T: Record>(
        pool: &MySqlPool,
        expr: &str,
        where_clause: Option<&str>,
        args: Vec<SqlValue>,
    ) -> Result<Option<i64>, AppError> {
        let stmt = sql::select_aggregate(T::descriptor(), expr, where_clause);
        db::fetch_scalar_i64(pool, &stmt, &args).await
    }

    /// Insert, filling unset columns from their defaults first. An affected
    /// row count other than 1 is logged as a warning, not an error.
    pub async fn save<T: Record>(pool: &MySqlPool, rec: &mut T) -> Result<(), AppError> {
        apply_defaults(rec);
        let desc = T::descriptor();
        let params: Vec<SqlValue> = desc.insert_columns().map(|c| rec.value_of(c)).collect();
        let rows = db::execute(pool, &desc.insert, &params).await?;
        if rows != 1 {
            tracing::warn!(table = desc.table, rows, "failed to insert record");
        }
        Ok(())
    }

    /// Update the non-key columns by primary key.
    pub async fn update<T: Record>(pool: &MySqlPool, rec: &T) -> Result<(), AppError> {
        let desc = T::descriptor();
        let mut params: Vec<SqlValue> = desc.fields.iter().map(|c| rec.value_of(c)).collect();
        params.push(rec.value_of(desc.primary_key));
        let rows = db::execute(pool, &desc.update, &params).await?;
        if rows != 1 {
            tracing::warn!(table = desc.table, rows, "failed to update by primary key");
        }
        Ok(())
    }

    /// Delete by primary key.
    pub async fn remove<T: Record>(pool: &MySqlPool, rec: &T) -> Result<(), AppError> {
        let desc = T::descriptor();
        let params = [rec.value_of(desc.primary_key)];
        let rows = db::execute(pool, &desc.delete, &params).await?;
        if rows != 1 {
            tracing::warn!(table = desc.table, rows, "failed to remove by primary key");
        }
        Ok(())
    }

    /// Insert a batch inside one explicit transaction. Any failure rolls the
    /// whole batch back and the error propagates to the caller.
    pub async fn save_all<T: Record>(pool: &MySqlPool, recs: &mut [T]) -> Result<(), AppError> {
        let desc = T::descriptor();
        let mut tx = pool.begin().await?;
        for rec in recs.iter_mut() {
            apply_defaults(rec);
            let params: Vec<SqlValue> = desc.insert_columns().map(|c| rec.value_of(c)).collect();
            db::execute_tx(&mut *tx, &desc.insert, &params).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
