//! Connection pool, bootstrap DDL, and the single statement-execution path.
//! Every statement runs through one of the helpers here with its values as
//! bound parameters.

use crate::config::DbConfig;
use crate::error::AppError;
use crate::models::{BLOGS, COMMENTS, USERS};
use crate::sql::{self, SqlValue};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::FromRow;

pub async fn connect(cfg: &DbConfig) -> Result<MySqlPool, AppError> {
    tracing::info!(
        host = %cfg.host,
        port = cfg.port,
        database = %cfg.database,
        "creating database connection pool"
    );
    let opts = MySqlConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.database)
        .charset("utf8mb4");
    MySqlPoolOptions::new()
        .min_connections(cfg.pool_min)
        .max_connections(cfg.pool_max)
        .connect_with(opts)
        .await
        .map_err(AppError::Db)
}

/// Create the three tables if they do not exist yet.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), AppError> {
    for desc in [&*USERS, &*BLOGS, &*COMMENTS] {
        let ddl = sql::create_table_stmt(desc);
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

pub async fn fetch_all<T>(pool: &MySqlPool, sql: &str, params: &[SqlValue]) -> Result<Vec<T>, AppError>
where
    T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    tracing::debug!(sql = %sql, "select");
    let mut query = sqlx::query_as::<_, T>(sql);
    for p in params {
        query = query.bind(p.clone());
    }
    Ok(query.fetch_all(pool).await?)
}

pub async fn fetch_optional<T>(
    pool: &MySqlPool,
    sql: &str,
    params: &[SqlValue],
) -> Result<Option<T>, AppError>
where
    T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    tracing::debug!(sql = %sql, "select");
    let mut query = sqlx::query_as::<_, T>(sql);
    for p in params {
        query = query.bind(p.clone());
    }
    Ok(query.fetch_optional(pool).await?)
}

pub async fn fetch_scalar_i64(
    pool: &MySqlPool,
    sql: &str,
    params: &[SqlValue],
) -> Result<Option<i64>, AppError> {
    tracing::debug!(sql = %sql, "select scalar");
    let mut query = sqlx::query_scalar::<_, i64>(sql);
    for p in params {
        query = query.bind(p.clone());
    }
    Ok(query.fetch_optional(pool).await?)
}

/// Autocommit mutation; returns the affected-row count.
pub async fn execute(pool: &MySqlPool, sql: &str, params: &[SqlValue]) -> Result<u64, AppError> {
    tracing::debug!(sql = %sql, "execute");
    let mut query = sqlx::query(sql);
    for p in params {
        query = query.bind(p.clone());
    }
    Ok(query.execute(pool).await?.rows_affected())
}

/// Mutation inside an explicit transaction.
pub async fn execute_tx(
    conn: &mut sqlx::MySqlConnection,
    sql: &str,
    params: &[SqlValue],
) -> Result<u64, AppError> {
    tracing::debug!(sql = %sql, "execute (tx)");
    let mut query = sqlx::query(sql);
    for p in params {
        query = query.bind(p.clone());
    }
    Ok(query.execute(&mut *conn).await?.rows_affected())
}
