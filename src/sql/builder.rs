//! Builds parameterized SELECT, INSERT, UPDATE, DELETE text from descriptor
//! column lists. Identifiers come from static descriptors only; all values
//! are positional `?` placeholders bound at execution time.

use crate::schema::EntityDescriptor;
use crate::sql::SqlValue;

/// Quote an identifier for MySQL.
fn quoted(s: &str) -> String {
    format!("`{}`", s)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// SELECT of all columns, used as the prefix for keyed and filtered reads.
pub fn select_stmt(table: &str, columns: &[&str]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| quoted(c)).collect();
    format!("SELECT {} FROM {}", cols.join(", "), quoted(table))
}

/// INSERT of every column; bind order must match `columns`.
pub fn insert_stmt(table: &str, columns: &[&str]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| quoted(c)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(table),
        cols.join(", "),
        placeholders(columns.len())
    )
}

/// UPDATE of the non-key columns, keyed by the primary key bound last.
pub fn update_stmt(table: &str, set_columns: &[&str], pk: &str) -> String {
    let sets: Vec<String> = set_columns
        .iter()
        .map(|c| format!("{} = ?", quoted(c)))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quoted(table),
        sets.join(", "),
        quoted(pk)
    )
}

/// DELETE by primary key.
pub fn delete_stmt(table: &str, pk: &str) -> String {
    format!("DELETE FROM {} WHERE {} = ?", quoted(table), quoted(pk))
}

/// Row bound for a filtered read: a plain count, or an (offset, count) pair.
#[derive(Clone, Debug)]
pub enum Limit {
    Count(u32),
    OffsetCount(u32, u32),
}

/// Keyed single-row read built on the canonical SELECT.
pub fn select_by_pk(desc: &EntityDescriptor) -> String {
    format!(
        "{} WHERE {} = ?",
        desc.select,
        quoted(desc.primary_key)
    )
}

/// Filtered read with optional WHERE/ORDER BY/LIMIT clauses. The WHERE
/// fragment is caller-authored statement text with `?` markers; its values
/// arrive separately. LIMIT arguments are returned for binding after them,
/// offset before count.
pub fn select_where(
    desc: &EntityDescriptor,
    where_clause: Option<&str>,
    order_by: Option<&str>,
    limit: Option<&Limit>,
) -> (String, Vec<SqlValue>) {
    let mut sql = desc.select.clone();
    let mut args = Vec::new();
    if let Some(w) = where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(w);
    }
    if let Some(o) = order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(o);
    }
    match limit {
        Some(Limit::Count(n)) => {
            sql.push_str(" LIMIT ?");
            args.push(SqlValue::Int(i64::from(*n)));
        }
        Some(Limit::OffsetCount(offset, n)) => {
            sql.push_str(" LIMIT ?, ?");
            args.push(SqlValue::Int(i64::from(*offset)));
            args.push(SqlValue::Int(i64::from(*n)));
        }
        None => {}
    }
    (sql, args)
}

/// Single scalar aggregate (e.g. `count(id)`) with an optional WHERE clause.
/// The aggregate expression is caller-authored statement text.
pub fn select_aggregate(
    desc: &EntityDescriptor,
    expr: &str,
    where_clause: Option<&str>,
) -> String {
    let mut sql = format!("SELECT {} FROM {}", expr, quoted(desc.table));
    if let Some(w) = where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(w);
    }
    sql
}

/// Bootstrap DDL for one descriptor. All columns NOT NULL; unique and
/// secondary-index column sets follow the descriptor.
pub fn create_table_stmt(desc: &EntityDescriptor) -> String {
    let mut parts: Vec<String> = desc
        .columns
        .iter()
        .map(|c| format!("{} {} NOT NULL", quoted(c.name), c.kind.ddl()))
        .collect();
    for col in &desc.unique {
        parts.push(format!(
            "UNIQUE KEY {} ({})",
            quoted(&format!("uk_{}_{}", desc.table, col)),
            quoted(col)
        ));
    }
    for col in &desc.indexes {
        parts.push(format!(
            "KEY {} ({})",
            quoted(&format!("idx_{}_{}", desc.table, col)),
            quoted(col)
        ));
    }
    parts.push(format!("PRIMARY KEY ({})", quoted(desc.primary_key)));
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({}) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        quoted(desc.table),
        parts.join(", ")
    )
}
