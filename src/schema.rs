//! Static schema descriptors: explicit per-entity column lists consumed by
//! the SQL builder and the generic store. Descriptor construction validates
//! the column set and precomputes the four canonical statements.

use crate::error::SchemaError;
use crate::sql::{self, SqlValue};
use chrono::Utc;
use uuid::Uuid;

/// Opaque primary key: zero-padded millisecond timestamp plus a random
/// suffix, so keys sort roughly by creation time.
pub fn next_id() -> String {
    format!(
        "{:015}{}000",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Creation timestamps are stored as seconds since epoch in a DOUBLE column,
/// which sorts trivially and sidesteps database time-zone handling.
pub fn now_epoch() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

#[derive(Clone, Debug)]
pub enum ColumnKind {
    Varchar(u16),
    Text,
    Boolean,
    Double,
}

impl ColumnKind {
    pub fn ddl(&self) -> String {
        match self {
            ColumnKind::Varchar(n) => format!("varchar({})", n),
            ColumnKind::Text => "mediumtext".into(),
            ColumnKind::Boolean => "boolean".into(),
            ColumnKind::Double => "double".into(),
        }
    }
}

/// Per-column rule for filling an unset value at save time.
#[derive(Clone, Debug)]
pub enum DefaultPolicy {
    None,
    /// Fresh opaque id from [`next_id`].
    GeneratedId,
    /// Current time from [`now_epoch`].
    Now,
    Bool(bool),
    Double(f64),
    Str(&'static str),
}

impl DefaultPolicy {
    /// Produce the default value, or `None` when the column has no default.
    pub fn produce(&self) -> Option<SqlValue> {
        match self {
            DefaultPolicy::None => None,
            DefaultPolicy::GeneratedId => Some(SqlValue::Text(next_id())),
            DefaultPolicy::Now => Some(SqlValue::Double(now_epoch())),
            DefaultPolicy::Bool(b) => Some(SqlValue::Bool(*b)),
            DefaultPolicy::Double(f) => Some(SqlValue::Double(*f)),
            DefaultPolicy::Str(s) => Some(SqlValue::Text((*s).to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub primary_key: bool,
    pub default: DefaultPolicy,
}

impl ColumnDef {
    pub fn new(name: &'static str, kind: ColumnKind) -> Self {
        ColumnDef {
            name,
            kind,
            primary_key: false,
            default: DefaultPolicy::None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn with_default(mut self, default: DefaultPolicy) -> Self {
        self.default = default;
        self
    }
}

/// Static description of one table: column list, single primary key, unique
/// and secondary-index column sets, and the canonical statements built once.
#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    pub table: &'static str,
    pub columns: Vec<ColumnDef>,
    pub primary_key: &'static str,
    /// Non-key column names in declared order.
    pub fields: Vec<&'static str>,
    pub unique: Vec<&'static str>,
    pub indexes: Vec<&'static str>,
    pub select: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
}

impl EntityDescriptor {
    /// Validate the column set (exactly one primary key, no duplicate names)
    /// and precompute the canonical SELECT/INSERT/UPDATE/DELETE statements.
    pub fn new(table: &'static str, columns: Vec<ColumnDef>) -> Result<Self, SchemaError> {
        let mut primary_key: Option<&'static str> = None;
        let mut fields = Vec::new();
        for (i, c) in columns.iter().enumerate() {
            if columns[..i].iter().any(|prev| prev.name == c.name) {
                return Err(SchemaError::DuplicateColumn {
                    table,
                    column: c.name,
                });
            }
            if c.primary_key {
                if primary_key.is_some() {
                    return Err(SchemaError::DuplicatePrimaryKey {
                        table,
                        column: c.name,
                    });
                }
                primary_key = Some(c.name);
            } else {
                fields.push(c.name);
            }
        }
        let primary_key = primary_key.ok_or(SchemaError::NoPrimaryKey { table })?;

        let all: Vec<&str> = columns.iter().map(|c| c.name).collect();
        let mut insert_cols: Vec<&str> = fields.clone();
        insert_cols.push(primary_key);

        Ok(EntityDescriptor {
            select: sql::select_stmt(table, &all),
            insert: sql::insert_stmt(table, &insert_cols),
            update: sql::update_stmt(table, &fields, primary_key),
            delete: sql::delete_stmt(table, primary_key),
            table,
            columns,
            primary_key,
            fields,
            unique: Vec::new(),
            indexes: Vec::new(),
        })
    }

    pub fn with_unique(mut self, column: &'static str) -> Self {
        self.unique.push(column);
        self
    }

    pub fn with_index(mut self, column: &'static str) -> Self {
        self.indexes.push(column);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Bind order for the canonical INSERT: non-key columns, then the key.
    pub fn insert_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .copied()
            .chain(std::iter::once(self.primary_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_col() -> ColumnDef {
        ColumnDef::new("id", ColumnKind::Varchar(50))
            .primary()
            .with_default(DefaultPolicy::GeneratedId)
    }

    #[test]
    fn descriptor_requires_a_primary_key() {
        let err = EntityDescriptor::new(
            "things",
            vec![ColumnDef::new("name", ColumnKind::Varchar(50))],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::NoPrimaryKey { table: "things" }));
    }

    #[test]
    fn descriptor_rejects_two_primary_keys() {
        let err = EntityDescriptor::new(
            "things",
            vec![
                id_col(),
                ColumnDef::new("other", ColumnKind::Varchar(50)).primary(),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicatePrimaryKey {
                column: "other",
                ..
            }
        ));
    }

    #[test]
    fn descriptor_rejects_duplicate_column_names() {
        let err = EntityDescriptor::new(
            "things",
            vec![
                id_col(),
                ColumnDef::new("name", ColumnKind::Varchar(50)),
                ColumnDef::new("name", ColumnKind::Text),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { column: "name", .. }));
    }

    #[test]
    fn canonical_statements_are_precomputed() {
        let d = EntityDescriptor::new(
            "things",
            vec![
                id_col(),
                ColumnDef::new("name", ColumnKind::Varchar(50)),
                ColumnDef::new("created_at", ColumnKind::Double)
                    .with_default(DefaultPolicy::Now),
            ],
        )
        .unwrap();
        assert_eq!(d.select, "SELECT `id`, `name`, `created_at` FROM `things`");
        assert_eq!(
            d.insert,
            "INSERT INTO `things` (`name`, `created_at`, `id`) VALUES (?, ?, ?)"
        );
        assert_eq!(
            d.update,
            "UPDATE `things` SET `name` = ?, `created_at` = ? WHERE `id` = ?"
        );
        assert_eq!(d.delete, "DELETE FROM `things` WHERE `id` = ?");
        assert_eq!(d.primary_key, "id");
        assert_eq!(d.fields, vec!["name", "created_at"]);
    }

    #[test]
    fn generated_id_is_sortable_and_unique() {
        let a = next_id();
        let b = next_id();
        assert_eq!(a.len(), 50);
        assert_ne!(a, b);
        assert!(!a.contains('-'));
    }

    #[test]
    fn default_policies_produce_values() {
        assert!(DefaultPolicy::None.produce().is_none());
        assert!(matches!(
            DefaultPolicy::Bool(false).produce(),
            Some(SqlValue::Bool(false))
        ));
        match DefaultPolicy::Now.produce() {
            Some(SqlValue::Double(t)) => assert!(t > 1_500_000_000.0),
            other => panic!("unexpected default: {:?}", other),
        }
    }
}
