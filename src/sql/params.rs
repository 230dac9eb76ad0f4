//! Typed bind values for MySQL queries. Every dynamic value travels as a
//! bound parameter; statement text never contains interpolated values.

use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::mysql::{MySql, MySqlTypeInfo};
use sqlx::Database;

/// A value that can be bound to a MySQL statement placeholder.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl From<f64> for SqlValue {
    fn from(n: f64) -> Self {
        SqlValue::Double(n)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl<'q> Encode<'q, MySql> for SqlValue {
    fn encode_by_ref(
        &self,
        buf: &mut <MySql as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) => <bool as Encode<MySql>>::encode_by_ref(b, buf),
            SqlValue::Int(n) => <i64 as Encode<MySql>>::encode_by_ref(n, buf),
            SqlValue::Double(n) => <f64 as Encode<MySql>>::encode_by_ref(n, buf),
            SqlValue::Text(s) => <String as Encode<MySql>>::encode_by_ref(s, buf),
        }
    }

    fn produces(&self) -> Option<MySqlTypeInfo> {
        Some(match self {
            SqlValue::Null | SqlValue::Text(_) => <str as sqlx::Type<MySql>>::type_info(),
            SqlValue::Bool(_) => <bool as sqlx::Type<MySql>>::type_info(),
            SqlValue::Int(_) => <i64 as sqlx::Type<MySql>>::type_info(),
            SqlValue::Double(_) => <f64 as sqlx::Type<MySql>>::type_info(),
        })
    }
}

impl sqlx::Type<MySql> for SqlValue {
    fn type_info() -> MySqlTypeInfo {
        <str as sqlx::Type<MySql>>::type_info()
    }

    fn compatible(_ty: &MySqlTypeInfo) -> bool {
        true
    }
}
