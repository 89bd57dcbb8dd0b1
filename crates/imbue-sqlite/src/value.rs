//! Dynamically typed SQL values and loosely typed result rows

use std::collections::BTreeMap;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};

/// A dynamically typed SQL value.
///
/// Closed over what the seed exports and the recipe tables actually store;
/// blobs are deliberately not representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Map a seed JSON value onto its SQL representation. Booleans become
    /// 0/1 integers; nested structures are stored as JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SqlValue::Null,
            serde_json::Value::Bool(flag) => SqlValue::Integer(*flag as i64),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Integer(i)
                } else {
                    SqlValue::Real(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => SqlValue::Text(s.clone()),
            other => SqlValue::Text(other.to_string()),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlValue::Real(x) => ToSqlOutput::Owned(Value::Real(*x)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl FromSql for SqlValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(SqlValue::Null),
            ValueRef::Integer(i) => Ok(SqlValue::Integer(i)),
            ValueRef::Real(x) => Ok(SqlValue::Real(x)),
            ValueRef::Text(text) => Ok(SqlValue::Text(String::from_utf8_lossy(text).into_owned())),
            ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// One result row: column name to value. Serializes to a plain JSON object,
/// which is exactly the shape the shells see for raw reads.
pub type Row = BTreeMap<String, SqlValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_maps_scalars() {
        assert_eq!(SqlValue::from_json(&json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::from_json(&json!(true)), SqlValue::Integer(1));
        assert_eq!(SqlValue::from_json(&json!(20)), SqlValue::Integer(20));
        assert_eq!(SqlValue::from_json(&json!(0.5)), SqlValue::Real(0.5));
        assert_eq!(
            SqlValue::from_json(&json!("45 min")),
            SqlValue::Text("45 min".to_string())
        );
    }

    #[test]
    fn from_json_stores_nested_structures_as_text() {
        let value = SqlValue::from_json(&json!([{"name": "Water", "quantity": 1.0}]));
        match value {
            SqlValue::Text(text) => assert!(text.contains("\"name\":\"Water\"")),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn row_serializes_to_json_object() {
        let mut row = Row::new();
        row.insert("id".to_string(), SqlValue::Text("r1".to_string()));
        row.insert("time".to_string(), SqlValue::Integer(20));
        row.insert("image".to_string(), SqlValue::Null);

        let rendered = serde_json::to_string(&row).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["id"], json!("r1"));
        assert_eq!(parsed["time"], json!(20));
        assert_eq!(parsed["image"], json!(null));
    }

    #[test]
    fn values_round_trip_through_sqlite() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE probe (a, b, c, d)").unwrap();
        conn.execute(
            "INSERT INTO probe (a, b, c, d) VALUES (?, ?, ?, ?)",
            rusqlite::params![
                SqlValue::Integer(7),
                SqlValue::Real(1.5),
                SqlValue::Text("soup".to_string()),
                SqlValue::Null,
            ],
        )
        .unwrap();

        let row = conn
            .query_row("SELECT a, b, c, d FROM probe", [], |row| {
                Ok((
                    row.get::<_, SqlValue>(0)?,
                    row.get::<_, SqlValue>(1)?,
                    row.get::<_, SqlValue>(2)?,
                    row.get::<_, SqlValue>(3)?,
                ))
            })
            .unwrap();

        assert_eq!(row.0, SqlValue::Integer(7));
        assert_eq!(row.1, SqlValue::Real(1.5));
        assert_eq!(row.2, SqlValue::Text("soup".to_string()));
        assert_eq!(row.3, SqlValue::Null);
    }
}
