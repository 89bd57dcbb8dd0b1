//! Seed dataset model
//!
//! A dataset is the JSON export format the apps bundle as a static asset:
//! a database name plus one dump (schema and values) per table. The engine
//! validates a dataset before importing it.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// How an import treats tables that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Drop and recreate every table in the dataset, then insert its rows.
    #[default]
    Full,
    /// Create missing tables only and insert on top of what is there.
    Partial,
}

/// A complete seed export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Name of the database this export provisions.
    pub database: String,
    #[serde(default = "default_version")]
    pub version: i64,
    /// Advisory flag carried by the export format; full mode replaces
    /// tables regardless of it.
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub mode: ImportMode,
    pub tables: Vec<TableDump>,
}

fn default_version() -> i64 {
    1
}

/// One table of a seed export: its schema and its rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDump {
    pub name: String,
    #[serde(default)]
    pub schema: Vec<SchemaEntry>,
    /// Row values in schema column order.
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

/// One entry of a table schema: a named column with its type text, or a
/// table-level constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Column type and modifiers, or the constraint body.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

impl Dataset {
    /// The engine's validity check, run before any import.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.database.trim().is_empty() {
            return Err(StoreError::InvalidDataset("database name is empty".into()));
        }
        if self.tables.is_empty() {
            return Err(StoreError::InvalidDataset("no tables".into()));
        }
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(StoreError::InvalidDataset("table with empty name".into()));
            }
            let columns = table.column_names();
            if columns.is_empty() {
                return Err(StoreError::InvalidDataset(format!(
                    "table {} declares no columns",
                    table.name
                )));
            }
            for (index, row) in table.values.iter().enumerate() {
                if row.len() != columns.len() {
                    return Err(StoreError::InvalidDataset(format!(
                        "table {} row {} has {} values but the schema has {} columns",
                        table.name,
                        index,
                        row.len(),
                        columns.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl TableDump {
    /// Names of the declared columns, in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema
            .iter()
            .filter_map(|entry| entry.column.as_deref())
            .collect()
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    pub fn create_sql(&self) -> String {
        let defs: Vec<String> = self
            .schema
            .iter()
            .map(|entry| match (&entry.column, &entry.constraint) {
                (Some(column), _) => format!("{} {}", column, entry.value),
                (None, Some(name)) => format!("CONSTRAINT {} {}", name, entry.value),
                (None, None) => entry.value.clone(),
            })
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            defs.join(", ")
        )
    }

    pub fn insert_sql(&self) -> String {
        let columns = self.column_names();
        let placeholders = vec!["?"; columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            columns.join(", "),
            placeholders
        )
    }
}
