//! Record codec: structured publications to and from flat `recipes` columns
//!
//! The `description` and `ingredient` columns hold JSON text; `time` keeps
//! its scalar type. [`encode`] and [`decode`] are exact inverses, so a
//! created record reads back structurally identical.

use imbue_sqlite::{Row, SqlValue};

use crate::domain::{Description, Ingredient, Publication, TimeValue};

/// Errors crossing the codec boundary.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),
    #[error("Unexpected value type in column: {0}")]
    UnexpectedType(&'static str),
    #[error("Invalid JSON in column {column}: {source}")]
    Json {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialize a publication into the six insert parameters, in column order:
/// id, name, description, time, ingredient, image.
pub fn encode(publication: &Publication) -> Result<[SqlValue; 6], CodecError> {
    let description = serde_json::to_string(&publication.description).map_err(|e| {
        CodecError::Json {
            column: "description",
            source: e,
        }
    })?;
    let ingredient = serde_json::to_string(&publication.ingredient).map_err(|e| {
        CodecError::Json {
            column: "ingredient",
            source: e,
        }
    })?;
    let time = match &publication.time {
        TimeValue::Integer(minutes) => SqlValue::Integer(*minutes),
        TimeValue::Float(minutes) => SqlValue::Real(*minutes),
        TimeValue::Text(text) => SqlValue::Text(text.clone()),
    };
    Ok([
        SqlValue::Text(publication.id.clone()),
        SqlValue::Text(publication.name.clone()),
        SqlValue::Text(description),
        time,
        SqlValue::Text(ingredient),
        SqlValue::Text(publication.image.clone()),
    ])
}

/// Rebuild a publication from a raw row. The exact inverse of [`encode`].
pub fn decode(row: &Row) -> Result<Publication, CodecError> {
    let id = text_column(row, "id")?;
    let name = text_column(row, "name")?;
    let description: Description = json_column(row, "description")?;
    let ingredient: Vec<Ingredient> = json_column(row, "ingredient")?;
    let image = text_column(row, "image")?;
    let time = match row.get("time").ok_or(CodecError::MissingColumn("time"))? {
        SqlValue::Integer(minutes) => TimeValue::Integer(*minutes),
        SqlValue::Real(minutes) => TimeValue::Float(*minutes),
        SqlValue::Text(text) => TimeValue::Text(text.clone()),
        SqlValue::Null => return Err(CodecError::UnexpectedType("time")),
    };
    Ok(Publication {
        id,
        name,
        description,
        time,
        ingredient,
        image,
    })
}

fn text_column(row: &Row, column: &'static str) -> Result<String, CodecError> {
    match row.get(column) {
        Some(SqlValue::Text(text)) => Ok(text.clone()),
        Some(_) => Err(CodecError::UnexpectedType(column)),
        None => Err(CodecError::MissingColumn(column)),
    }
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &Row,
    column: &'static str,
) -> Result<T, CodecError> {
    let text = text_column(row, column)?;
    serde_json::from_str(&text).map_err(|e| CodecError::Json { column, source: e })
}
