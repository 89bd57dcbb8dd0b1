//! Publication domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recipe description: one block of text, or ordered preparation steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum Description {
    Plain(String),
    Steps(Vec<String>),
}

/// Preparation time. Whole minutes, fractional values, and free-text
/// durations all round-trip through storage unchanged.
///
/// The integer variant is listed first so `20` stays `20` instead of
/// turning into `20.0` when a stored value is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum TimeValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
}

/// A shared recipe, the persisted entity of the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct Publication {
    pub id: String,
    pub name: String,
    pub description: Description,
    pub time: TimeValue,
    pub ingredient: Vec<Ingredient>,
    pub image: String,
}

impl Publication {
    /// Create a publication with a generated id.
    pub fn new(
        name: String,
        description: Description,
        time: TimeValue,
        ingredient: Vec<Ingredient>,
        image: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            time,
            ingredient,
            image,
        }
    }
}
