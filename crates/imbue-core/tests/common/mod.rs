//! Shared helpers for integration tests

use std::path::{Path, PathBuf};

use imbue_core::{Description, Ingredient, Platform, Publication, StoreConfig, TimeValue};
use serde_json::json;

/// Write a small but complete seed export into `dir` and return its path.
///
/// The export provisions a database named `favorites` holding one recipe.
pub fn write_seed(dir: &Path) -> PathBuf {
    let seed = json!({
        "database": "favorites",
        "version": 1,
        "encrypted": false,
        "mode": "full",
        "tables": [{
            "name": "recipes",
            "schema": [
                {"column": "id", "value": "TEXT PRIMARY KEY NOT NULL"},
                {"column": "name", "value": "TEXT NOT NULL"},
                {"column": "description", "value": "TEXT NOT NULL"},
                {"column": "time", "value": "NUMERIC"},
                {"column": "ingredient", "value": "TEXT NOT NULL"},
                {"column": "image", "value": "TEXT"}
            ],
            "values": [
                [
                    "seed-1",
                    "Gazpacho",
                    "[\"Blend\",\"Chill\"]",
                    15,
                    "[{\"name\":\"Tomato\",\"quantity\":6.0}]",
                    "gazpacho.png"
                ]
            ]
        }]
    });
    let path = dir.join("favorites.json");
    std::fs::write(&path, seed.to_string()).unwrap();
    path
}

/// A config rooted in `dir`, seeding from [`write_seed`], with the platform
/// pinned so tests never depend on the machine they run on.
pub fn config_for(dir: &Path, platform: Platform) -> StoreConfig {
    let seed_path = write_seed(dir);
    StoreConfig {
        data_dir: Some(dir.to_string_lossy().into_owned()),
        seed_url: None,
        seed_path: Some(seed_path.to_string_lossy().into_owned()),
        platform: Some(platform),
    }
}

pub fn sample_publication(id: &str) -> Publication {
    Publication {
        id: id.to_string(),
        name: "Soup".to_string(),
        description: Description::Steps(vec!["Boil".to_string(), "Serve".to_string()]),
        time: TimeValue::Integer(20),
        ingredient: vec![Ingredient {
            name: "Water".to_string(),
            quantity: 1.0,
        }],
        image: "soup.png".to_string(),
    }
}
