use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tarot card in the catalog. Written once by the seeder, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CardRow {
    pub id: i32,
    pub name: String,
    pub image_path: String,
}

/// A card awaiting insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub name: String,
    pub image_path: String,
}
