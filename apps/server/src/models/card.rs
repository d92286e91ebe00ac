//! Card records as returned by the data store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card record in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub type_id: Option<i64>,
    pub rarity_id: Option<i64>,
    pub set_id: Option<i64>,
    pub faction: Option<String>,
    pub series: Option<String>,
    pub level: Option<i32>,
    pub cost: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Display names of the referenced type, rarity and set.
    /// Only populated when the search asked for `includeRelations`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<CardRelations>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRelations {
    pub type_name: Option<String>,
    pub rarity_name: Option<String>,
    pub set_name: Option<String>,
}

/// Payload for creating or replacing a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    pub name: String,
    #[serde(default)]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub rarity_id: Option<i64>,
    #[serde(default)]
    pub set_id: Option<i64>,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub cost: Option<i32>,
}

impl CardInput {
    /// Trim text fields and reject payloads the catalog cannot store.
    pub fn validated(mut self) -> crate::Result<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(crate::Error::Validation(
                "Card name must not be empty".to_string(),
            ));
        }
        if self.name.chars().count() > 200 {
            return Err(crate::Error::Validation(
                "Card name must be at most 200 characters".to_string(),
            ));
        }
        self.faction = trim_optional(self.faction);
        self.series = trim_optional(self.series);
        if matches!(self.level, Some(l) if l < 0) || matches!(self.cost, Some(c) if c < 0) {
            return Err(crate::Error::Validation(
                "Card level and cost must not be negative".to_string(),
            ));
        }
        Ok(self)
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
