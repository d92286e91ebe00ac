use axum::body::Bytes;
use cardvault::models::Card;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Converts a JSON value to request body bytes
pub fn to_json_body(value: &serde_json::Value) -> anyhow::Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Builder for catalog cards with fixed timestamps
pub struct CardBuilder {
    card: Card,
}

impl CardBuilder {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let created = epoch() + Duration::days(id);
        Self {
            card: Card {
                id,
                name: name.into(),
                type_id: None,
                rarity_id: None,
                set_id: None,
                faction: None,
                series: None,
                level: None,
                cost: None,
                created_at: created,
                updated_at: created,
                relations: None,
            },
        }
    }

    pub fn type_id(mut self, type_id: i64) -> Self {
        self.card.type_id = Some(type_id);
        self
    }

    pub fn rarity_id(mut self, rarity_id: i64) -> Self {
        self.card.rarity_id = Some(rarity_id);
        self
    }

    pub fn set_id(mut self, set_id: i64) -> Self {
        self.card.set_id = Some(set_id);
        self
    }

    pub fn faction(mut self, faction: impl Into<String>) -> Self {
        self.card.faction = Some(faction.into());
        self
    }

    pub fn series(mut self, series: impl Into<String>) -> Self {
        self.card.series = Some(series.into());
        self
    }

    pub fn level(mut self, level: i32) -> Self {
        self.card.level = Some(level);
        self
    }

    pub fn cost(mut self, cost: i32) -> Self {
        self.card.cost = Some(cost);
        self
    }

    pub fn build(self) -> Card {
        self.card
    }
}
