//! PostgreSQL card store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::search::{BindValue, QueryPlan};
use super::traits::{CardStore, SearchRows};
use crate::models::{Card, CardInput, CardRelations};
use crate::Result;

const RETURNING_COLUMNS: &str = "id, name, type_id, rarity_id, set_id, faction, series, level, cost, \
     created_at, updated_at, NULL::text AS type_name, NULL::text AS rarity_name, NULL::text AS set_name";

#[derive(Debug, sqlx::FromRow)]
struct CardRow {
    id: i64,
    name: String,
    type_id: Option<i64>,
    rarity_id: Option<i64>,
    set_id: Option<i64>,
    faction: Option<String>,
    series: Option<String>,
    level: Option<i32>,
    cost: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    type_name: Option<String>,
    rarity_name: Option<String>,
    set_name: Option<String>,
}

impl CardRow {
    fn into_card(self, include_relations: bool) -> Card {
        let relations = include_relations.then(|| CardRelations {
            type_name: self.type_name,
            rarity_name: self.rarity_name,
            set_name: self.set_name,
        });
        Card {
            id: self.id,
            name: self.name,
            type_id: self.type_id,
            rarity_id: self.rarity_id,
            set_id: self.set_id,
            faction: self.faction,
            series: self.series,
            level: self.level,
            cost: self.cost,
            created_at: self.created_at,
            updated_at: self.updated_at,
            relations,
        }
    }
}

/// Card storage backed by the `cards` table.
#[derive(Clone)]
pub struct PostgresCardStore {
    pool: PgPool,
}

impl PostgresCardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_page(&self, plan: &QueryPlan) -> Result<Vec<Card>> {
        let (sql, bind_values) = plan.build_sql();

        let mut query = sqlx::query_as::<_, CardRow>(&sql);
        for value in bind_values {
            query = match value {
                BindValue::Text(v) => query.bind(v),
                BindValue::Int(v) => query.bind(v),
            };
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(crate::Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_card(plan.include_relations))
            .collect())
    }

    async fn count_total(&self, plan: &QueryPlan) -> Result<i64> {
        let (sql, bind_values) = plan.build_count_sql();

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in bind_values {
            query = match value {
                BindValue::Text(v) => query.bind(v),
                BindValue::Int(v) => query.bind(v),
            };
        }

        query
            .fetch_one(&self.pool)
            .await
            .map_err(crate::Error::Database)
    }
}

#[async_trait]
impl CardStore for PostgresCardStore {
    async fn execute(&self, plan: &QueryPlan) -> Result<SearchRows> {
        if plan.is_empty_result() {
            return Ok(SearchRows::default());
        }
        let (cards, total) = tokio::try_join!(self.fetch_page(plan), self.count_total(plan))?;
        Ok(SearchRows { cards, total })
    }

    async fn get(&self, id: i64) -> Result<Option<Card>> {
        let sql = format!("SELECT {RETURNING_COLUMNS} FROM cards WHERE id = $1");
        let row = sqlx::query_as::<_, CardRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.into_card(false)))
    }

    async fn create(&self, input: &CardInput) -> Result<Card> {
        let sql = format!(
            "INSERT INTO cards (name, type_id, rarity_id, set_id, faction, series, level, cost) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {RETURNING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CardRow>(&sql)
            .bind(&input.name)
            .bind(input.type_id)
            .bind(input.rarity_id)
            .bind(input.set_id)
            .bind(&input.faction)
            .bind(&input.series)
            .bind(input.level)
            .bind(input.cost)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into_card(false))
    }

    async fn update(&self, id: i64, input: &CardInput) -> Result<Option<Card>> {
        let sql = format!(
            "UPDATE cards SET name = $2, type_id = $3, rarity_id = $4, set_id = $5, faction = $6, \
             series = $7, level = $8, cost = $9, updated_at = NOW() \
             WHERE id = $1 RETURNING {RETURNING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CardRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.type_id)
            .bind(input.rarity_id)
            .bind(input.set_id)
            .bind(&input.faction)
            .bind(&input.series)
            .bind(input.level)
            .bind(input.cost)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.into_card(false)))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
