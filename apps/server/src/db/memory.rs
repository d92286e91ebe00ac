//! In-memory card and analytics stores
//!
//! Used when `database.in_memory` is set and by the test suite. Searches run
//! the same `QueryPlan` as PostgreSQL, evaluated with `Predicate::matches` and
//! `OrderBy::compare`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::RwLock;

use super::search::QueryPlan;
use super::traits::{
    AnalyticsSink, AnalyticsStore, AnalyticsSummary, CardStore, FilterUsage, SearchRows,
};
use crate::models::{Card, CardInput, CardRelations, SearchEvent};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct RelationNames {
    types: HashMap<i64, String>,
    rarities: HashMap<i64, String>,
    sets: HashMap<i64, String>,
}

impl RelationNames {
    fn resolve(&self, card: &Card) -> CardRelations {
        let lookup = |names: &HashMap<i64, String>, id: Option<i64>| {
            id.and_then(|id| names.get(&id).cloned())
        };
        CardRelations {
            type_name: lookup(&self.types, card.type_id),
            rarity_name: lookup(&self.rarities, card.rarity_id),
            set_name: lookup(&self.sets, card.set_id),
        }
    }
}

/// Card store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCardStore {
    cards: RwLock<BTreeMap<i64, Card>>,
    relations: std::sync::RwLock<RelationNames>,
    next_id: AtomicI64,
    executions: AtomicUsize,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Register display names for a type, rarity or set id.
    pub fn add_type(&self, id: i64, name: impl Into<String>) {
        if let Ok(mut names) = self.relations.write() {
            names.types.insert(id, name.into());
        }
    }

    pub fn add_rarity(&self, id: i64, name: impl Into<String>) {
        if let Ok(mut names) = self.relations.write() {
            names.rarities.insert(id, name.into());
        }
    }

    pub fn add_set(&self, id: i64, name: impl Into<String>) {
        if let Ok(mut names) = self.relations.write() {
            names.sets.insert(id, name.into());
        }
    }

    /// Insert a card as-is, keeping its id and timestamps.
    pub async fn insert(&self, card: Card) {
        self.next_id.fetch_max(card.id + 1, Ordering::SeqCst);
        self.cards.write().await.insert(card.id, card);
    }

    /// Number of `execute` calls that reached the store.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Make every operation fail with a data-access error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every `execute` call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn check_available(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::DataAccess("card store unavailable".to_string()));
        }
        Ok(())
    }

    fn with_relations(&self, mut card: Card) -> Card {
        card.relations = self.relations.read().ok().map(|names| names.resolve(&card));
        card
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn execute(&self, plan: &QueryPlan) -> Result<SearchRows> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        self.check_available().await?;

        let cards = self.cards.read().await;
        let (page, total) = plan.apply(cards.values());
        let cards = page
            .into_iter()
            .cloned()
            .map(|card| {
                if plan.include_relations {
                    self.with_relations(card)
                } else {
                    card
                }
            })
            .collect();
        Ok(SearchRows { cards, total })
    }

    async fn get(&self, id: i64) -> Result<Option<Card>> {
        self.check_available().await?;
        Ok(self.cards.read().await.get(&id).cloned())
    }

    async fn create(&self, input: &CardInput) -> Result<Card> {
        self.check_available().await?;
        let now = Utc::now();
        let card = Card {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: input.name.clone(),
            type_id: input.type_id,
            rarity_id: input.rarity_id,
            set_id: input.set_id,
            faction: input.faction.clone(),
            series: input.series.clone(),
            level: input.level,
            cost: input.cost,
            created_at: now,
            updated_at: now,
            relations: None,
        };
        self.cards.write().await.insert(card.id, card.clone());
        Ok(card)
    }

    async fn update(&self, id: i64, input: &CardInput) -> Result<Option<Card>> {
        self.check_available().await?;
        let mut cards = self.cards.write().await;
        let Some(card) = cards.get_mut(&id) else {
            return Ok(None);
        };
        card.name = input.name.clone();
        card.type_id = input.type_id;
        card.rarity_id = input.rarity_id;
        card.set_id = input.set_id;
        card.faction = input.faction.clone();
        card.series = input.series.clone();
        card.level = input.level;
        card.cost = input.cost;
        card.updated_at = Utc::now();
        Ok(Some(card.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.check_available().await?;
        Ok(self.cards.write().await.remove(&id).is_some())
    }
}

/// Analytics store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryAnalyticsStore {
    events: Mutex<Vec<SearchEvent>>,
    failing: AtomicBool,
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SearchEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make `append` fail, to exercise the recorder's error path.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnalyticsSink for InMemoryAnalyticsStore {
    async fn append(&self, event: &SearchEvent) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::DataAccess("analytics store unavailable".to_string()));
        }
        self.events
            .lock()
            .map_err(|_| Error::Internal("analytics store lock poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn summary(&self, since: DateTime<Utc>, top_n: usize) -> Result<AnalyticsSummary> {
        let events = self
            .events
            .lock()
            .map_err(|_| Error::Internal("analytics store lock poisoned".to_string()))?;

        let mut total = 0i64;
        let mut hits = 0i64;
        let mut latency_sum = 0u64;
        let mut usage: HashMap<&'static str, i64> = HashMap::new();

        for event in events.iter().filter(|e| e.timestamp >= since) {
            total += 1;
            if event.cache_hit {
                hits += 1;
            }
            latency_sum += event.latency_ms;
            for name in event.filter_names() {
                *usage.entry(name).or_default() += 1;
            }
        }

        let mut popular_filters: Vec<FilterUsage> = usage
            .into_iter()
            .map(|(filter, count)| FilterUsage {
                filter: filter.to_string(),
                count,
            })
            .collect();
        popular_filters.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.filter.cmp(&b.filter)));
        popular_filters.truncate(top_n);

        let avg_latency_ms = if total > 0 {
            latency_sum as f64 / total as f64
        } else {
            0.0
        };

        Ok(AnalyticsSummary::new(
            since,
            total,
            hits,
            avg_latency_ms,
            popular_filters,
        ))
    }
}
