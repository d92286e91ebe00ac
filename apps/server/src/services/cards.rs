//! Card mutations
//!
//! Every successful write clears the search result cache once the store has
//! committed, so no cached page can outlive the data it was computed from.

use std::sync::Arc;

use crate::{
    cache::ResultCache,
    db::traits::CardStore,
    models::{Card, CardInput},
    Error, Result,
};

pub struct CardService {
    store: Arc<dyn CardStore>,
    cache: Arc<ResultCache>,
}

impl CardService {
    pub fn new(store: Arc<dyn CardStore>, cache: Arc<ResultCache>) -> Self {
        Self { store, cache }
    }

    pub async fn get(&self, id: i64) -> Result<Card> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Card {id}")))
    }

    pub async fn create(&self, input: CardInput) -> Result<Card> {
        let input = input.validated()?;
        let card = self.store.create(&input).await?;
        self.cache.invalidate_all();
        tracing::info!(card_id = card.id, "Card created");
        Ok(card)
    }

    pub async fn update(&self, id: i64, input: CardInput) -> Result<Card> {
        let input = input.validated()?;
        let card = self
            .store
            .update(id, &input)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Card {id}")))?;
        self.cache.invalidate_all();
        tracing::info!(card_id = id, "Card updated");
        Ok(card)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(Error::NotFound(format!("Card {id}")));
        }
        self.cache.invalidate_all();
        tracing::info!(card_id = id, "Card deleted");
        Ok(())
    }
}
