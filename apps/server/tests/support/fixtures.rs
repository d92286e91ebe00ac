use super::builders::CardBuilder;
use cardvault::db::InMemoryCardStore;

/// Ids of the standard catalog, for readable assertions.
pub mod ids {
    pub const GUNDAM: i64 = 1;
    pub const ZAKU_II: i64 = 2;
    pub const CHARS_ZAKU: i64 = 3;
    pub const GOUF: i64 = 4;
    pub const GM: i64 = 5;
    pub const WHITE_BASE: i64 = 6;
    pub const AMURO: i64 = 7;
    pub const ZAKU_WARRIOR: i64 = 8;
}

pub const CATALOG_SIZE: i64 = 8;

/// Eight cards across three types, rarities and sets.
pub async fn seed_catalog(store: &InMemoryCardStore) {
    for (id, name) in [(1, "Mobile Suit"), (2, "Ship"), (3, "Pilot")] {
        store.add_type(id, name);
    }
    for (id, name) in [(1, "Common"), (2, "Uncommon"), (3, "Rare")] {
        store.add_rarity(id, name);
    }
    for (id, name) in [(1, "Operation V"), (2, "Jaburo"), (3, "Seed")] {
        store.add_set(id, name);
    }

    let cards = [
        CardBuilder::new(ids::GUNDAM, "RX-78-2 Gundam")
            .type_id(1)
            .rarity_id(3)
            .set_id(1)
            .faction("Federation")
            .series("UC")
            .level(6)
            .cost(4),
        CardBuilder::new(ids::ZAKU_II, "Zaku II")
            .type_id(1)
            .rarity_id(1)
            .set_id(1)
            .faction("Zeon")
            .series("UC")
            .level(3)
            .cost(2),
        CardBuilder::new(ids::CHARS_ZAKU, "Char's Zaku II")
            .type_id(1)
            .rarity_id(2)
            .set_id(1)
            .faction("Zeon")
            .series("UC")
            .level(4)
            .cost(3),
        CardBuilder::new(ids::GOUF, "Gouf")
            .type_id(1)
            .rarity_id(2)
            .set_id(2)
            .faction("Zeon")
            .series("UC")
            .level(4)
            .cost(3),
        CardBuilder::new(ids::GM, "GM")
            .type_id(1)
            .rarity_id(1)
            .set_id(2)
            .faction("Federation")
            .series("UC")
            .level(2)
            .cost(1),
        CardBuilder::new(ids::WHITE_BASE, "White Base")
            .type_id(2)
            .rarity_id(3)
            .set_id(1)
            .faction("Federation")
            .series("UC")
            .level(7)
            .cost(6),
        CardBuilder::new(ids::AMURO, "Amuro Ray")
            .type_id(3)
            .rarity_id(3)
            .set_id(1)
            .faction("Federation")
            .series("UC")
            .cost(1),
        CardBuilder::new(ids::ZAKU_WARRIOR, "Zaku Warrior")
            .type_id(1)
            .rarity_id(1)
            .set_id(3)
            .faction("ZAFT")
            .series("CE")
            .level(3)
            .cost(2),
    ];

    for card in cards {
        store.insert(card.build()).await;
    }
}
