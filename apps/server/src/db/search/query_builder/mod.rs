//! Query planning for card searches.
//!
//! Turns a normalized filter and validated options into a `QueryPlan`:
//! - a predicate tree over allow-listed card columns
//! - deterministic ordering (requested field, then `id`)
//! - skip/take pagination
//!
//! The plan renders to parameterized PostgreSQL. Request values only ever
//! travel as bind parameters.

use std::cmp::Ordering;

use super::params::{NormalizedFilter, SearchOptions, SortField, SortOrder};
use crate::models::Card;

mod bind;
mod filter;

use bind::push_int;
pub use filter::{Condition, Predicate};

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Int(i64),
}

/// Card columns a plan may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardColumn {
    Id,
    Name,
    TypeId,
    RarityId,
    SetId,
    Faction,
    Series,
    Level,
    Cost,
    CreatedAt,
    UpdatedAt,
}

impl CardColumn {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Id => "c.id",
            Self::Name => "c.name",
            Self::TypeId => "c.type_id",
            Self::RarityId => "c.rarity_id",
            Self::SetId => "c.set_id",
            Self::Faction => "c.faction",
            Self::Series => "c.series",
            Self::Level => "c.level",
            Self::Cost => "c.cost",
            Self::CreatedAt => "c.created_at",
            Self::UpdatedAt => "c.updated_at",
        }
    }

    fn int_value(self, card: &Card) -> Option<i64> {
        match self {
            Self::Id => Some(card.id),
            Self::TypeId => card.type_id,
            Self::RarityId => card.rarity_id,
            Self::SetId => card.set_id,
            Self::Level => card.level.map(i64::from),
            Self::Cost => card.cost.map(i64::from),
            _ => None,
        }
    }

    fn text_value(self, card: &Card) -> Option<&str> {
        match self {
            Self::Name => Some(card.name.as_str()),
            Self::Faction => card.faction.as_deref(),
            Self::Series => card.series.as_deref(),
            _ => None,
        }
    }
}

impl From<SortField> for CardColumn {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Name => Self::Name,
            SortField::Level => Self::Level,
            SortField::Cost => Self::Cost,
            SortField::CreatedAt => Self::CreatedAt,
            SortField::UpdatedAt => Self::UpdatedAt,
        }
    }
}

/// Requested sort plus the `id ASC` tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: SortField,
    pub order: SortOrder,
}

impl OrderBy {
    fn build_sql(&self) -> String {
        let direction = match self.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let column = CardColumn::from(self.field).sql();
        match self.field {
            SortField::Name => format!("lower({column}) {direction}, c.id ASC"),
            _ => format!("{column} {direction} NULLS LAST, c.id ASC"),
        }
    }

    /// Same ordering as the SQL rendering: missing values sort last in both directions.
    pub fn compare(&self, a: &Card, b: &Card) -> Ordering {
        let primary = match self.field {
            SortField::Name => {
                let ord = a.name.to_lowercase().cmp(&b.name.to_lowercase());
                self.directed(ord)
            }
            SortField::Level => self.compare_optional(a.level, b.level),
            SortField::Cost => self.compare_optional(a.cost, b.cost),
            SortField::CreatedAt => self.directed(a.created_at.cmp(&b.created_at)),
            SortField::UpdatedAt => self.directed(a.updated_at.cmp(&b.updated_at)),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    fn directed(&self, ord: Ordering) -> Ordering {
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }

    fn compare_optional<T: Ord>(&self, a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => self.directed(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Everything the data store needs to answer one page of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub predicate: Predicate,
    pub order_by: OrderBy,
    pub skip: u64,
    pub take: u32,
    pub include_relations: bool,
}

impl QueryPlan {
    pub fn build(filter: &NormalizedFilter, options: &SearchOptions) -> Self {
        let mut parts = Vec::new();

        if let Some(name) = &filter.name {
            parts.push(Predicate::Atom(Condition::NameContains(name.clone())));
        }
        for (field, value) in [
            (CardColumn::TypeId, filter.type_id),
            (CardColumn::RarityId, filter.rarity_id),
            (CardColumn::SetId, filter.set_id),
        ] {
            if let Some(value) = value {
                parts.push(Predicate::Atom(Condition::IdEquals { field, value }));
            }
        }
        for (field, value) in [
            (CardColumn::Faction, &filter.faction),
            (CardColumn::Series, &filter.series),
        ] {
            if let Some(value) = value {
                parts.push(Predicate::Atom(Condition::TextEquals {
                    field,
                    value: value.clone(),
                }));
            }
        }
        for (field, range) in [(CardColumn::Level, filter.level), (CardColumn::Cost, filter.cost)] {
            if let Some(range) = range {
                if range.is_inverted() {
                    parts.push(Predicate::Never);
                } else {
                    parts.push(Predicate::Atom(Condition::Range { field, range }));
                }
            }
        }

        Self {
            predicate: Predicate::and(parts),
            order_by: OrderBy {
                field: options.sort_by,
                order: options.sort_order,
            },
            skip: options.offset(),
            take: options.limit,
            include_relations: options.include_relations,
        }
    }

    /// True when no card can match and the store need not be asked.
    pub fn is_empty_result(&self) -> bool {
        self.predicate.is_never()
    }

    /// Page query: card columns (plus relation names when requested), ordered and paginated.
    pub fn build_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let mut sql = String::from(
            "SELECT c.id, c.name, c.type_id, c.rarity_id, c.set_id, c.faction, c.series, \
             c.level, c.cost, c.created_at, c.updated_at, ",
        );

        if self.include_relations {
            sql.push_str(
                "t.name AS type_name, r.name AS rarity_name, s.name AS set_name \
                 FROM cards c \
                 LEFT JOIN card_types t ON t.id = c.type_id \
                 LEFT JOIN rarities r ON r.id = c.rarity_id \
                 LEFT JOIN card_sets s ON s.id = c.set_id",
            );
        } else {
            sql.push_str(
                "NULL::text AS type_name, NULL::text AS rarity_name, NULL::text AS set_name \
                 FROM cards c",
            );
        }

        sql.push_str(" WHERE ");
        sql.push_str(&self.predicate.build_sql(&mut bind_params));
        sql.push_str(" ORDER BY ");
        sql.push_str(&self.order_by.build_sql());

        let limit_idx = push_int(&mut bind_params, self.take as i64);
        let offset_idx = push_int(
            &mut bind_params,
            i64::try_from(self.skip).unwrap_or(i64::MAX),
        );
        sql.push_str(&format!(" LIMIT ${limit_idx} OFFSET ${offset_idx}"));

        (sql, bind_params)
    }

    /// Total number of matching cards, ignoring pagination.
    pub fn build_count_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let mut sql = String::from("SELECT COUNT(*) FROM cards c WHERE ");
        sql.push_str(&self.predicate.build_sql(&mut bind_params));
        (sql, bind_params)
    }

    /// Apply the plan to cards held in memory: filter, order, paginate.
    ///
    /// Returns the requested page and the total number of matches.
    pub fn apply<'a, I>(&self, cards: I) -> (Vec<&'a Card>, i64)
    where
        I: IntoIterator<Item = &'a Card>,
    {
        if self.is_empty_result() {
            return (Vec::new(), 0);
        }
        let mut matched: Vec<&Card> = cards
            .into_iter()
            .filter(|card| self.predicate.matches(card))
            .collect();
        let total = matched.len() as i64;
        matched.sort_by(|a, b| self.order_by.compare(a, b));
        let page = matched
            .into_iter()
            .skip(usize::try_from(self.skip).unwrap_or(usize::MAX))
            .take(self.take as usize)
            .collect();
        (page, total)
    }
}
