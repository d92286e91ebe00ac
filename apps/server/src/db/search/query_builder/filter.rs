use super::bind::{push_int, push_text};
use super::{BindValue, CardColumn};
use crate::db::search::params::NumericRange;
use crate::db::search::string_normalization::{escape_like_pattern, normalize_filter_text};
use crate::models::Card;

/// Boolean filter over cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every card.
    All,
    /// Matches nothing; the engine answers without touching the store.
    Never,
    And(Vec<Predicate>),
    Atom(Condition),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Case-insensitive substring match on the card name.
    NameContains(String),
    IdEquals { field: CardColumn, value: i64 },
    /// Case-insensitive equality; `value` is already normalized.
    TextEquals { field: CardColumn, value: String },
    /// Inclusive bounds; a card without a value never matches.
    Range { field: CardColumn, range: NumericRange },
}

impl Predicate {
    /// Conjunction that folds `All` away and short-circuits on `Never`.
    pub fn and(parts: Vec<Predicate>) -> Predicate {
        let mut flat = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Predicate::All => {}
                Predicate::Never => return Predicate::Never,
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::All,
            1 => flat.remove(0),
            _ => Predicate::And(flat),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Predicate::Never)
    }

    pub(crate) fn build_sql(&self, bind_params: &mut Vec<BindValue>) -> String {
        match self {
            Self::All => "TRUE".to_string(),
            Self::Never => "FALSE".to_string(),
            Self::And(parts) => {
                let clauses: Vec<String> =
                    parts.iter().map(|p| p.build_sql(bind_params)).collect();
                format!("({})", clauses.join(" AND "))
            }
            Self::Atom(condition) => condition.build_sql(bind_params),
        }
    }

    /// Evaluate the predicate against a card held in memory.
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            Self::All => true,
            Self::Never => false,
            Self::And(parts) => parts.iter().all(|p| p.matches(card)),
            Self::Atom(condition) => condition.matches(card),
        }
    }
}

/// SQL form of `normalize_filter_text` applied to a column: NFKC, collapsed
/// whitespace, trimmed, lowercased. Must stay in step with the expression
/// indexes in `migrations/0001_init.sql`.
fn canonical_text_sql(field: CardColumn) -> String {
    format!(
        "lower(btrim(regexp_replace(normalize({}, NFKC), '\\s+', ' ', 'g')))",
        field.sql()
    )
}

impl Condition {
    fn build_sql(&self, bind_params: &mut Vec<BindValue>) -> String {
        match self {
            Self::NameContains(value) => {
                let idx = push_text(bind_params, format!("%{}%", escape_like_pattern(value)));
                format!("{} LIKE ${}", canonical_text_sql(CardColumn::Name), idx)
            }
            Self::IdEquals { field, value } => {
                let idx = push_int(bind_params, *value);
                format!("{} = ${}", field.sql(), idx)
            }
            Self::TextEquals { field, value } => {
                let idx = push_text(bind_params, value.clone());
                format!("{} = ${}", canonical_text_sql(*field), idx)
            }
            Self::Range { field, range } => {
                let mut clauses = Vec::with_capacity(2);
                if let Some(min) = range.min {
                    let idx = push_int(bind_params, min as i64);
                    clauses.push(format!("{} >= ${}", field.sql(), idx));
                }
                if let Some(max) = range.max {
                    let idx = push_int(bind_params, max as i64);
                    clauses.push(format!("{} <= ${}", field.sql(), idx));
                }
                if clauses.is_empty() {
                    format!("{} IS NOT NULL", field.sql())
                } else {
                    clauses.join(" AND ")
                }
            }
        }
    }

    fn matches(&self, card: &Card) -> bool {
        match self {
            Self::NameContains(value) => normalize_filter_text(&card.name)
                .is_some_and(|name| name.contains(value.as_str())),
            Self::IdEquals { field, value } => field.int_value(card) == Some(*value),
            Self::TextEquals { field, value } => field
                .text_value(card)
                .and_then(normalize_filter_text)
                .is_some_and(|v| v == *value),
            Self::Range { field, range } => field
                .int_value(card)
                .and_then(|v| i32::try_from(v).ok())
                .is_some_and(|v| range.contains(v)),
        }
    }
}
