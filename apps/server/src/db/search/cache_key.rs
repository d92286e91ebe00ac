//! Deterministic cache keys for normalized searches

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use super::params::{NormalizedFilter, SearchOptions};

/// Bumped whenever the canonical form changes so old and new keys never meet.
const KEY_FORMAT_VERSION: &str = "cards.search.v1";

/// Bytes of the SHA-256 digest kept in the key (128 bits).
const KEY_BYTES: usize = 16;

/// Fixed-length identifier for one normalized search: 32 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(filter: &NormalizedFilter, options: &SearchOptions) -> Self {
        let digest = Sha256::digest(canonical_form(filter, options).as_bytes());
        Self(hex::encode(&digest[..KEY_BYTES]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Version tag followed by sorted-key JSON of filters and options.
fn canonical_form(filter: &NormalizedFilter, options: &SearchOptions) -> String {
    let document = BTreeMap::from([
        ("filters", filter.canonical_fields()),
        ("options", options.canonical_fields()),
    ]);
    // Maps of JSON scalars always serialize.
    let json = serde_json::to_string(&document).unwrap_or_default();
    format!("{KEY_FORMAT_VERSION}:{json}")
}
