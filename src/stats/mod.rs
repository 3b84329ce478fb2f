//! Collection completion statistics.
//!
//! Combines the store's three purchase-rate aggregates into one typed
//! result. The HTTP layer flattens it back to the `{"total": N, "<artist>":
//! N, "<country>": N}` map the progress bars consume.

use serde::Serialize;
use thiserror::Error;

use crate::collection_store::CollectionStore;

/// A rounded purchase percentage for one grouping label (an artist name or
/// a country code).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GroupRate {
    pub label: String,
    pub rate: i64,
}

/// Aggregate completion statistics over the whole collection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollectionStats {
    /// Overall purchase percentage; 0 when there are no editions.
    pub total: i64,
    /// Per-artist rates, ordered by artist name.
    pub by_artist: Vec<GroupRate>,
    /// Per-country rates, ordered by country code.
    pub by_country: Vec<GroupRate>,
}

impl CollectionStats {
    /// Flatten to the wire shape: `total` first, then one key per artist,
    /// then one key per country. A label equal to `"total"` or to another
    /// label overwrites the earlier entry; the labels are assumed disjoint
    /// and no guard is attempted.
    pub fn to_wire_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("total".to_string(), self.total.into());
        for group in self.by_artist.iter().chain(self.by_country.iter()) {
            map.insert(group.label.clone(), group.rate.into());
        }
        map
    }
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("collection storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),
}

/// Percentages are shown as integers; ties round away from zero, so 74.5
/// becomes 75.
fn round_rate(rate: f64) -> i64 {
    rate.round() as i64
}

/// Compute the completion statistics from the current store state.
///
/// Read-only and deterministic for a fixed database state. Fails without a
/// partial result if any of the three aggregate queries fails.
pub fn collection_stats(store: &dyn CollectionStore) -> Result<CollectionStats, StatsError> {
    let total = store
        .total_purchase_rate()
        .map_err(StatsError::StorageUnavailable)?
        .map(round_rate)
        .unwrap_or(0);

    let by_artist = store
        .purchase_rate_by_artist()
        .map_err(StatsError::StorageUnavailable)?
        .into_iter()
        .map(|(label, rate)| GroupRate {
            label,
            rate: round_rate(rate),
        })
        .collect();

    let by_country = store
        .purchase_rate_by_country()
        .map_err(StatsError::StorageUnavailable)?
        .into_iter()
        .map(|(label, rate)| GroupRate {
            label,
            rate: round_rate(rate),
        })
        .collect();

    Ok(CollectionStats {
        total,
        by_artist,
        by_country,
    })
}
