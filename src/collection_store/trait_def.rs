//! CollectionStore trait definition.

use anyhow::Result;

use super::models::{Disc, DiscographyRow, Edition, FlagUpdate, NewRandomItem, RandomItem};

/// Trait for collection storage backends.
///
/// Row-level reads and writes plus the small set of aggregate queries the
/// statistics endpoint needs. Referential integrity is the store's problem;
/// callers do not re-validate ids they pass in.
pub trait CollectionStore: Send + Sync {
    // =========================================================================
    // Discography Read Model
    // =========================================================================

    /// Full discography listing, ordered by release date descending with
    /// ties broken by edition id ascending.
    fn list_discography_ordered(&self) -> Result<Vec<DiscographyRow>>;

    /// Rows flagged as wishlist, in storage order.
    fn list_wishlist_rows(&self) -> Result<Vec<DiscographyRow>>;

    // =========================================================================
    // Flag Writes
    // =========================================================================

    /// Unconditional overwrite of the purchase flag (last writer wins).
    fn update_purchase_flag(&self, edition_id: &str, is_purchased: bool) -> Result<FlagUpdate>;

    /// Unconditional overwrite of the wishlist flag (last writer wins).
    fn update_wishlist_flag(&self, edition_id: &str, is_wishlist: bool) -> Result<FlagUpdate>;

    // =========================================================================
    // Aggregate Queries (statistics)
    // =========================================================================

    /// Overall purchase percentage over all editions, in [0, 100].
    /// None when there are no editions at all.
    fn total_purchase_rate(&self) -> Result<Option<f64>>;

    /// Purchase percentage per artist, over artists with at least one
    /// edition, ordered by artist name.
    fn purchase_rate_by_artist(&self) -> Result<Vec<(String, f64)>>;

    /// Purchase percentage per country, over countries with at least one
    /// edition, ordered by country code.
    fn purchase_rate_by_country(&self) -> Result<Vec<(String, f64)>>;

    // =========================================================================
    // Random Items
    // =========================================================================

    /// Insert a random item, assigning its id and creation timestamp.
    /// Returns the assigned item id.
    fn insert_random_item(&self, item: NewRandomItem) -> Result<i64>;

    /// List random items, optionally filtered to one edition, in insertion
    /// order.
    fn list_random_items(&self, edition_id: Option<&str>) -> Result<Vec<RandomItem>>;

    // =========================================================================
    // Master Data (selection lists)
    // =========================================================================

    /// All discs.
    fn list_discs(&self) -> Result<Vec<Disc>>;

    /// Editions belonging to one disc.
    fn list_editions_by_disc(&self, disc_id: &str) -> Result<Vec<Edition>>;
}
