//! Collection data models.
//!
//! Serialized field names are camelCase because that is the wire contract
//! the frontend consumes (`discId`, `isPurchased`, ...).

use serde::{Deserialize, Serialize};

/// An album/release grouping one or more editions. Kept to the fields the
/// selection lists need; the richer per-disc columns surface through
/// [`DiscographyRow`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Disc {
    pub disc_id: String,
    pub artist: String,
    pub title: String,
}

/// A specific retail release of a disc (regular version, limited version...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    pub edition_id: String,
    pub disc_id: String,
    pub edition_name: Option<String>,
    pub display_name: Option<String>,
}

/// One row of the denormalized discography listing (`v_discography`),
/// joining disc and edition data. Keyed by `edition_id`; this is a
/// projection, so mutations go through the editions table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscographyRow {
    pub edition_id: String,
    pub disc_id: String,
    pub artist: String,
    pub title: String,
    pub title_sub: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub release_date: Option<String>,
    pub edition_name: Option<String>,
    pub display_name: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub remarks: Option<String>,
    pub tracklist: Option<String>,
    pub benefit: Option<String>,
    pub video_content: Option<String>,
    pub is_purchased: bool,
    pub is_wishlist: bool,
}

/// A bundled collectible (trading card, postcard...) tied to an edition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomItem {
    pub item_id: i64,
    pub edition_id: String,
    pub item_type: String,
    pub member_name: String,
    pub image_url: String,
    /// Unix seconds, set once when the row is written.
    pub created_at: i64,
}

/// Data for a random item about to be inserted; the store assigns the id
/// and the creation timestamp.
#[derive(Debug, Clone)]
pub struct NewRandomItem {
    pub edition_id: String,
    pub item_type: String,
    pub member_name: String,
    pub image_url: String,
}

/// Outcome of a point-write against an edition flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagUpdate {
    Updated,
    NotFound,
}
