//! SQLite schema for the collection database.
//!
//! Discs and editions are seeded out-of-band and read-mostly; random items
//! are append-only. The discography listing is a view over the join so flag
//! updates only ever touch the editions table.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, View,
};

/// Discs table - one row per album/release.
const DISCS_TABLE: Table = Table {
    name: "discs",
    columns: &[
        sqlite_column!("disc_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("title_sub", &SqlType::Text), // "-1st Mini Album-" style subtitle
        sqlite_column!("category", &SqlType::Text),  // 'album', 'single', ...
        sqlite_column!("country", &SqlType::Text),   // release market, 'jp', 'kr', ...
        sqlite_column!("release_date", &SqlType::Text), // ISO date, drives listing order
    ],
    indices: &[("idx_discs_artist", "artist")],
};

const DISC_FK: ForeignKey = ForeignKey {
    foreign_table: "discs",
    foreign_column: "disc_id",
    on_delete: ForeignKeyOnChange::Restrict,
};

/// Editions table - one row per retail form of a disc. Owns the purchase
/// and wishlist flags.
const EDITIONS_TABLE: Table = Table {
    name: "editions",
    columns: &[
        sqlite_column!("edition_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "disc_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&DISC_FK)
        ),
        sqlite_column!("edition_name", &SqlType::Text),
        sqlite_column!("display_name", &SqlType::Text),
        sqlite_column!("price", &SqlType::Integer),
        sqlite_column!("currency", &SqlType::Text),
        sqlite_column!("remarks", &SqlType::Text),
        sqlite_column!("tracklist", &SqlType::Text),
        sqlite_column!("benefit", &SqlType::Text),
        sqlite_column!("video_content", &SqlType::Text),
        sqlite_column!(
            "is_purchased",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "is_wishlist",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[
        ("idx_editions_disc", "disc_id"),
        ("idx_editions_wishlist", "is_wishlist"),
    ],
};

const EDITION_FK: ForeignKey = ForeignKey {
    foreign_table: "editions",
    foreign_column: "edition_id",
    on_delete: ForeignKeyOnChange::Restrict,
};

/// Random items table - append-only collectibles with their uploaded image
/// URL. `created_at` is written once at insert and never updated.
const RANDOM_ITEMS_TABLE: Table = Table {
    name: "random_items",
    columns: &[
        sqlite_column!("item_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "edition_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&EDITION_FK)
        ),
        sqlite_column!("item_type", &SqlType::Text, non_null = true),
        sqlite_column!("member_name", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text, non_null = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_random_items_edition", "edition_id")],
};

/// The discography read model: disc columns plus edition columns, keyed by
/// edition_id.
const DISCOGRAPHY_VIEW: View = View {
    name: "v_discography",
    select_sql: "SELECT e.edition_id, d.disc_id, d.artist, d.title, d.title_sub, \
                 d.category, d.country, d.release_date, e.edition_name, e.display_name, \
                 e.price, e.currency, e.remarks, e.tracklist, e.benefit, e.video_content, \
                 e.is_purchased, e.is_wishlist \
                 FROM editions e JOIN discs d ON e.disc_id = d.disc_id",
};

pub const COLLECTION_SCHEMA: VersionedSchema = VersionedSchema {
    version: 1,
    tables: &[DISCS_TABLE, EDITIONS_TABLE, RANDOM_ITEMS_TABLE],
    views: &[DISCOGRAPHY_VIEW],
};
