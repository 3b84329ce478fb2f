//! Test database fixtures.

use super::constants::*;
use anyhow::Result;
use shinee_collection_server::collection_store::SqliteCollectionStore;
use tempfile::TempDir;

/// Create a temporary collection database seeded with two discs and three
/// editions. The TempDir must stay alive as long as the store is used.
pub fn create_test_collection() -> Result<(TempDir, SqliteCollectionStore)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("collection.db");
    let store = SqliteCollectionStore::new(&db_path)?;

    store.insert_disc(
        DISC_1_ID,
        DISC_1_ARTIST,
        DISC_1_TITLE,
        Some("-1st Mini-"),
        Some("album"),
        Some("jp"),
        Some("2024-06-26"),
    )?;
    store.insert_disc(
        DISC_2_ID,
        DISC_2_ARTIST,
        DISC_2_TITLE,
        None,
        Some("album"),
        Some("kr"),
        Some("2022-04-11"),
    )?;

    store.insert_edition(EDITION_1_ID, DISC_1_ID, Some("regular"), Some("通常盤"))?;
    store.insert_edition(EDITION_2_ID, DISC_1_ID, Some("limited"), Some("初回限定盤"))?;
    store.insert_edition(EDITION_3_ID, DISC_2_ID, Some("digipack"), Some("Digipack Ver."))?;

    Ok((temp_dir, store))
}
