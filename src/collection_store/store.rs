//! SQLite-backed collection store implementation.

use super::models::{Disc, DiscographyRow, Edition, FlagUpdate, NewRandomItem, RandomItem};
use super::schema::COLLECTION_SCHEMA;
use super::trait_def::CollectionStore;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed collection store.
///
/// A single connection guarded by a mutex; every statement is its own
/// row-level atomicity unit, which is all the flag-write contract needs.
pub struct SqliteCollectionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCollectionStore {
    /// Open an existing collection database or create a new one with the
    /// current schema.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                &db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(&db_path)?;
            COLLECTION_SCHEMA.create(&conn)?;
            info!(
                "Created new collection database at {:?}",
                db_path.as_ref()
            );
            conn
        };

        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        let db_version: i64 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .context("Failed to read database version")?;
        if db_version as usize != COLLECTION_SCHEMA.version {
            bail!(
                "Collection database version {} is not supported (expected {})",
                db_version,
                COLLECTION_SCHEMA.version
            );
        }

        COLLECTION_SCHEMA.validate(&conn)?;

        Ok(SqliteCollectionStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store for testing.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        COLLECTION_SCHEMA.create(&conn)?;
        Ok(SqliteCollectionStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // =========================================================================
    // Out-of-band seeding
    // =========================================================================
    //
    // Discs and editions are reference data with no create API; they are
    // loaded by import scripts and test fixtures through these helpers on
    // the concrete store.

    #[allow(clippy::too_many_arguments)]
    pub fn insert_disc(
        &self,
        disc_id: &str,
        artist: &str,
        title: &str,
        title_sub: Option<&str>,
        category: Option<&str>,
        country: Option<&str>,
        release_date: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO discs (disc_id, artist, title, title_sub, category, country, release_date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![disc_id, artist, title, title_sub, category, country, release_date],
        )
        .with_context(|| format!("Failed to insert disc {}", disc_id))?;
        Ok(())
    }

    pub fn insert_edition(
        &self,
        edition_id: &str,
        disc_id: &str,
        edition_name: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO editions (edition_id, disc_id, edition_name, display_name) \
             VALUES (?1, ?2, ?3, ?4)",
            params![edition_id, disc_id, edition_name, display_name],
        )
        .with_context(|| format!("Failed to insert edition {}", edition_id))?;
        Ok(())
    }

    // =========================================================================
    // Row Counts (startup banner)
    // =========================================================================

    pub fn disc_count(&self) -> usize {
        self.count_rows("discs")
    }

    pub fn edition_count(&self) -> usize {
        self.count_rows("editions")
    }

    pub fn random_item_count(&self) -> usize {
        self.count_rows("random_items")
    }

    fn count_rows(&self, table: &str) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
            r.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }

    // =========================================================================
    // Row Mapping
    // =========================================================================

    fn row_to_discography(row: &rusqlite::Row) -> rusqlite::Result<DiscographyRow> {
        Ok(DiscographyRow {
            edition_id: row.get("edition_id")?,
            disc_id: row.get("disc_id")?,
            artist: row.get("artist")?,
            title: row.get("title")?,
            title_sub: row.get("title_sub")?,
            category: row.get("category")?,
            country: row.get("country")?,
            release_date: row.get("release_date")?,
            edition_name: row.get("edition_name")?,
            display_name: row.get("display_name")?,
            price: row.get("price")?,
            currency: row.get("currency")?,
            remarks: row.get("remarks")?,
            tracklist: row.get("tracklist")?,
            benefit: row.get("benefit")?,
            video_content: row.get("video_content")?,
            is_purchased: row.get("is_purchased")?,
            is_wishlist: row.get("is_wishlist")?,
        })
    }

    fn row_to_random_item(row: &rusqlite::Row) -> rusqlite::Result<RandomItem> {
        Ok(RandomItem {
            item_id: row.get("item_id")?,
            edition_id: row.get("edition_id")?,
            item_type: row.get("item_type")?,
            member_name: row.get("member_name")?,
            image_url: row.get("image_url")?,
            created_at: row.get("created_at")?,
        })
    }

    fn query_discography(&self, sql: &str) -> Result<Vec<DiscographyRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], Self::row_to_discography)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn update_edition_flag(
        &self,
        column: &str,
        edition_id: &str,
        value: bool,
    ) -> Result<FlagUpdate> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute(
                &format!("UPDATE editions SET {} = ?2 WHERE edition_id = ?1", column),
                params![edition_id, value],
            )
            .with_context(|| format!("Failed to update {} for edition {}", column, edition_id))?;
        if affected == 0 {
            Ok(FlagUpdate::NotFound)
        } else {
            Ok(FlagUpdate::Updated)
        }
    }

    fn query_group_rates(&self, sql: &str) -> Result<Vec<(String, f64)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl CollectionStore for SqliteCollectionStore {
    fn list_discography_ordered(&self) -> Result<Vec<DiscographyRow>> {
        self.query_discography(
            "SELECT * FROM v_discography ORDER BY release_date DESC, edition_id ASC",
        )
    }

    fn list_wishlist_rows(&self) -> Result<Vec<DiscographyRow>> {
        self.query_discography("SELECT * FROM v_discography WHERE is_wishlist = 1")
    }

    fn update_purchase_flag(&self, edition_id: &str, is_purchased: bool) -> Result<FlagUpdate> {
        self.update_edition_flag("is_purchased", edition_id, is_purchased)
    }

    fn update_wishlist_flag(&self, edition_id: &str, is_wishlist: bool) -> Result<FlagUpdate> {
        self.update_edition_flag("is_wishlist", edition_id, is_wishlist)
    }

    fn total_purchase_rate(&self) -> Result<Option<f64>> {
        let conn = self.conn.lock().unwrap();
        // COUNT(*) of zero rows makes the division NULL, which maps to None.
        let rate = conn.query_row(
            "SELECT COUNT(CASE WHEN is_purchased = 1 THEN 1 END) * 100.0 / COUNT(*) \
             FROM editions",
            [],
            |row| row.get::<_, Option<f64>>(0),
        )?;
        Ok(rate)
    }

    fn purchase_rate_by_artist(&self) -> Result<Vec<(String, f64)>> {
        self.query_group_rates(
            "SELECT d.artist, COUNT(CASE WHEN e.is_purchased = 1 THEN 1 END) * 100.0 / COUNT(*) AS rate \
             FROM discs d JOIN editions e ON d.disc_id = e.disc_id \
             GROUP BY d.artist ORDER BY d.artist",
        )
    }

    fn purchase_rate_by_country(&self) -> Result<Vec<(String, f64)>> {
        self.query_group_rates(
            "SELECT d.country, COUNT(CASE WHEN e.is_purchased = 1 THEN 1 END) * 100.0 / COUNT(*) AS rate \
             FROM discs d JOIN editions e ON d.disc_id = e.disc_id \
             WHERE d.country IS NOT NULL \
             GROUP BY d.country ORDER BY d.country",
        )
    }

    fn insert_random_item(&self, item: NewRandomItem) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let created_at = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO random_items (edition_id, item_type, member_name, image_url, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                item.edition_id,
                item.item_type,
                item.member_name,
                item.image_url,
                created_at
            ],
        )
        .with_context(|| format!("Failed to insert random item for edition {}", item.edition_id))?;
        Ok(conn.last_insert_rowid())
    }

    fn list_random_items(&self, edition_id: Option<&str>) -> Result<Vec<RandomItem>> {
        let conn = self.conn.lock().unwrap();
        let mut items = Vec::new();
        match edition_id {
            Some(edition_id) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM random_items WHERE edition_id = ?1 ORDER BY item_id",
                )?;
                let rows = stmt.query_map(params![edition_id], Self::row_to_random_item)?;
                for row in rows {
                    items.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM random_items ORDER BY item_id")?;
                let rows = stmt.query_map([], Self::row_to_random_item)?;
                for row in rows {
                    items.push(row?);
                }
            }
        }
        Ok(items)
    }

    fn list_discs(&self) -> Result<Vec<Disc>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT disc_id, artist, title FROM discs ORDER BY disc_id")?;
        let discs = stmt
            .query_map([], |row| {
                Ok(Disc {
                    disc_id: row.get(0)?,
                    artist: row.get(1)?,
                    title: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(discs)
    }

    fn list_editions_by_disc(&self, disc_id: &str) -> Result<Vec<Edition>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT edition_id, disc_id, edition_name, display_name \
             FROM editions WHERE disc_id = ?1 ORDER BY edition_id",
        )?;
        let editions = stmt
            .query_map(params![disc_id], |row| {
                Ok(Edition {
                    edition_id: row.get(0)?,
                    disc_id: row.get(1)?,
                    edition_name: row.get(2)?,
                    display_name: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(editions)
    }
}
