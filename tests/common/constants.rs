//! Shared fixture data for the end-to-end tests.

pub const DISC_1_ID: &str = "D001";
pub const DISC_1_ARTIST: &str = "SHINee";
pub const DISC_1_TITLE: &str = "HUNTER";

pub const DISC_2_ID: &str = "D002";
pub const DISC_2_ARTIST: &str = "Onew";
pub const DISC_2_TITLE: &str = "DICE";

/// 2024-06-26 release, regular edition.
pub const EDITION_1_ID: &str = "D001-01";
/// 2024-06-26 release, limited edition.
pub const EDITION_2_ID: &str = "D001-02";
/// 2022-04-11 release.
pub const EDITION_3_ID: &str = "D002-01";
