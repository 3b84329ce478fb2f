//! Collection storage: discs, editions, random items and the denormalized
//! discography read model.

pub mod models;
pub mod schema;
mod store;
mod trait_def;

pub use models::{Disc, DiscographyRow, Edition, FlagUpdate, NewRandomItem, RandomItem};
pub use store::SqliteCollectionStore;
pub use trait_def::CollectionStore;
