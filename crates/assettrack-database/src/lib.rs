//! # assettrack-database
//!
//! Persistence for AssetTrack: the [`AssetStore`] / [`StoreTransaction`]
//! abstraction the services are written against, a PostgreSQL
//! implementation built on sqlx repositories, and an in-memory
//! implementation with write-failure injection for tests and demos.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use postgres::PgAssetStore;
pub use store::{AssetQuery, AssetStore, StoreTransaction};
