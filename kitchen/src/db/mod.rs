//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with SQLite.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries and transactions)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Transactions
//!
//! Handlers that read before they write (existence checks, then the write) do both inside
//! one transaction and hand the transaction to the repositories. Such transactions are opened
//! with [`begin_write`]:
//!
//! ```ignore
//! let mut tx = db::begin_write(&pool).await?;
//! let dish_type = DishTypes::new(&mut tx).get_by_id(id).await?;
//! let dish = Dishes::new(&mut tx).create(&request).await?;
//! tx.commit().await?;
//! ```
//!
//! A plain `BEGIN` is deferred: it starts as a reader and upgrades on its first write. If
//! another connection commits in between, the upgrade fails at once with `SQLITE_BUSY`
//! and the busy timeout never applies. `BEGIN IMMEDIATE` takes the write lock up front, so
//! competing writers queue on the busy timeout instead.
//!
//! Foreign keys are enforced (deleting a dish type removes its dishes), and the
//! connection pool runs in WAL mode. See [`crate::setup_database`].
//!
//! # Migrations
//!
//! Database migrations are managed by SQLx and located in the `migrations/` directory.
//! The [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! kitchen::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;

use sqlx::{Sqlite, SqlitePool, Transaction};

/// Begin a transaction that holds SQLite's write lock from the start.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}
