//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction and implements the
//! [`Repository`] trait for one record kind:
//!
//! - [`DishTypes`]: dish categories, searchable by name
//! - [`Dishes`]: dishes and their cook assignments, searchable by dish or dish type name
//! - [`Cooks`]: cooks, which are also the identities the service authenticates
//!
//! Writes that touch more than one table open their own transaction on the wrapped
//! connection, so a repository built from a plain pooled connection is still atomic:
//!
//! ```ignore
//! use kitchen::db::handlers::{Dishes, Repository};
//!
//! let mut conn = pool.acquire().await?;
//! let dish = Dishes::new(&mut conn).create(&request).await?;
//! ```

pub mod cooks;
pub mod dish_types;
pub mod dishes;
pub mod repository;

pub use cooks::Cooks;
pub use dish_types::DishTypes;
pub use dishes::Dishes;
pub use repository::Repository;
