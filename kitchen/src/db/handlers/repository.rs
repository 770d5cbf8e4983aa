//! The [`Repository`] trait shared by the dish type, dish and cook stores.

use std::collections::HashMap;

use crate::db::errors::Result;

/// CRUD over one kitchen table and the association rows it owns.
///
/// Implementors borrow a `SqliteConnection` for their lifetime, so the same repository code
/// runs on a pooled connection or inside a caller's transaction:
///
/// ```ignore
/// let mut tx = db::begin_write(&pool).await?;
/// let soup = DishTypes::new(&mut tx).create(&request).await?;
/// let dishes = Dishes::new(&mut tx).list(&DishFilter::new(0, 10)).await?;
/// tx.commit().await?;
/// ```
///
/// Lookups that find nothing return `Ok(None)` or `Ok(false)`; only [`update`](Self::update)
/// reports a missing row as [`DbError::NotFound`](crate::db::errors::DbError::NotFound).
#[async_trait::async_trait]
pub trait Repository {
    /// Store request for a new row
    type CreateRequest;

    /// Store request for a partial update; `None` fields keep their value
    type UpdateRequest;

    /// Row as returned to handlers, with its associations resolved
    type Response;

    type Id: Send + Sync;

    /// Search text and page window for [`list`](Self::list)
    type Filter: Send + Sync;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Rows for `ids`, keyed by ID. Unknown IDs are absent from the map.
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>>;

    /// One page of rows matching the filter, in display order.
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Returns whether a row was removed. Dependent rows follow the schema's cascade rules.
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}
