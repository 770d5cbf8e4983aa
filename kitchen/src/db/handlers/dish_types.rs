//! Database repository for dish types.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::dish_types::{DishTypeCreateDBRequest, DishTypeDBResponse, DishTypeUpdateDBRequest},
};
use crate::types::DishTypeId;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing dish types
#[derive(Debug, Clone, Default)]
pub struct DishTypeFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>, // Case-insensitive substring match on name
}

impl DishTypeFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct DishType {
    pub id: DishTypeId,
    pub name: String,
}

impl From<DishType> for DishTypeDBResponse {
    fn from(dish_type: DishType) -> Self {
        Self {
            id: dish_type.id,
            name: dish_type.name,
        }
    }
}

pub struct DishTypes<'c> {
    db: &'c mut SqliteConnection,
}

fn push_search_clause(query: &mut QueryBuilder<'_, Sqlite>, search: Option<&str>) {
    if let Some(search) = search {
        query.push(" AND instr(name_folded, ");
        query.push_bind(search.to_lowercase());
        query.push(") > 0");
    }
}

#[async_trait::async_trait]
impl<'c> Repository for DishTypes<'c> {
    type CreateRequest = DishTypeCreateDBRequest;
    type UpdateRequest = DishTypeUpdateDBRequest;
    type Response = DishTypeDBResponse;
    type Id = DishTypeId;
    type Filter = DishTypeFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let dish_type = sqlx::query_as::<_, DishType>(
            r#"
            INSERT INTO dish_types (name, name_folded)
            VALUES (?, ?)
            RETURNING id, name
            "#,
        )
        .bind(&request.name)
        .bind(request.name.to_lowercase())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(DishTypeDBResponse::from(dish_type))
    }

    #[instrument(skip(self), fields(dish_type_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let dish_type = sqlx::query_as::<_, DishType>("SELECT id, name FROM dish_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(dish_type.map(DishTypeDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<DishTypeId>) -> Result<HashMap<DishTypeId, DishTypeDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name FROM dish_types WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        query.push(")");

        let dish_types = query.build_query_as::<DishType>().fetch_all(&mut *self.db).await?;

        Ok(dish_types.into_iter().map(|t| (t.id, DishTypeDBResponse::from(t))).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name FROM dish_types WHERE 1=1");
        push_search_clause(&mut query, filter.search.as_deref());

        // id breaks ties so repeated queries page identically
        query.push(" ORDER BY name, id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let dish_types = query.build_query_as::<DishType>().fetch_all(&mut *self.db).await?;

        tracing::debug!("Retrieved {} dish types", dish_types.len());

        Ok(dish_types.into_iter().map(DishTypeDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(dish_type_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // Dishes of this type go with it (ON DELETE CASCADE), and their cook assignments with them
        let result = sqlx::query("DELETE FROM dish_types WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(dish_type_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let dish_type = sqlx::query_as::<_, DishType>(
            r#"
            UPDATE dish_types SET
                name = COALESCE(?, name),
                name_folded = COALESCE(?, name_folded)
            WHERE id = ?
            RETURNING id, name
            "#,
        )
        .bind(request.name.as_deref())
        .bind(request.name.as_ref().map(|n| n.to_lowercase()))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(DishTypeDBResponse::from(dish_type))
    }
}

impl<'c> DishTypes<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &DishTypeFilter) -> Result<i64> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM dish_types WHERE 1=1");
        push_search_clause(&mut query, filter.search.as_deref());

        let count: i64 = query.build_query_scalar().fetch_one(&mut *self.db).await?;

        Ok(count)
    }
}
