//! Database repository for dishes and their cook assignments.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::dishes::{DishCreateDBRequest, DishDBResponse, DishUpdateDBRequest},
};
use crate::types::{CookId, DishId, DishTypeId};
use sqlx::{Connection, FromRow, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::instrument;

const SELECT_DISHES: &str = r#"
    SELECT d.id, d.name, d.description, d.price_cents, d.dish_type_id, t.name AS dish_type_name
    FROM dishes d
    JOIN dish_types t ON t.id = d.dish_type_id
"#;

/// Filter for listing dishes
#[derive(Debug, Clone, Default)]
pub struct DishFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive substring match on the dish name or its dish type's name
    pub search: Option<String>,
}

impl DishFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }
}

// Database entity model, joined with dish_types
#[derive(Debug, Clone, FromRow)]
struct Dish {
    pub id: DishId,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub dish_type_id: DishTypeId,
    pub dish_type_name: String,
}

impl From<(Vec<CookId>, Dish)> for DishDBResponse {
    fn from((cook_ids, dish): (Vec<CookId>, Dish)) -> Self {
        Self {
            id: dish.id,
            name: dish.name,
            description: dish.description,
            price_cents: dish.price_cents,
            dish_type_id: dish.dish_type_id,
            dish_type_name: dish.dish_type_name,
            cook_ids,
        }
    }
}

pub struct Dishes<'c> {
    db: &'c mut SqliteConnection,
}

fn push_search_clause(query: &mut QueryBuilder<'_, Sqlite>, search: Option<&str>) {
    if let Some(search) = search {
        let folded = search.to_lowercase();
        query.push(" AND (instr(d.name_folded, ");
        query.push_bind(folded.clone());
        query.push(") > 0 OR instr(t.name_folded, ");
        query.push_bind(folded);
        query.push(") > 0)");
    }
}

async fn fetch_dish(conn: &mut SqliteConnection, id: DishId) -> Result<Option<Dish>> {
    let dish = sqlx::query_as::<_, Dish>(&format!("{SELECT_DISHES} WHERE d.id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(dish)
}

async fn fetch_cook_ids(conn: &mut SqliteConnection, dish_ids: &[DishId]) -> Result<HashMap<DishId, Vec<CookId>>> {
    if dish_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new("SELECT dish_id, cook_id FROM dish_cooks WHERE dish_id IN (");
    let mut separated = query.separated(", ");
    for id in dish_ids {
        separated.push_bind(*id);
    }
    query.push(") ORDER BY dish_id, cook_id");

    let rows: Vec<(DishId, CookId)> = query.build_query_as().fetch_all(conn).await?;

    let mut result: HashMap<DishId, Vec<CookId>> = HashMap::new();
    for (dish_id, cook_id) in rows {
        result.entry(dish_id).or_default().push(cook_id);
    }
    Ok(result)
}

async fn insert_assignments(conn: &mut SqliteConnection, dish_id: DishId, cook_ids: &[CookId]) -> Result<()> {
    for cook_id in cook_ids {
        sqlx::query("INSERT INTO dish_cooks (dish_id, cook_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
            .bind(dish_id)
            .bind(*cook_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

impl<'c> Dishes<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    async fn attach_cooks(&mut self, dishes: Vec<Dish>) -> Result<Vec<DishDBResponse>> {
        let ids: Vec<DishId> = dishes.iter().map(|d| d.id).collect();
        let mut cook_ids = fetch_cook_ids(&mut *self.db, &ids).await?;

        Ok(dishes
            .into_iter()
            .map(|dish| {
                let cooks = cook_ids.remove(&dish.id).unwrap_or_default();
                DishDBResponse::from((cooks, dish))
            })
            .collect())
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &DishFilter) -> Result<i64> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM dishes d JOIN dish_types t ON t.id = d.dish_type_id WHERE 1=1");
        push_search_clause(&mut query, filter.search.as_deref());

        let count: i64 = query.build_query_scalar().fetch_one(&mut *self.db).await?;

        Ok(count)
    }

    /// Dishes a cook is assigned to, ordered by name then id
    #[instrument(skip(self), fields(cook_id = cook_id), err)]
    pub async fn list_for_cook(&mut self, cook_id: CookId) -> Result<Vec<DishDBResponse>> {
        let dishes = sqlx::query_as::<_, Dish>(&format!(
            "{SELECT_DISHES} JOIN dish_cooks dc ON dc.dish_id = d.id WHERE dc.cook_id = ? ORDER BY d.name, d.id"
        ))
        .bind(cook_id)
        .fetch_all(&mut *self.db)
        .await?;

        self.attach_cooks(dishes).await
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Dishes<'c> {
    type CreateRequest = DishCreateDBRequest;
    type UpdateRequest = DishUpdateDBRequest;
    type Response = DishDBResponse;
    type Id = DishId;
    type Filter = DishFilter;

    #[instrument(skip(self, request), fields(name = %request.name, cooks = request.cook_ids.len()), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // The dish row and its assignments are written together
        let mut tx = self.db.begin().await?;

        let id: DishId = sqlx::query_scalar(
            r#"
            INSERT INTO dishes (name, name_folded, description, price_cents, dish_type_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&request.name)
        .bind(request.name.to_lowercase())
        .bind(&request.description)
        .bind(request.price_cents)
        .bind(request.dish_type_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_assignments(&mut tx, id, &request.cook_ids).await?;

        let dish = fetch_dish(&mut tx, id).await?.ok_or(DbError::NotFound)?;
        let mut cook_ids = fetch_cook_ids(&mut tx, &[id]).await?;

        tx.commit().await?;

        Ok(DishDBResponse::from((cook_ids.remove(&id).unwrap_or_default(), dish)))
    }

    #[instrument(skip(self), fields(dish_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let Some(dish) = fetch_dish(&mut *self.db, id).await? else {
            return Ok(None);
        };
        let mut cook_ids = fetch_cook_ids(&mut *self.db, &[id]).await?;

        Ok(Some(DishDBResponse::from((cook_ids.remove(&id).unwrap_or_default(), dish))))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<DishId>) -> Result<HashMap<DishId, DishDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(SELECT_DISHES);
        query.push(" WHERE d.id IN (");
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        query.push(")");

        let dishes = query.build_query_as::<Dish>().fetch_all(&mut *self.db).await?;
        let dishes = self.attach_cooks(dishes).await?;

        Ok(dishes.into_iter().map(|d| (d.id, d)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_DISHES);
        query.push(" WHERE 1=1");
        push_search_clause(&mut query, filter.search.as_deref());

        query.push(" ORDER BY d.name, d.id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let dishes = query.build_query_as::<Dish>().fetch_all(&mut *self.db).await?;

        tracing::debug!("Retrieved {} dishes", dishes.len());

        self.attach_cooks(dishes).await
    }

    #[instrument(skip(self), fields(dish_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(dish_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // This update may touch dish_cooks too, so it always runs in its own transaction
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE dishes SET
                name = COALESCE(?, name),
                name_folded = COALESCE(?, name_folded),
                description = COALESCE(?, description),
                price_cents = COALESCE(?, price_cents),
                dish_type_id = COALESCE(?, dish_type_id)
            WHERE id = ?
            "#,
        )
        .bind(request.name.as_deref())
        .bind(request.name.as_ref().map(|n| n.to_lowercase()))
        .bind(request.description.as_deref())
        .bind(request.price_cents)
        .bind(request.dish_type_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        if let Some(cook_ids) = &request.cook_ids {
            sqlx::query("DELETE FROM dish_cooks WHERE dish_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_assignments(&mut tx, id, cook_ids).await?;
        }

        let dish = fetch_dish(&mut tx, id).await?.ok_or(DbError::NotFound)?;
        let mut cook_ids = fetch_cook_ids(&mut tx, &[id]).await?;

        tx.commit().await?;

        Ok(DishDBResponse::from((cook_ids.remove(&id).unwrap_or_default(), dish)))
    }
}
