use crate::api::models::cooks::CookSummary;
use crate::api::models::dishes::{DishCreate, DishResponse, DishUpdate, ListDishesQuery};
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::search::search_term;
use crate::api::models::validation::JsonBody;
use crate::auth::permissions::{RequiresPermission, operation, resource};
use crate::db::handlers::{Cooks, DishTypes, Dishes, Repository, dishes::DishFilter};
use crate::db::models::dishes::{DishCreateDBRequest, DishDBResponse, DishUpdateDBRequest};
use crate::errors::{Error, FieldErrors, Result};
use crate::types::{CookId, DishId, DishTypeId};
use crate::{AppState, db, db::errors::DbError};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use sqlx::SqliteConnection;
use std::collections::HashMap;

fn not_found(id: DishId) -> Error {
    Error::NotFound {
        resource: "Dish".to_string(),
        id: id.to_string(),
    }
}

/// Reject references to dish types or cooks that don't exist as field errors, before the
/// write reaches a foreign key.
async fn check_references(conn: &mut SqliteConnection, dish_type_id: Option<DishTypeId>, cook_ids: &[CookId]) -> Result<()> {
    let mut errors = FieldErrors::new();

    if let Some(dish_type_id) = dish_type_id
        && DishTypes::new(&mut *conn).get_by_id(dish_type_id).await?.is_none()
    {
        errors.add(
            "dish_type_id",
            "Select a valid choice. That choice is not one of the available choices.",
        );
    }

    if !cook_ids.is_empty() {
        let found = Cooks::new(&mut *conn).get_bulk(cook_ids.to_vec()).await?;
        for id in cook_ids.iter().filter(|id| !found.contains_key(*id)) {
            errors.add(
                "cook_ids",
                format!("Select a valid choice. {id} is not one of the available choices."),
            );
        }
    }

    errors.into_result()
}

/// Build full responses for `dishes`, loading every assigned cook in one query.
async fn with_cooks(conn: &mut SqliteConnection, dishes: Vec<DishDBResponse>) -> Result<Vec<DishResponse>> {
    let mut ids: Vec<CookId> = dishes.iter().flat_map(|d| d.cook_ids.iter().copied()).collect();
    ids.sort_unstable();
    ids.dedup();

    let cooks: HashMap<CookId, CookSummary> = Cooks::new(conn)
        .get_bulk(ids)
        .await?
        .into_iter()
        .map(|(id, cook)| (id, CookSummary::from(cook)))
        .collect();

    Ok(dishes
        .into_iter()
        .map(|dish| {
            let summaries = dish.cook_ids.iter().filter_map(|id| cooks.get(id).cloned()).collect();
            DishResponse::new(dish, summaries)
        })
        .collect())
}

async fn single_response(conn: &mut SqliteConnection, dish: DishDBResponse) -> Result<DishResponse> {
    let mut responses = with_cooks(conn, vec![dish]).await?;
    responses.pop().ok_or_else(|| Error::Internal {
        operation: "build dish response".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/dishes",
    tag = "dishes",
    summary = "List dishes",
    description = "Lists dishes ordered by name, ten per page. `search` matches, case-insensitively, \
        any part of the dish name or its dish type's name; blank or over-long text is ignored.",
    params(ListDishesQuery),
    responses(
        (status = 200, description = "Page of dishes", body = PaginatedResponse<DishResponse>),
        (status = 400, description = "Invalid page number"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Page out of range"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_dishes(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dishes, operation::ReadAll>,
    Query(query): Query<ListDishesQuery>,
) -> Result<Json<PaginatedResponse<DishResponse>>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let search = search_term(query.search.as_deref());
    let total_count = Dishes::new(&mut tx)
        .count(&DishFilter {
            search: search.clone(),
            ..Default::default()
        })
        .await?;

    let window = query.pagination.window(total_count)?;
    let filter = DishFilter {
        skip: window.skip,
        limit: window.limit,
        search,
    };
    let dishes = Dishes::new(&mut tx).list(&filter).await?;
    let data = with_cooks(&mut tx, dishes).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(PaginatedResponse::new(data, total_count, window)))
}

#[utoipa::path(
    post,
    path = "/dishes",
    tag = "dishes",
    summary = "Create dish",
    request_body = DishCreate,
    responses(
        (status = 201, description = "Dish created successfully", body = DishResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ValidationErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_dish(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dishes, operation::CreateAll>,
    JsonBody(create): JsonBody<DishCreate>,
) -> Result<(StatusCode, Json<DishResponse>)> {
    create.validate()?;
    let request = DishCreateDBRequest::from(create);

    let mut tx = db::begin_write(&state.db).await.map_err(|e| Error::Database(e.into()))?;
    check_references(&mut tx, Some(request.dish_type_id), &request.cook_ids).await?;

    let dish = Dishes::new(&mut tx).create(&request).await?;
    let response = single_response(&mut tx, dish).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/dishes/{id}",
    tag = "dishes",
    summary = "Get dish",
    responses(
        (status = 200, description = "Dish details", body = DishResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dish not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i64, Path, description = "Dish ID")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_dish(
    State(state): State<AppState>,
    Path(id): Path<DishId>,
    _: RequiresPermission<resource::Dishes, operation::ReadAll>,
) -> Result<Json<DishResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let dish = Dishes::new(&mut pool_conn).get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(single_response(&mut pool_conn, dish).await?))
}

#[utoipa::path(
    patch,
    path = "/dishes/{id}",
    tag = "dishes",
    summary = "Update dish",
    description = "Updates the given fields. `cook_ids`, when present, replaces the assigned cooks.",
    request_body = DishUpdate,
    responses(
        (status = 200, description = "Dish updated successfully", body = DishResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ValidationErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dish not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i64, Path, description = "Dish ID")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_dish(
    State(state): State<AppState>,
    Path(id): Path<DishId>,
    _: RequiresPermission<resource::Dishes, operation::UpdateAll>,
    JsonBody(update): JsonBody<DishUpdate>,
) -> Result<Json<DishResponse>> {
    update.validate()?;
    let request = DishUpdateDBRequest::from(update);

    let mut tx = db::begin_write(&state.db).await.map_err(|e| Error::Database(e.into()))?;
    if Dishes::new(&mut tx).get_by_id(id).await?.is_none() {
        return Err(not_found(id));
    }
    check_references(&mut tx, request.dish_type_id, request.cook_ids.as_deref().unwrap_or_default()).await?;

    let dish = match Dishes::new(&mut tx).update(id, &request).await {
        Ok(dish) => dish,
        Err(DbError::NotFound) => return Err(not_found(id)),
        Err(e) => return Err(e.into()),
    };
    let response = single_response(&mut tx, dish).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/dishes/{id}",
    tag = "dishes",
    summary = "Delete dish",
    responses(
        (status = 204, description = "Dish deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dish not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i64, Path, description = "Dish ID")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_dish(
    State(state): State<AppState>,
    Path(id): Path<DishId>,
    _: RequiresPermission<resource::Dishes, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Dishes::new(&mut pool_conn).delete(id).await? {
        return Err(not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}
