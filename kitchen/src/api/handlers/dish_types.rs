use crate::api::models::dish_types::{DishTypeCreate, DishTypeResponse, DishTypeUpdate, ListDishTypesQuery};
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::search::search_term;
use crate::api::models::validation::JsonBody;
use crate::auth::permissions::{RequiresPermission, operation, resource};
use crate::db::handlers::{DishTypes, Repository, dish_types::DishTypeFilter};
use crate::db::models::dish_types::{DishTypeCreateDBRequest, DishTypeUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::{AppState, db, db::errors::DbError, types::DishTypeId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

fn not_found(id: DishTypeId) -> Error {
    Error::NotFound {
        resource: "Dish type".to_string(),
        id: id.to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/dish-types",
    tag = "dish-types",
    summary = "List dish types",
    description = "Lists dish types ordered by name, ten per page. `name` filters by case-insensitive substring; \
        blank or over-long text is ignored.",
    params(ListDishTypesQuery),
    responses(
        (status = 200, description = "Page of dish types", body = PaginatedResponse<DishTypeResponse>),
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
pub async fn list_dish_types(
    State(state): State<AppState>,
    _: RequiresPermission<resource::DishTypes, operation::ReadAll>,
    Query(query): Query<ListDishTypesQuery>,
) -> Result<Json<PaginatedResponse<DishTypeResponse>>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = DishTypes::new(&mut tx);

    let search = search_term(query.name.as_deref());
    let total_count = repo
        .count(&DishTypeFilter {
            search: search.clone(),
            ..Default::default()
        })
        .await?;

    let window = query.pagination.window(total_count)?;
    let filter = DishTypeFilter {
        skip: window.skip,
        limit: window.limit,
        search,
    };
    let dish_types = repo.list(&filter).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let data = dish_types.into_iter().map(DishTypeResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, total_count, window)))
}

#[utoipa::path(
    post,
    path = "/dish-types",
    tag = "dish-types",
    summary = "Create dish type",
    request_body = DishTypeCreate,
    responses(
        (status = 201, description = "Dish type created successfully", body = DishTypeResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ValidationErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Elevated role required"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_dish_type(
    State(state): State<AppState>,
    _: RequiresPermission<resource::DishTypes, operation::CreateAll>,
    JsonBody(create): JsonBody<DishTypeCreate>,
) -> Result<(StatusCode, Json<DishTypeResponse>)> {
    create.validate()?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = DishTypes::new(&mut pool_conn);

    let dish_type = repo.create(&DishTypeCreateDBRequest::from(create)).await?;
    Ok((StatusCode::CREATED, Json(DishTypeResponse::from(dish_type))))
}

#[utoipa::path(
    get,
    path = "/dish-types/{id}",
    tag = "dish-types",
    summary = "Get dish type",
    responses(
        (status = 200, description = "Dish type details", body = DishTypeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dish type not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i64, Path, description = "Dish type ID")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_dish_type(
    State(state): State<AppState>,
    Path(id): Path<DishTypeId>,
    _: RequiresPermission<resource::DishTypes, operation::ReadAll>,
) -> Result<Json<DishTypeResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = DishTypes::new(&mut pool_conn);

    match repo.get_by_id(id).await? {
        Some(dish_type) => Ok(Json(DishTypeResponse::from(dish_type))),
        None => Err(not_found(id)),
    }
}

#[utoipa::path(
    patch,
    path = "/dish-types/{id}",
    tag = "dish-types",
    summary = "Update dish type",
    request_body = DishTypeUpdate,
    responses(
        (status = 200, description = "Dish type updated successfully", body = DishTypeResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ValidationErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Elevated role required"),
        (status = 404, description = "Dish type not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i64, Path, description = "Dish type ID")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_dish_type(
    State(state): State<AppState>,
    Path(id): Path<DishTypeId>,
    _: RequiresPermission<resource::DishTypes, operation::UpdateAll>,
    JsonBody(update): JsonBody<DishTypeUpdate>,
) -> Result<Json<DishTypeResponse>> {
    update.validate()?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = DishTypes::new(&mut pool_conn);

    match repo.update(id, &DishTypeUpdateDBRequest::from(update)).await {
        Ok(dish_type) => Ok(Json(DishTypeResponse::from(dish_type))),
        Err(DbError::NotFound) => Err(not_found(id)),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    delete,
    path = "/dish-types/{id}",
    tag = "dish-types",
    summary = "Delete dish type",
    description = "Deletes the dish type and every dish of that type.",
    responses(
        (status = 204, description = "Dish type deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Elevated role required"),
        (status = 404, description = "Dish type not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i64, Path, description = "Dish type ID")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_dish_type(
    State(state): State<AppState>,
    Path(id): Path<DishTypeId>,
    _: RequiresPermission<resource::DishTypes, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut tx = db::begin_write(&state.db).await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = DishTypes::new(&mut tx);

    if !repo.delete(id).await? {
        return Err(not_found(id));
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{dish_types::DishTypeResponse, pagination::PaginatedResponse},
        db::handlers::{DishTypes, Dishes, Repository},
        errors::ValidationErrorResponse,
        test_utils::*,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_dish_types_paginates_and_searches(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let cook = create_test_cook(&pool, false).await;
        let (header, value) = add_auth_headers(&cook);

        for i in 0..12 {
            create_test_dish_type(&pool, &format!("Course {i:02}")).await;
        }
        create_test_dish_type(&pool, "Soup").await;
        create_test_dish_type(&pool, "SOUPS & STEWS").await;

        let response = app.get("/api/v1/dish-types").add_header(&header, &value).await;
        response.assert_status_ok();
        let page: PaginatedResponse<DishTypeResponse> = response.json();
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total_count, 14);
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.data[0].name, "Course 00");

        let response = app.get("/api/v1/dish-types?page=2").add_header(&header, &value).await;
        response.assert_status_ok();
        let page: PaginatedResponse<DishTypeResponse> = response.json();
        let names: Vec<_> = page.data.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Course 10", "Course 11", "SOUPS & STEWS", "Soup"]);

        let response = app.get("/api/v1/dish-types?name=soup").add_header(&header, &value).await;
        response.assert_status_ok();
        let page: PaginatedResponse<DishTypeResponse> = response.json();
        let names: Vec<_> = page.data.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["SOUPS & STEWS", "Soup"]);
        assert_eq!(page.num_pages, 1);

        // Blank and over-long search text both mean "no filter"
        let too_long = format!("name={}", "x".repeat(101));
        for query in ["name=%20%20", too_long.as_str()] {
            let response = app
                .get(&format!("/api/v1/dish-types?{query}"))
                .add_header(&header, &value)
                .await;
            response.assert_status_ok();
            let page: PaginatedResponse<DishTypeResponse> = response.json();
            assert_eq!(page.total_count, 14, "{query}");
        }

        // A repeated parameter keeps its last value
        let response = app
            .get("/api/v1/dish-types?name=course&name=soup")
            .add_header(&header, &value)
            .await;
        response.assert_status_ok();
        let page: PaginatedResponse<DishTypeResponse> = response.json();
        assert_eq!(page.total_count, 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_dish_types_page_errors(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let cook = create_test_cook(&pool, false).await;
        let (header, value) = add_auth_headers(&cook);

        // An empty table still has one page
        app.get("/api/v1/dish-types?page=1")
            .add_header(&header, &value)
            .await
            .assert_status_ok();

        app.get("/api/v1/dish-types?page=2")
            .add_header(&header, &value)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        app.get("/api/v1/dish-types?page=abc")
            .add_header(&header, &value)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unauthenticated_requests_are_rejected(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;

        app.get("/api/v1/dish-types").await.assert_status(StatusCode::UNAUTHORIZED);
        app.post("/api/v1/dish-types")
            .json(&json!({"name": "Soup"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_regular_cook_cannot_modify_dish_types(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let cook = create_test_cook(&pool, false).await;
        let (header, value) = add_auth_headers(&cook);
        let soup = create_test_dish_type(&pool, "Soup").await;

        let response = app
            .post("/api/v1/dish-types")
            .add_header(&header, &value)
            .json(&json!({"name": "Salad"}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert!(!response.text().contains("Soup"));

        app.patch(&format!("/api/v1/dish-types/{}", soup.id))
            .add_header(&header, &value)
            .json(&json!({"name": "Broth"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        app.delete(&format!("/api/v1/dish-types/{}", soup.id))
            .add_header(&header, &value)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // Nothing changed
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = DishTypes::new(&mut conn);
        assert_eq!(repo.get_by_id(soup.id).await.unwrap().unwrap().name, "Soup");
        assert_eq!(repo.count(&Default::default()).await.unwrap(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_elevated_cook_manages_dish_types(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_cook(&pool, true).await;
        let (header, value) = add_auth_headers(&admin);

        let response = app
            .post("/api/v1/dish-types")
            .add_header(&header, &value)
            .json(&json!({"name": "  Soup  "}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: DishTypeResponse = response.json();
        assert_eq!(created.name, "Soup");

        let response = app
            .patch(&format!("/api/v1/dish-types/{}", created.id))
            .add_header(&header, &value)
            .json(&json!({"name": "Broth"}))
            .await;
        response.assert_status_ok();
        let updated: DishTypeResponse = response.json();
        assert_eq!(updated.name, "Broth");

        let response = app
            .get(&format!("/api/v1/dish-types/{}", created.id))
            .add_header(&header, &value)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<DishTypeResponse>().name, "Broth");

        app.delete(&format!("/api/v1/dish-types/{}", created.id))
            .add_header(&header, &value)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        app.get(&format!("/api/v1/dish-types/{}", created.id))
            .add_header(&header, &value)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        app.patch(&format!("/api/v1/dish-types/{}", created.id))
            .add_header(&header, &value)
            .json(&json!({"name": "Gone"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        app.delete(&format!("/api/v1/dish-types/{}", created.id))
            .add_header(&header, &value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_dish_type_validation(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_cook(&pool, true).await;
        let (header, value) = add_auth_headers(&admin);

        let response = app
            .post("/api/v1/dish-types")
            .add_header(&header, &value)
            .json(&json!({"name": "x".repeat(101)}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ValidationErrorResponse = response.json();
        assert!(body.errors.contains("name"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deleting_dish_type_deletes_its_dishes(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_cook(&pool, true).await;
        let (header, value) = add_auth_headers(&admin);

        let soup = create_test_dish_type(&pool, "Soup").await;
        let salad = create_test_dish_type(&pool, "Salad").await;
        let mut soup_dishes = Vec::new();
        for name in ["Tomato Soup", "Pea Soup", "Miso Soup"] {
            soup_dishes.push(create_test_dish(&pool, name, soup.id, vec![admin.id]).await);
        }
        let caesar = create_test_dish(&pool, "Caesar", salad.id, vec![]).await;

        app.delete(&format!("/api/v1/dish-types/{}", soup.id))
            .add_header(&header, &value)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let mut conn = pool.acquire().await.unwrap();
        let mut dishes = Dishes::new(&mut conn);
        for dish in soup_dishes {
            assert!(dishes.get_by_id(dish.id).await.unwrap().is_none(), "{} survived", dish.name);
        }
        assert!(dishes.get_by_id(caesar.id).await.unwrap().is_some());
    }
}
