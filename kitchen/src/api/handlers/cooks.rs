use crate::api::models::cooks::{CookCreate, CookFormResponse, CookResponse, CookSummary, CookUpdate, CurrentUser};
use crate::api::models::dishes::DishSummary;
use crate::api::models::validation::JsonBody;
use crate::auth::password;
use crate::auth::permissions::{
    RequiresPermission, can_read_all_resources, can_read_own_resource, can_update_all_resources, can_update_own_resource,
    insufficient_permissions, operation, resource,
};
use crate::db::handlers::{Cooks, Dishes, Repository, cooks::CookFilter};
use crate::db::models::cooks::{CookDBResponse, CookUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{CookId, Operation, Permission, Resource};
use crate::{AppState, db::errors::DbError};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::SqliteConnection;

fn not_found(id: CookId) -> Error {
    Error::NotFound {
        resource: "Cook".to_string(),
        id: id.to_string(),
    }
}

async fn detail_response(conn: &mut SqliteConnection, cook: CookDBResponse) -> Result<CookResponse> {
    let dishes = Dishes::new(conn).list_for_cook(cook.id).await?;
    Ok(CookResponse::from(cook).with_dishes(dishes.into_iter().map(DishSummary::from).collect()))
}

#[utoipa::path(
    get,
    path = "/cooks",
    tag = "cooks",
    summary = "List cooks",
    description = "Every cook, ordered by username. Entries are summaries without contact details or role flags.",
    responses(
        (status = 200, description = "List of cooks", body = [CookSummary]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_cooks(State(state): State<AppState>, _: CurrentUser) -> Result<Json<Vec<CookSummary>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cooks::new(&mut pool_conn);

    let cooks = repo.list(&CookFilter::all()).await?;
    Ok(Json(cooks.into_iter().map(CookSummary::from).collect()))
}

#[utoipa::path(
    post,
    path = "/cooks",
    tag = "cooks",
    summary = "Create cook",
    description = "Creates a cook with a password. `is_staff` and `is_superuser` are honoured for elevated callers only.",
    request_body = CookCreate,
    responses(
        (status = 201, description = "Cook created successfully", body = CookResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ValidationErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Elevated role required"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_cook(
    State(state): State<AppState>,
    current_user: RequiresPermission<resource::Cooks, operation::CreateAll>,
    JsonBody(create): JsonBody<CookCreate>,
) -> Result<(StatusCode, Json<CookResponse>)> {
    let password_config = &state.config.auth.native.password;
    create.validate(password_config)?;

    let password_hash = password::hash_password(create.password.clone(), password_config).await?;
    let request = create.into_db_request(password_hash, current_user.is_elevated());

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let cook = Cooks::new(&mut pool_conn).create(&request).await?;

    // A new cook has no dishes yet
    Ok((StatusCode::CREATED, Json(CookResponse::from(cook))))
}

#[utoipa::path(
    get,
    path = "/cooks/form",
    tag = "cooks",
    summary = "Describe the cook create form",
    description = "The fields a create form should offer this caller. Role flags are listed for elevated callers only.",
    responses(
        (status = 200, description = "Form fields", body = CookFormResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_cook_form(current_user: CurrentUser) -> Json<CookFormResponse> {
    Json(CookFormResponse::for_caller(current_user.is_elevated()))
}

#[utoipa::path(
    get,
    path = "/cooks/{id}",
    tag = "cooks",
    summary = "Get cook",
    description = "Full details and assigned dishes. Regular cooks may only open their own.",
    responses(
        (status = 200, description = "Cook details", body = CookResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not this cook and not elevated"),
        (status = 404, description = "Cook not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i64, Path, description = "Cook ID")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_cook(State(state): State<AppState>, Path(id): Path<CookId>, current_user: CurrentUser) -> Result<Json<CookResponse>> {
    if !can_read_all_resources(&current_user, Resource::Cooks) && !can_read_own_resource(&current_user, Resource::Cooks, id) {
        return Err(insufficient_permissions(
            Permission::Any(vec![
                Permission::Allow(Resource::Cooks, Operation::ReadAll),
                Permission::Allow(Resource::Cooks, Operation::ReadOwn),
            ]),
            Operation::ReadOwn,
            Resource::Cooks,
        ));
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let cook = Cooks::new(&mut pool_conn).get_by_id(id).await?.ok_or_else(|| not_found(id))?;

    Ok(Json(detail_response(&mut pool_conn, cook).await?))
}

#[utoipa::path(
    patch,
    path = "/cooks/{id}",
    tag = "cooks",
    summary = "Update cook",
    description = "Updates profile fields. Regular cooks may only update their own. Role flags and passwords are \
        not changed here.",
    request_body = CookUpdate,
    responses(
        (status = 200, description = "Cook updated successfully", body = CookResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ValidationErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not this cook and not elevated"),
        (status = 404, description = "Cook not found"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i64, Path, description = "Cook ID")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_cook(
    State(state): State<AppState>,
    Path(id): Path<CookId>,
    current_user: CurrentUser,
    JsonBody(update): JsonBody<CookUpdate>,
) -> Result<Json<CookResponse>> {
    if !can_update_all_resources(&current_user, Resource::Cooks) && !can_update_own_resource(&current_user, Resource::Cooks, id)
    {
        return Err(insufficient_permissions(
            Permission::Any(vec![
                Permission::Allow(Resource::Cooks, Operation::UpdateAll),
                Permission::Allow(Resource::Cooks, Operation::UpdateOwn),
            ]),
            Operation::UpdateOwn,
            Resource::Cooks,
        ));
    }
    update.validate()?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let cook = match Cooks::new(&mut pool_conn).update(id, &CookUpdateDBRequest::new(update)).await {
        Ok(cook) => cook,
        Err(DbError::NotFound) => return Err(not_found(id)),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(detail_response(&mut pool_conn, cook).await?))
}

#[utoipa::path(
    delete,
    path = "/cooks/{id}",
    tag = "cooks",
    summary = "Delete cook",
    description = "Deletes the cook and their dish assignments. The dishes themselves remain.",
    responses(
        (status = 204, description = "Cook deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Elevated role required"),
        (status = 404, description = "Cook not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i64, Path, description = "Cook ID")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_cook(
    State(state): State<AppState>,
    Path(id): Path<CookId>,
    _: RequiresPermission<resource::Cooks, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Cooks::new(&mut pool_conn).delete(id).await? {
        return Err(not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}
