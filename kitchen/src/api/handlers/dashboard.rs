use crate::api::models::{cooks::CurrentUser, dashboard::DashboardResponse};
use crate::db::handlers::{Cooks, DishTypes, Dishes, dish_types::DishTypeFilter, dishes::DishFilter};
use crate::errors::{Error, Result};
use crate::AppState;
use axum::{Json, extract::State};

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    summary = "Record counts",
    responses(
        (status = 200, description = "Counts of dish types, dishes and cooks", body = DashboardResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_dashboard(State(state): State<AppState>, _: CurrentUser) -> Result<Json<DashboardResponse>> {
    // One read transaction so the three counts agree with each other
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let num_dish_types = DishTypes::new(&mut tx).count(&DishTypeFilter::default()).await?;
    let num_dishes = Dishes::new(&mut tx).count(&DishFilter::default()).await?;
    let num_cooks = Cooks::new(&mut tx).count().await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(DashboardResponse {
        num_dish_types,
        num_dishes,
        num_cooks,
    }))
}

#[cfg(test)]
mod tests {
    use crate::{api::models::dashboard::DashboardResponse, test_utils::*};
    use axum::http::StatusCode;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_dashboard_counts(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let cook = create_test_cook(&pool, false).await;
        let (header, value) = add_auth_headers(&cook);

        let soup = create_test_dish_type(&pool, "Soup").await;
        create_test_dish_type(&pool, "Salad").await;
        create_test_dish(&pool, "Ramen", soup.id, vec![cook.id]).await;

        let response = app.get("/api/v1/dashboard").add_header(&header, &value).await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<DashboardResponse>(),
            DashboardResponse {
                num_dish_types: 2,
                num_dishes: 1,
                // The test cook and the configured admin
                num_cooks: 2,
            }
        );

        app.get("/api/v1/dashboard").await.assert_status(StatusCode::UNAUTHORIZED);
    }
}
