use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginRequest, LoginResponse, LogoutResponse, MeResponse},
        cooks::CurrentUser,
        validation::JsonBody,
    },
    auth::{password, permissions, session},
    config::Config,
    db::handlers::Cooks,
    errors::Error,
};

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid username or password".to_string()),
    }
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Native authentication is disabled"),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, JsonBody(request): JsonBody<LoginRequest>) -> Result<LoginResponse, Error> {
    if !state.config.auth.native.enabled {
        return Err(Error::BadRequest {
            message: "Native authentication is disabled".to_string(),
        });
    }
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut cook_repo = Cooks::new(&mut pool_conn);

    let cook = cook_repo.get_by_username(request.username.trim()).await?;

    // Cooks created without a password can't log in natively
    let Some((cook, password_hash)) = cook.and_then(|c| c.password_hash.clone().map(|hash| (c, hash))) else {
        // Spend one hash's worth of work so a miss takes as long as a wrong password
        password::hash_password(request.password, &state.config.auth.native.password).await?;
        return Err(invalid_credentials());
    };

    if !password::verify_password(request.password, password_hash).await? {
        return Err(invalid_credentials());
    }

    cook_repo.record_login(cook.id).await?;

    let current_user = CurrentUser::from(cook);
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    let auth_response = AuthResponse {
        user: current_user,
        message: "Login successful".to_string(),
    };

    Ok(LoginResponse { auth_response, cookie })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    // An expired, empty cookie replaces the session
    let cookie = cookie_header(&state.config, "", 0);

    let auth_response = AuthSuccessResponse {
        message: "Logout successful".to_string(),
    };

    Ok(LogoutResponse { auth_response, cookie })
}

/// The current caller and what their role lets them do
#[utoipa::path(
    get,
    path = "/authentication/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Current caller", body = MeResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("CookieAuth" = []),
        ("X-Kitchen-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn me(current_user: CurrentUser) -> Result<Json<MeResponse>, Error> {
    let affordances = permissions::affordances(&current_user);
    Ok(Json(MeResponse {
        user: current_user,
        affordances,
    }))
}

fn create_session_cookie(token: &str, config: &Config) -> String {
    let max_age = config.auth.native.session.timeout.as_secs();
    cookie_header(config, token, max_age)
}

fn cookie_header(config: &Config, value: &str, max_age: u64) -> String {
    let session_config = &config.auth.native.session;
    let secure = if session_config.cookie_secure { " Secure;" } else { "" };

    format!(
        "{}={}; Path=/; HttpOnly;{} SameSite={}; Max-Age={}",
        session_config.cookie_name, value, secure, session_config.cookie_same_site, max_age
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::auth::Affordances;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_app_with_config, create_test_config, create_test_cook};
    use std::time::{Duration, Instant};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    async fn create_cook_with_password(server: &axum_test::TestServer, admin: &CurrentUser, username: &str, password: &str) {
        let (header, value) = add_auth_headers(admin);
        server
            .post("/api/v1/cooks")
            .add_header(&header, &value)
            .json(&json!({
                "username": username,
                "email": format!("{username}@kitchen.local"),
                "password": password,
                "password_confirmation": password,
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    fn session_cookie(response: &axum_test::TestResponse) -> String {
        let set_cookie = response.header("set-cookie");
        let set_cookie = set_cookie.to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_me_logout(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        let admin = create_test_cook(&pool, true).await;
        create_cook_with_password(&server, &admin, "remy", "ratatouille").await;

        let response = server
            .post("/authentication/login")
            .json(&json!({"username": "remy", "password": "ratatouille"}))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert_eq!(body.user.username, "remy");
        assert!(!body.user.is_superuser);

        let set_cookie = response.header("set-cookie");
        let set_cookie = set_cookie.to_str().unwrap();
        assert!(set_cookie.starts_with("kitchen_session="));
        assert!(set_cookie.contains("HttpOnly"));
        // The test config serves plain HTTP
        assert!(!set_cookie.contains("Secure"));

        let cookie = session_cookie(&response);
        let response = server.get("/authentication/me").add_header("cookie", &cookie).await;
        response.assert_status_ok();
        let me: MeResponse = response.json();
        assert_eq!(me.user.username, "remy");
        assert_eq!(
            me.affordances,
            Affordances {
                manage_dish_types: false,
                manage_dishes: true,
                manage_cooks: false,
                view_cook_details: false,
            }
        );

        let response = server.post("/authentication/logout").await;
        response.assert_status_ok();
        let cleared = session_cookie(&response);
        assert_eq!(cleared, "kitchen_session=");
        assert!(response.header("set-cookie").to_str().unwrap().contains("Max-Age=0"));

        server
            .get("/authentication/me")
            .add_header("cookie", &cleared)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_rejects_bad_credentials(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        let admin = create_test_cook(&pool, true).await;
        create_cook_with_password(&server, &admin, "linguini", "soupoftheday").await;

        for (username, password) in [("linguini", "wrong-password"), ("nobody", "soupoftheday")] {
            let response = server
                .post("/authentication/login")
                .json(&json!({"username": username, "password": password}))
                .await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert!(response.maybe_header("set-cookie").is_none());
            assert_eq!(response.text(), "Invalid username or password");
        }

        // No password hash at all
        let response = server
            .post("/authentication/login")
            .json(&json!({"username": admin.username, "password": "anything"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_username_costs_a_password_hash(pool: SqlitePool) {
        let mut config = create_test_config();
        // Heavy enough that a skipped hash is obvious next to the lookup alone
        config.auth.native.password.argon2_memory_kib = 16 * 1024;
        config.auth.native.password.argon2_iterations = 3;
        let server = create_test_app_with_config(pool.clone(), config).await;
        let admin = create_test_cook(&pool, true).await;
        create_cook_with_password(&server, &admin, "skinner", "ratcatcher").await;

        async fn timed_login(server: &axum_test::TestServer, username: &str) -> Duration {
            let started = Instant::now();
            server
                .post("/authentication/login")
                .json(&json!({"username": username, "password": "not-the-password"}))
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
            started.elapsed()
        }

        let wrong_password = timed_login(&server, "skinner").await;
        let unknown_user = timed_login(&server, "nobody-by-that-name").await;

        assert!(
            unknown_user * 4 >= wrong_password,
            "unknown user took {unknown_user:?}, wrong password took {wrong_password:?}"
        );
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_me_reports_elevated_affordances(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        let admin = create_test_cook(&pool, true).await;
        let (header, value) = add_auth_headers(&admin);

        let response = server.get("/authentication/me").add_header(&header, &value).await;
        response.assert_status_ok();
        let me: MeResponse = response.json();
        assert!(me.user.is_superuser);
        assert_eq!(
            me.affordances,
            Affordances {
                manage_dish_types: true,
                manage_dishes: true,
                manage_cooks: true,
                view_cook_details: true,
            }
        );

        server.get("/authentication/me").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut config = create_test_config();
        config.auth.native.session.cookie_secure = true;

        let cookie = create_session_cookie("abc", &config);
        assert_eq!(cookie, "kitchen_session=abc; Path=/; HttpOnly; Secure; SameSite=strict; Max-Age=86400");

        config.auth.native.session.cookie_secure = false;
        let cookie = create_session_cookie("abc", &config);
        assert_eq!(cookie, "kitchen_session=abc; Path=/; HttpOnly; SameSite=strict; Max-Age=86400");
    }
}
