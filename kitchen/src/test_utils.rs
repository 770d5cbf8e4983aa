//! Test utilities shared by the handler and extractor tests.

use crate::{
    AppState, Application,
    api::models::cooks::CurrentUser,
    config::{Config, NativeAuthConfig, PasswordConfig, PoolSettings, ProxyHeaderAuthConfig, SessionConfig},
    db::{
        handlers::{Cooks, DishTypes, Dishes, Repository},
        models::{
            cooks::CookCreateDBRequest,
            dish_types::{DishTypeCreateDBRequest, DishTypeDBResponse},
            dishes::{DishCreateDBRequest, DishDBResponse},
        },
    },
    types::{CookId, DishTypeId},
};
use axum_test::TestServer;
use sqlx::SqlitePool;
use uuid::Uuid;

pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    create_test_app_with_config(pool, create_test_config()).await
}

pub async fn create_test_app_with_config(pool: SqlitePool, config: Config) -> TestServer {
    let app = Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: crate::config::DatabaseConfig {
            // Tests hand in their own pool
            url: "sqlite::memory:".to_string(),
            pool: PoolSettings {
                max_connections: 1,
                min_connections: 1,
                ..Default::default()
            },
        },
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        auth: crate::config::AuthConfig {
            native: NativeAuthConfig {
                enabled: true,
                password: PasswordConfig {
                    // Cheap hashing keeps the login tests fast
                    argon2_memory_kib: 1024,
                    argon2_iterations: 1,
                    ..Default::default()
                },
                session: SessionConfig {
                    cookie_secure: false,
                    ..Default::default()
                },
            },
            proxy_header: ProxyHeaderAuthConfig {
                enabled: true,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn create_test_state(pool: SqlitePool) -> AppState {
    AppState::builder().db(pool).config(create_test_config()).build()
}

pub async fn create_test_cook(pool: &SqlitePool, elevated: bool) -> CurrentUser {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut cooks_repo = Cooks::new(&mut conn);
    let username = format!("testcook_{}", Uuid::new_v4().simple());

    let cook_create = CookCreateDBRequest {
        username: username.clone(),
        email: format!("{username}@example.com"),
        first_name: "Test".to_string(),
        last_name: "Cook".to_string(),
        years_of_experience: 3,
        is_staff: elevated,
        is_superuser: elevated,
        password_hash: None,
    };

    let cook = cooks_repo.create(&cook_create).await.expect("Failed to create test cook");
    CurrentUser::from(cook)
}

pub fn add_auth_headers(user: &CurrentUser) -> (String, String) {
    let config = ProxyHeaderAuthConfig::default();
    (config.header_name, user.username.clone())
}

pub async fn create_test_dish_type(pool: &SqlitePool, name: &str) -> DishTypeDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    DishTypes::new(&mut conn)
        .create(&DishTypeCreateDBRequest { name: name.to_string() })
        .await
        .expect("Failed to create test dish type")
}

pub async fn create_test_dish(pool: &SqlitePool, name: &str, dish_type_id: DishTypeId, cook_ids: Vec<CookId>) -> DishDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let request = DishCreateDBRequest {
        name: name.to_string(),
        description: format!("{name}, made fresh"),
        price_cents: 1250,
        dish_type_id,
        cook_ids,
    };
    Dishes::new(&mut conn).create(&request).await.expect("Failed to create test dish")
}
