//! # kitchen: Restaurant Kitchen Administration Service
//!
//! `kitchen` is a small administrative service for a restaurant kitchen. It keeps track of the
//! kinds of dish on the menu (dish types), the dishes themselves and the cooks who prepare them,
//! and exposes all three through a JSON API.
//!
//! ## Overview
//!
//! Every cook is also a login identity. Cooks come in two roles: *regular* cooks can browse
//! everything and manage dishes, while *elevated* cooks (superusers) can also manage dish types
//! and the cook roster. Deleting a dish type removes every dish of that type.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! stores everything in a single SQLite database through [sqlx](https://github.com/launchbadge/sqlx).
//!
//! ### Request Flow
//!
//! Requests to the API (`/api/v1/*`) first authenticate the caller, either from a session
//! cookie issued by `POST /authentication/login` or from a trusted proxy header. The
//! [`RequiresPermission`](auth::permissions::RequiresPermission) extractor then checks the
//! caller's role against the operation, and the handler runs its queries through the
//! repositories in [`db::handlers`].
//!
//! ### Core Components
//!
//! - The **API layer** ([`api`]) holds the handlers and the request/response models.
//! - The **authentication layer** ([`auth`]) handles sessions, password hashing and the role
//!   matrix.
//! - The **database layer** ([`db`]) wraps each table in a repository. Search is a
//!   case-insensitive substring match on a lowercased copy of each name.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use kitchen::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = kitchen::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     kitchen::telemetry::init_telemetry(config.log_format)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The database file is created if missing and migrations run on startup:
//!
//! ```no_run
//! # use sqlx::SqlitePool;
//! # async fn example(pool: SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
//! kitchen::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::password,
    config::{CorsOrigin, PoolSettings},
    db::{
        handlers::{Cooks, Repository},
        models::cooks::{CookCreateDBRequest, CookUpdateDBRequest},
    },
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    http::{self, HeaderValue},
    routing::{delete, get, patch, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CookId, DishId, DishTypeId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the kitchen database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Make sure the configured superuser exists.
///
/// Idempotent: creates the cook if missing. An existing cook keeps their profile but is
/// (re-)elevated, and their password is replaced when `admin_password` is set.
#[instrument(skip_all, fields(username = %config.admin_username))]
pub async fn create_initial_admin_user(config: &Config, pool: &SqlitePool) -> anyhow::Result<CookId> {
    let password_hash = match config.admin_password.as_deref() {
        Some(pwd) => Some(password::hash_password(pwd.to_string(), &config.auth.native.password).await?),
        None => None,
    };

    let mut tx = db::begin_write(pool).await?;
    let mut cook_repo = Cooks::new(&mut tx);

    let admin_id = if let Some(existing) = cook_repo.get_by_username(&config.admin_username).await? {
        if password_hash.is_some() {
            let update = CookUpdateDBRequest {
                password_hash,
                ..Default::default()
            };
            cook_repo.update(existing.id, &update).await?;
        }
        if !existing.is_superuser {
            cook_repo.set_elevated(existing.id, true).await?;
        }
        existing.id
    } else {
        let create = CookCreateDBRequest {
            username: config.admin_username.clone(),
            email: config.admin_email.clone(),
            first_name: String::new(),
            last_name: String::new(),
            years_of_experience: 0,
            is_staff: true,
            is_superuser: true,
            password_hash,
        };
        let created = cook_repo.create(&create).await?;
        info!("Created initial superuser {}", created.username);
        created.id
    };

    tx.commit().await?;
    Ok(admin_id)
}

fn pool_options(settings: &PoolSettings) -> SqlitePoolOptions {
    let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));

    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(secs(settings.idle_timeout_secs))
        .max_lifetime(secs(settings.max_lifetime_secs))
}

/// Open the database, creating the file if needed, and run migrations.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    info!("Opening database at {}", config.database.url);

    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = pool_options(&config.database.pool).connect_with(options).await?;
    migrator().run(&pool).await?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Browsers send origins without a trailing slash
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::PATCH, http::Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router.
///
/// - Authentication routes at the root (`/authentication/*`)
/// - The JSON API under `/api/v1`
/// - `/healthz`, the OpenAPI document and its Scalar UI at `/docs`
/// - CORS and request tracing layers
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Authentication routes (at root level, can be masked when deployed behind SSO proxy)
    let auth_routes = Router::new()
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/me", get(api::handlers::auth::me))
        .with_state(state.clone());

    // API routes
    let api_routes = Router::new()
        .route("/dashboard", get(api::handlers::dashboard::get_dashboard))
        // Dish types (elevated only for write operations)
        .route("/dish-types", get(api::handlers::dish_types::list_dish_types))
        .route("/dish-types", post(api::handlers::dish_types::create_dish_type))
        .route("/dish-types/{id}", get(api::handlers::dish_types::get_dish_type))
        .route("/dish-types/{id}", patch(api::handlers::dish_types::update_dish_type))
        .route("/dish-types/{id}", delete(api::handlers::dish_types::delete_dish_type))
        // Dishes
        .route("/dishes", get(api::handlers::dishes::list_dishes))
        .route("/dishes", post(api::handlers::dishes::create_dish))
        .route("/dishes/{id}", get(api::handlers::dishes::get_dish))
        .route("/dishes/{id}", patch(api::handlers::dishes::update_dish))
        .route("/dishes/{id}", delete(api::handlers::dishes::delete_dish))
        // Cooks (elevated only for write operations)
        .route("/cooks", get(api::handlers::cooks::list_cooks))
        .route("/cooks", post(api::handlers::cooks::create_cook))
        .route("/cooks/form", get(api::handlers::cooks::get_cook_form))
        .route("/cooks/{id}", get(api::handlers::cooks::get_cook))
        .route("/cooks/{id}", patch(api::handlers::cooks::update_cook))
        .route("/cooks/{id}", delete(api::handlers::cooks::delete_cook))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let router = router.layer(create_cors_layer(&state.config)?);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application, reusing `pool` when given instead of opening the configured
    /// database.
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!("Starting kitchen with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        create_initial_admin_user(&config, &pool).await?;

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Kitchen listening on http://{}, available at http://localhost:{}", bind_addr, self.config.port);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
