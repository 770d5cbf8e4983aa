//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): login, logout, current caller
//! - **Dashboard** (`/api/v1/dashboard`): record counts
//! - **Dish types** (`/api/v1/dish-types/*`)
//! - **Dishes** (`/api/v1/dishes/*`)
//! - **Cooks** (`/api/v1/cooks/*`)
//!
//! All endpoints carry `utoipa` annotations. The document is served at
//! `/api-docs/openapi.json` and browsable at `/docs`.

pub mod handlers;
pub mod models;
