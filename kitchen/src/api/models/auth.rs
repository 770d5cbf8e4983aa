//! API request/response models for authentication.

use super::cooks::CurrentUser;
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Login with username and password
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "gordon")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body returned on successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: CurrentUser,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// What the caller's role lets them do, for clients deciding which controls to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Affordances {
    /// Create, rename and delete dish types
    pub manage_dish_types: bool,
    /// Create, edit and delete dishes
    pub manage_dishes: bool,
    /// Create, edit and delete cooks
    pub manage_cooks: bool,
    /// Open any cook's full details, not just their own
    pub view_cook_details: bool,
}

/// The current caller and their affordances
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: CurrentUser,
    pub affordances: Affordances,
}

/// Login response carrying the session cookie
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, [(header::SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}

/// Logout response clearing the session cookie
pub struct LogoutResponse {
    pub auth_response: AuthSuccessResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, [(header::SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}
