//! OpenAPI documentation for the kitchen API.
//!
//! [`ApiDoc`] covers the authentication routes at the root and nests the resource routes
//! under `/api/v1`. It is served as JSON at `/api-docs/openapi.json` and rendered by Scalar
//! at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api::handlers::{auth, cooks, dashboard, dish_types, dishes};
use crate::api::models::{
    auth::{Affordances, AuthResponse, AuthSuccessResponse, LoginRequest, MeResponse},
    cooks::{CookCreate, CookFormResponse, CookResponse, CookSummary, CookUpdate, CurrentUser},
    dashboard::DashboardResponse,
    dish_types::{DishTypeCreate, DishTypeResponse, DishTypeUpdate},
    dishes::{DishCreate, DishResponse, DishSummary, DishUpdate},
};
use crate::errors::{FieldErrors, ValidationErrorResponse};

/// Session cookie and trusted proxy header authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "CookieAuth".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "kitchen_session",
                    "Session cookie set by `POST /authentication/login`.",
                ))),
            );
            components.security_schemes.insert(
                "X-Kitchen-User".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-kitchen-user",
                    "Username of an existing cook, set by a trusted reverse proxy. Only honoured when \
                    proxy header authentication is enabled.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        dashboard::get_dashboard,
        dish_types::list_dish_types,
        dish_types::create_dish_type,
        dish_types::get_dish_type,
        dish_types::update_dish_type,
        dish_types::delete_dish_type,
        dishes::list_dishes,
        dishes::create_dish,
        dishes::get_dish,
        dishes::update_dish,
        dishes::delete_dish,
        cooks::list_cooks,
        cooks::create_cook,
        cooks::get_cook_form,
        cooks::get_cook,
        cooks::update_cook,
        cooks::delete_cook,
    )
)]
struct ResourcesApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kitchen API",
        description = "Manage a restaurant kitchen's dish types, dishes and cooks.\n\n\
            Regular cooks may browse everything, manage dishes and open their own profile. \
            Elevated cooks (superusers) may also manage dish types and cooks."
    ),
    modifiers(&SecurityAddon),
    nest(
        (path = "/api/v1", api = ResourcesApi)
    ),
    paths(
        auth::login,
        auth::logout,
        auth::me,
    ),
    components(schemas(
        LoginRequest,
        AuthResponse,
        AuthSuccessResponse,
        MeResponse,
        Affordances,
        CurrentUser,
        DashboardResponse,
        DishTypeCreate,
        DishTypeUpdate,
        DishTypeResponse,
        DishCreate,
        DishUpdate,
        DishResponse,
        DishSummary,
        CookCreate,
        CookUpdate,
        CookSummary,
        CookResponse,
        CookFormResponse,
        FieldErrors,
        ValidationErrorResponse,
    )),
    tags(
        (name = "authentication", description = "Session login and the current caller"),
        (name = "dashboard", description = "Record counts"),
        (name = "dish-types", description = "Dish categories. Searchable by name; elevated cooks manage them. \
            Deleting a dish type deletes its dishes."),
        (name = "dishes", description = "Dishes, their prices and assigned cooks. Searchable by dish or dish type name."),
        (name = "cooks", description = "The cook roster. Cooks are also the accounts that sign in."),
    )
)]
pub struct ApiDoc;
