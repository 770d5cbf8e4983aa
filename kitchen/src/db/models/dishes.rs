//! Database models for dishes and their cook assignments.

use crate::types::{CookId, DishId, DishTypeId};

/// Database request for creating a new dish.
///
/// Prices travel through the database layer as integer cents.
#[derive(Debug, Clone)]
pub struct DishCreateDBRequest {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub dish_type_id: DishTypeId,
    pub cook_ids: Vec<CookId>,
}

/// Database request for updating a dish. `cook_ids`, when present, replaces the assignment set.
#[derive(Debug, Clone, Default)]
pub struct DishUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub dish_type_id: Option<DishTypeId>,
    pub cook_ids: Option<Vec<CookId>>,
}

/// Database response for a dish, joined with its dish type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishDBResponse {
    pub id: DishId,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub dish_type_id: DishTypeId,
    pub dish_type_name: String,
    /// Assigned cooks, ascending by id
    pub cook_ids: Vec<CookId>,
}
