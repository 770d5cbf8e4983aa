//! API request/response models for dish types.

use super::pagination::Pagination;
use super::search::RawListQuery;
use super::validation::required_text;
use crate::db::models::dish_types::DishTypeDBResponse;
use crate::errors::{FieldErrors, Result};
use crate::types::DishTypeId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const NAME_MAX_LENGTH: usize = 100;

/// Query parameters for listing dish types
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(from = "RawListQuery")]
pub struct ListDishTypesQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on the dish type name
    pub name: Option<String>,
}

impl From<RawListQuery> for ListDishTypesQuery {
    fn from(mut raw: RawListQuery) -> Self {
        let name = raw.take("name");
        Self {
            pagination: raw.pagination,
            name,
        }
    }
}

/// Request body for creating a dish type
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DishTypeCreate {
    #[serde(default)]
    #[schema(example = "Soup")]
    pub name: String,
}

impl DishTypeCreate {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        required_text("name", &self.name, NAME_MAX_LENGTH, &mut errors);
        errors.into_result()
    }
}

/// Request body for updating a dish type. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DishTypeUpdate {
    #[schema(example = "Soups & Stews")]
    pub name: Option<String>,
}

impl DishTypeUpdate {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            required_text("name", name, NAME_MAX_LENGTH, &mut errors);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DishTypeResponse {
    pub id: DishTypeId,
    pub name: String,
}

impl From<DishTypeDBResponse> for DishTypeResponse {
    fn from(db: DishTypeDBResponse) -> Self {
        Self { id: db.id, name: db.name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validation() {
        assert!(DishTypeCreate { name: "Soup".to_string() }.validate().is_ok());
        assert!(DishTypeCreate { name: " ".to_string() }.validate().is_err());
        assert!(DishTypeCreate { name: "x".repeat(101) }.validate().is_err());
    }

    #[test]
    fn test_update_validation() {
        assert!(DishTypeUpdate { name: None }.validate().is_ok());
        assert!(DishTypeUpdate { name: Some(String::new()) }.validate().is_err());
    }
}
