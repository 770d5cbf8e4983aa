//! Database models for dish types.

use crate::api::models::dish_types::{DishTypeCreate, DishTypeUpdate};
use crate::types::DishTypeId;

/// Database request for creating a new dish type
#[derive(Debug, Clone)]
pub struct DishTypeCreateDBRequest {
    pub name: String,
}

impl From<DishTypeCreate> for DishTypeCreateDBRequest {
    fn from(api: DishTypeCreate) -> Self {
        Self {
            name: api.name.trim().to_string(),
        }
    }
}

/// Database request for updating a dish type
#[derive(Debug, Clone, Default)]
pub struct DishTypeUpdateDBRequest {
    pub name: Option<String>,
}

impl From<DishTypeUpdate> for DishTypeUpdateDBRequest {
    fn from(api: DishTypeUpdate) -> Self {
        Self {
            name: api.name.map(|n| n.trim().to_string()),
        }
    }
}

/// Database response for a dish type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishTypeDBResponse {
    pub id: DishTypeId,
    pub name: String,
}
