//! API request/response models for dishes.
//!
//! Prices are decimals on the wire, serialized as strings (`"12.50"`) so no precision is lost,
//! and integer cents in the store.

use super::cooks::CookSummary;
use super::dish_types::DishTypeResponse;
use super::pagination::Pagination;
use super::search::RawListQuery;
use super::validation::{REQUIRED, required_text};
use crate::db::models::dishes::{DishCreateDBRequest, DishDBResponse, DishUpdateDBRequest};
use crate::errors::{FieldErrors, Result};
use crate::types::{CookId, DishId, DishTypeId};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const NAME_MAX_LENGTH: usize = 100;
pub const PRICE_MAX_DIGITS: u32 = 5;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// Query parameters for listing dishes
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(from = "RawListQuery")]
pub struct ListDishesQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on the dish name or its dish type's name
    pub search: Option<String>,
}

impl From<RawListQuery> for ListDishesQuery {
    fn from(mut raw: RawListQuery) -> Self {
        let search = raw.take("search");
        Self {
            pagination: raw.pagination,
            search,
        }
    }
}

/// Request body for creating a dish. Missing fields are reported by [`DishCreate::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DishCreate {
    #[serde(default)]
    #[schema(example = "Tomato Soup")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Slow-roasted tomatoes with basil")]
    pub description: String,
    #[serde(default)]
    #[schema(value_type = String, example = "8.50")]
    pub price: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = i64)]
    pub dish_type_id: Option<DishTypeId>,
    /// Cooks assigned to this dish
    #[serde(default)]
    pub cook_ids: Vec<CookId>,
}

impl DishCreate {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        required_text("name", &self.name, NAME_MAX_LENGTH, &mut errors);
        if self.description.trim().is_empty() {
            errors.add("description", REQUIRED);
        }
        match self.price {
            Some(price) => validate_price(price, &mut errors),
            None => errors.add("price", REQUIRED),
        }
        if self.dish_type_id.is_none() {
            errors.add("dish_type_id", REQUIRED);
        }
        errors.into_result()
    }
}

impl From<DishCreate> for DishCreateDBRequest {
    fn from(api: DishCreate) -> Self {
        Self {
            name: api.name.trim().to_string(),
            description: api.description,
            price_cents: api.price.map(price_to_cents).unwrap_or_default(),
            dish_type_id: api.dish_type_id.unwrap_or_default(),
            cook_ids: dedup_ids(api.cook_ids),
        }
    }
}

/// Request body for updating a dish. Absent fields are left unchanged; `cook_ids`, when
/// present, replaces the whole assignment set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DishUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "9.00")]
    pub price: Option<Decimal>,
    pub dish_type_id: Option<DishTypeId>,
    pub cook_ids: Option<Vec<CookId>>,
}

impl DishUpdate {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            required_text("name", name, NAME_MAX_LENGTH, &mut errors);
        }
        if let Some(description) = &self.description
            && description.trim().is_empty()
        {
            errors.add("description", REQUIRED);
        }
        if let Some(price) = self.price {
            validate_price(price, &mut errors);
        }
        errors.into_result()
    }
}

impl From<DishUpdate> for DishUpdateDBRequest {
    fn from(api: DishUpdate) -> Self {
        Self {
            name: api.name.map(|n| n.trim().to_string()),
            description: api.description,
            price_cents: api.price.map(price_to_cents),
            dish_type_id: api.dish_type_id,
            cook_ids: api.cook_ids.map(dedup_ids),
        }
    }
}

/// Full dish details, with its dish type and assigned cooks
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DishResponse {
    pub id: DishId,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "8.50")]
    pub price: Decimal,
    pub dish_type: DishTypeResponse,
    #[schema(no_recursion)]
    pub cooks: Vec<CookSummary>,
}

impl DishResponse {
    /// Build a response from a stored dish and the summaries of its cooks.
    pub fn new(db: DishDBResponse, cooks: Vec<CookSummary>) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            price: cents_to_price(db.price_cents),
            dish_type: DishTypeResponse {
                id: db.dish_type_id,
                name: db.dish_type_name,
            },
            cooks,
        }
    }
}

/// Dish entry used in lists and on cook details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DishSummary {
    pub id: DishId,
    pub name: String,
    #[schema(value_type = String, example = "8.50")]
    pub price: Decimal,
    pub dish_type: DishTypeResponse,
}

impl From<DishDBResponse> for DishSummary {
    fn from(db: DishDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            price: cents_to_price(db.price_cents),
            dish_type: DishTypeResponse {
                id: db.dish_type_id,
                name: db.dish_type_name,
            },
        }
    }
}

/// Check a price fits five digits with two decimal places. Trailing zeros don't count.
pub fn validate_price(price: Decimal, errors: &mut FieldErrors) {
    let normalized = price.normalize();
    if normalized.scale() > PRICE_DECIMAL_PLACES {
        errors.add(
            "price",
            format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
        );
    }
    let whole_digits_max = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
    if normalized.trunc().abs() >= Decimal::from(10_i64.pow(whole_digits_max)) {
        errors.add(
            "price",
            format!("Ensure that there are no more than {whole_digits_max} digits before the decimal point."),
        );
    }
}

/// Convert a validated price to integer cents.
pub fn price_to_cents(price: Decimal) -> i64 {
    (price * Decimal::ONE_HUNDRED).round().to_i64().unwrap_or_default()
}

/// Convert stored cents back to a two-place decimal.
pub fn cents_to_price(cents: i64) -> Decimal {
    Decimal::new(cents, PRICE_DECIMAL_PLACES)
}

fn dedup_ids(mut ids: Vec<CookId>) -> Vec<CookId> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn price_errors(s: &str) -> Vec<String> {
        let mut errors = FieldErrors::new();
        validate_price(price(s), &mut errors);
        errors.get("price").map(<[String]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn test_price_limits() {
        for ok in ["0", "8.5", "999.99", "-999.99", "12.500"] {
            assert!(price_errors(ok).is_empty(), "{ok} should be accepted");
        }
        assert_eq!(
            price_errors("1.234"),
            vec!["Ensure that there are no more than 2 decimal places.".to_string()]
        );
        assert_eq!(
            price_errors("1000"),
            vec!["Ensure that there are no more than 3 digits before the decimal point.".to_string()]
        );
        assert_eq!(price_errors("-1000.001").len(), 2);
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(price_to_cents(price("8.50")), 850);
        assert_eq!(price_to_cents(price("-0.01")), -1);
        assert_eq!(cents_to_price(850).to_string(), "8.50");
        assert_eq!(cents_to_price(99999), price("999.99"));
    }

    #[test]
    fn test_price_serializes_as_string() {
        let summary = DishSummary {
            id: 1,
            name: "Tomato Soup".to_string(),
            price: cents_to_price(850),
            dish_type: DishTypeResponse {
                id: 1,
                name: "Soup".to_string(),
            },
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["price"], "8.50");
    }

    #[test]
    fn test_create_validation_collects_fields() {
        let request = DishCreate {
            name: String::new(),
            description: " ".to_string(),
            price: Some(price("1.001")),
            dish_type_id: None,
            cook_ids: vec![],
        };
        match request.validate() {
            Err(crate::errors::Error::Validation { errors }) => {
                assert!(errors.contains("name"));
                assert!(errors.contains("description"));
                assert!(errors.contains("price"));
                assert_eq!(errors.get("dish_type_id"), Some(&[REQUIRED.to_string()][..]));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_cook_ids_are_deduplicated() {
        let request = DishCreateDBRequest::from(DishCreate {
            name: " Tomato Soup ".to_string(),
            description: "Red".to_string(),
            price: Some(price("8.50")),
            dish_type_id: Some(1),
            cook_ids: vec![3, 1, 3],
        });
        assert_eq!(request.name, "Tomato Soup");
        assert_eq!(request.cook_ids, vec![1, 3]);
        assert_eq!(request.price_cents, 850);
    }
}
