//! API response model for the dashboard.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Record counts shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub num_dish_types: i64,
    pub num_dishes: i64,
    pub num_cooks: i64,
}
