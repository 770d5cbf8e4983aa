//! Database record models matching table schemas.
//!
//! These structs are what repositories accept and return. They are kept separate from the
//! API models so storage and wire representations can evolve independently: prices are
//! integer cents here and decimals on the wire, and password hashes never leave this layer.
//!
//! - [`dish_types`]: dish categories
//! - [`dishes`]: dishes, with their dish type name and assigned cook ids
//! - [`cooks`]: cooks, which double as the identity records used for login
//!
//! API models convert into database requests with `From`, and database responses convert
//! into API responses the same way:
//!
//! ```ignore
//! use kitchen::db::models::dish_types::DishTypeCreateDBRequest;
//! use kitchen::api::models::dish_types::{DishTypeCreate, DishTypeResponse};
//!
//! let request = DishTypeCreateDBRequest::from(DishTypeCreate { name: "Soup".into() });
//! let created = repo.create(&request).await?;
//! let response = DishTypeResponse::from(created);
//! ```

pub mod cooks;
pub mod dish_types;
pub mod dishes;
