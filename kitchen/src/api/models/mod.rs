//! API request and response data models.
//!
//! These structures define the public JSON contract and are kept apart from the database
//! models in [`crate::db::models`]. Request models validate themselves, collecting every
//! field problem into a single [`FieldErrors`](crate::errors::FieldErrors) response.
//!
//! - [`dish_types`], [`dishes`], [`cooks`]: resource requests and responses
//! - [`auth`]: login payloads, session cookies and caller affordances
//! - [`dashboard`]: record counts
//! - [`pagination`] and [`search`]: list query handling shared by the list endpoints

pub mod auth;
pub mod cooks;
pub mod dashboard;
pub mod dish_types;
pub mod dishes;
pub mod pagination;
pub mod search;
pub mod validation;
