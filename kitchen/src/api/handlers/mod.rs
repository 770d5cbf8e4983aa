//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates its request, checks the caller's role through an extractor
//! ([`crate::auth::permissions::RequiresPermission`] or plain
//! [`CurrentUser`](crate::api::models::cooks::CurrentUser)), runs repository calls and
//! serializes the result.
//!
//! # Handler Modules
//!
//! - [`auth`]: login, logout and the current caller
//! - [`dashboard`]: record counts
//! - [`dish_types`]: dish type CRUD with name search
//! - [`dishes`]: dish CRUD with name and dish type search, plus cook assignment
//! - [`cooks`]: cook roster, details and elevated-only management
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which converts into the matching HTTP status and
//! body.

pub mod auth;
pub mod cooks;
pub mod dashboard;
pub mod dish_types;
pub mod dishes;
