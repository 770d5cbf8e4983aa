//! Database models for cooks.

use crate::api::models::cooks::CookUpdate;
use crate::types::CookId;
use chrono::{DateTime, Utc};

/// Database request for creating a new cook
#[derive(Debug, Clone)]
pub struct CookCreateDBRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub years_of_experience: i64,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub password_hash: Option<String>,
}

/// Database request for updating a cook's profile fields
#[derive(Debug, Clone, Default)]
pub struct CookUpdateDBRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub years_of_experience: Option<i64>,
    pub password_hash: Option<String>,
}

impl CookUpdateDBRequest {
    pub fn new(update: CookUpdate) -> Self {
        Self {
            username: update.username.map(|u| u.trim().to_string()),
            first_name: update.first_name,
            last_name: update.last_name,
            email: update.email.map(|e| e.trim().to_string()),
            years_of_experience: update.years_of_experience,
            password_hash: None, // Profile updates never touch the password
        }
    }
}

/// Database response for a cook
#[derive(Debug, Clone)]
pub struct CookDBResponse {
    pub id: CookId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub years_of_experience: i64,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
}
