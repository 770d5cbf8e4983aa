//! API request/response models for cooks.

use super::dishes::DishSummary;
use super::validation::{REQUIRED, max_length};
use crate::auth::password::validate_new_password;
use crate::config::PasswordConfig;
use crate::db::models::cooks::{CookCreateDBRequest, CookDBResponse};
use crate::errors::{FieldErrors, Result};
use crate::types::CookId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const NAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Fields a cook create form always offers.
pub const BASE_FORM_FIELDS: &[&str] = &["username", "email", "years_of_experience", "password", "password_confirmation"];

/// Fields only offered to elevated callers.
pub const ELEVATED_FORM_FIELDS: &[&str] = &["is_staff", "is_superuser"];

/// The authenticated caller, loaded fresh from the store on every request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub id: CookId,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl CurrentUser {
    /// Superusers hold the elevated role.
    pub fn is_elevated(&self) -> bool {
        self.is_superuser
    }
}

impl From<CookDBResponse> for CurrentUser {
    fn from(db: CookDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            email: db.email,
            is_staff: db.is_staff,
            is_superuser: db.is_superuser,
        }
    }
}

/// Request body for creating a cook.
///
/// `is_staff` and `is_superuser` are only honoured for elevated callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CookCreate {
    #[serde(default)]
    #[schema(example = "gordon")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "gordon@kitchen.local")]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    #[schema(example = 12)]
    pub years_of_experience: Option<i64>,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

impl CookCreate {
    pub fn validate(&self, password_config: &PasswordConfig) -> Result<()> {
        let mut errors = FieldErrors::new();
        validate_username(&self.username, &mut errors);
        if let Some(email) = &self.email {
            validate_email(email, &mut errors);
        }
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if let Some(value) = value {
                max_length(field, value, NAME_MAX_LENGTH, &mut errors);
            }
        }
        if let Some(years) = self.years_of_experience {
            validate_years_of_experience(years, &mut errors);
        }
        validate_new_password(&self.password, &self.password_confirmation, password_config, &mut errors);
        errors.into_result()
    }

    /// Build the store request. Role flags are dropped unless `allow_flags` is set.
    pub fn into_db_request(self, password_hash: String, allow_flags: bool) -> CookCreateDBRequest {
        CookCreateDBRequest {
            username: self.username.trim().to_string(),
            email: self.email.map(|e| e.trim().to_string()).unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            years_of_experience: self.years_of_experience.unwrap_or(0),
            is_staff: allow_flags && self.is_staff.unwrap_or(false),
            is_superuser: allow_flags && self.is_superuser.unwrap_or(false),
            password_hash: Some(password_hash),
        }
    }
}

/// Request body for updating a cook's profile. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CookUpdate {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub years_of_experience: Option<i64>,
}

impl CookUpdate {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if let Some(username) = &self.username {
            validate_username(username, &mut errors);
        }
        if let Some(email) = &self.email {
            validate_email(email, &mut errors);
        }
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if let Some(value) = value {
                max_length(field, value, NAME_MAX_LENGTH, &mut errors);
            }
        }
        if let Some(years) = self.years_of_experience {
            validate_years_of_experience(years, &mut errors);
        }
        errors.into_result()
    }
}

/// Roster entry. Carries no contact details or role flags.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CookSummary {
    pub id: CookId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub years_of_experience: i64,
}

impl From<CookDBResponse> for CookSummary {
    fn from(db: CookDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            first_name: db.first_name,
            last_name: db.last_name,
            years_of_experience: db.years_of_experience,
        }
    }
}

/// Full cook details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CookResponse {
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
    /// "{username} - {years_of_experience} - {email}"
    #[schema(example = "gordon - 12 - gordon@kitchen.local")]
    pub display: String,
    /// Dishes this cook is assigned to
    #[schema(no_recursion)]
    pub dishes: Vec<DishSummary>,
}

impl From<CookDBResponse> for CookResponse {
    fn from(db: CookDBResponse) -> Self {
        let display = format!("{} - {} - {}", db.username, db.years_of_experience, db.email);
        Self {
            id: db.id,
            username: db.username,
            email: db.email,
            first_name: db.first_name,
            last_name: db.last_name,
            years_of_experience: db.years_of_experience,
            is_staff: db.is_staff,
            is_superuser: db.is_superuser,
            date_joined: db.date_joined,
            last_login: db.last_login,
            display,
            dishes: Vec::new(),
        }
    }
}

impl CookResponse {
    pub fn with_dishes(mut self, dishes: Vec<DishSummary>) -> Self {
        self.dishes = dishes;
        self
    }
}

/// Describes the cook create form offered to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CookFormResponse {
    /// Field names, in display order
    #[schema(example = json!(["username", "email", "years_of_experience", "password", "password_confirmation"]))]
    pub fields: Vec<String>,
}

impl CookFormResponse {
    pub fn for_caller(elevated: bool) -> Self {
        let mut fields: Vec<String> = BASE_FORM_FIELDS.iter().map(|f| f.to_string()).collect();
        if elevated {
            fields.extend(ELEVATED_FORM_FIELDS.iter().map(|f| f.to_string()));
        }
        Self { fields }
    }
}

fn validate_username(username: &str, errors: &mut FieldErrors) {
    let username = username.trim();
    if username.is_empty() {
        errors.add("username", REQUIRED);
        return;
    }
    max_length("username", username, USERNAME_MAX_LENGTH, errors);
    if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

/// Empty means "no email". Otherwise expects a single `@` with text on both sides and a dot
/// in the domain.
fn validate_email(email: &str, errors: &mut FieldErrors) {
    let email = email.trim();
    if email.is_empty() {
        return;
    }
    max_length("email", email, EMAIL_MAX_LENGTH, errors);
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        errors.add("email", "Enter a valid email address.");
    }
}

fn validate_years_of_experience(years: i64, errors: &mut FieldErrors) {
    if years < 0 {
        errors.add("years_of_experience", "Ensure this value is greater than or equal to 0.");
    }
}
