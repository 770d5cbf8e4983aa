//! Database repository for cooks.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::cooks::{CookCreateDBRequest, CookDBResponse, CookUpdateDBRequest},
};
use crate::types::CookId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::instrument;

const COOK_COLUMNS: &str = "id, username, password_hash, email, first_name, last_name, years_of_experience, \
                            is_staff, is_superuser, date_joined, last_login";

/// Filter for listing cooks. A missing limit returns every cook.
#[derive(Debug, Clone, Default)]
pub struct CookFilter {
    pub skip: i64,
    pub limit: Option<i64>,
}

impl CookFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit: Some(limit) }
    }

    pub fn all() -> Self {
        Self::default()
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Cook {
    pub id: CookId,
    pub username: String,
    pub password_hash: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub years_of_experience: i64,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<Cook> for CookDBResponse {
    fn from(cook: Cook) -> Self {
        Self {
            id: cook.id,
            username: cook.username,
            email: cook.email,
            first_name: cook.first_name,
            last_name: cook.last_name,
            years_of_experience: cook.years_of_experience,
            is_staff: cook.is_staff,
            is_superuser: cook.is_superuser,
            date_joined: cook.date_joined,
            last_login: cook.last_login,
            password_hash: cook.password_hash,
        }
    }
}

pub struct Cooks<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Cooks<'c> {
    type CreateRequest = CookCreateDBRequest;
    type UpdateRequest = CookUpdateDBRequest;
    type Response = CookDBResponse;
    type Id = CookId;
    type Filter = CookFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let cook = sqlx::query_as::<_, Cook>(&format!(
            r#"
            INSERT INTO cooks (username, password_hash, email, first_name, last_name, years_of_experience,
                               is_staff, is_superuser, date_joined)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {COOK_COLUMNS}
            "#
        ))
        .bind(&request.username)
        .bind(request.password_hash.as_deref())
        .bind(&request.email)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.years_of_experience)
        .bind(request.is_staff)
        .bind(request.is_superuser)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(CookDBResponse::from(cook))
    }

    #[instrument(skip(self), fields(cook_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let cook = sqlx::query_as::<_, Cook>(&format!("SELECT {COOK_COLUMNS} FROM cooks WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(cook.map(CookDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<CookId>) -> Result<HashMap<CookId, CookDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {COOK_COLUMNS} FROM cooks WHERE id IN ("));
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        query.push(")");

        let cooks = query.build_query_as::<Cook>().fetch_all(&mut *self.db).await?;

        Ok(cooks.into_iter().map(|c| (c.id, CookDBResponse::from(c))).collect())
    }

    #[instrument(skip(self, filter), fields(limit = ?filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // SQLite treats a negative LIMIT as unbounded
        let cooks = sqlx::query_as::<_, Cook>(&format!(
            "SELECT {COOK_COLUMNS} FROM cooks ORDER BY username, id LIMIT ? OFFSET ?"
        ))
        .bind(filter.limit.unwrap_or(-1))
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(cooks.into_iter().map(CookDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(cook_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // Assignments in dish_cooks cascade, the dishes themselves stay
        let result = sqlx::query("DELETE FROM cooks WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(cook_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let cook = sqlx::query_as::<_, Cook>(&format!(
            r#"
            UPDATE cooks SET
                username = COALESCE(?, username),
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                email = COALESCE(?, email),
                years_of_experience = COALESCE(?, years_of_experience),
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            RETURNING {COOK_COLUMNS}
            "#
        ))
        .bind(request.username.as_deref())
        .bind(request.first_name.as_deref())
        .bind(request.last_name.as_deref())
        .bind(request.email.as_deref())
        .bind(request.years_of_experience)
        .bind(request.password_hash.as_deref())
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(CookDBResponse::from(cook))
    }
}

impl<'c> Cooks<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<CookDBResponse>> {
        let cook = sqlx::query_as::<_, Cook>(&format!("SELECT {COOK_COLUMNS} FROM cooks WHERE username = ?"))
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(cook.map(CookDBResponse::from))
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cooks")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    /// Stamp a successful login
    #[instrument(skip(self), fields(cook_id = id), err)]
    pub async fn record_login(&mut self, id: CookId) -> Result<()> {
        let result = sqlx::query("UPDATE cooks SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Grant or revoke both elevation flags at once
    #[instrument(skip(self), fields(cook_id = id), err)]
    pub async fn set_elevated(&mut self, id: CookId, elevated: bool) -> Result<CookDBResponse> {
        let cook = sqlx::query_as::<_, Cook>(&format!(
            "UPDATE cooks SET is_staff = ?, is_superuser = ? WHERE id = ? RETURNING {COOK_COLUMNS}"
        ))
        .bind(elevated)
        .bind(elevated)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(CookDBResponse::from(cook))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    fn create_request(username: &str) -> CookCreateDBRequest {
        CookCreateDBRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "Test".to_string(),
            last_name: "Cook".to_string(),
            years_of_experience: 4,
            is_staff: false,
            is_superuser: false,
            password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string()),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_cook(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cooks::new(&mut conn);

        let before = Utc::now();
        let cook = repo.create(&create_request("gordon")).await.unwrap();

        assert_eq!(cook.username, "gordon");
        assert_eq!(cook.email, "gordon@example.com");
        assert_eq!(cook.years_of_experience, 4);
        assert!(!cook.is_superuser);
        assert!(cook.password_hash.is_some());
        assert!(cook.date_joined >= before - chrono::Duration::seconds(1));
        assert!(cook.last_login.is_none());

        let by_name = repo.get_by_username("gordon").await.unwrap().unwrap();
        assert_eq!(by_name.id, cook.id);
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_username_is_unique_violation(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cooks::new(&mut conn);

        repo.create(&create_request("gordon")).await.unwrap();
        let err = repo.create(&create_request("gordon")).await.unwrap_err();

        match err {
            DbError::UniqueViolation { table, constraint, .. } => {
                assert_eq!(table.as_deref(), Some("cooks"));
                assert_eq!(constraint.as_deref(), Some("username"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_negative_experience_is_rejected_by_store(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cooks::new(&mut conn);

        let mut request = create_request("gordon");
        request.years_of_experience = -1;

        assert!(matches!(repo.create(&request).await, Err(DbError::CheckViolation { .. })));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_orders_by_username(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cooks::new(&mut conn);

        for username in ["marco", "alice", "zed", "bob"] {
            repo.create(&create_request(username)).await.unwrap();
        }

        let all: Vec<_> = repo.list(&CookFilter::all()).await.unwrap().into_iter().map(|c| c.username).collect();
        assert_eq!(all, vec!["alice", "bob", "marco", "zed"]);

        let page: Vec<_> = repo.list(&CookFilter::new(1, 2)).await.unwrap().into_iter().map(|c| c.username).collect();
        assert_eq!(page, vec!["bob", "marco"]);

        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_profile_fields(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cooks::new(&mut conn);

        let cook = repo.create(&create_request("gordon")).await.unwrap();

        let updated = repo
            .update(
                cook.id,
                &CookUpdateDBRequest {
                    first_name: Some("Gordon".to_string()),
                    years_of_experience: Some(25),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "gordon");
        assert_eq!(updated.first_name, "Gordon");
        assert_eq!(updated.last_name, "Cook");
        assert_eq!(updated.years_of_experience, 25);
        assert_eq!(updated.password_hash, cook.password_hash);

        let missing = repo.update(cook.id + 1000, &CookUpdateDBRequest::default()).await;
        assert!(matches!(missing, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_elevation_and_login_stamp(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cooks::new(&mut conn);

        let cook = repo.create(&create_request("gordon")).await.unwrap();

        let elevated = repo.set_elevated(cook.id, true).await.unwrap();
        assert!(elevated.is_staff);
        assert!(elevated.is_superuser);

        repo.record_login(cook.id).await.unwrap();
        let reloaded = repo.get_by_id(cook.id).await.unwrap().unwrap();
        assert!(reloaded.last_login.is_some());

        assert!(matches!(repo.record_login(cook.id + 1000).await, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_bulk_and_delete(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cooks::new(&mut conn);

        let alice = repo.create(&create_request("alice")).await.unwrap();
        let bob = repo.create(&create_request("bob")).await.unwrap();

        let bulk = repo.get_bulk(vec![alice.id, bob.id, 9999]).await.unwrap();
        assert_eq!(bulk.len(), 2);
        assert_eq!(bulk[&bob.id].username, "bob");

        assert!(repo.delete(alice.id).await.unwrap());
        assert!(!repo.delete(alice.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
