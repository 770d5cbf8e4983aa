use crate::{
    AppState,
    api::models::cooks::CurrentUser,
    auth::session,
    config::Config,
    db::{
        errors::DbError,
        handlers::{Cooks, Repository},
    },
    errors::{Error, Result},
    types::CookId,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::SqlitePool;
use tracing::{debug, instrument, trace};

/// Extract the cook id from the JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present, or only expired/invalid ones
/// - Some(Ok(id)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but unreadable
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &Config) -> Option<Result<CookId>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.native.session.cookie_name;

    for cookie in cookie_str.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=')
            && name == cookie_name
        {
            match session::verify_session_token(value, config) {
                Ok(claims) => return Some(Ok(claims.sub)),
                // Expired tokens are expected; keep looking
                Err(e) => trace!("Ignoring session cookie: {e}"),
            }
        }
    }
    None
}

/// Load the cook a session points at. A cook deleted since login is no longer authenticated.
async fn load_session_user(db: &SqlitePool, id: CookId) -> Result<Option<CurrentUser>> {
    let mut conn = db.acquire().await.map_err(DbError::from)?;
    let cook = Cooks::new(&mut conn).get_by_id(id).await?;
    Ok(cook.map(CurrentUser::from))
}

/// Look up the cook named by the trusted proxy header
/// Returns:
/// - None: No proxy header present
/// - Some(Ok(None)): Header present but names no known cook
/// - Some(Ok(Some(user))): Cook found
/// - Some(Err(error)): Lookup failed
#[instrument(skip(parts, config, db))]
async fn try_proxy_header_auth(parts: &Parts, config: &Config, db: &SqlitePool) -> Option<Result<Option<CurrentUser>>> {
    let username = parts
        .headers
        .get(&config.auth.proxy_header.header_name)
        .and_then(|h| h.to_str().ok())?
        .trim();

    Some(load_user_by_username(db, username).await)
}

async fn load_user_by_username(db: &SqlitePool, username: &str) -> Result<Option<CurrentUser>> {
    let mut conn = db.acquire().await.map_err(DbError::from)?;
    let cook = Cooks::new(&mut conn).get_by_username(username).await?;
    Ok(cook.map(CurrentUser::from))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Every method is tried in turn; the first that yields a cook wins.
        if state.config.auth.native.enabled {
            match try_jwt_session_auth(parts, &state.config) {
                Some(Ok(id)) => match load_session_user(&state.db, id).await? {
                    Some(user) => {
                        debug!("Found JWT session authenticated cook: {}", user.id);
                        return Ok(user);
                    }
                    None => trace!("Session refers to cook {id}, which no longer exists"),
                },
                Some(Err(e)) => trace!("JWT session authentication failed: {:?}", e),
                None => trace!("No JWT session authentication attempted"),
            }
        }

        if state.config.auth.proxy_header.enabled {
            match try_proxy_header_auth(parts, &state.config, &state.db).await {
                Some(Ok(Some(user))) => {
                    debug!("Found proxy header authenticated cook: {}", user.id);
                    return Ok(user);
                }
                Some(Ok(None)) => trace!("Proxy header names an unknown cook"),
                Some(Err(e)) => return Err(e),
                None => trace!("No proxy header authentication attempted"),
            }
        }

        Err(Error::Unauthenticated { message: None })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::cooks::CurrentUser,
        auth::session,
        test_utils::{create_test_cook, create_test_state},
    };
    use axum::{
        extract::FromRequestParts as _,
        http::{StatusCode, request::Parts},
    };
    use sqlx::SqlitePool;

    fn parts_with_header(header_name: &str, header_value: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(header_name, header_value)
            .body(())
            .unwrap();

        let (parts, _body) = request.into_parts();
        parts
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_proxy_header_extraction(pool: SqlitePool) {
        let state = create_test_state(pool.clone());
        let cook = create_test_cook(&pool, false).await;

        let mut parts = parts_with_header("x-kitchen-user", &cook.username);
        let current_user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();

        assert_eq!(current_user.id, cook.id);
        assert!(!current_user.is_elevated());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_proxy_user_is_unauthenticated(pool: SqlitePool) {
        let state = create_test_state(pool);

        let mut parts = parts_with_header("x-kitchen-user", "nobody");
        let error = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_missing_credentials_is_unauthenticated(pool: SqlitePool) {
        let state = create_test_state(pool);

        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let error = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_session_cookie_reloads_role(pool: SqlitePool) {
        let state = create_test_state(pool.clone());
        let cook = create_test_cook(&pool, false).await;

        let token = session::create_session_token(&cook, &state.config).unwrap();
        let cookie = format!("other=1; {}={token}", state.config.auth.native.session.cookie_name);

        // Promote after the token was issued; the extractor sees the current role
        {
            let mut conn = pool.acquire().await.unwrap();
            crate::db::handlers::Cooks::new(&mut conn).set_elevated(cook.id, true).await.unwrap();
        }

        let mut parts = parts_with_header("cookie", &cookie);
        let current_user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(current_user.id, cook.id);
        assert!(current_user.is_elevated());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_session_for_deleted_cook_is_rejected(pool: SqlitePool) {
        use crate::db::handlers::Repository as _;

        let state = create_test_state(pool.clone());
        let cook = create_test_cook(&pool, true).await;
        let token = session::create_session_token(&cook, &state.config).unwrap();

        {
            let mut conn = pool.acquire().await.unwrap();
            assert!(crate::db::handlers::Cooks::new(&mut conn).delete(cook.id).await.unwrap());
        }

        let cookie = format!("{}={token}", state.config.auth.native.session.cookie_name);
        let mut parts = parts_with_header("cookie", &cookie);
        let error = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_garbage_cookie_is_ignored(pool: SqlitePool) {
        let state = create_test_state(pool);

        let cookie = format!("{}=not-a-jwt", state.config.auth.native.session.cookie_name);
        let mut parts = parts_with_header("cookie", &cookie);
        let error = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
    }
}
