use axum::{
    extract::{FromRef, FromRequestParts, Path, State},
    http::request::Parts,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::db::DbPool;
use crate::dto::CreateUserDto;
use crate::errors::ApiError;
use crate::models::{Permission, User};
use crate::repo;

/// Header carrying the id of the acting user
///
/// Authentication happens in front of the portal; the proxy sets this
/// header once the user is signed in.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf a request is made
///
/// Extracting it rejects the request with 401 when the header is missing or
/// names no known user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Fails with 403 unless the user's role grants `permission`
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.0.get_role().has_permission(permission) {
            Ok(())
        } else {
            warn!(user_id = %self.0.get_id(), %permission, "Permission denied");
            Err(ApiError::Forbidden(format!("Missing permission {}", permission)))
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<DbPool>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        let pool = Arc::<DbPool>::from_ref(state);
        let user = repo::get_user(&pool, user_id)?.ok_or(ApiError::Unauthorized)?;

        debug!(user_id = %user.get_id(), "Resolved acting user");

        Ok(CurrentUser(user))
    }
}

/// Handler for registering a user
///
/// This function handles POST requests to `/users`.
///
/// ### Returns
///
/// The new user, or a 409 when the email address is taken
#[instrument(skip(pool, payload), fields(role = %payload.role))]
pub async fn create_user_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<CreateUserDto>,
) -> Result<Json<User>, ApiError> {
    info!("Creating user");

    let user = repo::create_user(&pool, payload).await?;

    info!("Successfully created user with id: {}", user.get_id());

    Ok(Json(user))
}

/// This function handles GET requests to `/users/{id}`.
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn get_user_handler(
    State(pool): State<Arc<DbPool>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = repo::get_user(&pool, &user_id)?.ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

/// This function handles GET requests to `/users`.
#[instrument(skip(pool))]
pub async fn list_users_handler(State(pool): State<Arc<DbPool>>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(repo::list_users(&pool)?))
}

/// Handler for the permissions granted to a user
///
/// This function handles GET requests to `/users/{id}/permissions`.
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn get_user_permissions_handler(
    State(pool): State<Arc<DbPool>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    let user = repo::get_user(&pool, &user_id)?.ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user.get_role().permissions()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::test_utils::{create_test_user, setup_test_db};
    use axum::http::Request;

    async fn extract(pool: &Arc<DbPool>, header: Option<&str>) -> Result<CurrentUser, ApiError> {
        let mut builder = Request::builder().uri("/polls");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, pool).await
    }

    #[tokio::test]
    async fn test_current_user_from_header() {
        let pool = setup_test_db();
        let user = create_test_user(&pool, Role::Member).await;

        let current = extract(&pool, Some(&user.get_id())).await.unwrap();

        assert_eq!(current.0.get_id(), user.get_id());
    }

    #[tokio::test]
    async fn test_current_user_missing_or_unknown() {
        let pool = setup_test_db();

        assert!(matches!(extract(&pool, None).await, Err(ApiError::Unauthorized)));
        assert!(matches!(extract(&pool, Some("ghost")).await, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_require_permission() {
        let pool = setup_test_db();
        let guest = CurrentUser(create_test_user(&pool, Role::Guest).await);
        let member = CurrentUser(create_test_user(&pool, Role::Member).await);

        assert!(matches!(guest.require(Permission::PollsVote), Err(ApiError::Forbidden(_))));
        assert!(member.require(Permission::PollsVote).is_ok());
    }

    #[tokio::test]
    async fn test_get_user_permissions_handler() {
        let pool = setup_test_db();
        let board = create_test_user(&pool, Role::Board).await;

        let permissions = get_user_permissions_handler(State(pool.clone()), Path(board.get_id()))
            .await
            .unwrap();

        assert!(permissions.0.contains(&Permission::TreasuryWrite));
        assert!(!permissions.0.contains(&Permission::UsersManage));
    }
}
