use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::CreateUserDto;
use crate::errors::DomainError;
use crate::models::User;
use crate::schema::users;
use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::require_text;

/// Creates a new user
///
/// ### Errors
///
/// Returns an error if:
/// - The name is blank or the email is not an address
/// - Another user already has the email (conflict)
#[instrument(skip(pool, dto), fields(email = %dto.email, role = %dto.role))]
pub async fn create_user(pool: &DbPool, dto: CreateUserDto) -> Result<User> {
    debug!("Creating user");

    require_text("Name", &dto.name)?;
    let email = dto.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(DomainError::Invalid(format!("Invalid email address: {}", dto.email)).into());
    }

    let mut conn = pool.get()?;
    let taken = users::table
        .filter(users::email.eq(&email))
        .select(users::id)
        .first::<String>(&mut conn)
        .optional()?;
    if taken.is_some() {
        return Err(DomainError::Conflict(format!("A user with email {} already exists", email)).into());
    }

    // Insert the new user into the database
    let user = User::new(dto.name, email, dto.role);
    diesel::insert_into(users::table)
        .values(&user)
        .execute_with_retry(&mut conn).await?;

    info!("Successfully created user with id: {}", user.get_id());

    Ok(user)
}

#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn get_user(pool: &DbPool, user_id: &str) -> Result<Option<User>> {
    let mut conn = pool.get()?;
    let user = users::table
        .find(user_id)
        .select(User::as_select())
        .first(&mut conn)
        .optional()?;
    Ok(user)
}

/// Lists users by name
#[instrument(skip(pool))]
pub fn list_users(pool: &DbPool) -> Result<Vec<User>> {
    let mut conn = pool.get()?;
    let result = users::table
        .select(User::as_select())
        .order(users::name.asc())
        .load(&mut conn)?;
    Ok(result)
}

#[cfg(test)]
mod tests;
