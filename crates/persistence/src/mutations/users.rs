// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::UserUpdate;
use crate::diesel_schema::users;
use crate::error::PersistenceError;
use crate::queries::users::user_owns_location;

#[derive(AsChangeset)]
#[diesel(table_name = users)]
struct UserChangeset<'a> {
    username: Option<&'a str>,
    password_hash: Option<String>,
    role: Option<&'a str>,
}

/// Hashes a plain-text password with bcrypt.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PersistenceError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Creates a new user account.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `username` - The normalized username
/// * `password` - The plain-text password (will be hashed)
/// * `role` - The stored role name
/// * `hash_cost` - The bcrypt cost factor
///
/// # Errors
///
/// Returns an error if the user cannot be created or if the username
/// already exists.
pub fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
    role: &str,
    hash_cost: u32,
) -> Result<i64, PersistenceError> {
    info!("Creating user with username: {}, role: {}", username, role);

    let password_hash: String = hash_password(password, hash_cost)?;

    diesel::insert_into(users::table)
        .values((
            users::username.eq(username),
            users::password_hash.eq(&password_hash),
            users::role.eq(role),
        ))
        .execute(conn)?;

    let user_id: i64 = get_last_insert_rowid(conn)?;

    info!(user_id, "User created successfully");
    Ok(user_id)
}

/// Applies the populated fields of `update` to a user.
///
/// # Errors
///
/// Returns an error if the user does not exist, the new username is taken,
/// or the database update fails.
pub fn update_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    update: &UserUpdate<'_>,
    hash_cost: u32,
) -> Result<(), PersistenceError> {
    let changeset: UserChangeset<'_> = UserChangeset {
        username: update.username,
        password_hash: update
            .password
            .map(|password| hash_password(password, hash_cost))
            .transpose()?,
        role: update.role,
    };

    if changeset.username.is_none() && changeset.password_hash.is_none() && changeset.role.is_none()
    {
        debug!(user_id, "Empty user update");
        let exists: i64 = users::table
            .filter(users::user_id.eq(user_id))
            .count()
            .get_result(conn)?;
        return if exists == 0 {
            Err(PersistenceError::NotFound(format!("user {user_id}")))
        } else {
            Ok(())
        };
    }

    let rows: usize = diesel::update(users::table.filter(users::user_id.eq(user_id)))
        .set(&changeset)
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("user {user_id}")));
    }

    info!(user_id, "User updated");
    Ok(())
}

/// Records a successful login.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn record_login(
    conn: &mut SqliteConnection,
    user_id: i64,
    at: &str,
) -> Result<(), PersistenceError> {
    diesel::update(users::table.filter(users::user_id.eq(user_id)))
        .set(users::last_login_at.eq(Some(at)))
        .execute(conn)?;
    Ok(())
}

/// Deletes a user and, through the cascade, its sessions.
///
/// # Errors
///
/// Returns [`PersistenceError::Referenced`] if the user owns a location,
/// [`PersistenceError::NotFound`] if there is no such user, or a database
/// error.
pub fn delete_user(conn: &mut SqliteConnection, user_id: i64) -> Result<(), PersistenceError> {
    if user_owns_location(conn, user_id)? {
        return Err(PersistenceError::Referenced {
            entity: "user",
            id: user_id,
            referenced_by: "location",
        });
    }

    let rows: usize =
        diesel::delete(users::table.filter(users::user_id.eq(user_id))).execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("user {user_id}")));
    }

    info!(user_id, "User deleted");
    Ok(())
}
