// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::UserData;
use crate::diesel_schema::{locations, users};
use crate::error::PersistenceError;

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct UserRow {
    user_id: i64,
    username: String,
    password_hash: String,
    role: String,
    created_at: String,
    last_login_at: Option<String>,
}

impl From<UserRow> for UserData {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            password_hash: row.password_hash,
            role: row.role,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_id(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserData>, PersistenceError> {
    debug!("Looking up user by ID: {}", user_id);

    let row: Option<UserRow> = users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(UserData::from))
}

/// Retrieves a user by username.
///
/// The caller passes the already-normalized username.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<UserData>, PersistenceError> {
    debug!("Looking up user by username: {}", username);

    let row: Option<UserRow> = users::table
        .filter(users::username.eq(username))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(UserData::from))
}

/// Checks whether a username is taken, optionally ignoring one user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn username_exists(
    conn: &mut SqliteConnection,
    username: &str,
    excluding_user_id: Option<i64>,
) -> Result<bool, PersistenceError> {
    let mut query = users::table
        .filter(users::username.eq(username))
        .into_boxed();
    if let Some(user_id) = excluding_user_id {
        query = query.filter(users::user_id.ne(user_id));
    }
    let count: i64 = query.count().get_result(conn)?;
    Ok(count > 0)
}

/// Counts users whose username contains `search`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(
    conn: &mut SqliteConnection,
    search: Option<&str>,
) -> Result<i64, PersistenceError> {
    let mut query = users::table.into_boxed();
    if let Some(pattern) = search.map(like_pattern) {
        query = query.filter(users::username.like(pattern).escape('\\'));
    }
    Ok(query.count().get_result(conn)?)
}

/// Lists one page of users ordered by username.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(
    conn: &mut SqliteConnection,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserData>, PersistenceError> {
    let mut query = users::table.select(UserRow::as_select()).into_boxed();
    if let Some(pattern) = search.map(like_pattern) {
        query = query.filter(users::username.like(pattern).escape('\\'));
    }

    let rows: Vec<UserRow> = query
        .order(users::username.asc())
        .limit(limit)
        .offset(offset)
        .load(conn)?;

    Ok(rows.into_iter().map(UserData::from).collect())
}

/// Counts users holding a role.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users_with_role(
    conn: &mut SqliteConnection,
    role: &str,
) -> Result<i64, PersistenceError> {
    Ok(users::table
        .filter(users::role.eq(role))
        .count()
        .get_result(conn)?)
}

/// Checks whether a user owns a location.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn user_owns_location(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = locations::table
        .filter(locations::user_id.eq(user_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Builds a `LIKE` pattern matching `search` anywhere, escaping wildcards.
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped: String = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
