// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session token mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::SessionKind;
use crate::diesel_schema::sessions;
use crate::error::PersistenceError;

/// Stores a new session token.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The opaque token
/// * `kind` - Whether this is an access or refresh token
/// * `user_id` - The owning user
/// * `expires_at` - Stored UTC timestamp after which the token is invalid
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    kind: SessionKind,
    user_id: i64,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    debug!(user_id, kind = kind.as_str(), "Creating session");

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::kind.eq(kind.as_str()),
            sessions::user_id.eq(user_id),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

/// Deletes a session by token. Returns whether a row was removed.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<bool, PersistenceError> {
    let rows: usize =
        diesel::delete(sessions::table.filter(sessions::session_token.eq(session_token)))
            .execute(conn)?;
    Ok(rows > 0)
}

/// Deletes every session of a user.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_sessions_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<usize, PersistenceError> {
    let rows: usize = diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id)))
        .execute(conn)?;
    info!(user_id, rows, "Deleted sessions for user");
    Ok(rows)
}

/// Deletes sessions whose expiry is at or before `now`.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let rows: usize = diesel::delete(sessions::table.filter(sessions::expires_at.le(now)))
        .execute(conn)?;
    if rows > 0 {
        info!(rows, "Deleted expired sessions");
    }
    Ok(rows)
}
