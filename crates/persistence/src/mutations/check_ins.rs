// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Check-in mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::check_ins;
use crate::error::PersistenceError;

/// Records a check-in.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `location_id` - Where the check-in happened
/// * `school_id` - The visiting school
/// * `capacity` - The location's capacity at this moment
/// * `created_at` - Stored UTC timestamp of the check-in
///
/// # Errors
///
/// Returns an error if the location or school does not exist or the insert
/// fails.
pub fn create_check_in(
    conn: &mut SqliteConnection,
    location_id: i64,
    school_id: i64,
    capacity: i32,
    created_at: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(check_ins::table)
        .values((
            check_ins::location_id.eq(location_id),
            check_ins::school_id.eq(school_id),
            check_ins::capacity.eq(capacity),
            check_ins::created_at.eq(created_at),
        ))
        .execute(conn)?;

    let check_in_id: i64 = get_last_insert_rowid(conn)?;
    info!(check_in_id, location_id, school_id, "Check-in recorded");
    Ok(check_in_id)
}

/// Deletes a check-in.
///
/// # Errors
///
/// Returns [`PersistenceError::NotFound`] if there is no such check-in, or a
/// database error.
pub fn delete_check_in(
    conn: &mut SqliteConnection,
    check_in_id: i64,
) -> Result<(), PersistenceError> {
    let rows: usize =
        diesel::delete(check_ins::table.filter(check_ins::check_in_id.eq(check_in_id)))
            .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("check-in {check_in_id}")));
    }
    info!(check_in_id, "Check-in deleted");
    Ok(())
}
