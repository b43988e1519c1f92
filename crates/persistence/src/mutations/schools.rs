// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! School mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::schools;
use crate::error::PersistenceError;
use crate::queries::schools::school_has_check_ins;

/// Creates a school.
///
/// # Errors
///
/// Returns an error if the name is taken or the insert fails.
pub fn create_school(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    diesel::insert_into(schools::table)
        .values(schools::name.eq(name))
        .execute(conn)?;

    let school_id: i64 = get_last_insert_rowid(conn)?;
    info!(school_id, name, "School created");
    Ok(school_id)
}

/// Renames a school.
///
/// # Errors
///
/// Returns an error if the school does not exist, the name is taken, or
/// the update fails.
pub fn update_school(
    conn: &mut SqliteConnection,
    school_id: i64,
    name: &str,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(schools::table.filter(schools::school_id.eq(school_id)))
        .set(schools::name.eq(name))
        .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("school {school_id}")));
    }
    info!(school_id, name, "School renamed");
    Ok(())
}

/// Deletes a school that no check-in references.
///
/// # Errors
///
/// Returns [`PersistenceError::Referenced`] while check-ins reference the
/// school, [`PersistenceError::NotFound`] if there is no such school, or a
/// database error.
pub fn delete_school(conn: &mut SqliteConnection, school_id: i64) -> Result<(), PersistenceError> {
    if school_has_check_ins(conn, school_id)? {
        return Err(PersistenceError::Referenced {
            entity: "school",
            id: school_id,
            referenced_by: "check-ins",
        });
    }

    let rows: usize =
        diesel::delete(schools::table.filter(schools::school_id.eq(school_id))).execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("school {school_id}")));
    }
    info!(school_id, "School deleted");
    Ok(())
}
