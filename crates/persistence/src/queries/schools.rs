// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! School queries.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::SchoolData;
use crate::diesel_schema::{check_ins, schools};
use crate::error::PersistenceError;
use crate::queries::users::like_pattern;

#[derive(Queryable, Selectable)]
#[diesel(table_name = schools)]
struct SchoolRow {
    school_id: i64,
    name: String,
    created_at: String,
}

impl From<SchoolRow> for SchoolData {
    fn from(row: SchoolRow) -> Self {
        Self {
            school_id: row.school_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Retrieves a school by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_school(
    conn: &mut SqliteConnection,
    school_id: i64,
) -> Result<Option<SchoolData>, PersistenceError> {
    let row: Option<SchoolRow> = schools::table
        .filter(schools::school_id.eq(school_id))
        .select(SchoolRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(SchoolData::from))
}

/// Checks whether a school name is taken (case-insensitive), optionally
/// ignoring one school.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn school_name_exists(
    conn: &mut SqliteConnection,
    name: &str,
    excluding_school_id: Option<i64>,
) -> Result<bool, PersistenceError> {
    // The column is declared COLLATE NOCASE, so equality ignores case.
    let mut query = schools::table.filter(schools::name.eq(name)).into_boxed();
    if let Some(school_id) = excluding_school_id {
        query = query.filter(schools::school_id.ne(school_id));
    }
    let count: i64 = query.count().get_result(conn)?;
    Ok(count > 0)
}

/// Counts schools whose name contains `search`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_schools(
    conn: &mut SqliteConnection,
    search: Option<&str>,
) -> Result<i64, PersistenceError> {
    let mut query = schools::table.into_boxed();
    if let Some(pattern) = search.map(like_pattern) {
        query = query.filter(schools::name.like(pattern).escape('\\'));
    }
    Ok(query.count().get_result(conn)?)
}

/// Lists one page of schools ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_schools(
    conn: &mut SqliteConnection,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<SchoolData>, PersistenceError> {
    let mut query = schools::table.select(SchoolRow::as_select()).into_boxed();
    if let Some(pattern) = search.map(like_pattern) {
        query = query.filter(schools::name.like(pattern).escape('\\'));
    }
    let rows: Vec<SchoolRow> = query
        .order(schools::name.asc())
        .limit(limit)
        .offset(offset)
        .load(conn)?;
    Ok(rows.into_iter().map(SchoolData::from).collect())
}

/// Checks whether any check-in references a school.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn school_has_check_ins(
    conn: &mut SqliteConnection,
    school_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = check_ins::table
        .filter(check_ins::school_id.eq(school_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
