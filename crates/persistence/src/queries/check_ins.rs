// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Check-in listing and statistics queries.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::{CheckInData, CheckInFilter, CheckInStats, DailyCount, SchoolCount};
use crate::diesel_schema::{check_ins, locations, schools};
use crate::error::PersistenceError;

type CheckInTuple = (i64, i64, String, i64, String, i32, String);

fn to_check_in(row: CheckInTuple) -> CheckInData {
    let (check_in_id, location_id, location_name, school_id, school_name, capacity, created_at) =
        row;
    CheckInData {
        check_in_id,
        location_id,
        location_name,
        school_id,
        school_name,
        capacity,
        created_at,
    }
}

/// Narrows a boxed check-in query by every populated filter field.
macro_rules! apply_filter {
    ($query:expr, $filter:expr) => {{
        let mut query = $query;
        if let Some(location_id) = $filter.location_id {
            query = query.filter(check_ins::location_id.eq(location_id));
        }
        if let Some(school_id) = $filter.school_id {
            query = query.filter(check_ins::school_id.eq(school_id));
        }
        if let Some(from) = $filter.from.clone() {
            query = query.filter(check_ins::created_at.ge(from));
        }
        if let Some(to) = $filter.to.clone() {
            query = query.filter(check_ins::created_at.lt(to));
        }
        query
    }};
}

/// Retrieves a check-in by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_check_in(
    conn: &mut SqliteConnection,
    check_in_id: i64,
) -> Result<Option<CheckInData>, PersistenceError> {
    debug!("Looking up check-in by ID: {}", check_in_id);

    let row: Option<CheckInTuple> = check_ins::table
        .inner_join(locations::table)
        .inner_join(schools::table)
        .filter(check_ins::check_in_id.eq(check_in_id))
        .select((
            check_ins::check_in_id,
            check_ins::location_id,
            locations::name,
            check_ins::school_id,
            schools::name,
            check_ins::capacity,
            check_ins::created_at,
        ))
        .first(conn)
        .optional()?;

    Ok(row.map(to_check_in))
}

/// Lists one page of check-ins, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_check_ins(
    conn: &mut SqliteConnection,
    filter: &CheckInFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<CheckInData>, PersistenceError> {
    let query = check_ins::table
        .inner_join(locations::table)
        .inner_join(schools::table)
        .select((
            check_ins::check_in_id,
            check_ins::location_id,
            locations::name,
            check_ins::school_id,
            schools::name,
            check_ins::capacity,
            check_ins::created_at,
        ))
        .into_boxed();

    let rows: Vec<CheckInTuple> = apply_filter!(query, filter)
        .order(check_ins::check_in_id.desc())
        .limit(limit)
        .offset(offset)
        .load(conn)?;

    Ok(rows.into_iter().map(to_check_in).collect())
}

/// Counts check-ins matching `filter`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_check_ins(
    conn: &mut SqliteConnection,
    filter: &CheckInFilter,
) -> Result<i64, PersistenceError> {
    let query = check_ins::table.into_boxed();
    Ok(apply_filter!(query, filter).count().get_result(conn)?)
}

/// Shared predicate of the statistics queries.
///
/// Bind order: from, from, to, to, location, location, school, school.
const STATS_WHERE: &str = "\
WHERE (? IS NULL OR c.created_at >= ?) \
  AND (? IS NULL OR c.created_at < ?) \
  AND (? IS NULL OR c.location_id = ?) \
  AND (? IS NULL OR c.school_id = ?)";

#[derive(QueryableByName)]
struct DailyCountRow {
    #[diesel(sql_type = Text)]
    date: String,
    #[diesel(sql_type = BigInt)]
    location_id: i64,
    #[diesel(sql_type = Text)]
    location_name: String,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct SchoolCountRow {
    #[diesel(sql_type = BigInt)]
    school_id: i64,
    #[diesel(sql_type = Text)]
    school_name: String,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

macro_rules! bind_stats_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind::<Nullable<Text>, _>($filter.from.clone())
            .bind::<Nullable<Text>, _>($filter.from.clone())
            .bind::<Nullable<Text>, _>($filter.to.clone())
            .bind::<Nullable<Text>, _>($filter.to.clone())
            .bind::<Nullable<BigInt>, _>($filter.location_id)
            .bind::<Nullable<BigInt>, _>($filter.location_id)
            .bind::<Nullable<BigInt>, _>($filter.school_id)
            .bind::<Nullable<BigInt>, _>($filter.school_id)
    };
}

/// Aggregates check-ins per local day and location, and per school.
///
/// `local_modifier` is the `SQLite` date modifier that shifts stored UTC
/// timestamps into local time before taking the date.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn check_in_stats(
    conn: &mut SqliteConnection,
    filter: &CheckInFilter,
    local_modifier: &str,
) -> Result<CheckInStats, PersistenceError> {
    debug!(?filter, local_modifier, "Computing check-in statistics");

    let day_sql: String = format!(
        "SELECT date(c.created_at, ?) AS date, c.location_id, l.name AS location_name, \
                COUNT(*) AS count \
         FROM check_ins c JOIN locations l ON l.location_id = c.location_id \
         {STATS_WHERE} \
         GROUP BY 1, 2, 3 ORDER BY 1, 3"
    );
    let day_rows: Vec<DailyCountRow> = bind_stats_filter!(
        diesel::sql_query(day_sql).bind::<Text, _>(local_modifier),
        filter
    )
    .load(conn)?;

    let school_sql: String = format!(
        "SELECT c.school_id, s.name AS school_name, COUNT(*) AS count \
         FROM check_ins c JOIN schools s ON s.school_id = c.school_id \
         {STATS_WHERE} \
         GROUP BY 1, 2 ORDER BY 3 DESC, 2"
    );
    let school_rows: Vec<SchoolCountRow> =
        bind_stats_filter!(diesel::sql_query(school_sql), filter).load(conn)?;

    let schools: Vec<SchoolCount> = school_rows
        .into_iter()
        .map(|row| SchoolCount {
            school_id: row.school_id,
            school_name: row.school_name,
            count: row.count,
        })
        .collect();
    let total: i64 = schools.iter().map(|s| s.count).sum();

    Ok(CheckInStats {
        days: day_rows
            .into_iter()
            .map(|row| DailyCount {
                date: row.date,
                location_id: row.location_id,
                location_name: row.location_name,
                count: row.count,
            })
            .collect(),
        schools,
        total,
    })
}
