// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Location queries.
//!
//! Location reads carry two derived fields that Diesel's DSL cannot express
//! cleanly, so they are computed by correlated subqueries in raw SQL:
//!
//! - `checked_in_today`: check-ins whose timestamp falls inside the current
//!   day window.
//! - `yesterday_full_at`: the timestamp of the first check-in of the previous
//!   day at which the running count for that day reached the capacity
//!   recorded on that check-in.
//!
//! Both windows are half-open UTC ranges produced by [`DayWindow`].

use checkin_domain::DayWindow;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::LocationData;
use crate::diesel_schema::locations;
use crate::error::PersistenceError;
use crate::queries::users::like_pattern;

/// Select list shared by every location read.
///
/// Bind order: today start, today end, yesterday start, yesterday end,
/// yesterday start.
const LOCATION_SELECT: &str = "\
SELECT l.location_id, l.name, l.normalized_name, l.capacity, l.user_id, \
       u.username, l.created_at, \
       (SELECT COUNT(*) FROM check_ins c \
         WHERE c.location_id = l.location_id \
           AND c.created_at >= ? AND c.created_at < ?) AS checked_in_today, \
       (SELECT c.created_at FROM check_ins c \
         WHERE c.location_id = l.location_id \
           AND c.created_at >= ? AND c.created_at < ? \
           AND (SELECT COUNT(*) FROM check_ins p \
                 WHERE p.location_id = c.location_id \
                   AND p.created_at >= ? \
                   AND p.check_in_id <= c.check_in_id) >= c.capacity \
         ORDER BY c.check_in_id LIMIT 1) AS yesterday_full_at \
FROM locations l JOIN users u ON u.user_id = l.user_id";

/// Row shape of [`LOCATION_SELECT`].
#[derive(QueryableByName)]
struct LocationRow {
    #[diesel(sql_type = BigInt)]
    location_id: i64,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    normalized_name: String,
    #[diesel(sql_type = Integer)]
    capacity: i32,
    #[diesel(sql_type = BigInt)]
    user_id: i64,
    #[diesel(sql_type = Text)]
    username: String,
    #[diesel(sql_type = Text)]
    created_at: String,
    #[diesel(sql_type = BigInt)]
    checked_in_today: i64,
    #[diesel(sql_type = Nullable<Text>)]
    yesterday_full_at: Option<String>,
}

impl From<LocationRow> for LocationData {
    fn from(row: LocationRow) -> Self {
        Self {
            location_id: row.location_id,
            name: row.name,
            normalized_name: row.normalized_name,
            capacity: row.capacity,
            user_id: row.user_id,
            username: row.username,
            created_at: row.created_at,
            checked_in_today: row.checked_in_today,
            yesterday_full_at: row.yesterday_full_at,
        }
    }
}

/// Starts a location query bound to the day windows derived from `today`.
macro_rules! location_query {
    ($suffix:expr, $today:expr) => {{
        let yesterday: DayWindow = $today.yesterday()?;
        diesel::sql_query(format!("{LOCATION_SELECT} {}", $suffix))
            .bind::<Text, _>($today.start().to_string())
            .bind::<Text, _>($today.end().to_string())
            .bind::<Text, _>(yesterday.start().to_string())
            .bind::<Text, _>(yesterday.end().to_string())
            .bind::<Text, _>(yesterday.start().to_string())
    }};
}

/// Retrieves a location by ID with derived fields for `today`.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the location does not exist.
pub fn get_location(
    conn: &mut SqliteConnection,
    location_id: i64,
    today: &DayWindow,
) -> Result<Option<LocationData>, PersistenceError> {
    debug!("Looking up location by ID: {}", location_id);

    let row: Option<LocationRow> = location_query!("WHERE l.location_id = ?", today)
        .bind::<BigInt, _>(location_id)
        .get_result(conn)
        .optional()?;

    Ok(row.map(LocationData::from))
}

/// Retrieves a location by normalized name with derived fields for `today`.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the location does not exist.
pub fn get_location_by_name(
    conn: &mut SqliteConnection,
    normalized_name: &str,
    today: &DayWindow,
) -> Result<Option<LocationData>, PersistenceError> {
    debug!("Looking up location by name: {}", normalized_name);

    let row: Option<LocationRow> = location_query!("WHERE l.normalized_name = ?", today)
        .bind::<Text, _>(normalized_name)
        .get_result(conn)
        .optional()?;

    Ok(row.map(LocationData::from))
}

/// Retrieves the location owned by a user.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user owns no location.
pub fn get_location_by_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    today: &DayWindow,
) -> Result<Option<LocationData>, PersistenceError> {
    debug!("Looking up location owned by user: {}", user_id);

    let row: Option<LocationRow> = location_query!("WHERE l.user_id = ?", today)
        .bind::<BigInt, _>(user_id)
        .get_result(conn)
        .optional()?;

    Ok(row.map(LocationData::from))
}

/// Lists one page of locations ordered by name.
///
/// `search` matches the display or normalized name anywhere.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_locations(
    conn: &mut SqliteConnection,
    search: Option<&str>,
    limit: i64,
    offset: i64,
    today: &DayWindow,
) -> Result<Vec<LocationData>, PersistenceError> {
    let pattern: Option<String> = search.map(like_pattern);

    let rows: Vec<LocationRow> = location_query!(
        "WHERE (? IS NULL OR l.name LIKE ? ESCAPE '\\' OR l.normalized_name LIKE ? ESCAPE '\\') \
         ORDER BY l.name, l.location_id LIMIT ? OFFSET ?",
        today
    )
    .bind::<Nullable<Text>, _>(pattern.clone())
    .bind::<Nullable<Text>, _>(pattern.clone())
    .bind::<Nullable<Text>, _>(pattern)
    .bind::<BigInt, _>(limit)
    .bind::<BigInt, _>(offset)
    .load(conn)?;

    Ok(rows.into_iter().map(LocationData::from).collect())
}

/// Counts locations matching `search`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_locations(
    conn: &mut SqliteConnection,
    search: Option<&str>,
) -> Result<i64, PersistenceError> {
    let mut query = locations::table.into_boxed();
    if let Some(pattern) = search.map(like_pattern) {
        query = query.filter(
            locations::name
                .like(pattern.clone())
                .escape('\\')
                .or(locations::normalized_name.like(pattern).escape('\\')),
        );
    }
    Ok(query.count().get_result(conn)?)
}

/// Checks whether a normalized location name is taken, optionally ignoring
/// one location.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn location_name_exists(
    conn: &mut SqliteConnection,
    normalized_name: &str,
    excluding_location_id: Option<i64>,
) -> Result<bool, PersistenceError> {
    let mut query = locations::table
        .filter(locations::normalized_name.eq(normalized_name))
        .into_boxed();
    if let Some(location_id) = excluding_location_id {
        query = query.filter(locations::location_id.ne(location_id));
    }
    let count: i64 = query.count().get_result(conn)?;
    Ok(count > 0)
}
