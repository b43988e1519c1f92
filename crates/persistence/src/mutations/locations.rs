// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Location mutations.
//!
//! A location and the `Location`-role account that owns it are created,
//! updated and deleted together inside one transaction.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{LocationUpdate, NewLocation, UserUpdate};
use crate::diesel_schema::{check_ins, locations, users};
use crate::error::PersistenceError;
use crate::mutations::users::{create_user, update_user};

/// Role stored on the account that owns a location.
const LOCATION_ROLE: &str = "Location";

#[derive(AsChangeset)]
#[diesel(table_name = locations)]
struct LocationChangeset<'a> {
    name: Option<&'a str>,
    normalized_name: Option<&'a str>,
    capacity: Option<i32>,
}

fn owning_user(conn: &mut SqliteConnection, location_id: i64) -> Result<i64, PersistenceError> {
    locations::table
        .filter(locations::location_id.eq(location_id))
        .select(locations::user_id)
        .first::<i64>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("location {location_id}")))
}

/// Creates a location together with its owning account.
///
/// Returns the new location ID.
///
/// # Errors
///
/// Returns an error if the username or normalized name is taken, or if
/// either insert fails. Nothing is written in that case.
pub fn create_location_with_user(
    conn: &mut SqliteConnection,
    new_location: &NewLocation<'_>,
    hash_cost: u32,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let user_id: i64 = create_user(
            conn,
            new_location.username,
            new_location.password,
            LOCATION_ROLE,
            hash_cost,
        )?;

        diesel::insert_into(locations::table)
            .values((
                locations::name.eq(new_location.name),
                locations::normalized_name.eq(new_location.normalized_name),
                locations::capacity.eq(new_location.capacity),
                locations::user_id.eq(user_id),
            ))
            .execute(conn)?;

        let location_id: i64 = get_last_insert_rowid(conn)?;
        info!(
            location_id,
            user_id,
            name = new_location.normalized_name,
            capacity = new_location.capacity,
            "Location created"
        );
        Ok(location_id)
    })
}

/// Applies the populated fields of `update` to a location and its account.
///
/// # Errors
///
/// Returns an error if the location does not exist, a unique constraint
/// rejects the change, or the update fails. Nothing is written in that case.
pub fn update_location(
    conn: &mut SqliteConnection,
    location_id: i64,
    update: &LocationUpdate<'_>,
    hash_cost: u32,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let user_id: i64 = owning_user(conn, location_id)?;

        let changeset: LocationChangeset<'_> = LocationChangeset {
            name: update.name.map(|(display, _)| display),
            normalized_name: update.name.map(|(_, normalized)| normalized),
            capacity: update.capacity,
        };
        if changeset.name.is_some() || changeset.capacity.is_some() {
            diesel::update(locations::table.filter(locations::location_id.eq(location_id)))
                .set(&changeset)
                .execute(conn)?;
        }

        if update.username.is_some() || update.password.is_some() {
            let account: UserUpdate<'_> = UserUpdate {
                username: update.username,
                password: update.password,
                role: None,
            };
            update_user(conn, user_id, &account, hash_cost)?;
        }

        info!(location_id, "Location updated");
        Ok(())
    })
}

/// Deletes a location, its check-ins and its owning account.
///
/// # Errors
///
/// Returns [`PersistenceError::NotFound`] if there is no such location, or a
/// database error. Nothing is deleted in that case.
pub fn delete_location(
    conn: &mut SqliteConnection,
    location_id: i64,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let user_id: i64 = owning_user(conn, location_id)?;

        let removed_check_ins: usize =
            diesel::delete(check_ins::table.filter(check_ins::location_id.eq(location_id)))
                .execute(conn)?;
        diesel::delete(locations::table.filter(locations::location_id.eq(location_id)))
            .execute(conn)?;
        diesel::delete(users::table.filter(users::user_id.eq(user_id))).execute(conn)?;

        info!(
            location_id,
            user_id, removed_check_ins, "Location deleted with its account"
        );
        Ok(())
    })
}
