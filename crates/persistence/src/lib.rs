// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Check-In attendance service.
//!
//! This crate stores users, sessions, schools, locations and check-ins in
//! `SQLite` through Diesel. Schema changes are embedded Diesel migrations
//! applied when the adapter is constructed.
//!
//! ## Derived location fields
//!
//! Every location read carries today's check-in count and the moment the
//! location filled up yesterday. Both are computed in SQL against a
//! [`DayWindow`] supplied by the caller, so the notion of "today" is owned
//! by whoever configures the UTC offset.
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] creates an isolated shared-cache memory
//! database per call and uses the minimum bcrypt cost so tests stay fast.
//! A long-lived in-memory adapter should raise it with
//! [`Persistence::with_hash_cost`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use checkin_domain::{DayWindow, Page, PageRequest, Role};
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    CheckInData, CheckInFilter, CheckInStats, DailyCount, LocationData, LocationUpdate,
    NewLocation, SchoolCount, SchoolData, SessionData, SessionKind, UserData, UserUpdate,
};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// bcrypt cost used for in-memory databases.
const IN_MEMORY_HASH_COST: u32 = 4;

/// bcrypt cost used for file databases.
pub const DEFAULT_HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Persistence adapter owning a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
    hash_cost: u32,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            hash_cost: IN_MEMORY_HASH_COST,
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            hash_cost: DEFAULT_HASH_COST,
        })
    }

    /// Replaces the bcrypt cost used for passwords hashed from now on.
    #[must_use]
    pub const fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self
    }

    /// The bcrypt cost used when hashing passwords.
    #[must_use]
    pub const fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    /// Checks a plain-text password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed.
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
        Ok(bcrypt::verify(password, password_hash)?)
    }

    // ========================================================================
    // Migrations
    // ========================================================================

    /// Lists applied migration versions in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the migrations table cannot be read.
    pub fn applied_migrations(&mut self) -> Result<Vec<String>, PersistenceError> {
        backend::sqlite::applied_migrations(&mut self.conn)
    }

    /// Lists embedded migrations not yet applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the migrations table cannot be read.
    pub fn pending_migrations(&mut self) -> Result<Vec<String>, PersistenceError> {
        backend::sqlite::pending_migrations(&mut self.conn)
    }

    /// Applies pending migrations and returns their versions.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub fn run_pending_migrations(&mut self) -> Result<Vec<String>, PersistenceError> {
        backend::sqlite::run_migrations(&mut self.conn)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Creates a user and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is taken or the insert fails.
    pub fn create_user(
        &mut self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_user(
            &mut self.conn,
            username,
            password,
            role.as_str(),
            self.hash_cost,
        )
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_username(&mut self.conn, username)
    }

    /// Lists one page of users, optionally filtered by a username fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(
        &mut self,
        request: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<UserData>, PersistenceError> {
        let total: i64 = queries::users::count_users(&mut self.conn, search)?;
        let items: Vec<UserData> = queries::users::list_users(
            &mut self.conn,
            search,
            request.limit(),
            request.offset(),
        )?;
        Ok(Page::new(items, request, total))
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users(&mut self, search: Option<&str>) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn, search)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users_with_role(&mut self, role: Role) -> Result<i64, PersistenceError> {
        queries::users::count_users_with_role(&mut self.conn, role.as_str())
    }

    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub fn update_user(
        &mut self,
        user_id: i64,
        update: &UserUpdate<'_>,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_user(&mut self.conn, user_id, update, self.hash_cost)
    }

    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn record_login(&mut self, user_id: i64, at: &str) -> Result<(), PersistenceError> {
        mutations::users::record_login(&mut self.conn, user_id, at)
    }

    /// Deletes a user that owns no location.
    ///
    /// # Errors
    ///
    /// Returns an error if the user owns a location, does not exist, or the
    /// delete fails.
    pub fn delete_user(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        mutations::users::delete_user(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn username_exists(
        &mut self,
        username: &str,
        excluding_user_id: Option<i64>,
    ) -> Result<bool, PersistenceError> {
        queries::users::username_exists(&mut self.conn, username, excluding_user_id)
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        kind: SessionKind,
        user_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::sessions::create_session(
            &mut self.conn,
            session_token,
            kind,
            user_id,
            expires_at,
        )
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::sessions::get_session_by_token(&mut self.conn, session_token)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_sessions_for_user(&mut self, user_id: i64) -> Result<i64, PersistenceError> {
        queries::sessions::count_sessions_for_user(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<bool, PersistenceError> {
        mutations::sessions::delete_session(&mut self.conn, session_token)
    }

    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_sessions_for_user(&mut self, user_id: i64) -> Result<usize, PersistenceError> {
        mutations::sessions::delete_sessions_for_user(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        mutations::sessions::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Schools
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the name is taken or the insert fails.
    pub fn create_school(&mut self, name: &str) -> Result<i64, PersistenceError> {
        mutations::schools::create_school(&mut self.conn, name)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_school(&mut self, school_id: i64) -> Result<Option<SchoolData>, PersistenceError> {
        queries::schools::get_school(&mut self.conn, school_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_schools(
        &mut self,
        request: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<SchoolData>, PersistenceError> {
        let total: i64 = queries::schools::count_schools(&mut self.conn, search)?;
        let items: Vec<SchoolData> = queries::schools::list_schools(
            &mut self.conn,
            search,
            request.limit(),
            request.offset(),
        )?;
        Ok(Page::new(items, request, total))
    }

    /// # Errors
    ///
    /// Returns an error if the school does not exist or the update fails.
    pub fn update_school(&mut self, school_id: i64, name: &str) -> Result<(), PersistenceError> {
        mutations::schools::update_school(&mut self.conn, school_id, name)
    }

    /// # Errors
    ///
    /// Returns an error if check-ins reference the school, it does not exist,
    /// or the delete fails.
    pub fn delete_school(&mut self, school_id: i64) -> Result<(), PersistenceError> {
        mutations::schools::delete_school(&mut self.conn, school_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn school_name_exists(
        &mut self,
        name: &str,
        excluding_school_id: Option<i64>,
    ) -> Result<bool, PersistenceError> {
        queries::schools::school_name_exists(&mut self.conn, name, excluding_school_id)
    }

    // ========================================================================
    // Locations
    // ========================================================================

    /// Creates a location and its owning account in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a unique constraint rejects either row or an
    /// insert fails.
    pub fn create_location_with_user(
        &mut self,
        new_location: &NewLocation<'_>,
    ) -> Result<i64, PersistenceError> {
        mutations::locations::create_location_with_user(
            &mut self.conn,
            new_location,
            self.hash_cost,
        )
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_location(
        &mut self,
        location_id: i64,
        today: &DayWindow,
    ) -> Result<Option<LocationData>, PersistenceError> {
        queries::locations::get_location(&mut self.conn, location_id, today)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_location_by_name(
        &mut self,
        normalized_name: &str,
        today: &DayWindow,
    ) -> Result<Option<LocationData>, PersistenceError> {
        queries::locations::get_location_by_name(&mut self.conn, normalized_name, today)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_location_by_user(
        &mut self,
        user_id: i64,
        today: &DayWindow,
    ) -> Result<Option<LocationData>, PersistenceError> {
        queries::locations::get_location_by_user(&mut self.conn, user_id, today)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_locations(
        &mut self,
        request: PageRequest,
        search: Option<&str>,
        today: &DayWindow,
    ) -> Result<Page<LocationData>, PersistenceError> {
        let total: i64 = queries::locations::count_locations(&mut self.conn, search)?;
        let items: Vec<LocationData> = queries::locations::list_locations(
            &mut self.conn,
            search,
            request.limit(),
            request.offset(),
            today,
        )?;
        Ok(Page::new(items, request, total))
    }

    /// # Errors
    ///
    /// Returns an error if the location does not exist, a unique constraint
    /// rejects the change, or the update fails.
    pub fn update_location(
        &mut self,
        location_id: i64,
        update: &LocationUpdate<'_>,
    ) -> Result<(), PersistenceError> {
        mutations::locations::update_location(&mut self.conn, location_id, update, self.hash_cost)
    }

    /// Deletes a location with its check-ins and owning account.
    ///
    /// # Errors
    ///
    /// Returns an error if the location does not exist or the delete fails.
    pub fn delete_location(&mut self, location_id: i64) -> Result<(), PersistenceError> {
        mutations::locations::delete_location(&mut self.conn, location_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn location_name_exists(
        &mut self,
        normalized_name: &str,
        excluding_location_id: Option<i64>,
    ) -> Result<bool, PersistenceError> {
        queries::locations::location_name_exists(
            &mut self.conn,
            normalized_name,
            excluding_location_id,
        )
    }

    // ========================================================================
    // Check-ins
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the location or school does not exist or the
    /// insert fails.
    pub fn create_check_in(
        &mut self,
        location_id: i64,
        school_id: i64,
        capacity: i32,
        created_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::check_ins::create_check_in(
            &mut self.conn,
            location_id,
            school_id,
            capacity,
            created_at,
        )
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_check_in(
        &mut self,
        check_in_id: i64,
    ) -> Result<Option<CheckInData>, PersistenceError> {
        queries::check_ins::get_check_in(&mut self.conn, check_in_id)
    }

    /// Lists one page of check-ins matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_check_ins(
        &mut self,
        filter: &CheckInFilter,
        request: PageRequest,
    ) -> Result<Page<CheckInData>, PersistenceError> {
        let total: i64 = queries::check_ins::count_check_ins(&mut self.conn, filter)?;
        let items: Vec<CheckInData> = queries::check_ins::list_check_ins(
            &mut self.conn,
            filter,
            request.limit(),
            request.offset(),
        )?;
        Ok(Page::new(items, request, total))
    }

    /// # Errors
    ///
    /// Returns an error if the check-in does not exist or the delete fails.
    pub fn delete_check_in(&mut self, check_in_id: i64) -> Result<(), PersistenceError> {
        mutations::check_ins::delete_check_in(&mut self.conn, check_in_id)
    }

    /// Aggregates check-ins per local day and per school.
    ///
    /// `local_day` supplies the UTC offset used to group timestamps into
    /// local dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn check_in_stats(
        &mut self,
        filter: &CheckInFilter,
        local_day: &DayWindow,
    ) -> Result<CheckInStats, PersistenceError> {
        queries::check_ins::check_in_stats(&mut self.conn, filter, &local_day.sqlite_modifier())
    }
}
