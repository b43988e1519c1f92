// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use checkin_domain::{Role, Username};
use checkin_persistence::Persistence;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::password_policy::PasswordPolicy;

/// Creates the first Admin account when none exists yet.
///
/// Returns the new user id, or `None` if an Admin already exists.
///
/// # Errors
///
/// Returns an error if the credentials are invalid, the username is taken
/// by a non-Admin account, or the insert fails.
pub fn bootstrap_admin(
    persistence: &mut Persistence,
    username: &str,
    password: &str,
) -> Result<Option<i64>, ApiError> {
    if persistence.count_users_with_role(Role::Admin)? > 0 {
        debug!("An Admin account exists; skipping bootstrap");
        return Ok(None);
    }

    let username: Username = Username::new(username)?;
    PasswordPolicy::default().validate(password, username.as_str())?;
    if persistence.username_exists(username.as_str(), None)? {
        return Err(ApiError::Conflict {
            message: format!("Username '{username}' is already taken"),
        });
    }

    let user_id: i64 = persistence.create_user(username.as_str(), password, Role::Admin)?;
    info!(user_id, username = %username, "Created bootstrap Admin account");
    Ok(Some(user_id))
}
