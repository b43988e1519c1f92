// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use checkin_persistence::Persistence;
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{MigrationsResponse, RunMigrationsResponse};

/// Lists applied and pending schema migrations.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the migration table
/// cannot be read.
pub fn list_migrations(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<MigrationsResponse, ApiError> {
    AuthorizationService::authorize_migrations(actor)?;
    Ok(MigrationsResponse {
        applied: persistence.applied_migrations()?,
        pending: persistence.pending_migrations()?,
    })
}

/// Applies every pending migration.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or a migration fails.
pub fn run_migrations(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<RunMigrationsResponse, ApiError> {
    AuthorizationService::authorize_migrations(actor)?;
    let applied: Vec<String> = persistence.run_pending_migrations()?;
    info!(count = applied.len(), actor = %actor.username, "Ran pending migrations");
    Ok(RunMigrationsResponse { applied })
}
