// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod error;
mod extract;
mod live;
mod routes;
mod session;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    routing::{get, post},
};
use checkin_api::ApiConfig;
use checkin_persistence::{DEFAULT_HASH_COST, Persistence, PersistenceError};
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::{Duration, UtcOffset};
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::live::OccupancyBroadcaster;

/// Check-In Server - attendance and live occupancy for school visits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "CHECKIN_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind the server to
    #[arg(short, long, env = "CHECKIN_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, env = "CHECKIN_PORT", default_value_t = 3000)]
    port: u16,

    /// Offset from UTC, in minutes, that defines the local day
    #[arg(
        long,
        env = "CHECKIN_UTC_OFFSET_MINUTES",
        default_value_t = 0,
        allow_hyphen_values = true
    )]
    utc_offset_minutes: i32,

    /// Access token lifetime in minutes
    #[arg(long, env = "CHECKIN_ACCESS_TOKEN_MINUTES", default_value_t = 15)]
    access_token_minutes: i64,

    /// Refresh token lifetime in days
    #[arg(long, env = "CHECKIN_REFRESH_TOKEN_DAYS", default_value_t = 7)]
    refresh_token_days: i64,

    /// Mark token cookies `Secure` (serve over HTTPS)
    #[arg(long, env = "CHECKIN_SECURE_COOKIES")]
    secure_cookies: bool,

    /// Username of the Admin account created when none exists
    #[arg(long, env = "CHECKIN_ADMIN_USERNAME")]
    admin_username: Option<String>,

    /// Password of the bootstrap Admin account
    #[arg(long, env = "CHECKIN_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Directory served for paths no API route matches
    #[arg(long, env = "CHECKIN_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

impl Args {
    fn api_config(&self) -> Result<ApiConfig, Box<dyn std::error::Error>> {
        let seconds: i32 = self
            .utc_offset_minutes
            .checked_mul(60)
            .ok_or("UTC offset is out of range")?;
        Ok(ApiConfig {
            utc_offset: UtcOffset::from_whole_seconds(seconds)?,
            access_token_ttl: Duration::minutes(self.access_token_minutes),
            refresh_token_ttl: Duration::days(self.refresh_token_days),
        })
    }
}

/// Application state shared across handlers.
///
/// Persistence is a single connection behind a Mutex; handlers release it
/// before publishing to the broadcaster.
#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<Mutex<Persistence>>,
    pub broadcaster: OccupancyBroadcaster,
    pub config: ApiConfig,
    pub secure_cookies: bool,
}

/// Builds the application router.
///
/// Paths no route matches fall through to `static_dir` when one is given,
/// and otherwise get a JSON 404.
fn build_router(app_state: AppState, static_dir: Option<PathBuf>) -> Router {
    let router: Router<AppState> = Router::new()
        .route("/health", get(routes::handle_health))
        .route("/auth/login", post(routes::handle_login))
        .route("/auth/refresh", post(routes::handle_refresh))
        .route("/auth/logout", post(routes::handle_logout))
        .route("/auth/me", get(routes::handle_whoami))
        .route(
            "/users",
            get(routes::handle_list_users).post(routes::handle_create_user),
        )
        .route(
            "/users/{id}",
            get(routes::handle_get_user)
                .patch(routes::handle_update_user)
                .delete(routes::handle_delete_user),
        )
        .route(
            "/schools",
            get(routes::handle_list_schools).post(routes::handle_create_school),
        )
        .route(
            "/schools/{id}",
            get(routes::handle_get_school)
                .patch(routes::handle_update_school)
                .delete(routes::handle_delete_school),
        )
        .route(
            "/locations",
            get(routes::handle_list_locations).post(routes::handle_create_location),
        )
        .route(
            "/locations/by-name/{name}",
            get(routes::handle_get_location_by_name),
        )
        .route(
            "/locations/{id}",
            get(routes::handle_get_location)
                .patch(routes::handle_update_location)
                .delete(routes::handle_delete_location),
        )
        .route(
            "/checkins",
            get(routes::handle_list_check_ins).post(routes::handle_create_check_in),
        )
        .route("/checkins/stats", get(routes::handle_check_in_stats))
        .route(
            "/checkins/{id}",
            axum::routing::delete(routes::handle_delete_check_in),
        )
        .route(
            "/migrations",
            get(routes::handle_list_migrations).post(routes::handle_run_migrations),
        )
        .route("/live/locations", get(live::handle_live_all))
        .route("/live/locations/{name}", get(live::handle_live_one))
        .route("/ws/locations", get(live::handle_live_socket));

    let router: Router<AppState> = match static_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Serving static files");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router.fallback(routes::handle_not_found),
    };

    router
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Opens the file database at `path`, or an in-memory one without it.
///
/// Both hash passwords at the default bcrypt cost.
fn open_persistence(path: Option<&Path>) -> Result<Persistence, PersistenceError> {
    if let Some(db_path) = path {
        info!(path = %db_path.display(), "Using file-based database");
        Persistence::new_with_file(db_path)
    } else {
        info!("Using in-memory database");
        Ok(Persistence::new_in_memory()?.with_hash_cost(DEFAULT_HASH_COST))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Check-In Server");

    let config: ApiConfig = args.api_config()?;

    let mut persistence: Persistence = open_persistence(args.database.as_deref())?;

    match (&args.admin_username, &args.admin_password) {
        (Some(username), Some(password)) => {
            match checkin_api::bootstrap_admin(&mut persistence, username, password)? {
                Some(user_id) => info!(user_id, %username, "Created bootstrap admin"),
                None => info!("Admin account already exists; skipping bootstrap"),
            }
        }
        (None, None) => {}
        _ => warn!("Both --admin-username and --admin-password are required to bootstrap"),
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        broadcaster: OccupancyBroadcaster::new(),
        config,
        secure_cookies: args.secure_cookies,
    };

    let app: Router = build_router(app_state, args.static_dir.clone());

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
