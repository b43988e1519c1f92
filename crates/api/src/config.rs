// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runtime settings shared by the request handlers.

use checkin_domain::{DayWindow, DomainError};
use time::{Duration, UtcOffset};

/// Settings that shape handler behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiConfig {
    /// Offset that defines the local calendar day.
    pub utc_offset: UtcOffset,
    /// Lifetime of an access token.
    pub access_token_ttl: Duration,
    /// Lifetime of a refresh token.
    pub refresh_token_ttl: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            utc_offset: UtcOffset::UTC,
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
        }
    }
}

impl ApiConfig {
    /// The current local day.
    ///
    /// # Errors
    ///
    /// Returns an error if the day window cannot be represented.
    pub fn today(&self) -> Result<DayWindow, DomainError> {
        DayWindow::today(self.utc_offset)
    }
}
