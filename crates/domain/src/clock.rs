// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Timestamps and local calendar days.
//!
//! Check-ins are stored with a UTC timestamp in the `SQLite`
//! `CURRENT_TIMESTAMP` layout (`YYYY-MM-DD HH:MM:SS`). A [`DayWindow`]
//! translates a local calendar day, under a fixed UTC offset, into the
//! half-open range of stored timestamps that belong to it. Because the
//! layout is fixed-width, plain string comparison in SQL orders the same
//! way as the instants.

use crate::error::DomainError;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Formats an instant as a stored UTC timestamp.
///
/// # Errors
///
/// Returns an error if the instant cannot be formatted.
pub fn format_timestamp(instant: OffsetDateTime) -> Result<String, DomainError> {
    let utc: OffsetDateTime = instant.to_offset(UtcOffset::UTC);
    utc.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .map_err(|e| DomainError::InvalidTimestamp {
        value: utc.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a stored UTC timestamp.
///
/// # Errors
///
/// Returns an error if the value is not in `YYYY-MM-DD HH:MM:SS` layout.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|e| DomainError::InvalidTimestamp {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a local calendar date in `YYYY-MM-DD` layout.
///
/// # Errors
///
/// Returns an error if the value is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        DomainError::InvalidDate {
            value: value.to_string(),
        }
    })
}

/// Returns the current instant as a stored UTC timestamp.
///
/// # Errors
///
/// Returns an error if the current time cannot be formatted.
pub fn now_timestamp() -> Result<String, DomainError> {
    format_timestamp(OffsetDateTime::now_utc())
}

/// A local calendar day expressed as a `[start, end)` range of stored
/// UTC timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWindow {
    date: Date,
    offset: UtcOffset,
    start: String,
    end: String,
}

impl DayWindow {
    /// Builds the window for a local date under `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the following day is outside the supported
    /// calendar range.
    pub fn for_date(date: Date, offset: UtcOffset) -> Result<Self, DomainError> {
        let next: Date = date.next_day().ok_or(DomainError::DateOutOfRange {
            operation: "computing the end of a day window",
        })?;

        Ok(Self {
            date,
            offset,
            start: format_timestamp(local_midnight(date, offset))?,
            end: format_timestamp(local_midnight(next, offset))?,
        })
    }

    /// Builds the window of the local day containing `instant`.
    ///
    /// # Errors
    ///
    /// Returns an error if the day window cannot be represented.
    pub fn containing(instant: OffsetDateTime, offset: UtcOffset) -> Result<Self, DomainError> {
        Self::for_date(instant.to_offset(offset).date(), offset)
    }

    /// Builds the window of the current local day.
    ///
    /// # Errors
    ///
    /// Returns an error if the day window cannot be represented.
    pub fn today(offset: UtcOffset) -> Result<Self, DomainError> {
        Self::containing(OffsetDateTime::now_utc(), offset)
    }

    /// Returns the window of the preceding local day.
    ///
    /// # Errors
    ///
    /// Returns an error if the previous day is outside the supported range.
    pub fn yesterday(&self) -> Result<Self, DomainError> {
        let previous: Date = self.date.previous_day().ok_or(DomainError::DateOutOfRange {
            operation: "computing yesterday",
        })?;
        Self::for_date(previous, self.offset)
    }

    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    #[must_use]
    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// First stored timestamp belonging to this day (inclusive).
    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    /// First stored timestamp of the next day (exclusive).
    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }

    /// The `SQLite` date modifier that shifts a stored UTC timestamp into
    /// this window's local time, e.g. `"+120 minutes"`.
    #[must_use]
    pub fn sqlite_modifier(&self) -> String {
        let minutes: i32 = self.offset.whole_minutes().into();
        format!("{minutes:+} minutes")
    }
}

fn local_midnight(date: Date, offset: UtcOffset) -> OffsetDateTime {
    PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(offset)
}
