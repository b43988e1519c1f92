// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// A validated page selection for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u32 = 20;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Validates optional page parameters, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` is zero or `per_page` is outside
    /// `1..=100`.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Result<Self, DomainError> {
        let page: u32 = page.unwrap_or(1);
        let per_page: u32 = per_page.unwrap_or(Self::DEFAULT_PER_PAGE);

        if page == 0 {
            return Err(DomainError::InvalidPageRequest(String::from(
                "page must be 1 or greater",
            )));
        }
        if per_page == 0 || per_page > Self::MAX_PER_PAGE {
            return Err(DomainError::InvalidPageRequest(format!(
                "per_page must be between 1 and {}",
                Self::MAX_PER_PAGE
            )));
        }

        Ok(Self { page, per_page })
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Number of rows to fetch.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// Number of pages needed for `total` rows; zero when there are no rows.
#[must_use]
pub fn total_pages(total: i64, per_page: u32) -> i64 {
    if total <= 0 || per_page == 0 {
        return 0;
    }
    let per_page: i64 = i64::from(per_page);
    (total + per_page - 1) / per_page
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total,
            total_pages: total_pages(total, request.per_page()),
        }
    }

    /// Converts every item while keeping the paging metadata.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
