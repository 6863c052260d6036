//! Offset-based paging over task listings.
//!
//! Listings are ordered by creation time ascending with ties broken by task
//! identifier, so walking a listing with increasing offsets never skips or
//! repeats a task while tasks are only added or edited. Deleting a task that
//! matches the filter shifts every later page back by one.

use super::{Task, TaskStatus};
use crate::identity::domain::UserId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

/// Errors returned while building page requests.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PageError {
    /// The offset is below zero.
    #[error("offset must not be negative, got {0}")]
    NegativeOffset(i64),

    /// The limit is zero or negative.
    #[error("limit must be positive, got {0}")]
    NonPositiveLimit(i64),

    /// The 1-based page number is below one or too large.
    #[error("invalid page number {0}")]
    InvalidPageNumber(i64),
}

/// Default and maximum page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default_size: u32,
    max_size: u32,
}

impl PageLimits {
    /// Creates page limits. A default above the maximum is lowered to it.
    #[must_use]
    pub const fn new(default_size: u32, max_size: u32) -> Self {
        let capped = if default_size > max_size {
            max_size
        } else {
            default_size
        };
        Self {
            default_size: capped,
            max_size,
        }
    }

    /// Returns the page size used when a request names none.
    #[must_use]
    pub const fn default_size(self) -> u32 {
        self.default_size
    }

    /// Returns the largest page size.
    #[must_use]
    pub const fn max_size(self) -> u32 {
        self.max_size
    }

    fn resolve_limit(self, limit: Option<i64>) -> Result<u32, PageError> {
        let Some(requested) = limit else {
            return Ok(self.default_size);
        };
        if requested < 1 {
            return Err(PageError::NonPositiveLimit(requested));
        }
        Ok(u32::try_from(requested)
            .unwrap_or(u32::MAX)
            .min(self.max_size))
    }
}

/// Validated window into an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl PageRequest {
    /// Builds a request from a raw limit and offset.
    ///
    /// A missing limit takes the default size; a limit above the maximum is
    /// clamped to it.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NegativeOffset`] for an offset below zero and
    /// [`PageError::NonPositiveLimit`] for a limit below one.
    pub fn new(limit: Option<i64>, offset: i64, limits: PageLimits) -> Result<Self, PageError> {
        let checked_offset = u64::try_from(offset).map_err(|_| PageError::NegativeOffset(offset))?;
        let resolved = limits.resolve_limit(limit)?;
        Ok(Self {
            limit: resolved,
            offset: checked_offset,
        })
    }

    /// Builds a request from a 1-based page number and page size.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidPageNumber`] for a page below one or one
    /// whose offset overflows, and [`PageError::NonPositiveLimit`] for a size
    /// below one.
    pub fn from_page_number(
        page: i64,
        size: Option<i64>,
        limits: PageLimits,
    ) -> Result<Self, PageError> {
        let index = page
            .checked_sub(1)
            .and_then(|index| u64::try_from(index).ok())
            .ok_or(PageError::InvalidPageNumber(page))?;
        let resolved = limits.resolve_limit(size)?;
        let offset = index
            .checked_mul(u64::from(resolved))
            .ok_or(PageError::InvalidPageNumber(page))?;
        Ok(Self {
            limit: resolved,
            offset,
        })
    }

    /// Returns the maximum number of items in the page.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Returns the number of items skipped before the page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.offset
    }
}

/// Optional criteria narrowing a task listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    status: Option<TaskStatus>,
    responsible_user_id: Option<UserId>,
}

impl TaskFilter {
    /// Creates a filter matching every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to one status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the listing to tasks a user is responsible for.
    #[must_use]
    pub const fn with_responsible_user(mut self, user_id: UserId) -> Self {
        self.responsible_user_id = Some(user_id);
        self
    }

    /// Returns `true` when the task satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status() == status)
            && self
                .responsible_user_id
                .is_none_or(|user| task.responsible_user_id() == Some(user))
    }
}

/// One window of an ordered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    items: Vec<T>,
    has_more: bool,
    limit: u32,
    offset: u64,
    total: Option<u64>,
}

impl<T> Page<T> {
    /// Creates a page from already-windowed items.
    #[must_use]
    pub const fn new(items: Vec<T>, has_more: bool, request: PageRequest) -> Self {
        Self {
            items,
            has_more,
            limit: request.limit,
            offset: request.offset,
            total: None,
        }
    }

    /// Records the total number of matching items.
    #[must_use]
    pub const fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Returns the items in listing order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns `true` when items exist beyond this page.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Returns the page size that was applied.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the offset of the first item.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the total number of matching items, when known.
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.total
    }
}

/// Orders two tasks by creation time, then by identifier.
#[must_use]
pub fn listing_order(left: &Task, right: &Task) -> Ordering {
    left.created_at()
        .cmp(&right.created_at())
        .then_with(|| left.id().cmp(&right.id()))
}

/// Filters, orders, and windows a task collection.
#[must_use]
pub fn paginate<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    filter: &TaskFilter,
    request: PageRequest,
) -> Page<Task> {
    let mut matching: Vec<&Task> = tasks.into_iter().filter(|task| filter.matches(task)).collect();
    matching.sort_by(|left, right| listing_order(left, right));

    let total = matching.len();
    let skip = usize::try_from(request.offset).unwrap_or(usize::MAX);
    let take = usize::try_from(request.limit).unwrap_or(usize::MAX);
    let items: Vec<Task> = matching
        .into_iter()
        .skip(skip)
        .take(take)
        .cloned()
        .collect();
    let has_more = skip.saturating_add(items.len()) < total;

    Page::new(items, has_more, request).with_total(u64::try_from(total).unwrap_or(u64::MAX))
}
