//! Dashboard arithmetic
//!
//! Pure helpers shared by the dashboard and activity endpoints. Kept free of
//! I/O so they can be unit tested directly.

use std::collections::BTreeMap;

use crate::models::project::ProjectStatus;

/// Largest page a list endpoint will return
pub const MAX_PAGE_SIZE: i64 = 100;

/// Rounded share of completed tasks, in percent
///
/// Rounds half up and returns `0` when there are no tasks.
pub fn completion_percentage(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    (completed * 200 + total) / (total * 2)
}

/// Per-status project counts keyed by lower-cased status, plus their sum
///
/// Statuses missing from `rows` stay absent from the map.
pub fn status_breakdown(rows: &[(ProjectStatus, i64)]) -> (BTreeMap<String, i64>, i64) {
    let mut stats = BTreeMap::new();
    let mut total = 0;
    for (status, count) in rows {
        *stats.entry(status.stats_key()).or_insert(0) += count;
        total += count;
    }
    (stats, total)
}

/// Rejected pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("limit must not be negative")]
    NegativeLimit,

    #[error("offset must not be negative")]
    NegativeOffset,
}

/// Validated `limit`/`offset` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Applies defaults and caps `limit` at [`MAX_PAGE_SIZE`]
    pub fn new(
        limit: Option<i64>,
        offset: Option<i64>,
        default_limit: i64,
    ) -> Result<Self, PageError> {
        let limit = limit.unwrap_or(default_limit);
        let offset = offset.unwrap_or(0);

        if limit < 0 {
            return Err(PageError::NegativeLimit);
        }
        if offset < 0 {
            return Err(PageError::NegativeOffset);
        }

        Ok(Self {
            limit: limit.min(MAX_PAGE_SIZE),
            offset,
        })
    }

    /// Whether rows remain past this window
    pub fn has_more(&self, total: i64) -> bool {
        self.offset.saturating_add(self.limit) < total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_percentage_zero_total() {
        assert_eq!(completion_percentage(0, 0), 0);
    }

    #[test]
    fn test_completion_percentage_rounds_half_up() {
        assert_eq!(completion_percentage(1, 2), 50);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 8), 13);
        assert_eq!(completion_percentage(1, 200), 1);
        assert_eq!(completion_percentage(5, 5), 100);
    }

    #[test]
    fn test_status_breakdown() {
        let (stats, total) = status_breakdown(&[
            (ProjectStatus::Active, 3),
            (ProjectStatus::OnHold, 1),
        ]);

        assert_eq!(total, 4);
        assert_eq!(stats.get("active"), Some(&3));
        assert_eq!(stats.get("on_hold"), Some(&1));
        assert!(!stats.contains_key("completed"));
    }

    #[test]
    fn test_status_breakdown_empty() {
        let (stats, total) = status_breakdown(&[]);
        assert!(stats.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn test_page_window_defaults_and_cap() {
        let window = PageWindow::new(None, None, 50).unwrap();
        assert_eq!(window, PageWindow { limit: 50, offset: 0 });

        let capped = PageWindow::new(Some(500), Some(10), 20).unwrap();
        assert_eq!(capped.limit, MAX_PAGE_SIZE);
        assert_eq!(capped.offset, 10);
    }

    #[test]
    fn test_page_window_rejects_negative() {
        assert_eq!(
            PageWindow::new(Some(-1), None, 20),
            Err(PageError::NegativeLimit)
        );
        assert_eq!(
            PageWindow::new(None, Some(-5), 20),
            Err(PageError::NegativeOffset)
        );
    }

    #[test]
    fn test_has_more() {
        let window = PageWindow { limit: 10, offset: 0 };
        assert!(window.has_more(11));
        assert!(!window.has_more(10));

        let last = PageWindow { limit: 10, offset: 20 };
        assert!(!last.has_more(25));
        assert!(!PageWindow { limit: 0, offset: 0 }.has_more(0));
    }
}
