//! Page windows over execution listings.
//!
//! A page is built from two independent reads, a count and a windowed list.
//! Nothing spans them, so `total` may disagree slightly with the items
//! actually returned while executions are being written concurrently.

use serde::Serialize;

use batchadmin_core::{AdminError, AdminResult};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Caller-requested slice of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Fill absent values from defaults. No upper bound is applied to `limit`.
    pub fn new(offset: Option<usize>, limit: Option<usize>, default_limit: usize) -> AdminResult<Self> {
        let limit = limit.unwrap_or(default_limit);
        if limit == 0 {
            return Err(AdminError::validation(
                "page.size.invalid",
                "page size must be greater than zero",
            ));
        }
        Ok(Self {
            offset: offset.unwrap_or(0),
            limit,
        })
    }
}

/// Offset, limit and the store's total at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
    pub total: u64,
}

impl PageWindow {
    /// 1-based index of the first item shown, 0 when the window is empty.
    pub fn first_item(&self) -> u64 {
        if (self.offset as u64) < self.total {
            self.offset as u64 + 1
        } else {
            0
        }
    }

    /// 1-based index of the last item shown, 0 when the window is empty.
    pub fn last_item(&self) -> u64 {
        if self.first_item() == 0 {
            return 0;
        }
        (self.offset as u64)
            .saturating_add(self.limit as u64)
            .min(self.total)
    }

    pub fn next_offset(&self) -> Option<usize> {
        let next = self.offset.checked_add(self.limit)?;
        ((next as u64) < self.total).then_some(next)
    }

    pub fn previous_offset(&self) -> Option<usize> {
        (self.offset > 0).then(|| self.offset.saturating_sub(self.limit))
    }
}

/// One page of items with the window that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}

/// Count, then list the requested window.
pub fn paginate<T, E, C, L>(request: PageRequest, count: C, list: L) -> Result<Page<T>, E>
where
    C: FnOnce() -> Result<u64, E>,
    L: FnOnce(usize, usize) -> Result<Vec<T>, E>,
{
    let total = count()?;
    let items = list(request.offset, request.limit)?;
    Ok(Page {
        items,
        window: PageWindow {
            offset: request.offset,
            limit: request.limit,
            total,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn records(n: u64) -> Vec<u64> {
        (1..=n).collect()
    }

    fn page_of(data: &[u64], request: PageRequest) -> Page<u64> {
        paginate::<_, (), _, _>(
            request,
            || Ok(data.len() as u64),
            |offset, limit| Ok(data.iter().skip(offset).take(limit).copied().collect()),
        )
        .unwrap()
    }

    #[test]
    fn first_page_of_45_records() {
        let data = records(45);
        let page = page_of(&data, PageRequest::default());

        assert_eq!(page.items.len(), 20);
        assert_eq!(page.window.total, 45);
        assert_eq!(page.window.first_item(), 1);
        assert_eq!(page.window.last_item(), 20);
        assert_eq!(page.window.next_offset(), Some(20));
        assert_eq!(page.window.previous_offset(), None);
    }

    #[test]
    fn last_partial_page_of_45_records() {
        let data = records(45);
        let page = page_of(&data, PageRequest { offset: 40, limit: 20 });

        assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.window.first_item(), 41);
        assert_eq!(page.window.last_item(), 45);
        assert_eq!(page.window.next_offset(), None);
        assert_eq!(page.window.previous_offset(), Some(20));
    }

    #[test]
    fn window_past_the_end_is_empty() {
        let data = records(3);
        let page = page_of(&data, PageRequest { offset: 10, limit: 5 });

        assert!(page.items.is_empty());
        assert_eq!(page.window.first_item(), 0);
        assert_eq!(page.window.last_item(), 0);
        assert_eq!(page.window.previous_offset(), Some(5));
    }

    #[test]
    fn unbounded_limit_clamps_to_total() {
        let window = PageWindow {
            offset: 1,
            limit: usize::MAX,
            total: 5,
        };

        assert_eq!(window.first_item(), 2);
        assert_eq!(window.last_item(), 5);
        assert_eq!(window.next_offset(), None);
        assert_eq!(window.previous_offset(), Some(0));
    }

    #[test]
    fn request_defaults_and_validation() {
        assert_eq!(
            PageRequest::new(None, None, DEFAULT_PAGE_SIZE).unwrap(),
            PageRequest::default()
        );
        assert_eq!(
            PageRequest::new(Some(7), Some(500), DEFAULT_PAGE_SIZE).unwrap(),
            PageRequest { offset: 7, limit: 500 }
        );
        let err = PageRequest::new(None, Some(0), DEFAULT_PAGE_SIZE).unwrap_err();
        assert_eq!(err.code(), "page.size.invalid");
    }

    #[test]
    fn count_failure_skips_listing() {
        let mut listed = false;
        let result: Result<Page<u64>, &str> =
            paginate(PageRequest::default(), || Err("down"), |_, _| {
                listed = true;
                Ok(vec![])
            });
        assert_eq!(result, Err("down"));
        assert!(!listed);
    }

    #[test]
    fn map_keeps_window() {
        let data = records(3);
        let page = page_of(&data, PageRequest::default()).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20, 30]);
        assert_eq!(page.window.total, 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn items_fit_the_window(total in 0u64..200, offset in 0usize..250, limit in 1usize..60) {
            let data = records(total);
            let page = page_of(&data, PageRequest { offset, limit });
            let shown = page.window.last_item().saturating_sub(page.window.first_item())
                + u64::from(page.window.first_item() > 0);

            prop_assert!(page.items.len() <= limit);
            prop_assert_eq!(page.items.len() as u64, shown);
            prop_assert!(page.window.last_item() <= total);
        }
    }
}
