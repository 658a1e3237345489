use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Page position over a filtered collection. Pages are 1-based.
///
/// Transitions take `self` and return the next state; a request that is out
/// of range returns the state unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Zero when nothing matched.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    #[must_use]
    pub fn go_to(self, page: usize) -> Self {
        if (1..=self.page_count()).contains(&page) {
            Self { page, ..self }
        } else {
            self
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        self.go_to(self.page + 1)
    }

    #[must_use]
    pub fn previous(self) -> Self {
        match self.page.checked_sub(1) {
            Some(page) => self.go_to(page),
            None => self,
        }
    }

    #[must_use]
    pub fn with_page_size(self, page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            ..self
        }
    }

    /// New filtered total after a filter change: back to page 1.
    #[must_use]
    pub fn restart(self, total: usize) -> Self {
        Self {
            page: 1,
            total,
            ..self
        }
    }

    /// New filtered total after the collection was replaced: stays on the
    /// current page while it still exists.
    #[must_use]
    pub fn retain(self, total: usize) -> Self {
        let next = Self { total, ..self };
        if next.page > next.page_count() {
            Self { page: 1, ..next }
        } else {
            next
        }
    }

    /// Slice bounds of the current page within the filtered collection.
    pub fn range(&self) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    pub fn summary(&self) -> PageSummary {
        let range = self.range();
        PageSummary {
            first: if range.is_empty() { 0 } else { range.start + 1 },
            last: range.end,
            total: self.total,
        }
    }

    /// At most `max_visible` page numbers around the current page, shifted
    /// back when the current page is near the end.
    pub fn window(&self, max_visible: usize) -> PageWindow {
        let count = self.page_count();
        let max_visible = max_visible.max(1);
        if count == 0 {
            return PageWindow {
                start: 1,
                end: 0,
                count,
                current: self.page,
            };
        }

        let mut start = self.page.saturating_sub(max_visible / 2).max(1);
        let end = (start + max_visible - 1).min(count);
        if end + 1 - start < max_visible {
            start = (end + 1).saturating_sub(max_visible).max(1);
        }
        PageWindow {
            start,
            end,
            count,
            current: self.page,
        }
    }
}

/// "Showing `first`-`last` of `total`". `first` is 0 on an empty page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
    pub count: usize,
    pub current: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageItem {
    Page { number: usize, current: bool },
    Gap,
}

impl PageWindow {
    pub fn pages(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Controls are pointless for a single page.
    pub fn is_visible(&self) -> bool {
        self.count > 1
    }

    /// Window pages plus first/last shortcuts, with gaps where pages are
    /// skipped.
    pub fn items(&self) -> Vec<PageItem> {
        let mut items = Vec::new();
        if self.count == 0 {
            return items;
        }
        let page = |number: usize| PageItem::Page {
            number,
            current: number == self.current,
        };

        if self.start > 1 {
            items.push(page(1));
            if self.start > 2 {
                items.push(PageItem::Gap);
            }
        }
        items.extend(self.pages().map(page));
        if self.end < self.count {
            if self.end + 1 < self.count {
                items.push(PageItem::Gap);
            }
            items.push(page(self.count));
        }
        items
    }
}
