use std::ops::Range;

pub const PAGE_SIZE: usize = 5;

/// Current page and page size. The index is stored 0-based and shown 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetting {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PageSetting {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: PAGE_SIZE,
        }
    }
}

impl PageSetting {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self, nrows: usize) -> usize {
        nrows.div_ceil(self.page_size)
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self, nrows: usize) -> bool {
        self.page_index + 1 < self.page_count(nrows)
    }

    pub fn previous(&self) -> Self {
        if !self.can_previous() {
            return *self;
        }
        Self {
            page_index: self.page_index - 1,
            ..*self
        }
    }

    pub fn next(&self, nrows: usize) -> Self {
        if !self.can_next(nrows) {
            return *self;
        }
        Self {
            page_index: self.page_index + 1,
            ..*self
        }
    }

    /// Jumps to `page_index` without clamping it to the page count.
    pub fn with_page_index(&self, page_index: usize) -> Self {
        Self {
            page_index,
            ..*self
        }
    }

    /// Every selectable page index for the given number of rows.
    pub fn page_options(&self, nrows: usize) -> Range<usize> {
        0..self.page_count(nrows)
    }

    /// Row positions shown on the current page. Empty if the index points past the end.
    pub fn slice(&self, nrows: usize) -> Range<usize> {
        let begin = self.page_index.saturating_mul(self.page_size);
        if begin >= nrows {
            return 0..0;
        }
        let end = std::cmp::min(begin + self.page_size, nrows);
        begin..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_rows_make_three_pages() {
        let page = PageSetting::default();
        assert_eq!(page.page_size, 5);
        assert_eq!(page.page_count(12), 3);
        assert_eq!(page.page_options(12).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(page.slice(12), 0..5);

        let page = page.next(12);
        assert_eq!(page.page_index, 1);
        // rows 6-10 in 1-based numbering
        assert_eq!(page.slice(12), 5..10);

        let page = page.next(12);
        assert_eq!(page.slice(12), 10..12);
        assert!(!page.can_next(12));
        assert_eq!(page.next(12), page);
    }

    #[test]
    fn previous_is_disabled_on_first_page() {
        let page = PageSetting::default();
        assert!(!page.can_previous());
        assert_eq!(page.previous(), page);
        assert_eq!(page.next(12).previous(), page);
    }

    #[test]
    fn no_rows_means_no_pages() {
        let page = PageSetting::default();
        assert_eq!(page.page_count(0), 0);
        assert!(!page.can_next(0));
        assert_eq!(page.slice(0), 0..0);
        assert!(page.page_options(0).is_empty());
    }

    #[test]
    fn out_of_range_index_is_kept_but_shows_nothing() {
        let page = PageSetting::default().with_page_index(2);
        assert_eq!(page.slice(12), 10..12);
        // filters shrank the data to a single page
        assert_eq!(page.page_index, 2);
        assert_eq!(page.slice(3), 0..0);
        assert!(page.can_previous());
        assert!(!page.can_next(3));
        assert_eq!(page.previous().page_index, 1);
    }

    #[test]
    fn zero_page_size_is_raised_to_one() {
        assert_eq!(PageSetting::new(0).page_size, 1);
    }
}
