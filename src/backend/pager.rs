use std::ops::Range;

/// Default number of listings shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Window over the filtered record list. Pages are 1-based; page numbers are
/// clamped rather than rejected, so the pager can never point past the end
/// of the data it is given.
#[derive(Clone, Copy, Debug)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Back to the first page. Called whenever the filtered set changes.
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Number of pages needed for `count` items; zero when there is nothing
    /// to show.
    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size)
    }

    /// Moves to `page`, clamped into the valid range for `count` items. An
    /// empty set keeps the pager on page 1.
    pub fn set_page(&mut self, page: usize, count: usize) {
        let last = self.total_pages(count).max(1);
        self.current_page = page.clamp(1, last);
    }

    /// Index range of the current page within a list of `count` items. The
    /// final page may be shorter than the page size.
    pub fn page_range(&self, count: usize) -> Range<usize> {
        let start = (self.current_page - 1).saturating_mul(self.page_size).min(count);
        let end = start.saturating_add(self.page_size).min(count);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_counts() {
        let pager = Pager::new(200);
        assert_eq!(pager.total_pages(0), 0);
        assert_eq!(pager.total_pages(1), 1);
        assert_eq!(pager.total_pages(200), 1);
        assert_eq!(pager.total_pages(201), 2);
        assert_eq!(pager.total_pages(250), 2);
    }

    #[test]
    fn test_short_final_page() {
        let mut pager = Pager::new(200);
        assert_eq!(pager.page_range(250), 0..200);
        pager.set_page(2, 250);
        assert_eq!(pager.page_range(250), 200..250);
    }

    #[test]
    fn test_set_page_clamps() {
        let mut pager = Pager::new(10);
        pager.set_page(99, 25);
        assert_eq!(pager.current_page(), 3);
        pager.set_page(0, 25);
        assert_eq!(pager.current_page(), 1);
        // Empty set: stay on page 1 with an empty range.
        pager.set_page(5, 0);
        assert_eq!(pager.current_page(), 1);
        assert_eq!(pager.page_range(0), 0..0);
    }

    #[test]
    fn test_pages_concatenate_to_the_whole_set() {
        let count = 47;
        let mut pager = Pager::new(10);
        let mut seen = Vec::new();
        for page in 1..=pager.total_pages(count) {
            pager.set_page(page, count);
            seen.extend(pager.page_range(count));
        }
        assert_eq!(seen, (0..count).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_page_size_is_coerced() {
        let pager = Pager::new(0);
        assert_eq!(pager.page_size(), 1);
    }
}
