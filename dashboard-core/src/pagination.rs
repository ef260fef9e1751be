use std::num::NonZeroUsize;

/// Page cursor over a filtered collection. `page_size` is fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    current_page: usize,
    page_size: NonZeroUsize,
}

impl PaginationState {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self { current_page: 1, page_size }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// `max(1, ceil(count / page_size))`
    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size.get()).max(1)
    }

    /// Pull `current_page` back into `[1, total_pages(count)]`.
    pub fn clamp(&mut self, count: usize) {
        self.current_page = self.current_page.clamp(1, self.total_pages(count));
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn next(&mut self) {
        self.current_page = self.current_page.saturating_add(1);
    }

    pub fn previous(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Clamp against `items.len()` and return the current page's items.
    pub fn slice<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        self.clamp(items.len());
        let start = (self.current_page - 1) * self.page_size.get();
        let end = (start + self.page_size.get()).min(items.len());
        &items[start.min(end)..end]
    }
}
