//! Paging and search state behind one list page.

pub const PAGE_SIZE_OPTIONS: [u32; 4] = [5, 10, 25, 50];

/// `page` is 0-based here; [`ListQueryState::server_page`] is what goes on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQueryState {
    page: u32,
    page_size: u32,
    search: String,
}

impl ListQueryState {
    pub fn new(page_size: u32) -> Self {
        ListQueryState {
            page: 0,
            page_size: page_size.max(1),
            search: String::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// 1-based page index for `list_paged`.
    pub fn server_page(&self) -> u32 {
        self.page + 1
    }

    /// Returns whether anything changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let changed = self.page != page;
        self.page = page;
        changed
    }

    /// A new page size always restarts at page 0.
    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        let page_size = page_size.max(1);
        let changed = self.page_size != page_size || self.page != 0;
        self.page_size = page_size;
        self.page = 0;
        changed
    }

    /// A new search term always restarts at page 0.
    pub fn set_search(&mut self, search: &str) -> bool {
        let changed = self.search != search || self.page != 0;
        self.search = search.to_string();
        self.page = 0;
        changed
    }

    /// Number of pages for `total` matches; at least one.
    pub fn page_count(&self, total: u64) -> u32 {
        let size = u64::from(self.page_size);
        (total.div_ceil(size)).max(1).min(u64::from(u32::MAX)) as u32
    }

    pub fn has_next(&self, total: u64) -> bool {
        self.page + 1 < self.page_count(total)
    }
}

impl Default for ListQueryState {
    fn default() -> Self {
        ListQueryState::new(crate::settings::DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_and_size_changes_reset_page() {
        let mut q = ListQueryState::new(10);
        q.set_page(3);
        assert_eq!(q.server_page(), 4);
        assert!(q.set_search("acme"));
        assert_eq!(q.page(), 0);
        q.set_page(2);
        assert!(q.set_page_size(25));
        assert_eq!(q.page(), 0);
        assert_eq!(q.page_size(), 25);
    }

    #[test]
    fn page_change_keeps_search_and_size() {
        let mut q = ListQueryState::new(10);
        q.set_search("x");
        q.set_page(1);
        assert_eq!(q.search(), "x");
        assert_eq!(q.page_size(), 10);
        assert!(!q.set_page(1));
    }

    #[test]
    fn page_count_rounds_up() {
        let q = ListQueryState::new(10);
        assert_eq!(q.page_count(37), 4);
        assert_eq!(q.page_count(0), 1);
        assert!(q.has_next(37));
        assert!(!q.has_next(10));
    }
}
