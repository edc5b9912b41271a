//! Page arithmetic for post listings.
//!
//! Page numbers are 1-based and lenient: anything unparseable maps to the
//! first page, anything past the end maps to the last page. An empty listing
//! still has one (empty) page.

/// Position of a requested page within a listing of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number, already clamped into range.
    pub number: usize,
    pub per_page: usize,
    pub total_items: usize,
}

impl PageRequest {
    /// Resolve the raw `?page=` value against the listing size.
    #[must_use]
    pub fn resolve(raw_page: Option<&str>, per_page: usize, total_items: usize) -> Self {
        let per_page = per_page.max(1);
        let num_pages = num_pages(total_items, per_page);
        let requested = raw_page
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1);
        let number = requested.clamp(1, num_pages);

        Self {
            number,
            per_page,
            total_items,
        }
    }

    #[must_use]
    pub fn num_pages(&self) -> usize {
        num_pages(self.total_items, self.per_page)
    }

    /// Row offset for the SQL query.
    #[must_use]
    pub fn offset(&self) -> i64 {
        ((self.number - 1) * self.per_page) as i64
    }

    /// Row limit for the SQL query.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest) -> Self {
        Self { items, request }
    }

    #[must_use]
    pub fn number(&self) -> usize {
        self.request.number
    }

    #[must_use]
    pub fn num_pages(&self) -> usize {
        self.request.num_pages()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number() < self.num_pages()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.number() > 1
    }

    /// 1-based index of the first item on this page, 0 for an empty listing.
    #[must_use]
    pub fn start_index(&self) -> usize {
        if self.request.total_items == 0 {
            0
        } else {
            (self.number() - 1) * self.request.per_page + 1
        }
    }

    /// 1-based index of the last item on this page.
    #[must_use]
    pub fn end_index(&self) -> usize {
        if self.number() == self.num_pages() {
            self.request.total_items
        } else {
            self.number() * self.request.per_page
        }
    }
}

fn num_pages(total_items: usize, per_page: usize) -> usize {
    total_items.div_ceil(per_page).max(1)
}
