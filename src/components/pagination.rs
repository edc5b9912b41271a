//! Pagination component for navigating through post listings.
//!
//! Renders first, previous, nearby page numbers, next, and last links.
//! Page numbers are 1-based and page 1 links to the bare base URL.

use maud::{html, Markup, Render};

use crate::pagination::Page;

/// Displays: Previous, 1 ... current-2..current+2 ... last, Next.
/// Hidden when there is only one page.
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Current page number, 1-based
    pub current_page: usize,
    pub total_pages: usize,
    /// Base URL for page links; `?page=N` is appended
    pub base_url: String,
}

impl Pagination {
    #[must_use]
    pub fn new(current_page: usize, total_pages: usize, base_url: &str) -> Self {
        Self {
            current_page: current_page.max(1),
            total_pages: total_pages.max(1),
            base_url: base_url.to_string(),
        }
    }

    /// Pagination controls for a resolved page of results.
    #[must_use]
    pub fn for_page<T>(page: &Page<T>, base_url: &str) -> Self {
        Self::new(page.number(), page.num_pages(), base_url)
    }

    fn build_url(&self, page_num: usize) -> String {
        if page_num <= 1 {
            self.base_url.clone()
        } else {
            format!("{}?page={page_num}", self.base_url)
        }
    }

    #[must_use]
    pub fn should_display(&self) -> bool {
        self.total_pages > 1
    }
}

impl Render for Pagination {
    fn render(&self) -> Markup {
        if !self.should_display() {
            return html! {};
        }

        let current = self.current_page;
        let total = self.total_pages;

        let start = current.saturating_sub(2).max(1);
        let end = (current + 2).min(total);

        html! {
            nav class="pagination" aria-label="Pages" {
                @if current > 1 {
                    a href=(self.build_url(current - 1)) { "\u{00ab} Previous" }
                } @else {
                    span class="disabled" { "\u{00ab} Previous" }
                }

                @if start > 1 {
                    a href=(self.build_url(1)) { "1" }
                    @if start > 2 {
                        span { "..." }
                    }
                }

                @for page_num in start..=end {
                    @if page_num == current {
                        span class="current" { (page_num) }
                    } @else {
                        a href=(self.build_url(page_num)) { (page_num) }
                    }
                }

                @if end < total {
                    @if end + 1 < total {
                        span { "..." }
                    }
                    a href=(self.build_url(total)) { (total) }
                }

                @if current < total {
                    a href=(self.build_url(current + 1)) { "Next \u{00bb}" }
                } @else {
                    span class="disabled" { "Next \u{00bb}" }
                }
            }
        }
    }
}
