//! Card components for displaying posts and comments.

use chrono::NaiveDateTime;
use maud::{html, Markup, Render};

use crate::db::{CommentDisplay, PostDisplay};

/// A post summary as shown in listings.
///
/// # Example
///
/// ```ignore
/// use crate::components::card::PostCard;
///
/// let card = PostCard::new(&post).hide_group();
/// ```
#[derive(Debug, Clone)]
pub struct PostCard<'a> {
    pub post: &'a PostDisplay,
    pub show_author: bool,
    pub show_group: bool,
}

impl<'a> PostCard<'a> {
    #[must_use]
    pub const fn new(post: &'a PostDisplay) -> Self {
        Self {
            post,
            show_author: true,
            show_group: true,
        }
    }

    /// Omit the author line (the page is already about this author).
    #[must_use]
    pub const fn hide_author(mut self) -> Self {
        self.show_author = false;
        self
    }

    /// Omit the group link (the page is already about this group).
    #[must_use]
    pub const fn hide_group(mut self) -> Self {
        self.show_group = false;
        self
    }
}

impl Render for PostCard<'_> {
    fn render(&self) -> Markup {
        let post = self.post;
        html! {
            article class="post-card" {
                header {
                    ul class="post-meta" {
                        @if self.show_author {
                            li {
                                "Author: "
                                a href=(format!("/profile/{}/", post.author_username)) {
                                    (post.author_name())
                                }
                            }
                        }
                        li { "Published: " (format_date(&post.pub_date)) }
                    }
                }
                @if let Some(image) = &post.image {
                    img class="post-image" src=(format!("/media/{image}")) alt="";
                }
                p { (text_with_breaks(&post.text)) }
                footer {
                    a href=(format!("/posts/{}/", post.id)) { "Details" }
                    @if post.comment_count > 0 {
                        " \u{00b7} " (post.comment_count) " comments"
                    }
                    @if self.show_group {
                        @if let (Some(slug), Some(title)) = (&post.group_slug, &post.group_title) {
                            " \u{00b7} "
                            a href=(format!("/group/{slug}/")) { "All posts of the group " (title) }
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentCard<'a> {
    pub comment: &'a CommentDisplay,
}

impl<'a> CommentCard<'a> {
    #[must_use]
    pub const fn new(comment: &'a CommentDisplay) -> Self {
        Self { comment }
    }
}

impl Render for CommentCard<'_> {
    fn render(&self) -> Markup {
        let comment = self.comment;
        html! {
            div class="comment" {
                h5 {
                    a href=(format!("/profile/{}/", comment.author_username)) {
                        (comment.author_username)
                    }
                    small { " " (format_date(&comment.created)) }
                }
                p { (text_with_breaks(&comment.text)) }
            }
        }
    }
}

/// Placeholder shown when a listing has nothing in it.
#[derive(Debug, Clone, Copy)]
pub struct EmptyState<'a> {
    pub message: &'a str,
}

impl<'a> EmptyState<'a> {
    #[must_use]
    pub const fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Render for EmptyState<'_> {
    fn render(&self) -> Markup {
        html! {
            p class="empty-state" { (self.message) }
        }
    }
}

/// Render a stored timestamp as e.g. `19 Oct 2026`. Unparseable input is shown as is.
#[must_use]
pub fn format_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map_or_else(|_| raw.to_string(), |dt| dt.format("%-d %b %Y").to_string())
}

/// Escaped text with newlines turned into `<br>`.
#[must_use]
pub fn text_with_breaks(text: &str) -> Markup {
    html! {
        @for (i, line) in text.lines().enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}
