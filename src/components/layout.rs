//! Base layout components for the web UI.
//!
//! This module provides the main page layout structure including
//! the HTML skeleton, navigation, and footer.

use maud::{html, Markup, DOCTYPE};

use crate::auth::csrf::CSRF_FIELD;
use crate::auth::Viewer;

pub const SITE_NAME: &str = "Yatube";

/// Base page layout builder.
///
/// The viewer is required so that authentication state is always handled
/// explicitly: pass `None` for anonymous visitors.
///
/// # Example
///
/// ```ignore
/// use maud::html;
/// use crate::components::layout::BaseLayout;
///
/// let content = html! { h1 { "Hello World" } };
/// let page = BaseLayout::new("My Page", viewer.as_ref()).render(content);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
    viewer: Option<&'a Viewer>,
}

impl<'a> BaseLayout<'a> {
    #[must_use]
    pub fn new(title: &'a str, viewer: Option<&'a Viewer>) -> Self {
        Self { title, viewer }
    }

    /// Render the complete HTML page with the given content.
    ///
    /// The content will be placed inside the `<main class="container">` element.
    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="color-scheme" content="light dark";
                    title { (self.title) " - " (SITE_NAME) }
                    link rel="stylesheet" href="/static/css/style.css";
                }
                body {
                    (self.render_header())
                    main class="container" {
                        (content)
                    }
                    (Self::render_footer())
                }
            }
        }
    }

    /// Render the page header with navigation.
    fn render_header(&self) -> Markup {
        html! {
            header class="container" {
                nav {
                    ul {
                        li {
                            a href="/" {
                                strong class="site-logo" { (SITE_NAME) }
                            }
                        }
                    }
                    ul {
                        li { a href="/" { "Home" } }
                        li { a href="/about/author/" { "About" } }
                        li { a href="/about/tech/" { "Tech" } }
                        (self.render_auth_nav())
                    }
                }
            }
        }
    }

    /// Render authentication-related navigation items.
    fn render_auth_nav(&self) -> Markup {
        match self.viewer {
            Some(viewer) => html! {
                li { a href="/create/" { "New post" } }
                li { a href="/follow/" { "Following" } }
                @if viewer.user.is_admin {
                    li { a href="/admin/" { "Admin" } }
                }
                li { a href="/auth/password_change/" { "Change password" } }
                li {
                    form class="inline-form" action="/auth/logout/" method="post" {
                        input type="hidden" name=(CSRF_FIELD) value=(viewer.csrf_token);
                        button type="submit" class="link-button" {
                            "Log out (" (viewer.user.username) ")"
                        }
                    }
                }
            },
            None => html! {
                li { a href="/auth/login/" { "Log in" } }
                li { a href="/auth/signup/" { "Sign up" } }
            },
        }
    }

    fn render_footer() -> Markup {
        let year = chrono::Utc::now().format("%Y");
        html! {
            footer class="container" {
                small { "\u{00a9} " (year) " " (SITE_NAME) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::User;

    fn test_viewer(is_admin: bool) -> Viewer {
        Viewer {
            user: User {
                id: 1,
                username: "testuser".to_string(),
                email: Some("test@example.com".to_string()),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                password_hash: "hash".to_string(),
                is_admin,
                is_active: true,
                created_at: "2024-01-01 00:00:00".to_string(),
                updated_at: "2024-01-01 00:00:00".to_string(),
            },
            session_token: "token".to_string(),
            csrf_token: "csrf123".to_string(),
        }
    }

    #[test]
    fn test_base_layout_basic_structure() {
        let content = html! { h1 { "Test Content" } };
        let html = BaseLayout::new("Test Page", None).render(content).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test Page - Yatube</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/static/css/style.css">"#));
        assert!(html.contains(r#"<main class="container"><h1>Test Content</h1></main>"#));
    }

    #[test]
    fn test_base_layout_anonymous() {
        let html = BaseLayout::new("Anon", None)
            .render(html! {})
            .into_string();

        assert!(html.contains(r#"<a href="/auth/login/">Log in</a>"#));
        assert!(html.contains(r#"<a href="/auth/signup/">Sign up</a>"#));
        assert!(!html.contains(r#"href="/create/""#));
        assert!(!html.contains("/auth/logout/"));
    }

    #[test]
    fn test_base_layout_regular_user() {
        let viewer = test_viewer(false);
        let html = BaseLayout::new("User", Some(&viewer))
            .render(html! {})
            .into_string();

        assert!(html.contains(r#"<a href="/create/">New post</a>"#));
        assert!(html.contains(r#"<a href="/follow/">Following</a>"#));
        assert!(html.contains(r#"action="/auth/logout/""#));
        assert!(html.contains(r#"value="csrf123""#));
        assert!(!html.contains(r#"href="/admin/""#));
        assert!(!html.contains(r#"href="/auth/login/""#));
    }

    #[test]
    fn test_base_layout_admin_user() {
        let viewer = test_viewer(true);
        let html = BaseLayout::new("Admin", Some(&viewer))
            .render(html! {})
            .into_string();

        assert!(html.contains(r#"<a href="/admin/">Admin</a>"#));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = BaseLayout::new("<script>", None)
            .render(html! {})
            .into_string();
        assert!(html.contains("<title>&lt;script&gt; - Yatube</title>"));
    }
}
