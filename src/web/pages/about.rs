//! Static "about" pages.

use maud::{html, Markup};

use crate::auth::Viewer;
use crate::components::BaseLayout;

#[must_use]
pub fn render_about_author_page(viewer: Option<&Viewer>) -> Markup {
    let content = html! {
        h1 { "About the author" }
        p {
            "Yatube is a small blogging platform: write posts, file them under "
            "groups, comment on what others write and follow the authors you like."
        }
        p { "It is built and maintained by a single developer as a learning project." }
    };
    BaseLayout::new("About the author", viewer).render(content)
}

#[must_use]
pub fn render_about_tech_page(viewer: Option<&Viewer>) -> Markup {
    let content = html! {
        h1 { "Technologies" }
        ul {
            li { "Rust with the axum web framework and tokio runtime" }
            li { "SQLite through sqlx" }
            li { "Server-rendered HTML with maud" }
            li { "Argon2 password hashing and cookie sessions" }
        }
    };
    BaseLayout::new("Technologies", viewer).render(content)
}
