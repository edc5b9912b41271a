//! Maud HTML template components for the web UI.
//!
//! Components are organized into submodules by functionality:
//!
//! - `layout`: Base page layout and navigation
//! - `alert`: Notices and validation error lists
//! - `button`: Buttons, link-buttons and one-click POST buttons
//! - `card`: Post and comment cards
//! - `form`: Form elements and input components
//! - `pagination`: Page navigation controls
//!
//! # Example
//!
//! ```ignore
//! use maud::{html, Markup};
//! use crate::components::{Alert, BaseLayout, Button};
//!
//! fn my_page() -> Markup {
//!     let content = html! {
//!         h1 { "Hello World" }
//!         (Alert::success("Page loaded!"))
//!         (Button::primary("Click me"))
//!     };
//!     BaseLayout::new("My Page", None).render(content)
//! }
//! ```

pub mod alert;
pub mod button;
pub mod card;
pub mod form;
pub mod layout;
pub mod pagination;

pub use alert::{Alert, AlertVariant, ErrorList};
pub use button::{ActionButton, Button, ButtonVariant};
pub use card::{format_date, text_with_breaks, CommentCard, EmptyState, PostCard};
pub use form::{
    Checkbox, CsrfField, FileInput, Form, FormGroup, Input, Select, SelectOption, TextArea,
};
pub use layout::{BaseLayout, SITE_NAME};
pub use pagination::Pagination;
