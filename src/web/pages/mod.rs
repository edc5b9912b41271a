//! Maud-based page templates for the web UI.
//!
//! Each page module exports render functions that produce complete HTML
//! documents wrapped in [`BaseLayout`](crate::components::BaseLayout).

pub mod about;
pub mod accounts;
pub mod admin;
pub mod errors;
pub mod posts;

pub use about::{render_about_author_page, render_about_tech_page};
pub use accounts::{
    render_logged_out_page, render_login_page, render_password_change_done_page,
    render_password_change_page, render_signup_page,
};
pub use admin::{render_admin_page, AdminPageParams};
pub use posts::{
    render_follow_page, render_group_page, render_index_page, render_post_detail_page,
    render_post_form_page, render_profile_page, PostFormParams, ProfilePageParams,
};
