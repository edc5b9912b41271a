//! Error pages. Rendered without a viewer, so the navigation shows the
//! anonymous links.

use maud::{html, Markup};

use crate::components::{BaseLayout, Button};

fn error_page(title: &str, heading: &str, detail: Markup) -> Markup {
    let content = html! {
        section class="error-page" {
            h1 { (heading) }
            (detail)
            p { (Button::outline("Back to the home page").href("/")) }
        }
    };
    BaseLayout::new(title, None).render(content)
}

#[must_use]
pub fn not_found_page() -> Markup {
    error_page(
        "Page not found",
        "404: Page not found",
        html! { p { "The page you requested does not exist." } },
    )
}

#[must_use]
pub fn forbidden_page() -> Markup {
    error_page(
        "Access denied",
        "403: Access denied",
        html! { p { "You do not have permission to view this page." } },
    )
}

#[must_use]
pub fn csrf_failure_page() -> Markup {
    error_page(
        "CSRF check failed",
        "403: CSRF check failed",
        html! {
            p { "The request was rejected because its security token was missing or did not match your session." }
            p { "Reload the form and try again." }
        },
    )
}

#[must_use]
pub fn bad_request_page(message: &str) -> Markup {
    error_page(
        "Bad request",
        "400: Bad request",
        html! { p { (message) } },
    )
}

#[must_use]
pub fn server_error_page() -> Markup {
    error_page(
        "Server error",
        "500: Server error",
        html! { p { "Something went wrong on our side. Please try again later." } },
    )
}
