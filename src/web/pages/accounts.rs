//! Account pages: sign up, log in, log out, password change.

use maud::{html, Markup, Render};

use crate::auth::Viewer;
use crate::components::{Alert, BaseLayout, Button, CsrfField, ErrorList, Form, FormGroup, Input};
use crate::web::forms::{FormErrors, SignupForm};

#[must_use]
pub fn render_signup_page(form: &SignupForm, errors: &FormErrors) -> Markup {
    let content = html! {
        div class="auth-container" {
            h1 { "Sign up" }
            (ErrorList::new(errors.non_field()))
            (Form::post("/auth/signup/", html! {
                (FormGroup::new("First name", "first_name",
                    Input::text("first_name").value(&form.first_name).maxlength(150).render())
                    .errors(errors.get("first_name")))
                (FormGroup::new("Last name", "last_name",
                    Input::text("last_name").value(&form.last_name).maxlength(150).render())
                    .errors(errors.get("last_name")))
                (FormGroup::new("Username", "username",
                    Input::text("username").value(&form.username).maxlength(150).required()
                        .autocomplete("username").render())
                    .help("Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.")
                    .errors(errors.get("username")))
                (FormGroup::new("Email address", "email",
                    Input::email("email").value(&form.email).autocomplete("email").render())
                    .errors(errors.get("email")))
                (FormGroup::new("Password", "password1",
                    Input::password("password1").required().autocomplete("new-password").render())
                    .help("At least 8 characters, not entirely numeric, not your username.")
                    .errors(errors.get("password1")))
                (FormGroup::new("Password confirmation", "password2",
                    Input::password("password2").required().autocomplete("new-password").render())
                    .errors(errors.get("password2")))
                (Button::primary("Sign up").r#type("submit"))
            }))
            p { "Already registered? " a href="/auth/login/" { "Log in" } }
        }
    };
    BaseLayout::new("Sign up", None).render(content)
}

#[must_use]
pub fn render_login_page(username: &str, next: Option<&str>, errors: &FormErrors) -> Markup {
    let content = html! {
        div class="auth-container" {
            h1 { "Log in" }
            (ErrorList::new(errors.non_field()))
            (Form::post("/auth/login/", html! {
                @if let Some(next) = next {
                    (Input::hidden("next", next))
                }
                (FormGroup::new("Username", "username",
                    Input::text("username").value(username).required().autocomplete("username").render())
                    .errors(errors.get("username")))
                (FormGroup::new("Password", "password",
                    Input::password("password").required().autocomplete("current-password").render())
                    .errors(errors.get("password")))
                (Button::primary("Log in").r#type("submit"))
            }))
            p { "No account yet? " a href="/auth/signup/" { "Sign up" } }
        }
    };
    BaseLayout::new("Log in", None).render(content)
}

#[must_use]
pub fn render_logged_out_page() -> Markup {
    let content = html! {
        div class="auth-container" {
            h1 { "Logged out" }
            (Alert::info("You have been logged out."))
            p { a href="/auth/login/" { "Log in again" } }
        }
    };
    BaseLayout::new("Logged out", None).render(content)
}

#[must_use]
pub fn render_password_change_page(errors: &FormErrors, viewer: &Viewer) -> Markup {
    let content = html! {
        div class="auth-container" {
            h1 { "Change password" }
            (ErrorList::new(errors.non_field()))
            (Form::post("/auth/password_change/", html! {
                (CsrfField(&viewer.csrf_token))
                (FormGroup::new("Old password", "old_password",
                    Input::password("old_password").required().autocomplete("current-password").render())
                    .errors(errors.get("old_password")))
                (FormGroup::new("New password", "new_password1",
                    Input::password("new_password1").required().autocomplete("new-password").render())
                    .errors(errors.get("new_password1")))
                (FormGroup::new("New password confirmation", "new_password2",
                    Input::password("new_password2").required().autocomplete("new-password").render())
                    .errors(errors.get("new_password2")))
                (Button::primary("Change password").r#type("submit"))
            }))
        }
    };
    BaseLayout::new("Change password", Some(viewer)).render(content)
}

#[must_use]
pub fn render_password_change_done_page(viewer: &Viewer) -> Markup {
    let content = html! {
        div class="auth-container" {
            h1 { "Password changed" }
            (Alert::success("Your password was changed. Other sessions have been signed out."))
        }
    };
    BaseLayout::new("Password changed", Some(viewer)).render(content)
}
