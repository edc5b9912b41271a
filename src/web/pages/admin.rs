//! Administration page: groups and users.

use maud::{html, Markup, Render};

use crate::auth::Viewer;
use crate::components::{
    ActionButton, BaseLayout, Button, CsrfField, ErrorList, Form, FormGroup, Input, TextArea,
};
use crate::db::{GroupWithCount, User};
use crate::web::forms::{FormErrors, GroupForm};

pub struct AdminPageParams<'a> {
    pub groups: &'a [GroupWithCount],
    pub users: &'a [User],
    /// Values to refill the "new group" form with after a failed submit.
    pub group_form: &'a GroupForm,
    pub errors: &'a FormErrors,
    pub viewer: &'a Viewer,
}

#[must_use]
pub fn render_admin_page(params: &AdminPageParams<'_>) -> Markup {
    let viewer = params.viewer;
    let csrf = viewer.csrf_token.as_str();

    let content = html! {
        h1 { "Administration" }

        section {
            h2 { "Groups" }
            @if params.groups.is_empty() {
                p { "No groups yet." }
            } @else {
                table {
                    thead { tr { th { "Title" } th { "Slug" } th { "Posts" } th {} } }
                    tbody {
                        @for group in params.groups {
                            tr {
                                td { a href=(format!("/group/{}/", group.slug)) { (group.title) } }
                                td { code { (group.slug) } }
                                td { (group.post_count) }
                                td {
                                    (ActionButton::new(
                                        &format!("/admin/groups/{}/delete/", group.slug),
                                        csrf,
                                        Button::danger("Delete"),
                                    ).confirm("Delete this group? Its posts will be kept."))
                                }
                            }
                        }
                    }
                }
            }

            h3 { "New group" }
            (ErrorList::new(params.errors.non_field()))
            (Form::post("/admin/groups/", html! {
                (CsrfField(csrf))
                (FormGroup::new("Title", "title",
                    Input::text("title").value(&params.group_form.title).maxlength(200).required().render())
                    .errors(params.errors.get("title")))
                (FormGroup::new("Slug", "slug",
                    Input::text("slug").value(&params.group_form.slug).maxlength(30).required().render())
                    .help("Letters, digits, hyphens and underscores.")
                    .errors(params.errors.get("slug")))
                (FormGroup::new("Description", "description",
                    TextArea::new("description").value(&params.group_form.description).rows(3).render())
                    .errors(params.errors.get("description")))
                (Button::primary("Create group").r#type("submit"))
            }))
        }

        section {
            h2 { "Users" }
            table {
                thead { tr { th { "Username" } th { "Name" } th { "Joined" } th { "Role" } th {} } }
                tbody {
                    @for user in params.users {
                        tr {
                            td { a href=(format!("/profile/{}/", user.username)) { (user.username) } }
                            td { (user.full_name()) }
                            td { (user.created_at) }
                            td { @if user.is_admin { "admin" } @else { "user" } }
                            td {
                                @if user.id != viewer.id() {
                                    (ActionButton::new(
                                        &format!("/admin/users/{}/delete/", user.id),
                                        csrf,
                                        Button::danger("Delete"),
                                    ).confirm("Delete this user and everything they wrote?"))
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    BaseLayout::new("Administration", Some(viewer)).render(content)
}
