//! Post listings, post detail and the create/edit form.

use maud::{html, Markup, Render};

use crate::auth::Viewer;
use crate::components::{
    format_date, text_with_breaks, ActionButton, BaseLayout, Button, Checkbox, CommentCard,
    CsrfField, EmptyState, ErrorList, FileInput, Form, FormGroup, Pagination, PostCard, Select,
    TextArea,
};
use crate::db::{CommentDisplay, Group, PostDisplay, User};
use crate::pagination::Page;
use crate::web::forms::FormErrors;

/// Which card details a listing leaves out because the page already shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingContext {
    All,
    Group,
    Author,
}

/// Cards for one page of posts plus the pagination controls.
fn post_list(page: &Page<PostDisplay>, base_url: &str, context: ListingContext) -> Markup {
    html! {
        @if page.is_empty() {
            (EmptyState::new("No posts yet."))
        } @else {
            @for post in &page.items {
                @match context {
                    ListingContext::All => { (PostCard::new(post)) }
                    ListingContext::Group => { (PostCard::new(post).hide_group()) }
                    ListingContext::Author => { (PostCard::new(post).hide_author()) }
                }
            }
        }
        (Pagination::for_page(page, base_url))
    }
}

#[must_use]
pub fn render_index_page(page: &Page<PostDisplay>, viewer: Option<&Viewer>) -> Markup {
    let content = html! {
        h1 { "Latest updates" }
        (post_list(page, "/", ListingContext::All))
    };
    BaseLayout::new("Latest updates", viewer).render(content)
}

#[must_use]
pub fn render_group_page(group: &Group, page: &Page<PostDisplay>, viewer: Option<&Viewer>) -> Markup {
    let title = format!("Posts of the group {}", group.title);
    let content = html! {
        h1 { (group.title) }
        @if !group.description.is_empty() {
            p class="group-description" { (text_with_breaks(&group.description)) }
        }
        (post_list(page, &format!("/group/{}/", group.slug), ListingContext::Group))
    };
    BaseLayout::new(&title, viewer).render(content)
}

#[must_use]
pub fn render_follow_page(page: &Page<PostDisplay>, viewer: &Viewer) -> Markup {
    let content = html! {
        h1 { "Posts from authors you follow" }
        @if page.is_empty() {
            (EmptyState::new("You are not following anyone yet, or they have not posted."))
        } @else {
            @for post in &page.items {
                (PostCard::new(post))
            }
            (Pagination::for_page(page, "/follow/"))
        }
    };
    BaseLayout::new("Following", Some(viewer)).render(content)
}

pub struct ProfilePageParams<'a> {
    pub author: &'a User,
    pub post_count: i64,
    pub follower_count: i64,
    pub page: &'a Page<PostDisplay>,
    /// `None` hides the follow controls (anonymous viewer or own profile).
    pub following: Option<bool>,
    pub viewer: Option<&'a Viewer>,
}

#[must_use]
pub fn render_profile_page(params: &ProfilePageParams<'_>) -> Markup {
    let author = params.author;
    let title = format!("Profile of {}", author.display_name());
    let base_url = format!("/profile/{}/", author.username);

    let follow_controls = match (params.following, params.viewer) {
        (Some(true), Some(viewer)) => html! {
            (ActionButton::new(
                &format!("{base_url}unfollow/"),
                &viewer.csrf_token,
                Button::outline("Unfollow"),
            ))
        },
        (Some(false), Some(viewer)) => html! {
            (ActionButton::new(
                &format!("{base_url}follow/"),
                &viewer.csrf_token,
                Button::primary("Follow"),
            ))
        },
        _ => html! {},
    };

    let content = html! {
        section class="profile-header" {
            h1 { "All posts of " (author.display_name()) }
            p {
                "Posts: " strong { (params.post_count) }
                " \u{00b7} Followers: " strong { (params.follower_count) }
            }
            (follow_controls)
        }
        (post_list(params.page, &base_url, ListingContext::Author))
    };
    BaseLayout::new(&title, params.viewer).render(content)
}

#[must_use]
pub fn render_post_detail_page(
    post: &PostDisplay,
    author_post_count: i64,
    comments: &[CommentDisplay],
    viewer: Option<&Viewer>,
) -> Markup {
    let title = format!("Post {}", post.preview());
    let is_author = viewer.is_some_and(|v| v.id() == post.author_id);

    let content = html! {
        div class="post-detail" {
            aside class="post-sidebar" {
                ul {
                    li { "Published: " (format_date(&post.pub_date)) }
                    @if let (Some(slug), Some(group_title)) = (&post.group_slug, &post.group_title) {
                        li {
                            "Group: "
                            a href=(format!("/group/{slug}/")) { (group_title) }
                        }
                    }
                    li {
                        "Author: "
                        a href=(format!("/profile/{}/", post.author_username)) { (post.author_name()) }
                    }
                    li { "Author's posts: " strong { (author_post_count) } }
                }
            }
            article class="post-body" {
                @if let Some(image) = &post.image {
                    img class="post-image" src=(format!("/media/{image}")) alt="";
                }
                p { (text_with_breaks(&post.text)) }
                @if let (true, Some(viewer)) = (is_author, viewer) {
                    div class="post-actions" {
                        (Button::outline("Edit").href(&format!("/posts/{}/edit/", post.id)))
                        " "
                        (ActionButton::new(
                            &format!("/posts/{}/delete/", post.id),
                            &viewer.csrf_token,
                            Button::danger("Delete"),
                        ).confirm("Delete this post?"))
                    }
                }
            }
        }

        section class="comments" {
            @if let Some(viewer) = viewer {
                (Form::post(&format!("/posts/{}/comment/", post.id), html! {
                    (CsrfField(&viewer.csrf_token))
                    (FormGroup::new("Add a comment", "text", TextArea::new("text").rows(3).required().render()))
                    (Button::primary("Send").r#type("submit"))
                }).class("comment-form"))
            }
            h3 { "Comments (" (comments.len()) ")" }
            @for comment in comments {
                (CommentCard::new(comment))
            }
        }
    };
    BaseLayout::new(&title, viewer).render(content)
}

/// What the create/edit form needs to render itself.
pub struct PostFormParams<'a> {
    /// `Some(id)` when editing an existing post.
    pub post_id: Option<i64>,
    pub text: &'a str,
    pub group: &'a str,
    pub current_image: Option<&'a str>,
    pub groups: &'a [Group],
    pub errors: &'a FormErrors,
}

#[must_use]
pub fn render_post_form_page(params: &PostFormParams<'_>, viewer: &Viewer) -> Markup {
    let (title, action, submit) = match params.post_id {
        Some(id) => ("Edit post", format!("/posts/{id}/edit/"), "Save"),
        None => ("New post", "/create/".to_string(), "Publish"),
    };

    let group_values: Vec<(String, &str)> = params
        .groups
        .iter()
        .map(|g| (g.id.to_string(), g.title.as_str()))
        .collect();
    let mut group_select = Select::new("group").selected_opt(Some(params.group));
    for (value, label) in &group_values {
        group_select = group_select.option(value, label);
    }

    let image_input = html! {
        @if let Some(current) = params.current_image {
            p class="current-image" {
                "Currently: "
                a href=(format!("/media/{current}")) { (current) }
                " "
                (Checkbox::new("image-clear", "Clear"))
            }
        }
        (FileInput::image("image"))
    };

    let content = html! {
        h1 { (title) }
        (ErrorList::new(params.errors.non_field()))
        (Form::post(&action, html! {
            (CsrfField(&viewer.csrf_token))
            (FormGroup::new("Text", "text", TextArea::new("text").value(params.text).required().render())
                .help("Text of the new post")
                .errors(params.errors.get("text")))
            (FormGroup::new("Group", "group", group_select.render())
                .help("Group the post will belong to")
                .errors(params.errors.get("group")))
            (FormGroup::new("Image", "image", image_input)
                .errors(params.errors.get("image")))
            (Button::primary(submit).r#type("submit"))
        }).multipart())
    };
    BaseLayout::new(title, Some(viewer)).render(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageRequest;

    fn viewer(id: i64) -> Viewer {
        Viewer {
            user: User {
                id,
                username: format!("user{id}"),
                email: None,
                first_name: String::new(),
                last_name: String::new(),
                password_hash: String::new(),
                is_admin: false,
                is_active: true,
                created_at: String::new(),
                updated_at: String::new(),
            },
            session_token: "session".to_string(),
            csrf_token: "csrf".to_string(),
        }
    }

    fn post(id: i64, author_id: i64) -> PostDisplay {
        PostDisplay {
            id,
            text: format!("Post number {id}"),
            pub_date: "2024-01-01 12:00:00.000".to_string(),
            author_id,
            author_username: format!("user{author_id}"),
            author_first_name: String::new(),
            author_last_name: String::new(),
            group_id: None,
            group_slug: None,
            group_title: None,
            image: None,
            comment_count: 0,
        }
    }

    #[test]
    fn test_index_lists_posts() {
        let items: Vec<_> = (1..=10).map(|i| post(i, 1)).collect();
        let page = Page::new(items, PageRequest::resolve(None, 10, 13));
        let html = render_index_page(&page, None).into_string();
        assert_eq!(html.matches(r#"class="post-card""#).count(), 10);
        assert!(html.contains(r#"href="/?page=2""#));
    }

    #[test]
    fn test_empty_index() {
        let page: Page<PostDisplay> = Page::new(vec![], PageRequest::resolve(None, 10, 0));
        let html = render_index_page(&page, None).into_string();
        assert!(html.contains("No posts yet."));
        assert!(!html.contains("pagination"));
    }

    #[test]
    fn test_post_detail_author_controls() {
        let p = post(5, 1);
        let author = viewer(1);
        let html = render_post_detail_page(&p, 1, &[], Some(&author)).into_string();
        assert!(html.contains(r#"href="/posts/5/edit/""#));
        assert!(html.contains(r#"action="/posts/5/delete/""#));
        assert!(html.contains(r#"action="/posts/5/comment/""#));

        let other = viewer(2);
        let html = render_post_detail_page(&p, 1, &[], Some(&other)).into_string();
        assert!(!html.contains("/posts/5/edit/"));
        assert!(html.contains(r#"action="/posts/5/comment/""#));

        let html = render_post_detail_page(&p, 1, &[], None).into_string();
        assert!(!html.contains("/posts/5/comment/"));
    }

    #[test]
    fn test_post_form_edit_mode() {
        let groups = vec![Group {
            id: 1,
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: String::new(),
        }];
        let errors = FormErrors::default();
        let params = PostFormParams {
            post_id: Some(9),
            text: "old text",
            group: "1",
            current_image: Some("posts/small.gif"),
            groups: &groups,
            errors: &errors,
        };
        let html = render_post_form_page(&params, &viewer(1)).into_string();
        assert!(html.contains(r#"action="/posts/9/edit/""#));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains("old text</textarea>"));
        assert!(html.contains(r#"<option value="1" selected>Cats</option>"#));
        assert!(html.contains(r#"name="image-clear""#));
        assert!(html.contains(r#"value="csrf""#));
    }

    #[test]
    fn test_profile_follow_button() {
        let author = viewer(1).user;
        let me = viewer(2);
        let page: Page<PostDisplay> = Page::new(vec![], PageRequest::resolve(None, 10, 0));
        let mut params = ProfilePageParams {
            author: &author,
            post_count: 0,
            follower_count: 0,
            page: &page,
            following: Some(false),
            viewer: Some(&me),
        };
        let html = render_profile_page(&params).into_string();
        assert!(html.contains(r#"action="/profile/user1/follow/""#));

        params.following = Some(true);
        let html = render_profile_page(&params).into_string();
        assert!(html.contains(r#"action="/profile/user1/unfollow/""#));

        params.following = None;
        let html = render_profile_page(&params).into_string();
        assert!(!html.contains("/profile/user1/follow/"));
    }
}
