use serde::{Deserialize, Serialize};

/// Number of characters shown when a post is displayed in short form.
pub const POST_PREVIEW_CHARS: usize = 15;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// First and last name joined, or empty if neither is set.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Name to show in page headings: full name, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// A login session backed by a cookie token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub csrf_token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
    pub last_used_at: Option<String>,
    pub expires_at: String,
}

/// A themed community that posts can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Group with the number of posts filed under it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupWithCount {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub post_count: i64,
}

/// A post row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: String,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Post joined with its author and group for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostDisplay {
    pub id: i64,
    pub text: String,
    pub pub_date: String,
    pub author_id: i64,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
    pub image: Option<String>,
    pub comment_count: i64,
}

impl PostDisplay {
    /// Short form of the post text.
    #[must_use]
    pub fn preview(&self) -> String {
        preview_text(&self.text)
    }

    #[must_use]
    pub fn author_name(&self) -> String {
        let full = format!("{} {}", self.author_first_name, self.author_last_name);
        let full = full.trim();
        if full.is_empty() {
            self.author_username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Comment joined with its author's username.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentDisplay {
    pub id: i64,
    pub text: String,
    pub created: String,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
}

/// A subscription of `user_id` to the posts of `author_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
    pub created: String,
}

/// Data for inserting or updating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub text: String,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Data for inserting a user.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Data for inserting a group.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// First characters of a post, on a char boundary.
#[must_use]
pub fn preview_text(text: &str) -> String {
    text.chars().take(POST_PREVIEW_CHARS).collect()
}
