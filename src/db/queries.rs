use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::models::{
    CommentDisplay, Follow, Group, GroupWithCount, NewGroup, NewPost, NewUser, Post, PostDisplay,
    Session, User,
};

/// Columns and joins shared by every post listing.
const POST_DISPLAY_SELECT: &str = r"
    SELECT
        p.id,
        p.text,
        p.pub_date,
        p.author_id,
        u.username AS author_username,
        u.first_name AS author_first_name,
        u.last_name AS author_last_name,
        p.group_id,
        g.slug AS group_slug,
        g.title AS group_title,
        p.image,
        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
";

const POST_ORDER: &str = "ORDER BY p.pub_date DESC, p.id DESC";

// ========== Users ==========

/// Get a user by ID.
pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by id")
}

/// Get a user by username.
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by username")
}

/// Check if a username already exists (case-insensitive).
pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ? COLLATE NOCASE")
            .bind(username)
            .fetch_one(pool)
            .await
            .context("Failed to check username existence")?;
    Ok(row.0 > 0)
}

/// Create a new user, returning its ID.
pub async fn create_user(pool: &SqlitePool, user: &NewUser, is_admin: bool) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO users (username, email, first_name, last_name, password_hash, is_admin)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .bind(is_admin)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(result.last_insert_rowid())
}

/// Sign up a user in a single statement.
///
/// The account is an admin only if the table was empty, and nothing is
/// inserted when the username is taken in any letter case. Returns the new
/// ID and admin flag, or `None` for a taken username.
pub async fn register_user(pool: &SqlitePool, user: &NewUser) -> Result<Option<(i64, bool)>> {
    sqlx::query_as(
        r"
        INSERT INTO users (username, email, first_name, last_name, password_hash, is_admin)
        SELECT ?, ?, ?, ?, ?, NOT EXISTS (SELECT 1 FROM users)
        WHERE NOT EXISTS (SELECT 1 FROM users WHERE username = ? COLLATE NOCASE)
        RETURNING id, is_admin
        ",
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .bind(&user.username)
    .fetch_optional(pool)
    .await
    .context("Failed to register user")
}

/// Get all users, oldest first.
pub async fn get_all_users(pool: &SqlitePool) -> Result<Vec<User>> {
    sqlx::query_as("SELECT * FROM users ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to get all users")
}

/// Update user password.
pub async fn update_user_password(
    pool: &SqlitePool,
    user_id: i64,
    password_hash: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE users SET password_hash = ?, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(password_hash)
    .bind(user_id)
    .execute(pool)
    .await
    .context("Failed to update user password")?;
    Ok(())
}

/// Delete a user together with their posts, comments, follows and sessions.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;
    Ok(result.rows_affected() > 0)
}

// ========== Sessions ==========

/// Create a new session.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    token: &str,
    csrf_token: &str,
    ip_address: &str,
    user_agent: Option<&str>,
    expires_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO sessions (user_id, token, csrf_token, ip_address, user_agent, expires_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(user_id)
    .bind(token)
    .bind(csrf_token)
    .bind(ip_address)
    .bind(user_agent)
    .bind(expires_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(result.last_insert_rowid())
}

/// Get a session by token.
pub async fn get_session_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    sqlx::query_as("SELECT * FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch session by token")
}

/// Update session last_used_at.
pub async fn update_session_last_used(pool: &SqlitePool, session_id: i64) -> Result<()> {
    sqlx::query("UPDATE sessions SET last_used_at = datetime('now') WHERE id = ?")
        .bind(session_id)
        .execute(pool)
        .await
        .context("Failed to update session last_used")?;
    Ok(())
}

/// Delete a session.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .context("Failed to delete session")?;
    Ok(())
}

/// Delete all sessions for a user except the current one.
/// Used when changing password to invalidate other sessions.
pub async fn delete_other_user_sessions(
    pool: &SqlitePool,
    user_id: i64,
    current_token: &str,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = ? AND token != ?")
        .bind(user_id)
        .bind(current_token)
        .execute(pool)
        .await
        .context("Failed to delete other user sessions")?;
    Ok(result.rows_affected())
}

/// Count active sessions for a user.
pub async fn count_user_sessions(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .context("Failed to count user sessions")?;
    Ok(row.0)
}

/// Delete oldest sessions for a user, keeping only the most recent `keep_count`.
pub async fn delete_oldest_user_sessions(
    pool: &SqlitePool,
    user_id: i64,
    keep_count: i64,
) -> Result<u64> {
    let result = sqlx::query(
        r"
        DELETE FROM sessions
        WHERE user_id = ? AND id NOT IN (
            SELECT id FROM sessions
            WHERE user_id = ?
            ORDER BY COALESCE(last_used_at, created_at) DESC, id DESC
            LIMIT ?
        )
        ",
    )
    .bind(user_id)
    .bind(user_id)
    .bind(keep_count)
    .execute(pool)
    .await
    .context("Failed to delete oldest user sessions")?;
    Ok(result.rows_affected())
}

/// Delete expired sessions.
pub async fn delete_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < datetime('now')")
        .execute(pool)
        .await
        .context("Failed to delete expired sessions")?;
    Ok(result.rows_affected())
}

// ========== Groups ==========

/// All groups, alphabetically by title.
pub async fn get_all_groups(pool: &SqlitePool) -> Result<Vec<Group>> {
    sqlx::query_as("SELECT * FROM post_groups ORDER BY title, id")
        .fetch_all(pool)
        .await
        .context("Failed to fetch groups")
}

/// All groups with the number of posts in each.
pub async fn get_groups_with_counts(pool: &SqlitePool) -> Result<Vec<GroupWithCount>> {
    sqlx::query_as(
        r"
        SELECT g.id, g.title, g.slug, g.description, COUNT(p.id) AS post_count
        FROM post_groups g
        LEFT JOIN posts p ON p.group_id = g.id
        GROUP BY g.id
        ORDER BY g.title, g.id
        ",
    )
    .fetch_all(pool)
    .await
    .context("Failed to fetch groups with counts")
}

pub async fn get_group_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Group>> {
    sqlx::query_as("SELECT * FROM post_groups WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch group by slug")
}

pub async fn get_group_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Group>> {
    sqlx::query_as("SELECT * FROM post_groups WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch group by id")
}

/// Insert a new group, returning its ID.
pub async fn insert_group(pool: &SqlitePool, group: &NewGroup) -> Result<i64> {
    let result =
        sqlx::query("INSERT INTO post_groups (title, slug, description) VALUES (?, ?, ?)")
            .bind(&group.title)
            .bind(&group.slug)
            .bind(&group.description)
            .execute(pool)
            .await
            .context("Failed to insert group")?;

    Ok(result.last_insert_rowid())
}

/// Delete a group; its posts are kept without a group.
pub async fn delete_group(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM post_groups WHERE slug = ?")
        .bind(slug)
        .execute(pool)
        .await
        .context("Failed to delete group")?;
    Ok(result.rows_affected() > 0)
}

// ========== Posts ==========

/// Insert a new post, returning its ID.
pub async fn insert_post(pool: &SqlitePool, post: &NewPost) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO posts (text, author_id, group_id, image)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(&post.text)
    .bind(post.author_id)
    .bind(post.group_id)
    .bind(&post.image)
    .execute(pool)
    .await
    .context("Failed to insert post")?;

    Ok(result.last_insert_rowid())
}

/// Update an existing post's editable fields. Author and publication date never change.
pub async fn update_post(
    pool: &SqlitePool,
    id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE posts SET text = ?, group_id = ?, image = ? WHERE id = ?")
        .bind(text)
        .bind(group_id)
        .bind(image)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update post")?;

    Ok(())
}

/// Delete a post and its comments.
pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_post(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    sqlx::query_as("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post")
}

/// Get a post with its author and group.
pub async fn get_post_display(pool: &SqlitePool, id: i64) -> Result<Option<PostDisplay>> {
    sqlx::query_as(&format!("{POST_DISPLAY_SELECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post for display")
}

/// Get the most recently created post.
pub async fn get_latest_post(pool: &SqlitePool) -> Result<Option<Post>> {
    sqlx::query_as("SELECT * FROM posts ORDER BY id DESC LIMIT 1")
        .fetch_optional(pool)
        .await
        .context("Failed to fetch latest post")
}

pub async fn count_posts(pool: &SqlitePool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;
    Ok(row.0)
}

/// Get a page of all posts, newest first.
pub async fn get_posts_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostDisplay>> {
    sqlx::query_as(&format!("{POST_DISPLAY_SELECT} {POST_ORDER} LIMIT ? OFFSET ?"))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to fetch posts page")
}

pub async fn count_group_posts(pool: &SqlitePool, group_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE group_id = ?")
        .bind(group_id)
        .fetch_one(pool)
        .await
        .context("Failed to count group posts")?;
    Ok(row.0)
}

/// Get a page of posts in a group, newest first.
pub async fn get_group_posts(
    pool: &SqlitePool,
    group_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostDisplay>> {
    sqlx::query_as(&format!(
        "{POST_DISPLAY_SELECT} WHERE p.group_id = ? {POST_ORDER} LIMIT ? OFFSET ?"
    ))
    .bind(group_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to fetch group posts")
}

pub async fn count_author_posts(pool: &SqlitePool, author_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count author posts")?;
    Ok(row.0)
}

/// Get a page of posts by one author, newest first.
pub async fn get_author_posts(
    pool: &SqlitePool,
    author_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostDisplay>> {
    sqlx::query_as(&format!(
        "{POST_DISPLAY_SELECT} WHERE p.author_id = ? {POST_ORDER} LIMIT ? OFFSET ?"
    ))
    .bind(author_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to fetch author posts")
}

/// Count posts by authors the user follows.
pub async fn count_feed_posts(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(
        r"
        SELECT COUNT(*) FROM posts
        WHERE author_id IN (SELECT author_id FROM follows WHERE user_id = ?)
        ",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("Failed to count feed posts")?;
    Ok(row.0)
}

/// Get a page of posts by authors the user follows, newest first.
pub async fn get_feed_posts(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostDisplay>> {
    sqlx::query_as(&format!(
        r"{POST_DISPLAY_SELECT}
        WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ?)
        {POST_ORDER} LIMIT ? OFFSET ?"
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to fetch feed posts")
}

// ========== Comments ==========

/// Insert a comment, returning its ID.
pub async fn insert_comment(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    text: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO comments (text, author_id, post_id) VALUES (?, ?, ?)")
        .bind(text)
        .bind(author_id)
        .bind(post_id)
        .execute(pool)
        .await
        .context("Failed to insert comment")?;

    Ok(result.last_insert_rowid())
}

/// Comments on a post, newest first.
pub async fn get_comments_for_post(pool: &SqlitePool, post_id: i64) -> Result<Vec<CommentDisplay>> {
    sqlx::query_as(
        r"
        SELECT c.id, c.text, c.created, c.post_id, c.author_id, u.username AS author_username
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ?
        ORDER BY c.created DESC, c.id DESC
        ",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch comments")
}

pub async fn count_comments(pool: &SqlitePool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;
    Ok(row.0)
}

// ========== Follows ==========

/// Subscribe `user_id` to `author_id`. Returns false if nothing changed
/// (already subscribed, or following oneself).
pub async fn follow_author(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<bool> {
    if user_id == author_id {
        return Ok(false);
    }
    let result = sqlx::query("INSERT OR IGNORE INTO follows (user_id, author_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await
        .context("Failed to follow author")?;
    Ok(result.rows_affected() > 0)
}

/// Remove a subscription. Returns false if there was none.
pub async fn unfollow_author(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await
        .context("Failed to unfollow author")?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_following(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<bool> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .fetch_one(pool)
            .await
            .context("Failed to check follow")?;
    Ok(row.0 > 0)
}

/// Subscriptions held by a user.
pub async fn get_follows_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Follow>> {
    sqlx::query_as("SELECT * FROM follows WHERE user_id = ? ORDER BY created DESC, id DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch follows")
}

/// Number of users subscribed to an author.
pub async fn count_followers(pool: &SqlitePool, author_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count followers")?;
    Ok(row.0)
}
