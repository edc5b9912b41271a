//! Yatube: a small blogging platform.
//!
//! Users publish short text posts with an optional image, file them under
//! groups, comment on each other's posts and follow authors. Everything is
//! served as server-rendered HTML on top of SQLite.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod auth;
pub mod components;
pub mod config;
pub mod db;
pub mod media;
pub mod pagination;
pub mod web;
