//! Storage for images attached to posts.
//!
//! Uploaded bytes are sniffed and decoded before anything touches the disk;
//! the client's file name and content type are never trusted for the format.

use std::path::Path;

use image::ImageFormat;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Subdirectory of the media root that post images live in.
pub const POST_IMAGE_DIR: &str = "posts";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Upload a valid image.")]
    InvalidImage,
    #[error("The file is too large ({size} bytes, limit {limit}).")]
    TooLarge { size: usize, limit: usize },
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Identify an accepted image format from the leading bytes and make sure it decodes.
pub fn sniff_image(bytes: &[u8]) -> Result<ImageFormat, MediaError> {
    let format = image::guess_format(bytes).map_err(|_| MediaError::InvalidImage)?;
    if !matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif
    ) {
        return Err(MediaError::InvalidImage);
    }
    image::load_from_memory_with_format(bytes, format).map_err(|_| MediaError::InvalidImage)?;
    Ok(format)
}

/// Validate an upload and write it under `{media_root}/posts/`.
///
/// Returns the path relative to the media root, e.g. `posts/small.gif`.
pub async fn store_post_image(
    media_root: &Path,
    original_name: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<String, MediaError> {
    if bytes.len() > max_bytes {
        return Err(MediaError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }
    let format = sniff_image(bytes)?;

    let dir = media_root.join(POST_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let (stem, ext) = split_file_name(original_name, format);
    let mut candidate = format!("{stem}.{ext}");

    loop {
        let path = dir.join(&candidate);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                let written = async {
                    file.write_all(bytes).await?;
                    file.flush().await
                }
                .await;
                if let Err(e) = written {
                    drop(file);
                    discard(&path).await;
                    return Err(e.into());
                }
                debug!(path = %path.display(), size = bytes.len(), "Stored post image");
                return Ok(format!("{POST_IMAGE_DIR}/{candidate}"));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                candidate = format!("{stem}_{}.{ext}", random_suffix());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Delete an image previously returned by [`store_post_image`].
///
/// Used when the post that would reference it was never saved. Failures are
/// logged, not returned.
pub async fn remove_post_image(media_root: &Path, relative: &str) {
    if !relative.starts_with(&format!("{POST_IMAGE_DIR}/")) || relative.contains("..") {
        warn!(path = %relative, "Refusing to remove path outside the image directory");
        return;
    }
    discard(&media_root.join(relative)).await;
}

async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed orphaned image"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove orphaned image"),
    }
}

/// Safe stem plus an extension that matches the sniffed format.
fn split_file_name(original_name: &str, format: ImageFormat) -> (String, &'static str) {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let (raw_stem, raw_ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext.to_ascii_lowercase())),
        _ => (base, None),
    };

    let stem: String = raw_stem
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    let stem = if stem.is_empty() {
        "image".to_string()
    } else {
        stem
    };

    let allowed = extensions_for(format);
    let ext = raw_ext
        .and_then(|ext| allowed.iter().copied().find(|a| *a == ext))
        .unwrap_or(allowed[0]);

    (stem, ext)
}

fn extensions_for(format: ImageFormat) -> &'static [&'static str] {
    match format {
        ImageFormat::Png => &["png"],
        ImageFormat::Gif => &["gif"],
        _ => &["jpg", "jpeg"],
    }
}

fn random_suffix() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect()
}
