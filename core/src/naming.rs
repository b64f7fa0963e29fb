//! Naming convention between thumbnail and full-size images.
//!
//! The server stores a thumbnail next to each full-size preview, named by
//! appending the thumbnail suffix to the preview's stem:
//!
//! ```text
//! /fits/2024-01-05/M31-thumb.png  ->  /fits/2024-01-05/M31.png
//! ```
//!
//! Only the final path segment is rewritten; directories, query strings and
//! fragments pass through unchanged.

use crate::config::ThumbnailNaming;
use crate::error::NamingError;
use crate::thumb_id::RecId;

/// Splits `url` into (path, tail) where tail is the `?query#fragment` part.
fn split_tail(url: &str) -> (&str, &str) {
    match url.find(|ch: char| ch == '?' || ch == '#') {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    }
}

pub fn basename(url: &str) -> &str {
    let (path, _) = split_tail(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Filename shown in the preview header: the basename with `%20` decoded.
pub fn display_filename(url: &str) -> String {
    basename(url).replace("%20", " ")
}

pub fn full_image_url(thumb_url: &str, naming: &ThumbnailNaming) -> Result<String, NamingError> {
    let (path, tail) = split_tail(thumb_url.trim());
    let (dir, file) = match path.rfind('/') {
        Some(idx) => path.split_at(idx + 1),
        None => ("", path),
    };
    if file.is_empty() {
        return Err(NamingError::EmptyFilename(thumb_url.to_string()));
    }
    let stem = file
        .strip_suffix(naming.thumb_suffix.as_str())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| NamingError::NotAThumbnail {
            file: file.to_string(),
            suffix: naming.thumb_suffix.clone(),
        })?;
    Ok(format!("{dir}{stem}{}{tail}", naming.full_suffix))
}

pub fn detail_url(endpoint: &str, recid: &RecId) -> String {
    let endpoint = endpoint.trim();
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}recid={}", urlencoding::encode(recid.as_str()))
}
