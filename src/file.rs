use std::path::Path;

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_EXTENSION: &str = ".mp4";

fn is_forbidden(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || (c as u32) < 32
}

/// Makes a title safe to use as a file name in the working directory.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .replace('+', " ")
        .chars()
        .filter(|c| !is_forbidden(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}

pub fn has_extension(filename: &str) -> bool {
    extension_of(filename).is_some()
}

pub fn extension_from_url(url: &Url) -> Option<String> {
    extension_of(url.path()).map(|ext| format!(".{}", ext))
}

pub fn extension_from_content_type(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    mime_guess::get_mime_extensions_str(essence)
        .and_then(|extensions| extensions.first())
        .map(|ext| format!(".{}", ext))
}

/// Sanitizes `candidate` into the name the video is stored under.
///
/// An empty name after sanitizing is treated like a missing title.
pub fn resolve_filename(candidate: &str) -> Result<String> {
    let filename = sanitize_filename(candidate);

    if filename.is_empty() {
        return Err(Error::TitleNotFound);
    }

    if filename != candidate {
        tracing::info!("Filename sanitized to: {}", filename);
    }

    Ok(filename)
}

pub fn with_extension(filename: String, extension: &str) -> String {
    tracing::info!("Adding file extension: {}", extension);

    filename + extension
}
