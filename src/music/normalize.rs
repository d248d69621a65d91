//! Text canonicalization for titles, search queries and submissions.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref WEBSITE_LINK_REGEX: Regex =
        Regex::new(r"(?i)(https?|ftp)://[^\s/$.?#].[^\s]*").unwrap();
    static ref WHITESPACE_RUN_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MusicValidationError {
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Field '{0}' must not contain website links")]
    ContainsLink(&'static str),

    #[error("Field '{0}' must not contain accents")]
    ContainsAccents(&'static str),
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercases the whole query, then uppercases the first character of every
/// space separated token. Spacing is preserved as is.
///
/// `"the beatles"` becomes `"The Beatles"`, `"hELLO"` becomes `"Hello"`.
pub fn normalize_title_query(raw: &str) -> String {
    raw.to_lowercase()
        .split(' ')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical form a title is stored with.
pub fn normalize_title(raw: &str) -> String {
    normalize_title_query(raw.trim())
}

/// Album and artist keep the submitter's casing.
pub fn normalize_field(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn contains_website_link(text: &str) -> bool {
    WEBSITE_LINK_REGEX.is_match(text)
}

/// True if the text carries any combining diacritical mark (U+0300..U+036F).
pub fn contains_accents(text: &str) -> bool {
    text.chars().any(|c| ('\u{0300}'..='\u{036F}').contains(&c))
}

pub fn validate_music_fields(
    title: &str,
    album: &str,
    artist: &str,
) -> Result<(), MusicValidationError> {
    for (name, value) in [("title", title), ("album", album), ("artist", artist)] {
        if value.trim().is_empty() {
            return Err(MusicValidationError::EmptyField(name));
        }
        if contains_website_link(value) {
            return Err(MusicValidationError::ContainsLink(name));
        }
        if contains_accents(value) {
            return Err(MusicValidationError::ContainsAccents(name));
        }
    }
    Ok(())
}

/// Path segment used by the details page, `"Blue In Green"` -> `"blue-in-green"`.
pub fn title_to_slug(title: &str) -> String {
    WHITESPACE_RUN_REGEX
        .replace_all(&title.to_lowercase(), "-")
        .into_owned()
}

/// Inverse of [`title_to_slug`] for titles stored in canonical form.
pub fn slug_to_title(slug: &str) -> String {
    slug.replace('-', " ")
        .split(' ')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}
