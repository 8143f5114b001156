// src/validators.rs

use regex::Regex;
use std::sync::OnceLock;

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s<>()\[\]]+").expect("valid url regex"))
}

fn youtube_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://(?:www\.)?(?:youtube\.com|youtu\.be)(?:[/?#]|$)")
            .expect("valid youtube regex")
    })
}

/// Course and lesson descriptions may embed links, but only to YouTube.
/// Every `http(s)://` URL found in the text is checked.
pub fn validate_description_links(text: &str) -> Result<(), String> {
    for link in url_re().find_iter(text) {
        if !youtube_re().is_match(link.as_str()) {
            return Err("links to resources other than youtube are not allowed".to_string());
        }
    }

    Ok(())
}
