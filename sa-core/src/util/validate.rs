use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SLUG_REGEX: Regex = Regex::new(r"^[-a-zA-Z0-9_]{1,128}$").unwrap();
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]{1,30}$").unwrap();
}

/// Slugs and submission set names become part of URL paths.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}
