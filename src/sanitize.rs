//! Markup stripping applied to every string value before it is persisted.

use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> Result<&'static Regex, regex::Error> {
    static TAG: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"</?[^>]+(>|$)")).as_ref().map_err(Clone::clone)
}

/// Remove anything that looks like an opening or closing tag, including an unterminated one at the end.
pub fn strip_markup(s: &str) -> Result<String, regex::Error> {
    Ok(tag_pattern()?.replace_all(s, "").into_owned())
}
