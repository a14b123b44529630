//! Pull the tagged regex out of a free-text model answer.

use itertools::Itertools;
use regex::Regex;
use std::sync::OnceLock;

/// Upper-case variant some answers use as both opener and closer.
pub const ALT_TAG: &str = "##<REGEX>##";

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Single(String),
    NoSolution,
    /// More than one distinct candidate; the answer cannot be trusted.
    Ambiguous(Vec<String>),
}

impl Extraction {
    pub fn into_regex(self) -> Option<String> {
        match self {
            Extraction::Single(r) => Some(r),
            Extraction::NoSolution | Extraction::Ambiguous(_) => None,
        }
    }
}

pub fn strip_code_blocks(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)```python.*?```").unwrap());
    re.replace_all(text, "").into_owned()
}

pub fn closed_tag_matches(text: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)##<Regex>##(.*?)##</Regex>##").unwrap());
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Text between each pair of consecutive `##<REGEX>##` markers.
pub fn open_tag_matches(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split(ALT_TAG).collect();
    if parts.len() < 3 {
        return Vec::new();
    }
    parts[1..parts.len() - 1]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Drop every string that appears more than once.
pub fn unique_only(matches: Vec<String>) -> Vec<String> {
    let counts = matches.iter().cloned().counts();
    matches.into_iter().filter(|m| counts[m] == 1).collect()
}

pub fn extract_candidates(text: &str) -> Vec<String> {
    let text = strip_code_blocks(text);
    let closed = closed_tag_matches(&text);
    if !closed.is_empty() {
        return unique_only(closed);
    }
    unique_only(open_tag_matches(&text))
}

pub fn extract(text: &str) -> Extraction {
    let mut candidates = extract_candidates(text);
    match candidates.len() {
        0 => Extraction::NoSolution,
        1 => Extraction::Single(candidates.remove(0)),
        _ => Extraction::Ambiguous(candidates),
    }
}
