//! Name normalization: exact keys, fuzzy keys, and codename extraction.
//!
//! Pure functions over the raw name string. The noise-word vocabulary and the
//! date/version pattern table are immutable statics compiled once.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest codename accepted by [`extract_codename`].
pub const MIN_CODENAME_LEN: usize = 3;

/// Tokens dropped from fuzzy keys. Also rejected as codenames.
pub static NOISE_WORDS: &[&str] = &[
    // organizational boilerplate
    "project", "projects", "inc", "llc", "ltd", "lp", "llp", "corp", "corporation", "co",
    "company", "group", "holdings", "partners", "hig", "the", "and", "of", "for", "an",
    // generic document types
    "cim", "teaser", "nda", "deck", "presentation", "memo", "report", "summary", "overview",
    "document", "doc", "docs", "file", "files", "copy", "confidential",
    // file extensions
    "pdf", "docx", "xlsx", "xls", "pptx", "ppt", "csv", "txt", "msg",
    // drafts and versions
    "draft", "final", "rev", "revised", "version", "ver", "signed", "executed", "clean",
    "redline", "updated",
];

static NOISE_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| NOISE_WORDS.iter().copied().collect());

static EXTENSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[a-z]{2,5}$").unwrap());

static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

/// Applied in order. The bare-year pattern stays last so it cannot eat the
/// year out of a more specific date before that date is recognized.
static DATE_VERSION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // v2, v1.3.0
        r"\bv\d+(?:\.\d+)*\b".to_string(),
        // rev 3, version-2
        r"\b(?:rev|ver|version)[\s.-]*\d+\b".to_string(),
        // march 2024, jan-24, sept 15, 2023
        format!(r"\b{MONTH}(?:[\s.-]+\d{{1,2}}(?:st|nd|rd|th)?,?)?[\s.,-]*(?:\d{{4}}|'?\d{{2}})\b"),
        // fy24, fy 2025
        r"\bfy[\s.-]*'?(?:\d{4}|\d{2})\b".to_string(),
        // 2024-01-15, 1/15/24, 15.01.2024
        r"\b\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}\b".to_string(),
        // 20240115
        r"\b(?:19|20)\d{2}(?:0[1-9]|1[0-2])(?:0[1-9]|[12]\d|3[01])\b".to_string(),
        // q3 2023, h1-24, spring 2022
        r"\b(?:q[1-4]|h[12]|spring|summer|fall|autumn|winter)[\s.-]*'?(?:\d{4}|\d{2})\b".to_string(),
        // 2023 q3
        r"\b(?:19|20)\d{2}[\s.-]*q[1-4]\b".to_string(),
        // bare year
        r"\b(?:19|20)\d{2}\b".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// "project falcon", "operation-falcon", "code name falcon".
static LEADING_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^a-z0-9])(?:project|operation|codename|code[\s._-]*name)[\s._-]+(\p{L}+)")
        .unwrap()
});

/// "falcon cim", "falcon_teaser": a leading word followed by a deal-document marker.
static TRAILING_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{L}+)[\s._-]+(?:cim|cip|teaser|nda|ioi|loi)(?:[^a-z0-9]|$)").unwrap()
});

pub fn is_noise_word(token: &str) -> bool {
    NOISE_SET.contains(token)
}

/// Key for exact comparison: trimmed, case-folded unless `case_sensitive`.
pub fn to_exact_key(raw: &str, case_sensitive: bool) -> String {
    let trimmed = raw.trim();
    if case_sensitive {
        trimmed.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

/// Aggressively cleaned key for fuzzy comparison.
///
/// Lower-cases, strips a trailing extension, removes dates and version
/// markers, turns every non-alphanumeric run into a single space, and drops
/// noise words and single-character tokens. The cleanup repeats until the key
/// stops changing, so `to_fuzzy_key(&to_fuzzy_key(x)) == to_fuzzy_key(x)`.
pub fn to_fuzzy_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = EXTENSION_RE.replace(&lowered, "");
    // Underscores are word characters to the regex engine; hyphens keep
    // `\b` working and still read as a date delimiter.
    let mut key = clean_fuzzy(&stripped.replace('_', "-"));

    // Dropping a noise word or a bracket can bring the two halves of a date
    // together ("q3 (draft) 24"). Each round only deletes, so this terminates.
    loop {
        let next = clean_fuzzy(&key);
        if next == key {
            return key;
        }
        key = next;
    }
}

fn clean_fuzzy(text: &str) -> String {
    let mut text = text.to_string();
    for pattern in DATE_VERSION_PATTERNS.iter() {
        text = pattern.replace_all(&text, " ").into_owned();
    }

    let spaced = SEPARATOR_RE.replace_all(&text, " ");
    spaced
        .split_whitespace()
        .filter(|t| t.chars().count() > 1 && !is_noise_word(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Where a codename was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodenameSource {
    /// Explicit marker: "project falcon", "operation falcon", "code name falcon".
    Marker,
    /// Word in front of a deal-document type: "falcon cim". Weaker evidence,
    /// since "mutual nda" reads the same way.
    DocumentType,
}

/// Extract a project codename ("Project Falcon" -> "falcon").
///
/// Only the first marker occurrence counts. A captured word that is a noise
/// word or shorter than [`MIN_CODENAME_LEN`] yields `None`.
pub fn extract_codename(raw: &str) -> Option<String> {
    extract_codename_with_source(raw).map(|(word, _)| word)
}

/// [`extract_codename`], also reporting which form produced the codename.
/// The document-type form is only tried when no explicit marker is present.
pub fn extract_codename_with_source(raw: &str) -> Option<(String, CodenameSource)> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let (caps, source) = match LEADING_MARKER_RE.captures(&lowered) {
        Some(caps) => (caps, CodenameSource::Marker),
        None => (TRAILING_MARKER_RE.captures(&lowered)?, CodenameSource::DocumentType),
    };
    let word = caps.get(1)?.as_str();

    if word.chars().count() < MIN_CODENAME_LEN || is_noise_word(word) {
        return None;
    }
    Some((word.to_string(), source))
}
