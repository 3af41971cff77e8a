//! Folder name sanitizing

use regex::Regex;
use std::sync::LazyLock;

/// Characters SharePoint refuses in folder names
static ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[~#%&*{}\[\]\\:<>?/+|$¤£€"\t]"#).unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Placeholder used when a case has no street name
pub const MISSING_STREET_NAME: &str = "Intet vejnavn angivet";

/// Strip illegal characters, collapse whitespace and trim
pub fn sanitize_folder_name(name: &str) -> String {
    let stripped = ILLEGAL_CHARS.replace_all(name, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Leaf folder name for a case: `{street}_{case_number}`, sanitized
///
/// Dots are dropped from the street name only; the case number keeps them.
pub fn case_folder_name(street_name: Option<&str>, case_number: &str) -> String {
    let street = street_name
        .filter(|s| !s.is_empty())
        .unwrap_or(MISSING_STREET_NAME)
        .replace('.', "");
    sanitize_folder_name(&format!("{}_{}", street, case_number))
}
