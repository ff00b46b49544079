use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// `{{` followed by the shortest run up to the first `}}`.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern compiles"));

/// Returns the distinct placeholder names found in `text`.
pub fn extract(text: &str) -> BTreeSet<String> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The literal token for `name`, e.g. `{{First Name}}`.
pub fn token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}
