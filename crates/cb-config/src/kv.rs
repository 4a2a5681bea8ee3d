use std::collections::BTreeMap;

/// Parses the key=value-with-`#`-comments grammar. Blank lines
/// and lines whose first non-whitespace character is `#` are ignored;
/// everything else must contain an `=`, split on the first occurrence so
/// values may themselves contain `=`.
pub fn parse(text: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once('=') {
            out.insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }
    out
}
