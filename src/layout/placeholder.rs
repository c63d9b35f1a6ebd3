//! `{{ key }}` template tokens.

/// Token text for `key`: `{{ key }}`.
pub fn token(key: &str) -> String {
    format!("{{{{ {key} }}}}")
}

/// Replaces every `{{ key }}` in `text` using `lookup`.
///
/// Keys are trimmed before lookup. A key `lookup` does not know is replaced by the
/// bare key text. Unterminated or empty tokens are left as they are.
pub fn substitute<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let inner = &after[..end];
        let key = inner.trim();
        out.push_str(&rest[..start]);
        if key.is_empty() || inner.contains('}') {
            out.push_str(&rest[start..start + 2 + end + 2]);
        } else {
            out.push_str(&lookup(key).unwrap_or_else(|| key.to_string()));
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Keys of every token in `text`, in order.
pub fn keys(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let key = after[..end].trim();
        if !key.is_empty() {
            found.push(key.to_string());
        }
        rest = &after[end + 2..];
    }
    found
}
