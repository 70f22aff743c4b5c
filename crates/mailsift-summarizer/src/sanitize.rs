//! Input sanitization before anything leaves the process

/// Punctuation kept besides alphanumerics and whitespace
const SAFE_PUNCTUATION: &[char] = &['.', ',', '!', '?', '-', '_'];

/// Strip markup tags and unsafe characters, collapse whitespace, then cap
/// the result at `max_chars` characters.
pub fn sanitize(text: &str, max_chars: usize) -> String {
    let safe: String = strip_tags(text)
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || SAFE_PUNCTUATION.contains(c))
        .collect();
    let collapsed = safe.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

/// Remove `<...>` spans; an unterminated `<` is kept as text
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
