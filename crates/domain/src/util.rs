//! Small shared helpers. Grounded on `gateway::runtime::mod::truncate_str`
//! and `runs::truncate_unicode_safe`: both exist because naive byte
//! slicing panics on multi-byte UTF-8 boundaries.

/// Truncate `s` to at most `max_bytes` bytes, backing off to the
/// nearest preceding char boundary so the result is always valid UTF-8.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
