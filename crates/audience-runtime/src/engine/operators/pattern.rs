//! LIKE pattern matching
//!
//! A pattern containing `%` or `*` is a wildcard pattern anchored at both
//! ends, where either character matches any run of characters. Any other
//! pattern matches as a substring. Matching is case-sensitive.

/// Returns true when `text` matches `pattern`
pub(crate) fn like_matches(text: &str, pattern: &str) -> bool {
    if pattern.contains(['%', '*']) {
        wildcard_matches(text, pattern)
    } else {
        text.contains(pattern)
    }
}

fn is_wildcard(c: char) -> bool {
    c == '%' || c == '*'
}

fn wildcard_matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut t, mut p) = (0, 0);
    // Position of the last wildcard seen and the text index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && is_wildcard(pattern[p]) {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star, tried)) = backtrack {
            p = star + 1;
            t = tried + 1;
            backtrack = Some((star, tried + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| is_wildcard(*c))
}
