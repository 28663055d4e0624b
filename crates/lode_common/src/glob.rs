//! Minimal glob matching for rule patterns and preserve lists.
//!
//! Supports `*` (any run of characters within one path segment), `?` (one
//! character within a segment), and `**` (any number of whole segments,
//! including zero). Patterns and paths are compared segment-by-segment on
//! `/` separators; there is no brace expansion or character-class syntax.

/// Returns `true` if `path` matches the glob `pattern`.
///
/// Both are interpreted as `/`-separated relative paths. A pattern without
/// separators (e.g. `*.js`) therefore only matches single-segment paths;
/// rule matching passes bare filenames here.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let pat: Vec<&str> = pattern.split('/').collect();
    let segs: Vec<&str> = path.split('/').collect();
    match_segments(&pat, &segs)
}

fn match_segments(pat: &[&str], segs: &[&str]) -> bool {
    match pat.first() {
        None => segs.is_empty(),
        Some(&"**") => {
            // `**` absorbs zero or more whole segments.
            (0..=segs.len()).any(|skip| match_segments(&pat[1..], &segs[skip..]))
        }
        Some(first) => match segs.first() {
            Some(seg) if match_segment(first, seg) => match_segments(&pat[1..], &segs[1..]),
            _ => false,
        },
    }
}

/// Matches a single segment pattern (`*`, `?`, literals) against a segment.
fn match_segment(pat: &str, seg: &str) -> bool {
    let p: Vec<char> = pat.chars().collect();
    let s: Vec<char> = seg.chars().collect();
    match_chars(&p, &s)
}

fn match_chars(pat: &[char], seg: &[char]) -> bool {
    match pat.first() {
        None => seg.is_empty(),
        Some('*') => (0..=seg.len()).any(|skip| match_chars(&pat[1..], &seg[skip..])),
        Some('?') => !seg.is_empty() && match_chars(&pat[1..], &seg[1..]),
        Some(c) => seg.first() == Some(c) && match_chars(&pat[1..], &seg[1..]),
    }
}
