//! Glob-style window title matching.
//!
//! `?` matches exactly one character and `*` any run of characters. The match
//! is anchored at both ends. A literal run that follows a `*` binds to its
//! *last* occurrence in the remaining title, not the first, so `*a*a` does
//! not match `aaa`: the first run already swallows the final `a`. Any `?`
//! directly following a `*` is absorbed by the star without consuming a
//! character. Existing title lists rely on this behaviour, which is why it is
//! kept even though it differs from a backtracking glob.

fn chars_eq(a: char, b: char, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(&b)
    }
}

fn is_wildcard(c: &char) -> bool {
    matches!(*c, '*' | '?')
}

// Start index of the last (possibly overlapping) occurrence of `needle`.
fn rfind(haystack: &[char], needle: &[char], case_sensitive: bool) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(&a, &b)| chars_eq(a, b, case_sensitive))
    })
}

/// Returns true when `title` matches `pattern`.
///
/// Without `case_sensitive` only ASCII letters are folded.
pub fn matches(title: &str, pattern: &str, case_sensitive: bool) -> bool {
    let literal: Vec<char> = title.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let mut li = 0;
    let mut pi = 0;

    while pi < pattern.len() {
        match pattern[pi] {
            '*' => {
                let start = pattern[pi..]
                    .iter()
                    .position(|c| !is_wildcard(c))
                    .map(|n| pi + n);
                let Some(start) = start else {
                    // trailing stars take whatever is left
                    return true;
                };
                let end = pattern[start..]
                    .iter()
                    .position(is_wildcard)
                    .map(|n| start + n);
                let run = &pattern[start..end.unwrap_or(pattern.len())];

                let Some(found) = rfind(&literal[li..], run, case_sensitive) else {
                    return false;
                };
                li += found + run.len();

                match end {
                    Some(end) => pi = end,
                    None => return li == literal.len(),
                }
            }
            '?' => {
                if li >= literal.len() {
                    return false;
                }
                li += 1;
                pi += 1;
            }
            c => {
                if li >= literal.len() || !chars_eq(c, literal[li], case_sensitive) {
                    return false;
                }
                li += 1;
                pi += 1;
            }
        }
    }

    li == literal.len()
}
