/// Matches `text` against a glob where `*` is any run of bytes and `?` is
/// exactly one byte. Case-sensitive.
pub fn match_pattern(text: &str, pattern: &str) -> bool {
    let text = text.as_bytes();
    let pattern = pattern.as_bytes();
    let (mut t, mut p) = (0, 0);
    // Position of the last `*` seen and the text index it was tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(b'?') => {
                t += 1;
                p += 1;
            }
            Some(&c) if c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    t = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == b'*')
}

/// Matches `text` against a comma-separated list of patterns.
///
/// A pattern prefixed with `!` is negated: if it matches, the whole list
/// fails regardless of any positive match. Otherwise the list matches when
/// at least one positive pattern does.
pub fn match_pattern_list(text: &str, list: &str) -> bool {
    let mut positive = false;
    for pattern in list.split(',') {
        if let Some(negated) = pattern.strip_prefix('!') {
            if match_pattern(text, negated) {
                return false;
            }
        } else if match_pattern(text, pattern) {
            positive = true;
        }
    }
    positive
}
