//! Activity label normalization.
//!
//! Derives the base term used for taxonomy keying and cache keys from a
//! free-text activity label. The base is never shown to users.

/// Lower-case, trim, and strip trailing `ing` / plural `s` suffixes until a
/// fixpoint is reached. Running the output back through is a no-op, so cache
/// keys built from it are stable.
///
/// Guards: short words are left alone (`ski` stays `ski`), and a double-s
/// ending is not a plural (`glass` stays `glass`).
pub fn normalize_base(raw: &str) -> String {
    let mut base = raw.trim().to_lowercase();
    while let Some(stripped) = strip_suffix_once(&base) {
        base = stripped;
    }
    base
}

fn strip_suffix_once(s: &str) -> Option<String> {
    if s.len() > 4 && s.ends_with("ing") {
        return Some(s[..s.len() - 3].trim_end().to_string());
    }
    if s.len() > 3 && s.ends_with('s') && !s.ends_with("ss") {
        return Some(s[..s.len() - 1].trim_end().to_string());
    }
    None
}
