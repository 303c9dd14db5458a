//! Display-name numbering for uploaded reports.
//!
//! Reports sharing a base name and extension form a numbering family:
//! `scan.pdf`, `scan(1).pdf`, `scan(2).pdf`, ... A new upload takes the
//! smallest unused position rather than one past the maximum, so deleted
//! numbers are handed out again before the sequence grows.

/// Position of `display_name` within the family of `base` + `ext`.
///
/// Returns 0 for the bare name, N for a `base(N)ext` member, and -1 for
/// names that merely resemble the family (`scan_old.pdf` next to `scan.pdf`).
/// A parenthesized zero also yields -1: the bare name is the only spelling of
/// position zero, so `base(0)ext` is never recognized as a member.
pub fn sequence_number(display_name: &str, base: &str, ext: &str) -> i64 {
    let rest = display_name.strip_suffix(ext).unwrap_or(display_name);
    let rest = rest.strip_prefix(base).unwrap_or(rest);

    if rest.is_empty() {
        return 0;
    }

    let inner = match rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => inner,
        None => return -1,
    };

    match inner.parse::<i64>() {
        Ok(0) | Err(_) => -1,
        Ok(number) => number,
    }
}

/// Smallest-unused-position name for a new member of the family.
///
/// `existing_display_names` is the storage pre-filter (every display name
/// containing `base` as a substring); non-members are dropped here via the
/// -1 sentinel. Input order does not matter.
pub fn next_available_name(base: &str, ext: &str, existing_display_names: &[String]) -> String {
    let mut numbers: Vec<i64> = existing_display_names
        .iter()
        .map(|name| sequence_number(name, base, ext))
        .filter(|&number| number >= 0)
        .collect();
    numbers.sort_unstable();

    let mut candidate = format!("{}{}", base, ext);
    for (index, number) in numbers.iter().enumerate() {
        let index = index as i64;
        if *number != index {
            // First gap wins; position zero renders as the bare name
            return if index == 0 {
                format!("{}{}", base, ext)
            } else {
                format!("{}({}){}", base, index, ext)
            };
        }
        candidate = format!("{}({}){}", base, index + 1, ext);
    }
    candidate
}

/// Last-dot split; the extension keeps its leading dot, and a name without a
/// dot has an empty extension.
pub fn split_file_name(file_name: &str) -> (String, String) {
    match file_name.rsplit_once('.') {
        Some((base, ext)) => (base.to_string(), format!(".{}", ext)),
        None => (file_name.to_string(), String::new()),
    }
}
