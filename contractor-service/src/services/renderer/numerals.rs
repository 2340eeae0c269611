//! Content-count wording used in the deliverables prose.

const WORDS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// `1 -> "one (1)"`, `3 -> "one (1) / two (2) / three (3)"`.
///
/// Counts outside 1..=10 fall back to the numeral as written, including
/// counts too large for an `i64`. Missing input or input without a leading
/// integer reads as a single item.
pub fn content_count_text(raw: Option<&str>) -> String {
    let Some(text) = raw.and_then(leading_integer) else {
        return "one (1)".to_string();
    };
    match text.parse::<i64>() {
        Ok(n) if (1..=10).contains(&n) => (1..=n as usize)
            .map(|i| format!("{} ({})", WORDS[i - 1], i))
            .collect::<Vec<_>>()
            .join(" / "),
        Ok(n) => n.to_string(),
        Err(_) => text.to_string(),
    }
}

/// Signed digit prefix of `raw` (`"3 videos"` -> `"3"`), ignoring
/// surrounding space and a leading `+`.
fn leading_integer(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let sign_len = usize::from(trimmed.starts_with('-'));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    (digits > 0).then(|| &trimmed[..sign_len + digits])
}
