//! Text helpers: URL discovery in free text, soft length limits.

const URL_PREFIXES: [&str; 3] = ["https://", "http://", "www."];

/// URLs found in free text, first-seen order, without duplicates.
/// Bare `www.` hosts get an `https://` scheme.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        let Some(candidate) = url_in_token(token) else {
            continue;
        };
        let url = if candidate.to_ascii_lowercase().starts_with("www.") {
            format!("https://{}", candidate)
        } else {
            candidate.to_string()
        };
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

fn url_in_token(token: &str) -> Option<&str> {
    let lower = token.to_ascii_lowercase();
    let (start, prefix) = URL_PREFIXES
        .iter()
        .filter_map(|prefix| lower.find(prefix).map(|i| (i, *prefix)))
        .min_by_key(|(i, _)| *i)?;
    let rest = &token[start..];
    let end = rest
        .char_indices()
        .find(|(_, c)| !is_url_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let url = rest[..end].trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'', ']']);
    if url.len() <= prefix.len() {
        None
    } else {
        Some(url)
    }
}

fn is_url_char(c: char) -> bool {
    c.is_alphanumeric() || "_-.~:/?#[]@!$&'()*+,;=%".contains(c)
}

/// Join non-blank sentences and cut the result to `limit` characters with `...`.
pub fn join_sentences<I, S>(sentences: I, limit: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = sentences
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    truncate_chars(&joined, limit)
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit || limit < 4 {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit - 3).collect();
    format!("{}...", kept.trim_end())
}

/// Confidence rounded to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
