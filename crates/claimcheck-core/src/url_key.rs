//! URL dedup keys.
//!
//! The key is only used for comparison. Stored URLs stay verbatim.

use std::collections::HashSet;
use url::Url;

use crate::model::SourceRef;

/// Dedup key for a URL: trimmed, scheme and host lower-cased, trailing slash stripped.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let key = match Url::parse(trimmed) {
        // The parser lower-cases scheme and host and leaves path case alone.
        Ok(parsed) if parsed.has_host() => parsed.to_string(),
        _ => lowercase_host_prefix(trimmed),
    };
    key.trim_end_matches('/').to_string()
}

/// Scheme-less input such as `www.Example.com/Path`.
fn lowercase_host_prefix(raw: &str) -> String {
    match raw.split_once('/') {
        Some((host, rest)) => format!("{}/{}", host.to_ascii_lowercase(), rest),
        None => raw.to_ascii_lowercase(),
    }
}

/// First-seen-wins filter over URL dedup keys.
#[derive(Debug, Default)]
pub struct UrlDeduper {
    seen: HashSet<String>,
}

impl UrlDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the URL has not been seen before; records it either way.
    pub fn admit(&mut self, url: &str) -> bool {
        self.seen.insert(normalize_url(url))
    }
}

/// Drop later entries whose URL shares a dedup key with an earlier one.
pub fn dedup_sources<I>(sources: I) -> Vec<SourceRef>
where
    I: IntoIterator<Item = SourceRef>,
{
    let mut deduper = UrlDeduper::new();
    sources
        .into_iter()
        .filter(|source| deduper.admit(&source.url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(
            normalize_url("https://x.com/a"),
            normalize_url("https://x.com/a/")
        );
    }

    #[test]
    fn scheme_and_host_case_is_ignored_but_path_case_is_kept() {
        assert_eq!(
            normalize_url("  HTTPS://Reuters.COM/World/x/ "),
            "https://reuters.com/World/x"
        );
        assert_ne!(
            normalize_url("https://x.com/Path"),
            normalize_url("https://x.com/path")
        );
    }

    #[test]
    fn scheme_less_host_is_lowercased() {
        assert_eq!(normalize_url("WWW.Example.com/A/"), "www.example.com/A");
    }

    #[test]
    fn dedup_keeps_first_label_and_order() {
        let sources = vec![
            SourceRef::new("Reuters", "https://reuters.com/x"),
            SourceRef::new("AP", "https://apnews.com/y"),
            SourceRef::new("Reuters mirror", "https://Reuters.com/x/"),
        ];
        let deduped = dedup_sources(sources);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].label, "Reuters");
        assert_eq!(deduped[0].url, "https://reuters.com/x");
        assert_eq!(deduped[1].label, "AP");
    }
}
