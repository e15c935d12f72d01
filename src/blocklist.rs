//! Domain and keyword denylist applied to every candidate before it is accepted.

use tracing::debug;

/// Configured denylist. Keywords are stored lower-cased; empty entries are
/// dropped at construction so they can never match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    domains: Vec<String>,
    keywords: Vec<String>,
}

impl Blocklist {
    pub fn new<D, K>(domains: D, keywords: K) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        Blocklist {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Build from comma-separated lists, e.g. `"spam.com,ads.net"`.
    pub fn from_csv(domains: &str, keywords: &str) -> Self {
        Self::new(domains.split(','), keywords.split(','))
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.keywords.is_empty()
    }

    /// True when the URL contains a blocked domain (case-sensitive) or the
    /// text contains a blocked keyword (case-insensitive).
    pub fn is_blocked(&self, text: &str, url: &str) -> bool {
        if let Some(domain) = self.domains.iter().find(|d| url.contains(d.as_str())) {
            debug!(domain = %domain, url = %url, "Blocked by domain");
            return true;
        }
        let text_lower = text.to_lowercase();
        if let Some(keyword) = self
            .keywords
            .iter()
            .find(|k| text_lower.contains(k.as_str()))
        {
            debug!(keyword = %keyword, "Blocked by keyword");
            return true;
        }
        false
    }
}
