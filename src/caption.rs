//! Caption construction with the 280-character budget of the strictest platform.

use serde::Serialize;

use crate::content::{ContentItem, ContentKind};

pub const MAX_CAPTION_CHARS: usize = 280;
/// Characters reserved for a link, whatever its real length (platforms shorten links).
pub const URL_BUDGET: usize = 25;
pub const HASHTAGS: &str = "#Longevity #Health #Wellness #Biohacking";
pub const ELLIPSIS: char = '…';

const NEWS_MARKER: &str = "📰";
const SOCIAL_MARKER: &str = "🔥";

/// A finished caption: body plus optional trailing URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    body: String,
    url: Option<String>,
    text: String,
}

impl Caption {
    /// Full caption text as posted.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Length as counted against the budget: the URL and its separator
    /// always weigh [`URL_BUDGET`].
    pub fn counted_len(&self) -> usize {
        let body = self.body.chars().count();
        match &self.url {
            Some(_) => body + URL_BUDGET,
            None => body,
        }
    }
}

impl std::fmt::Display for Caption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Build the caption for an item: marker, title, optional source, hashtags, link.
pub fn build_caption(item: &ContentItem) -> Caption {
    let base = match item.kind {
        ContentKind::News => {
            let mut base = format!("{NEWS_MARKER} {}", item.title);
            if let Some(name) = item.source_name.as_deref().filter(|n| !n.is_empty()) {
                base.push_str(" — ");
                base.push_str(name);
            }
            base
        }
        ContentKind::SocialPost => format!("{SOCIAL_MARKER} {}", item.title),
    };
    trim_caption(&format!("{base}\n{HASHTAGS}"), &item.source_url)
}

/// Fit `text` into the budget left after reserving room for `url`.
///
/// A body that fits is kept intact; otherwise it is cut to one character
/// under the budget, right-trimmed and terminated with a single ellipsis.
pub fn trim_caption(text: &str, url: &str) -> Caption {
    let url = url.trim();
    let url_budget = if url.is_empty() { 0 } else { URL_BUDGET };
    let body_budget = MAX_CAPTION_CHARS - url_budget;

    let text = text.trim();
    let body = if text.chars().count() > body_budget {
        let cut: String = text.chars().take(body_budget - 1).collect();
        let mut cut = cut.trim_end().to_string();
        cut.push(ELLIPSIS);
        cut
    } else {
        text.to_string()
    };

    let text = format!("{body} {url}").trim().to_string();
    Caption {
        body,
        url: (!url.is_empty()).then(|| url.to_string()),
        text,
    }
}
