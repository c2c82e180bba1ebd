//! Design scheme handling.
//!
//! A redesign run is driven by a four-color scheme, normally produced
//! by an external AI design service from a free-text style
//! description. The network call lives outside this crate; what lives
//! here is the part the core depends on: the reply format, its
//! validation, and the fixed fallback used whenever the advisor is
//! unavailable or returns something unusable. Callers never observe a
//! failure from this module, only possibly-default colors.

use serde::{Deserialize, Serialize};

/// A four-color design scheme, each entry a `#RRGGBB` string.
///
/// The accent color is part of the advisor contract and is surfaced to
/// the user, but it is not painted onto the deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorScheme {
    pub background: String,
    pub title: String,
    pub body: String,
    pub accent: String,
}

/// Advisor reply shape: a JSON object of four hex strings.
#[derive(Deserialize)]
struct SchemeReply {
    background_color: String,
    title_color: String,
    body_color: String,
    accent_color: String,
}

impl ColorScheme {
    /// The scheme used when no usable advisor reply is available.
    pub fn fallback() -> Self {
        Self {
            background: "#0D1B2A".to_string(),
            title: "#E0E1DD".to_string(),
            body: "#FFFFFF".to_string(),
            accent: "#778DA9".to_string(),
        }
    }

    /// Parse an advisor reply, or `None` if it is unusable.
    ///
    /// Replies are often wrapped in Markdown code fences or prose; the
    /// first `{` to the last `}` is taken as the JSON object. All four
    /// `*_color` keys must be present and each value must be a
    /// six-digit `#RRGGBB` string.
    pub fn parse_reply(text: &str) -> Option<Self> {
        let body = strip_code_fences(text);
        let json = json_object_span(body)?;
        let reply: SchemeReply = serde_json::from_str(json).ok()?;
        let scheme = Self {
            background: reply.background_color,
            title: reply.title_color,
            body: reply.body_color,
            accent: reply.accent_color,
        };
        scheme.is_valid().then_some(scheme)
    }

    /// Parse an advisor reply, degrading to [`ColorScheme::fallback`]
    /// on any failure.
    pub fn from_reply(text: &str) -> Self {
        Self::parse_reply(text).unwrap_or_else(Self::fallback)
    }

    fn is_valid(&self) -> bool {
        [&self.background, &self.title, &self.body, &self.accent]
            .iter()
            .all(|c| is_rrggbb(c))
    }
}

fn is_rrggbb(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Strip a surrounding Markdown code fence, ` ```json ... ``` ` or
/// plain ` ``` ... ``` `.
fn strip_code_fences(text: &str) -> &str {
    let mut t = text.trim();
    for prefix in ["```json", "```JSON", "```"] {
        if let Some(rest) = t.strip_prefix(prefix) {
            t = rest.trim_start();
            break;
        }
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest.trim_end();
    }
    t
}

/// The widest `{...}` span in the text, matching how advisor replies
/// embed their JSON object in prose.
fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_REPLY: &str = r##"{
        "background_color": "#1A1A2E",
        "title_color": "#E94560",
        "body_color": "#EEEEEE",
        "accent_color": "#0F3460"
    }"##;

    #[test]
    fn test_fallback_values() {
        let scheme = ColorScheme::fallback();
        assert_eq!(scheme.background, "#0D1B2A");
        assert_eq!(scheme.title, "#E0E1DD");
        assert_eq!(scheme.body, "#FFFFFF");
        assert_eq!(scheme.accent, "#778DA9");
    }

    #[test]
    fn test_parse_plain_json() {
        let scheme = ColorScheme::parse_reply(PLAIN_REPLY).unwrap();
        assert_eq!(scheme.background, "#1A1A2E");
        assert_eq!(scheme.accent, "#0F3460");
    }

    #[test]
    fn test_parse_fenced_reply_with_prose() {
        let reply = format!("Here is your palette:\n```json\n{PLAIN_REPLY}\n```\nEnjoy!");
        let scheme = ColorScheme::parse_reply(&reply).unwrap();
        assert_eq!(scheme.title, "#E94560");
    }

    #[test]
    fn test_missing_key_degrades_to_fallback() {
        let reply = r##"{"background_color": "#111111", "title_color": "#222222"}"##;
        assert!(ColorScheme::parse_reply(reply).is_none());
        assert_eq!(ColorScheme::from_reply(reply), ColorScheme::fallback());
    }

    #[test]
    fn test_malformed_hex_degrades_to_fallback() {
        let reply = r##"{
            "background_color": "dark blue",
            "title_color": "#E94560",
            "body_color": "#EEEEEE",
            "accent_color": "#0F3460"
        }"##;
        assert_eq!(ColorScheme::from_reply(reply), ColorScheme::fallback());
    }

    #[test]
    fn test_no_json_at_all() {
        assert!(ColorScheme::parse_reply("sorry, I cannot help with that").is_none());
    }
}
