use std::fmt;

use crate::error::StepError;

/// The strategy used to resolve a selector to an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectorType {
    #[default]
    Css,
    Text,
}

/// A literal element selector from a scenario definition.
///
/// Resolution is permissive: when several elements match, the first match
/// in document order is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub raw: String,
    pub kind: SelectorType,
}

impl Selector {
    pub fn css(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: SelectorType::Css,
        }
    }

    pub fn text(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: SelectorType::Text,
        }
    }

    /// Parse a selector string, rewriting a Playwright-style
    /// `:has-text("...")` into a text selector.
    pub fn parse(raw: &str) -> Self {
        if let Some(start) = raw.find(":has-text(") {
            let after = &raw[start + ":has-text(".len()..];
            let (quote, rest) = if let Some(stripped) = after.strip_prefix('"') {
                ('"', stripped)
            } else if let Some(stripped) = after.strip_prefix('\'') {
                ('\'', stripped)
            } else {
                return Self::css(raw);
            };
            if let Some(end) = rest.find(quote) {
                return Self::text(&rest[..end]);
            }
        }
        Self::css(raw)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SelectorType::Css => write!(f, "{}", self.raw),
            SelectorType::Text => write!(f, "text={}", self.raw),
        }
    }
}

/// Convert a selector to a JS expression resolving to the element, or
/// null when nothing matches.
pub fn selector_to_js(selector: &Selector) -> Result<String, StepError> {
    let sel_str = serde_json::to_string(&selector.raw)
        .map_err(|e| StepError::Transport(format!("failed to quote selector: {e}")))?;
    Ok(match selector.kind {
        SelectorType::Css => format!("document.querySelector({})", sel_str),
        SelectorType::Text => format!(
            r#"(() => {{
                const target = {};
                const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT, null);
                while (walker.nextNode()) {{
                    if (walker.currentNode.textContent.trim().toLowerCase().includes(target.toLowerCase())) {{
                        return walker.currentNode.parentElement;
                    }}
                }}
                return null;
            }})()"#,
            sel_str
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_has_text_double_quotes() {
        let sel = Selector::parse(r#"button:has-text("Accept all")"#);
        assert_eq!(sel.raw, "Accept all");
        assert_eq!(sel.kind, SelectorType::Text);
    }

    #[test]
    fn test_parse_has_text_single_quotes() {
        let sel = Selector::parse("button:has-text('I agree')");
        assert_eq!(sel.raw, "I agree");
        assert_eq!(sel.kind, SelectorType::Text);
    }

    #[test]
    fn test_parse_plain_css_unchanged() {
        let sel = Selector::parse("input#searchInput");
        assert_eq!(sel.raw, "input#searchInput");
        assert_eq!(sel.kind, SelectorType::Css);
    }

    #[test]
    fn test_parse_unterminated_has_text_stays_css() {
        let sel = Selector::parse(r#"button:has-text("Accept"#);
        assert_eq!(sel.kind, SelectorType::Css);
    }

    #[test]
    fn test_css_selector_js_quotes_the_selector() {
        let js = selector_to_js(&Selector::css(r#"a[title="it's"]"#)).unwrap();
        assert!(js.starts_with("document.querySelector("));
        assert!(js.contains(r#"\""#));
    }

    #[test]
    fn test_text_selector_js_walks_text_nodes() {
        let js = selector_to_js(&Selector::text("Accept all")).unwrap();
        assert!(js.contains("createTreeWalker"));
        assert!(js.contains("Accept all"));
    }

    #[test]
    fn test_display_marks_text_selectors() {
        assert_eq!(Selector::css("#main").to_string(), "#main");
        assert_eq!(Selector::text("Accept").to_string(), "text=Accept");
    }
}
