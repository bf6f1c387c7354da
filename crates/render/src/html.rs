//! HTML escaping and the pre-sanitized HTML value type

use std::fmt;

/// HTML that has been through the sanitizer.
///
/// Only [`crate::Sanitizer`] can construct one, so anything holding a
/// `SanitizedHtml` is safe to inject into a document as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    pub(crate) fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SanitizedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Append `text` to `out`, escaping the characters significant in HTML text and attribute values.
pub fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Escaped copy of `text`.
pub fn escaped(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html(text, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escaped(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escaped("plain"), "plain");
    }

    #[test]
    fn test_sanitized_html_accessors() {
        let html = SanitizedHtml::new("<p>hi</p>".to_string());
        assert_eq!(html.as_str(), "<p>hi</p>");
        assert_eq!(html.to_string(), "<p>hi</p>");
        assert!(!html.is_empty());
        assert_eq!(html.into_inner(), "<p>hi</p>");
    }
}
