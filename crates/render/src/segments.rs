//! Paragraph text tokenizer
//!
//! Inline text is split into typed segments first and turned into HTML in a
//! separate pass, so a tag inside a URL (or a URL inside a tag) can never be
//! expanded twice.

use crate::html::escape_html;
use memos_core::patterns::{PLAIN_LINK, is_hashtag_char};

/// A typed run of inline text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain text, emitted escaped
    Text(&'a str),
    /// A hashtag including its leading `#`
    Tag(&'a str),
    /// A bare URL
    Link(&'a str),
}

impl Segment<'_> {
    /// Append the HTML for this segment to `out`.
    pub fn write_html(&self, out: &mut String) {
        match self {
            Segment::Text(text) => escape_html(text, out),
            Segment::Tag(tag) => {
                out.push_str(r#"<span class="tag-span">"#);
                escape_html(tag, out);
                out.push_str("</span>");
            }
            Segment::Link(url) => {
                out.push_str(r#"<a class="link" target="_blank" href=""#);
                escape_html(url, out);
                out.push_str(r#"">"#);
                escape_html(url, out);
                out.push_str("</a>");
            }
        }
    }
}

/// Split `text` into segments.
///
/// `at_boundary` tells whether the character before `text` was a line start
/// or whitespace; a hashtag is only recognized at such a boundary.
pub fn tokenize(text: &str, at_boundary: bool) -> Vec<Segment<'_>> {
    split(text, at_boundary, true)
}

/// Split `text` into plain text and bare URLs only.
pub fn tokenize_links(text: &str) -> Vec<Segment<'_>> {
    split(text, false, false)
}

fn split(text: &str, at_boundary: bool, tags: bool) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut boundary = at_boundary;

    for found in PLAIN_LINK.find_iter(text) {
        let link = trim_link(found.as_str());
        push_text(&text[cursor..found.start()], boundary, tags, &mut segments);
        segments.push(Segment::Link(link));
        cursor = found.start() + link.len();
        boundary = false;
    }

    push_text(&text[cursor..], boundary, tags, &mut segments);
    segments
}

fn push_text<'a>(chunk: &'a str, at_boundary: bool, tags: bool, segments: &mut Vec<Segment<'a>>) {
    if tags {
        tokenize_tags(chunk, at_boundary, segments);
    } else if !chunk.is_empty() {
        segments.push(Segment::Text(chunk));
    }
}

/// Drop trailing punctuation and unbalanced closing parens from a bare URL.
fn trim_link(url: &str) -> &str {
    let mut link = url;

    while let Some(last) = link.chars().last() {
        let unbalanced_paren = last == ')' && link.matches(')').count() > link.matches('(').count();
        if matches!(last, '.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'' | '*' | '_' | '~') || unbalanced_paren {
            link = &link[..link.len() - last.len_utf8()];
        } else {
            break;
        }
    }

    link
}

fn tokenize_tags<'a>(chunk: &'a str, at_boundary: bool, segments: &mut Vec<Segment<'a>>) {
    let mut text_start = 0;
    let mut prev_is_boundary = at_boundary;
    let mut chars = chunk.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '#' && prev_is_boundary {
            let body = &chunk[i + 1..];
            let tag_len = body.find(|ch: char| !is_hashtag_char(ch)).unwrap_or(body.len());

            if tag_len > 0 {
                let tag_end = i + 1 + tag_len;
                if text_start < i {
                    segments.push(Segment::Text(&chunk[text_start..i]));
                }
                segments.push(Segment::Tag(&chunk[i..tag_end]));
                text_start = tag_end;

                while chars.next_if(|&(j, _)| j < tag_end).is_some() {}
                prev_is_boundary = false;
                continue;
            }
        }

        prev_is_boundary = c.is_whitespace();
    }

    if text_start < chunk.len() {
        segments.push(Segment::Text(&chunk[text_start..]));
    }
}

/// Whether text ending like `text` leaves the next character at a tag boundary.
pub fn ends_at_boundary(text: &str, default: bool) -> bool {
    text.chars().last().map(char::is_whitespace).unwrap_or(default)
}

/// Render `text` through the tokenizer straight into `out`.
///
/// With `tags` off only bare URLs are picked out.
pub fn write_tokenized(text: &str, at_boundary: bool, tags: bool, out: &mut String) {
    for segment in split(text, at_boundary, tags) {
        segment.write_html(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(tokenize("just words", true), vec![Segment::Text("just words")]);
        assert!(tokenize("", true).is_empty());
    }

    #[test]
    fn test_tag_at_start_and_after_space() {
        assert_eq!(
            tokenize("#work and #home", true),
            vec![Segment::Tag("#work"), Segment::Text(" and "), Segment::Tag("#home")]
        );
    }

    #[test]
    fn test_tag_requires_boundary() {
        assert_eq!(tokenize("issue#42", true), vec![Segment::Text("issue#42")]);
        assert_eq!(tokenize("#42", false), vec![Segment::Text("#42")]);
    }

    #[test]
    fn test_tag_stops_at_non_word_character() {
        assert_eq!(
            tokenize("#a/b/c text", true),
            vec![Segment::Tag("#a"), Segment::Text("/b/c text")]
        );
        assert_eq!(tokenize("#rust-lang!", true), vec![Segment::Tag("#rust-lang"), Segment::Text("!")]);
    }

    #[test]
    fn test_nested_hash_is_not_expanded_twice() {
        assert_eq!(tokenize("#a#b", true), vec![Segment::Tag("#a"), Segment::Text("#b")]);
        assert_eq!(tokenize("## x", true), vec![Segment::Text("## x")]);
    }

    #[test]
    fn test_bare_link() {
        assert_eq!(
            tokenize("see https://example.com/#frag now", true),
            vec![Segment::Text("see "), Segment::Link("https://example.com/#frag"), Segment::Text(" now")]
        );
    }

    #[test]
    fn test_tag_right_after_link_is_text() {
        assert_eq!(
            tokenize("https://a.io #ok", true),
            vec![Segment::Link("https://a.io"), Segment::Text(" "), Segment::Tag("#ok")]
        );
    }

    #[test]
    fn test_write_html() {
        let mut out = String::new();
        write_tokenized("#todo <b> https://x.io?a=1&b=2", true, true, &mut out);
        assert_eq!(
            out,
            r#"<span class="tag-span">#todo</span> &lt;b&gt; <a class="link" target="_blank" href="https://x.io?a=1&amp;b=2">https://x.io?a=1&amp;b=2</a>"#
        );
    }

    #[test]
    fn test_link_drops_trailing_punctuation() {
        assert_eq!(
            tokenize("see (https://x.io). next", true),
            vec![Segment::Text("see ("), Segment::Link("https://x.io"), Segment::Text("). next")]
        );
        assert_eq!(
            tokenize("visit https://x.io, then", true),
            vec![Segment::Text("visit "), Segment::Link("https://x.io"), Segment::Text(", then")]
        );
        assert_eq!(tokenize("https://x.io?!", true), vec![Segment::Link("https://x.io"), Segment::Text("?!")]);
    }

    #[test]
    fn test_link_keeps_balanced_parens() {
        assert_eq!(
            tokenize("https://en.wikipedia.org/wiki/Rust_(language)", true),
            vec![Segment::Link("https://en.wikipedia.org/wiki/Rust_(language)")]
        );
        assert_eq!(
            tokenize("https://x.io/a(b))", true),
            vec![Segment::Link("https://x.io/a(b)"), Segment::Text(")")]
        );
    }

    #[test]
    fn test_tag_after_trimmed_link() {
        assert_eq!(
            tokenize("https://x.io, #next", true),
            vec![Segment::Link("https://x.io"), Segment::Text(", "), Segment::Tag("#next")]
        );
    }

    #[test]
    fn test_links_only_mode() {
        assert_eq!(
            tokenize_links("#title https://x.io."),
            vec![Segment::Text("#title "), Segment::Link("https://x.io"), Segment::Text(".")]
        );
        assert_eq!(tokenize_links(""), Vec::<Segment>::new());
    }

    #[test]
    fn test_ends_at_boundary() {
        assert!(ends_at_boundary("word ", false));
        assert!(!ends_at_boundary("word", true));
        assert!(ends_at_boundary("", true));
        assert!(!ends_at_boundary("", false));
    }
}
