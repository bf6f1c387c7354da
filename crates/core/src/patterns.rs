//! Lexical patterns shared by the renderer and the filter engine
//!
//! The renderer uses these to turn hashtags and bare URLs into markup, the
//! filter engine uses the same definitions to classify memo content, so a tag
//! that renders as a tag is also a tag a query can match.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// A tag occurrence anywhere in content: `#` followed by non-space, non-`#` characters.
pub static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([^\s#]+)").expect("valid tag pattern"));

/// A markdown-style link `[text](href)`.
pub static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)]\(([^)]+)\)").expect("valid link pattern"));

/// A bare URL.
pub static PLAIN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"((?:https?|chrome|edge)://[^ ]+)").expect("valid plain link pattern"));

/// A markdown image `![alt](src)`.
pub static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[.*?\]\((.+?)\)").expect("valid image pattern"));

/// Characters allowed in a rendered hashtag after the leading `#`.
pub fn is_hashtag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// All tags in `content`, without the leading `#` and trimmed.
pub fn extract_tags(content: &str) -> Vec<&str> {
    TAG.captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .collect()
}

/// Every matchable prefix of every tag in `content`.
///
/// A tag `a/b/c` registers `a`, `a/b` and `a/b/c`.
pub fn tag_prefixes(content: &str) -> BTreeSet<String> {
    let mut prefixes = BTreeSet::new();

    for tag in extract_tags(content) {
        let mut prefix = String::with_capacity(tag.len());
        for (i, part) in tag.split('/').enumerate() {
            if i > 0 {
                prefix.push('/');
            }
            prefix.push_str(part);
            prefixes.insert(prefix.clone());
        }
    }

    prefixes
}

/// Whether `query` names a tag (or a parent of a tag) in `content`.
pub fn has_tag_prefix(content: &str, query: &str) -> bool {
    tag_prefixes(content).contains(query)
}

pub fn has_tag(content: &str) -> bool {
    TAG.is_match(content)
}

pub fn has_link(content: &str) -> bool {
    LINK.is_match(content)
}

pub fn has_plain_link(content: &str) -> bool {
    PLAIN_LINK.is_match(content)
}

pub fn has_image(content: &str) -> bool {
    IMAGE.is_match(content)
}
