//! HTML sanitization
//!
//! Wraps ammonia's default policy and widens it just enough for the markup
//! the renderer itself produces: forced-new-tab links, tag spans, the copy
//! button, hidden diagram sources and task checkboxes.

use crate::html::SanitizedHtml;

/// Attributes allowed on every element
const GENERIC_ATTRIBUTES: &[&str] = &["class", "id", "hidden", "target"];

/// Attribute prefixes allowed on every element
const GENERIC_ATTRIBUTE_PREFIXES: &[&str] = &["data-"];

/// Elements allowed on top of ammonia's defaults
const EXTRA_TAGS: &[&str] = &["input", "button", "label"];

const INPUT_ATTRIBUTES: &[&str] = &["type", "checked", "disabled"];
const LABEL_ATTRIBUTES: &[&str] = &["for"];

/// HTML sanitizer with an extensible attribute allowlist
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    extra_attributes: Vec<String>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow additional attributes on every element.
    ///
    /// Event handler attributes (`on*`) are never added.
    pub fn with_allowed_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for attribute in attributes {
            let attribute = attribute.into().to_lowercase();
            if attribute.starts_with("on") || attribute == "style" {
                tracing::warn!(attribute = %attribute, "refusing to allow attribute through sanitizer");
                continue;
            }
            if !self.extra_attributes.contains(&attribute) {
                self.extra_attributes.push(attribute);
            }
        }
        self
    }

    /// Strip scripts, event handlers and unsafe URLs from `html`.
    pub fn clean(&self, html: &str) -> SanitizedHtml {
        let mut builder = ammonia::Builder::default();
        builder
            .add_tags(EXTRA_TAGS.iter().copied())
            .add_generic_attributes(GENERIC_ATTRIBUTES.iter().copied())
            .add_generic_attributes(self.extra_attributes.iter().map(String::as_str))
            .add_generic_attribute_prefixes(GENERIC_ATTRIBUTE_PREFIXES.iter().copied())
            .add_tag_attributes("input", INPUT_ATTRIBUTES.iter().copied())
            .add_tag_attributes("label", LABEL_ATTRIBUTES.iter().copied());

        SanitizedHtml::new(builder.clean(html).to_string())
    }
}
