//! The declarative filter a memo list is evaluated against

use memos_core::{Shortcut, Visibility};
use serde::{Deserialize, Serialize};

/// Inclusive display-time window in Unix milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: i64,
    pub to: i64,
}

impl DateRange {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// A range only constrains anything when `from < to`.
    pub fn is_valid(&self) -> bool {
        self.from < self.to
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.from && ts <= self.to
    }
}

/// Content classification a list can be narrowed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoType {
    /// No hashtag anywhere in the content
    NotTagged,
    /// Both a markdown link and a bare URL in the content
    Linked,
}

impl MemoType {
    pub const VALUES: &[MemoType] = &[MemoType::NotTagged, MemoType::Linked];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoType::NotTagged => "NOT_TAGGED",
            MemoType::Linked => "LINKED",
        }
    }
}

impl std::fmt::Display for MemoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MemoType {
    type Err = memos_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "NOT_TAGGED" => Ok(MemoType::NotTagged),
            "LINKED" => Ok(MemoType::Linked),
            _ => Err(memos_core::Error::parse(format!("invalid memo type: {}", s))),
        }
    }
}

/// Everything the list view can be filtered by.
///
/// Every field is optional; an empty `tag` or `text` counts as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub tag: Option<String>,
    pub duration: Option<DateRange>,
    pub memo_type: Option<MemoType>,
    pub text: Option<String>,
    pub shortcut: Option<Shortcut>,
    pub visibility: Option<Visibility>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_duration(mut self, duration: DateRange) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_memo_type(mut self, memo_type: MemoType) -> Self {
        self.memo_type = Some(memo_type);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Tag query, if set and non-empty
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|tag| !tag.is_empty())
    }

    /// Text query, if set and non-empty
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }

    /// Duration, if set and valid
    pub fn duration(&self) -> Option<DateRange> {
        self.duration.filter(DateRange::is_valid)
    }

    /// Whether any predicate is in effect.
    pub fn is_active(&self) -> bool {
        self.tag().is_some()
            || self.duration().is_some()
            || self.memo_type.is_some()
            || self.text().is_some()
            || self.shortcut.is_some()
            || self.visibility.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let range = DateRange::new(100, 200);
        assert!(range.contains(100));
        assert!(range.contains(200));
        assert!(!range.contains(201));
        assert!(!range.contains(99));
    }

    #[test]
    fn test_date_range_validity() {
        assert!(DateRange::new(1, 2).is_valid());
        assert!(!DateRange::new(2, 2).is_valid());
        assert!(!DateRange::new(3, 2).is_valid());
    }

    #[test]
    fn test_empty_spec_is_inactive() {
        assert!(!FilterSpec::new().is_active());
        assert!(!FilterSpec::new().with_tag("").with_text("").is_active());
        assert!(!FilterSpec::new().with_duration(DateRange::new(5, 5)).is_active());
    }

    #[test]
    fn test_any_field_activates() {
        assert!(FilterSpec::new().with_tag("work").is_active());
        assert!(FilterSpec::new().with_text("x").is_active());
        assert!(FilterSpec::new().with_duration(DateRange::new(1, 5)).is_active());
        assert!(FilterSpec::new().with_memo_type(MemoType::Linked).is_active());
        assert!(FilterSpec::new().with_visibility(Visibility::Public).is_active());
        assert!(FilterSpec::new().with_shortcut(Shortcut::new(1, "s", "[]")).is_active());
    }

    #[test]
    fn test_memo_type_from_str() {
        assert_eq!(MemoType::from_str("not-tagged").unwrap(), MemoType::NotTagged);
        assert_eq!(MemoType::from_str("NOT_TAGGED").unwrap(), MemoType::NotTagged);
        assert_eq!(MemoType::from_str("linked").unwrap(), MemoType::Linked);
        assert!(MemoType::from_str("imaged").is_err());

        for memo_type in MemoType::VALUES {
            assert_eq!(MemoType::from_str(memo_type.as_str()).unwrap(), *memo_type);
        }
    }

    #[test]
    fn test_spec_deserializes() {
        let spec: FilterSpec =
            serde_json::from_str(r#"{"tag":"work","duration":{"from":1,"to":9},"memoType":"LINKED"}"#).unwrap();
        assert_eq!(spec.tag(), Some("work"));
        assert_eq!(spec.duration(), Some(DateRange::new(1, 9)));
        assert_eq!(spec.memo_type, Some(MemoType::Linked));
        assert!(spec.text.is_none());
    }
}
