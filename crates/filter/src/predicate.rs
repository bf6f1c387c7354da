//! Generic shortcut predicates
//!
//! A shortcut stores a list of [`Filter`]s as JSON. Each filter is evaluated
//! on its own and the results are folded left to right by their relation,
//! starting from `true`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use memos_core::Memo;
use memos_core::patterns::{has_image, has_link, has_tag, has_tag_prefix};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What a filter looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterKind {
    Tag,
    Type,
    Text,
    DisplayTime,
    Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Contain,
    NotContain,
    Is,
    IsNot,
    Before,
    After,
}

impl Operator {
    /// Operators that invert the underlying match
    pub fn is_negated(self) -> bool {
        matches!(self, Operator::NotContain | Operator::IsNot)
    }
}

/// How a filter's result joins the ones before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValue {
    pub operator: Operator,
    #[serde(default)]
    pub value: String,
}

/// One atomic predicate from a shortcut payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "type")]
    pub kind: FilterKind,
    pub value: FilterValue,
    #[serde(default)]
    pub relation: Relation,
}

impl Filter {
    pub fn new(kind: FilterKind, operator: Operator, value: impl Into<String>) -> Self {
        Self { kind, value: FilterValue { operator, value: value.into() }, relation: Relation::And }
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = relation;
        self
    }

    /// Whether `memo` passes this filter alone.
    pub fn matches(&self, memo: &Memo) -> bool {
        let FilterValue { operator, value } = &self.value;
        let operator = *operator;
        if value.is_empty() {
            return true;
        }

        match self.kind {
            FilterKind::Tag => apply(operator, has_tag_prefix(&memo.content, value)),
            FilterKind::Type => apply(operator, matches_type(memo, value)),
            FilterKind::Text => match text_matches(&memo.content, value) {
                Some(found) => apply(operator, found),
                None => true,
            },
            FilterKind::DisplayTime => match parse_time(value) {
                Some(ts) if operator == Operator::Before => memo.display_ts < ts,
                Some(ts) => memo.display_ts >= ts,
                None => {
                    tracing::debug!(value = %value, "unparsable display time filter ignored");
                    true
                }
            },
            FilterKind::Visibility => apply(operator, memo.visibility.as_str().eq_ignore_ascii_case(value)),
        }
    }
}

fn apply(operator: Operator, matched: bool) -> bool {
    if operator.is_negated() { !matched } else { matched }
}

fn matches_type(memo: &Memo, value: &str) -> bool {
    match value {
        "NOT_TAGGED" => !has_tag(&memo.content),
        "LINKED" => has_link(&memo.content),
        "IMAGED" => has_image(&memo.content),
        "CONNECTED" => true,
        _ => false,
    }
}

/// Substring match, or a regex match for values starting with `^`.
///
/// `None` when the expression does not compile.
fn text_matches(content: &str, value: &str) -> Option<bool> {
    match value.strip_prefix('^') {
        Some(pattern) => match Regex::new(pattern) {
            Ok(re) => Some(re.is_match(content)),
            Err(e) => {
                tracing::debug!(pattern = %pattern, error = %e, "invalid text filter expression ignored");
                None
            }
        },
        None => Some(content.to_lowercase().contains(&value.to_lowercase())),
    }
}

/// Parse a filter time value to Unix milliseconds (UTC).
pub fn parse_time(value: &str) -> Option<i64> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc().timestamp_millis());
    }

    value.parse::<i64>().ok()
}

/// Fold `filters` over `memo` by relation, starting from `true`.
pub fn matches_filters(memo: &Memo, filters: &[Filter]) -> bool {
    filters.iter().fold(true, |acc, filter| match filter.relation {
        Relation::And => acc && filter.matches(memo),
        Relation::Or => acc || filter.matches(memo),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use memos_core::Visibility;

    fn memo(content: &str) -> Memo {
        Memo::new(1, 1, content, 1_700_000_000_000)
    }

    #[test]
    fn test_empty_value_passes() {
        let filter = Filter::new(FilterKind::Tag, Operator::Contain, "");
        assert!(filter.matches(&memo("nothing")));
    }

    #[test]
    fn test_tag_prefixes() {
        let m = memo("#a/b/c text");
        assert!(Filter::new(FilterKind::Tag, Operator::Contain, "a").matches(&m));
        assert!(Filter::new(FilterKind::Tag, Operator::Contain, "a/b").matches(&m));
        assert!(Filter::new(FilterKind::Tag, Operator::Contain, "a/b/c").matches(&m));
        assert!(!Filter::new(FilterKind::Tag, Operator::Contain, "a/bc").matches(&m));
        assert!(Filter::new(FilterKind::Tag, Operator::NotContain, "a/bc").matches(&m));
        assert!(!Filter::new(FilterKind::Tag, Operator::NotContain, "a").matches(&m));
    }

    #[test]
    fn test_type_filters() {
        let tagged = memo("#x");
        let linked = memo("[site](https://example.com)");
        let imaged = memo("![cat](cat.png)");

        assert!(!Filter::new(FilterKind::Type, Operator::Is, "NOT_TAGGED").matches(&tagged));
        assert!(Filter::new(FilterKind::Type, Operator::IsNot, "NOT_TAGGED").matches(&tagged));
        assert!(Filter::new(FilterKind::Type, Operator::Is, "LINKED").matches(&linked));
        assert!(Filter::new(FilterKind::Type, Operator::Is, "IMAGED").matches(&imaged));
        assert!(Filter::new(FilterKind::Type, Operator::Is, "CONNECTED").matches(&tagged));
        assert!(!Filter::new(FilterKind::Type, Operator::Is, "UNKNOWN").matches(&tagged));
    }

    #[test]
    fn test_text_filters() {
        let m = memo("Buy Milk today");
        assert!(Filter::new(FilterKind::Text, Operator::Contain, "milk").matches(&m));
        assert!(!Filter::new(FilterKind::Text, Operator::NotContain, "MILK").matches(&m));
        assert!(Filter::new(FilterKind::Text, Operator::Contain, "^Buy\\s+M").matches(&m));
        assert!(!Filter::new(FilterKind::Text, Operator::Contain, "^^today").matches(&m));
        assert!(Filter::new(FilterKind::Text, Operator::NotContain, "^(unclosed").matches(&m));
    }

    #[test]
    fn test_display_time_filters() {
        let m = Memo::new(1, 1, "x", parse_time("2024-01-02").unwrap());

        assert!(Filter::new(FilterKind::DisplayTime, Operator::Before, "2024-01-03").matches(&m));
        assert!(!Filter::new(FilterKind::DisplayTime, Operator::Before, "2024-01-02").matches(&m));
        assert!(Filter::new(FilterKind::DisplayTime, Operator::After, "2024-01-02").matches(&m));
        assert!(!Filter::new(FilterKind::DisplayTime, Operator::After, "2024-01-02T00:00:01Z").matches(&m));
        assert!(Filter::new(FilterKind::DisplayTime, Operator::Before, "someday").matches(&m));
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("1970-01-01"), Some(0));
        assert_eq!(parse_time("1970-01-01T00:01"), Some(60_000));
        assert_eq!(parse_time("1970-01-01T00:00:02"), Some(2_000));
        assert_eq!(parse_time("1970-01-01T01:00:00+01:00"), Some(0));
        assert_eq!(parse_time("1500"), Some(1_500));
        assert_eq!(parse_time("nope"), None);
    }

    #[test]
    fn test_visibility_filter() {
        let m = memo("x").with_visibility(Visibility::Public);
        assert!(Filter::new(FilterKind::Visibility, Operator::Is, "PUBLIC").matches(&m));
        assert!(!Filter::new(FilterKind::Visibility, Operator::IsNot, "PUBLIC").matches(&m));
        assert!(!Filter::new(FilterKind::Visibility, Operator::Is, "PRIVATE").matches(&m));
    }

    #[test]
    fn test_fold_starts_true() {
        let m = memo("#work");
        assert!(matches_filters(&m, &[]));

        let hit = Filter::new(FilterKind::Tag, Operator::Contain, "work");
        let miss = Filter::new(FilterKind::Tag, Operator::Contain, "home");

        assert!(!matches_filters(&m, &[hit.clone(), miss.clone()]));
        assert!(matches_filters(&m, &[miss.clone().with_relation(Relation::Or)]));
        assert!(matches_filters(&m, &[hit.clone(), miss.clone().with_relation(Relation::Or)]));
        assert!(matches_filters(&m, &[miss.clone(), hit.with_relation(Relation::Or)]));
        assert!(!matches_filters(&m, &[miss.clone(), miss.with_relation(Relation::Or)]));
    }

    #[test]
    fn test_filter_deserializes() {
        let filter: Filter =
            serde_json::from_str(r#"{"type":"DISPLAY_TIME","value":{"operator":"BEFORE","value":"2024-01-01"}}"#)
                .unwrap();
        assert_eq!(filter.kind, FilterKind::DisplayTime);
        assert_eq!(filter.value.operator, Operator::Before);
        assert_eq!(filter.relation, Relation::And);
    }
}
