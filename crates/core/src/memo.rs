//! Memo and shortcut records
//!
//! These mirror the JSON the memos API returns, so they deserialize directly
//! from a fetched page. The engine never mutates them.

use serde::{Deserialize, Serialize};

/// Memo identifier
pub type MemoId = i64;

/// User identifier
pub type UserId = i64;

/// Row lifecycle state of a memo or shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    /// Active row, shown in lists
    #[default]
    Normal,
    /// Archived row, hidden from the main list
    Archived,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

impl RowStatus {
    pub fn is_active(self) -> bool {
        matches!(self, RowStatus::Normal)
    }
}

/// Who may see a memo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Private,
}

impl Visibility {
    pub const VALUES: &[Visibility] = &[Visibility::Public, Visibility::Protected, Visibility::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Protected => "PROTECTED",
            Visibility::Private => "PRIVATE",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PUBLIC" => Ok(Visibility::Public),
            "PROTECTED" => Ok(Visibility::Protected),
            "PRIVATE" => Ok(Visibility::Private),
            _ => Err(crate::Error::parse(format!("invalid visibility: {}", s))),
        }
    }
}

/// A single user-authored note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: MemoId,
    pub creator_id: UserId,
    /// Raw markdown content
    pub content: String,
    /// Display timestamp in Unix milliseconds
    pub display_ts: i64,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub row_status: RowStatus,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl Memo {
    /// Create a normal, private, unpinned memo
    pub fn new(id: MemoId, creator_id: UserId, content: impl Into<String>, display_ts: i64) -> Self {
        Self {
            id,
            creator_id,
            content: content.into(),
            display_ts,
            pinned: false,
            row_status: RowStatus::Normal,
            visibility: Visibility::default(),
            payload: None,
        }
    }

    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_row_status(mut self, row_status: RowStatus) -> Self {
        self.row_status = row_status;
        self
    }
}

/// A saved, named filter
///
/// `payload` is stored verbatim by the shortcut store and only parsed when a
/// memo list is evaluated against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortcut {
    pub id: i64,
    #[serde(default)]
    pub creator_id: UserId,
    #[serde(default)]
    pub title: String,
    pub payload: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub row_status: RowStatus,
}

impl Shortcut {
    pub fn new(id: i64, title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id,
            creator_id: 0,
            title: title.into(),
            payload: payload.into(),
            pinned: false,
            row_status: RowStatus::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_memo_deserializes_api_json() {
        let json = r##"{
            "id": 7,
            "creatorId": 1,
            "content": "#work standup notes",
            "displayTs": 1700000000000,
            "pinned": true,
            "rowStatus": "NORMAL",
            "visibility": "PUBLIC"
        }"##;

        let memo: Memo = serde_json::from_str(json).unwrap();
        assert_eq!(memo.id, 7);
        assert_eq!(memo.creator_id, 1);
        assert_eq!(memo.display_ts, 1_700_000_000_000);
        assert!(memo.pinned);
        assert_eq!(memo.row_status, RowStatus::Normal);
        assert_eq!(memo.visibility, Visibility::Public);
        assert!(memo.payload.is_none());
    }

    #[test]
    fn test_unknown_row_status_is_not_active() {
        let json = r#"{"id":1,"creatorId":1,"content":"x","displayTs":0,"rowStatus":"DELETED"}"#;
        let memo: Memo = serde_json::from_str(json).unwrap();
        assert_eq!(memo.row_status, RowStatus::Unknown);
        assert!(!memo.row_status.is_active());
        assert!(!RowStatus::Archived.is_active());
        assert!(RowStatus::Normal.is_active());
    }

    #[test]
    fn test_memo_serializes_camel_case() {
        let memo = Memo::new(3, 9, "hello", 42).with_pinned(true);
        let value = serde_json::to_value(&memo).unwrap();
        assert_eq!(value["creatorId"], 9);
        assert_eq!(value["displayTs"], 42);
        assert_eq!(value["rowStatus"], "NORMAL");
        assert_eq!(value["visibility"], "PRIVATE");
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn test_visibility_from_str() {
        assert_eq!(Visibility::from_str("public").unwrap(), Visibility::Public);
        assert_eq!(Visibility::from_str("PROTECTED").unwrap(), Visibility::Protected);
        assert_eq!(Visibility::from_str("Private").unwrap(), Visibility::Private);
        assert!(Visibility::from_str("secret").is_err());
    }

    #[test]
    fn test_shortcut_deserializes_with_defaults() {
        let shortcut: Shortcut = serde_json::from_str(r#"{"id":2,"payload":"[]"}"#).unwrap();
        assert_eq!(shortcut.payload, "[]");
        assert_eq!(shortcut.row_status, RowStatus::Normal);
        assert!(shortcut.title.is_empty());
    }
}
