//! Client-side memo filtering
//!
//! Evaluates a [`FilterSpec`] (tag, date range, content type, text,
//! visibility and saved shortcut predicates) against an in-memory memo
//! collection and produces the ordered list the memo view shows.

pub mod engine;
pub mod feed;
pub mod filter_spec;
pub mod predicate;
pub mod shortcut;

pub use engine::{MemoQuery, filter_and_sort};
pub use feed::{FeedStatus, MemoFeed, MemoSource, StaticSource};
pub use filter_spec::{DateRange, FilterSpec, MemoType};
pub use predicate::{Filter, FilterKind, FilterValue, Operator, Relation, matches_filters};
pub use shortcut::{parse_filters, shortcut_filters};
