//! Filter-and-sort for the memo list view

use crate::filter_spec::{FilterSpec, MemoType};
use crate::predicate::{Filter, matches_filters};
use crate::shortcut::shortcut_filters;
use memos_core::patterns::{has_link, has_plain_link, has_tag, has_tag_prefix};
use memos_core::{Memo, UserId};

/// A [`FilterSpec`] prepared for evaluation against many memos.
///
/// The shortcut payload is parsed and the text query lowercased once.
#[derive(Debug, Clone)]
pub struct MemoQuery<'s> {
    spec: &'s FilterSpec,
    shortcut: Option<Vec<Filter>>,
    text: Option<String>,
}

impl<'s> MemoQuery<'s> {
    pub fn new(spec: &'s FilterSpec) -> Self {
        Self {
            spec,
            shortcut: spec.shortcut.as_ref().map(shortcut_filters),
            text: spec.text().map(str::to_lowercase),
        }
    }

    pub fn is_active(&self) -> bool {
        self.spec.is_active()
    }

    /// Whether `memo` satisfies every predicate in effect.
    pub fn matches(&self, memo: &Memo) -> bool {
        let content = memo.content.as_str();

        if let Some(filters) = &self.shortcut
            && !matches_filters(memo, filters)
        {
            return false;
        }

        if let Some(tag) = self.spec.tag()
            && !has_tag_prefix(content, tag)
        {
            return false;
        }

        if let Some(duration) = self.spec.duration()
            && !duration.contains(memo.display_ts)
        {
            return false;
        }

        match self.spec.memo_type {
            Some(MemoType::NotTagged) if has_tag(content) => return false,
            Some(MemoType::Linked) if !(has_link(content) && has_plain_link(content)) => return false,
            _ => {}
        }

        if let Some(text) = &self.text
            && !content.to_lowercase().contains(text.as_str())
        {
            return false;
        }

        if let Some(visibility) = self.spec.visibility
            && memo.visibility != visibility
        {
            return false;
        }

        true
    }
}

/// The memos `current_user` sees for `spec`, in display order.
///
/// Pinned memos come first; each group is newest first with ties kept in
/// input order. Memos that are not in the normal row state are dropped.
pub fn filter_and_sort<'a>(memos: &'a [Memo], spec: &FilterSpec, current_user: UserId) -> Vec<&'a Memo> {
    let query = MemoQuery::new(spec);
    let active = query.is_active();

    let (mut pinned, mut unpinned): (Vec<&Memo>, Vec<&Memo>) = memos
        .iter()
        .filter(|memo| !active || query.matches(memo))
        .filter(|memo| memo.creator_id == current_user)
        .partition(|memo| memo.pinned);

    pinned.sort_by(|a, b| b.display_ts.cmp(&a.display_ts));
    unpinned.sort_by(|a, b| b.display_ts.cmp(&a.display_ts));

    let shown: Vec<&Memo> =
        pinned.into_iter().chain(unpinned).filter(|memo| memo.row_status.is_active()).collect();

    tracing::debug!(total = memos.len(), shown = shown.len(), filtered = active, "memo list evaluated");
    shown
}
