//! Paginated memo feed
//!
//! The list view keeps one growing, deduplicated collection of memos and
//! asks a [`MemoSource`] for more whenever the filtered view is shorter than
//! a page. A page shorter than requested means the server has nothing more.

use crate::engine::filter_and_sort;
use crate::filter_spec::FilterSpec;
use async_trait::async_trait;
use memos_core::{DEFAULT_MEMO_LIMIT, Error, FeedConfig, Memo, Result, UserId};

/// Where pages of memos come from
#[async_trait]
pub trait MemoSource: Send + Sync {
    /// Up to `limit` memos starting at `offset`.
    async fn fetch(&self, limit: usize, offset: usize) -> Result<Vec<Memo>>;
}

/// In-memory source serving a fixed list in order
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    memos: Vec<Memo>,
}

impl StaticSource {
    pub fn new(memos: Vec<Memo>) -> Self {
        Self { memos }
    }
}

#[async_trait]
impl MemoSource for StaticSource {
    async fn fetch(&self, limit: usize, offset: usize) -> Result<Vec<Memo>> {
        Ok(self.memos.iter().skip(offset).take(limit).cloned().collect())
    }
}

/// What the list footer should say
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// The source may have more memos
    MoreAvailable,
    /// Everything has been fetched; `empty` when nothing is shown
    Complete { empty: bool },
}

/// Growing memo collection backed by a [`MemoSource`]
#[derive(Debug)]
pub struct MemoFeed<S> {
    source: S,
    page_size: usize,
    memos: Vec<Memo>,
    complete: bool,
}

impl<S: MemoSource> MemoFeed<S> {
    pub fn new(source: S, page_size: usize) -> Self {
        let page_size = if page_size == 0 { DEFAULT_MEMO_LIMIT } else { page_size };
        Self { source, page_size, memos: Vec::new(), complete: false }
    }

    pub fn from_config(source: S, config: &FeedConfig) -> Self {
        Self::new(source, config.page_size)
    }

    pub fn memos(&self) -> &[Memo] {
        &self.memos
    }

    pub fn len(&self) -> usize {
        self.memos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memos.is_empty()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Fetch the next page; returns how many memos were new.
    ///
    /// A failed fetch leaves the feed as it was.
    pub async fn fetch_more(&mut self) -> Result<usize> {
        if self.complete {
            return Ok(0);
        }

        let offset = self.memos.len();
        let page = self.source.fetch(self.page_size, offset).await.map_err(|e| match e {
            Error::Fetch(_) => e,
            other => Error::fetch(other.to_string()),
        })?;

        let received = page.len();
        if received < self.page_size {
            self.complete = true;
        }

        let before = self.memos.len();
        for memo in page {
            self.upsert(memo);
        }
        let added = self.memos.len() - before;

        tracing::debug!(offset, received, added, complete = self.complete, "fetched memo page");
        Ok(added)
    }

    /// Insert `memo`, replacing any memo with the same id in place.
    pub fn upsert(&mut self, memo: Memo) {
        match self.memos.iter_mut().find(|existing| existing.id == memo.id) {
            Some(existing) => *existing = memo,
            None => self.memos.push(memo),
        }
    }

    /// The filtered, ordered list for `spec`.
    pub fn view(&self, spec: &FilterSpec, current_user: UserId) -> Vec<&Memo> {
        filter_and_sort(&self.memos, spec, current_user)
    }

    /// Fetch until the view holds at least one page or the source runs dry.
    ///
    /// Returns the number of pages fetched.
    pub async fn fill(&mut self, spec: &FilterSpec, current_user: UserId) -> Result<usize> {
        let mut pages = 0;

        while !self.complete && self.view(spec, current_user).len() < self.page_size {
            let added = self.fetch_more().await?;
            pages += 1;
            if added == 0 && !self.complete {
                tracing::warn!(offset = self.memos.len(), "full page without new memos, stopping");
                break;
            }
        }

        Ok(pages)
    }

    pub fn status(&self, shown: usize) -> FeedStatus {
        if self.complete { FeedStatus::Complete { empty: shown == 0 } } else { FeedStatus::MoreAvailable }
    }

    /// Drop everything fetched so far.
    pub fn reset(&mut self) {
        self.memos.clear();
        self.complete = false;
    }
}
