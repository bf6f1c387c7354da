use crate::diagram::DiagramNode;
use memos_core::TodoIdMode;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Mutable state for exactly one render call.
///
/// Created at the start of [`crate::MarkdownRenderer::render`] and dropped at
/// the end, so two renders never share a task counter.
#[derive(Debug)]
pub struct RenderContext {
    next_todo: usize,
    ids: TodoIds,
    diagrams: Vec<DiagramNode>,
}

/// Checkbox id generator for one render call
#[derive(Debug, Clone)]
enum TodoIds {
    Random,
    Stable { seed: u64 },
}

impl RenderContext {
    pub fn new(mode: TodoIdMode, source: &str) -> Self {
        let ids = match mode {
            TodoIdMode::Random => TodoIds::Random,
            TodoIdMode::Stable => {
                let mut hasher = DefaultHasher::new();
                source.hash(&mut hasher);
                TodoIds::Stable { seed: hasher.finish() }
            }
        };

        Self { next_todo: 0, ids, diagrams: Vec::new() }
    }

    /// Claim the next task index and a checkbox id for it.
    pub fn next_todo(&mut self) -> (usize, String) {
        let index = self.next_todo;
        self.next_todo += 1;

        let id = match &self.ids {
            TodoIds::Random => format!("todo-{}", uuid::Uuid::new_v4().simple()),
            TodoIds::Stable { seed } => format!("todo-{:016x}-{}", seed, index),
        };

        (index, id)
    }

    /// Number of task items seen so far.
    pub fn todo_count(&self) -> usize {
        self.next_todo
    }

    pub fn push_diagram(&mut self, language: &str, source: &str) {
        let index = self.diagrams.len();
        self.diagrams.push(DiagramNode { index, language: language.to_string(), source: source.to_string() });
    }

    pub fn into_diagrams(self) -> Vec<DiagramNode> {
        self.diagrams
    }
}
