//! Diagram engine hand-off
//!
//! The renderer never lays out diagrams itself. It records one
//! [`DiagramNode`] per diagram code block and a [`DiagramDispatcher`] hands
//! them to an external [`DiagramEngine`] on a detached task. Whatever the
//! engine does (including failing or panicking) cannot reach the caller of
//! `render`.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A diagram code block, as handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    /// Position among diagram blocks of one render call
    pub index: usize,
    /// Declared code block language
    pub language: String,
    /// Raw diagram source
    pub source: String,
}

/// Errors reported by a diagram engine
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// The engine could not parse a diagram
    #[error("diagram syntax error in block {index}: {message}")]
    Syntax { index: usize, message: String },

    /// Any other engine failure
    #[error("diagram engine error: {0}")]
    Engine(String),
}

/// External diagram layout engine
#[async_trait]
pub trait DiagramEngine: Send + Sync {
    /// Lay out `nodes` in place.
    async fn run(&self, nodes: Vec<DiagramNode>) -> Result<(), DiagramError>;
}

/// Spawns diagram runs without waiting for them
#[derive(Clone)]
pub struct DiagramDispatcher {
    engine: Arc<dyn DiagramEngine>,
    handle: Handle,
}

impl std::fmt::Debug for DiagramDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramDispatcher").finish_non_exhaustive()
    }
}

impl DiagramDispatcher {
    /// Dispatcher spawning onto `handle`
    pub fn new(engine: Arc<dyn DiagramEngine>, handle: Handle) -> Self {
        Self { engine, handle }
    }

    /// Dispatcher spawning onto the runtime of the calling context, if there is one
    pub fn current(engine: Arc<dyn DiagramEngine>) -> Option<Self> {
        Handle::try_current().ok().map(|handle| Self::new(engine, handle))
    }

    /// Start laying out `nodes` and return immediately.
    ///
    /// Engine errors and panics are logged. The handle may be dropped; it
    /// only exists so callers that care can wait for layout to finish.
    pub fn dispatch(&self, nodes: Vec<DiagramNode>) -> Option<JoinHandle<()>> {
        if nodes.is_empty() {
            return None;
        }

        let engine = Arc::clone(&self.engine);
        let count = nodes.len();
        let run = self.handle.spawn(async move { engine.run(nodes).await });
        let supervisor = self.handle.spawn(async move {
            match run.await {
                Ok(Ok(())) => tracing::debug!(count, "diagrams rendered"),
                Ok(Err(e)) => tracing::error!(error = %e, count, "diagram engine failed"),
                Err(join_error) => {
                    let e = DiagramError::Engine(join_error.to_string());
                    tracing::error!(error = %e, panicked = join_error.is_panic(), count, "diagram engine task aborted");
                }
            }
        });

        Some(supervisor)
    }
}

/// Engine that accepts every diagram and does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEngine;

#[async_trait]
impl DiagramEngine for NoopEngine {
    async fn run(&self, nodes: Vec<DiagramNode>) -> Result<(), DiagramError> {
        tracing::trace!(count = nodes.len(), "noop diagram engine");
        Ok(())
    }
}
