//! Markdown rendering for memo content
//!
//! Turns raw memo markdown into [`SanitizedHtml`]: hashtags become tag spans,
//! links open in a new tab, code blocks get a copy button, checklists become
//! indexed checkboxes and diagram blocks are collected for an external
//! [`DiagramEngine`].

pub mod context;
pub mod diagram;
pub mod html;
pub mod renderer;
pub mod sanitize;
pub mod segments;

pub use context::RenderContext;
pub use diagram::{DiagramDispatcher, DiagramEngine, DiagramError, DiagramNode, NoopEngine};
pub use html::SanitizedHtml;
pub use renderer::{MarkdownRenderer, Rendered, render_markdown};
pub use sanitize::Sanitizer;
pub use segments::{Segment, tokenize, tokenize_links};
