//! Markdown to sanitized HTML
//!
//! pulldown-cmark does the parsing. The emitter below walks its event stream
//! and produces the house-style markup: tag spans and one `<p>` per line in
//! paragraphs, forced-new-tab links, copyable code blocks with hidden diagram
//! sources, and indexed task checkboxes. The result goes through the
//! sanitizer before it leaves this module.

use crate::context::RenderContext;
use crate::diagram::{DiagramDispatcher, DiagramNode};
use crate::html::{SanitizedHtml, escape_html, escaped};
use crate::sanitize::Sanitizer;
use crate::segments::{ends_at_boundary, write_tokenized};
use memos_core::RenderConfig;
use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag};
use std::ops::Range;

const COPY_BUTTON: &str = r#"<button class="text-xs font-mono italic absolute top-0 right-0 px-2 leading-6 border btn-text rounded opacity-0 group-hover:opacity-60">copy</button>"#;

/// Output of one render call
#[derive(Debug, Clone)]
pub struct Rendered {
    pub html: SanitizedHtml,
    /// Number of task items found
    pub task_count: usize,
    /// Diagram blocks to hand to a diagram engine
    pub diagrams: Vec<DiagramNode>,
}

/// Markdown renderer
///
/// Holds configuration only; every call to [`MarkdownRenderer::render`] gets
/// its own [`RenderContext`], so one renderer can be shared across threads.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    config: RenderConfig,
    sanitizer: Sanitizer,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl MarkdownRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let sanitizer = Sanitizer::new().with_allowed_attributes(config.extra_allowed_attributes.iter().cloned());
        Self { config, sanitizer }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `markdown` to sanitized HTML.
    pub fn render(&self, markdown: &str) -> Rendered {
        let mut ctx = RenderContext::new(self.config.todo_ids, markdown);
        let raw = emit_html(markdown, &self.config.diagram_language, &mut ctx);
        let html = self.sanitizer.clean(&raw);
        let task_count = ctx.todo_count();
        let diagrams = ctx.into_diagrams();

        tracing::debug!(
            input_len = markdown.len(),
            output_len = html.as_str().len(),
            task_count,
            diagram_count = diagrams.len(),
            "rendered memo content"
        );

        Rendered { html, task_count, diagrams }
    }

    /// Render and keep only the HTML.
    pub fn render_html(&self, markdown: &str) -> SanitizedHtml {
        self.render(markdown).html
    }

    /// Render, then hand diagram blocks to `dispatcher` without waiting for them.
    pub fn render_and_dispatch(&self, markdown: &str, dispatcher: &DiagramDispatcher) -> SanitizedHtml {
        let rendered = self.render(markdown);
        // Detached; layout lands after the HTML is already in place.
        let _ = dispatcher.dispatch(rendered.diagrams);
        rendered.html
    }
}

/// Render `markdown` with the default configuration.
pub fn render_markdown(markdown: &str) -> SanitizedHtml {
    MarkdownRenderer::default().render_html(markdown)
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Unsanitized house-style HTML for `markdown`.
pub(crate) fn emit_html(markdown: &str, diagram_language: &str, ctx: &mut RenderContext) -> String {
    let mut emitter = HtmlEmitter::new(markdown, diagram_language, ctx);
    for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
        emitter.event(event, range);
    }
    emitter.finish()
}

/// A block whose output is buffered until its end event
enum Block {
    Root,
    Paragraph { lines: Vec<Line> },
    /// `task` holds the checkbox state of a task item
    Item { task: Option<bool> },
    CodeBlock { language: Option<String>, source: String },
    Image { dest: String, title: String },
}

struct Frame {
    block: Block,
    buf: String,
}

impl Frame {
    fn new(block: Block) -> Self {
        Self { block, buf: String::new() }
    }
}

/// A finished paragraph line
struct Line {
    html: String,
    break_after: bool,
}

struct Todo {
    index: usize,
    id: String,
    checked: bool,
}

/// Inline scopes that turn off hashtag/link tokenizing
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    None,
    Link,
    Heading,
    TableHead,
    TableCell,
}

/// What an end event has to undo
enum Open {
    Frame,
    Markup { close: String, scope: Scope },
    Nothing,
}

struct HtmlEmitter<'a, 'c> {
    source: &'a str,
    diagram_language: &'a str,
    ctx: &'c mut RenderContext,
    frames: Vec<Frame>,
    open: Vec<Open>,
    link_depth: usize,
    heading_depth: usize,
    cell_depth: usize,
    in_table_head: bool,
    at_boundary: bool,
    /// Adjacent text events, merged before tokenizing
    pending: String,
}

impl<'a, 'c> HtmlEmitter<'a, 'c> {
    fn new(source: &'a str, diagram_language: &'a str, ctx: &'c mut RenderContext) -> Self {
        Self {
            source,
            diagram_language,
            ctx,
            frames: vec![Frame::new(Block::Root)],
            open: Vec::new(),
            link_depth: 0,
            heading_depth: 0,
            cell_depth: 0,
            in_table_head: false,
            at_boundary: true,
            pending: String::new(),
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        if !matches!(event, Event::Text(_)) {
            self.flush_text();
        }

        match event {
            Event::Start(tag) => {
                let open = self.start(tag);
                self.open.push(open);
            }
            Event::End(_) => self.end(),
            Event::Text(text) => self.pending.push_str(&text),
            Event::Code(code) => {
                if let Some(buf) = self.markup_buf() {
                    buf.push_str("<code>");
                    escape_html(&code, buf);
                    buf.push_str("</code>");
                } else {
                    self.top().buf.push_str(&code);
                }
                self.at_boundary = false;
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                if let Some(buf) = self.markup_buf() {
                    buf.push_str(&html);
                }
                self.at_boundary = ends_at_boundary(&html, false);
            }
            Event::SoftBreak => self.line_break(self.has_trailing_whitespace(&range)),
            Event::HardBreak => self.hard_break(),
            Event::Rule => self.top().buf.push_str("<hr>\n"),
            Event::TaskListMarker(checked) => self.task_marker(checked),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) -> Open {
        match tag {
            Tag::Paragraph => {
                self.frames.push(Frame::new(Block::Paragraph { lines: Vec::new() }));
                self.at_boundary = true;
                Open::Frame
            }
            Tag::Item => {
                self.frames.push(Frame::new(Block::Item { task: None }));
                self.at_boundary = true;
                Open::Frame
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.frames.push(Frame::new(Block::CodeBlock { language, source: String::new() }));
                Open::Frame
            }
            Tag::Image { dest_url, title, .. } => {
                self.frames.push(Frame::new(Block::Image { dest: dest_url.to_string(), title: title.to_string() }));
                Open::Frame
            }
            Tag::Link { link_type, dest_url, title, .. } => {
                let mut markup = String::from(r#"<a class="link" target="_blank" href=""#);
                if link_type == LinkType::Email && !dest_url.starts_with("mailto:") {
                    markup.push_str("mailto:");
                }
                escape_html(&dest_url, &mut markup);
                markup.push('"');
                push_title(&mut markup, &title);
                markup.push('>');
                self.link_depth += 1;
                self.open_markup(&markup, "</a>", Scope::Link)
            }
            Tag::Heading { level, .. } => {
                let n = level as usize;
                self.heading_depth += 1;
                self.open_markup(&format!("<h{}>", n), &format!("</h{}>\n", n), Scope::Heading)
            }
            Tag::BlockQuote(..) => self.open_markup("<blockquote>\n", "</blockquote>\n", Scope::None),
            Tag::List(Some(1)) => self.open_markup("<ol>\n", "</ol>\n", Scope::None),
            Tag::List(Some(start)) => self.open_markup(&format!(r#"<ol start="{}">"#, start), "</ol>\n", Scope::None),
            Tag::List(None) => self.open_markup("<ul>\n", "</ul>\n", Scope::None),
            Tag::Table(_) => self.open_markup("<table>", "</tbody></table>\n", Scope::None),
            Tag::TableHead => {
                self.in_table_head = true;
                self.open_markup("<thead><tr>", "</tr></thead><tbody>", Scope::TableHead)
            }
            Tag::TableRow => self.open_markup("<tr>", "</tr>", Scope::None),
            Tag::TableCell => {
                self.cell_depth += 1;
                if self.in_table_head {
                    self.open_markup("<th>", "</th>", Scope::TableCell)
                } else {
                    self.open_markup("<td>", "</td>", Scope::TableCell)
                }
            }
            Tag::Emphasis => self.open_markup("<em>", "</em>", Scope::None),
            Tag::Strong => self.open_markup("<strong>", "</strong>", Scope::None),
            Tag::Strikethrough => self.open_markup("<del>", "</del>", Scope::None),
            _ => Open::Nothing,
        }
    }

    fn end(&mut self) {
        match self.open.pop() {
            Some(Open::Frame) => self.close_frame(),
            Some(Open::Markup { close, scope }) => {
                if let Some(buf) = self.markup_buf() {
                    buf.push_str(&close);
                }
                match scope {
                    Scope::Link => {
                        self.link_depth = self.link_depth.saturating_sub(1);
                        self.at_boundary = false;
                    }
                    Scope::Heading => self.heading_depth = self.heading_depth.saturating_sub(1),
                    Scope::TableHead => self.in_table_head = false,
                    Scope::TableCell => self.cell_depth = self.cell_depth.saturating_sub(1),
                    Scope::None => {}
                }
            }
            Some(Open::Nothing) | None => {}
        }
    }

    fn open_markup(&mut self, open: &str, close: &str, scope: Scope) -> Open {
        if let Some(buf) = self.markup_buf() {
            buf.push_str(open);
        }
        Open::Markup { close: close.to_string(), scope }
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        self.text(&text);
    }

    fn text(&mut self, text: &str) {
        let tags = self.tags_enabled();
        let links = self.link_depth == 0;
        let at_boundary = self.at_boundary;
        let frame = self.top();

        match &mut frame.block {
            Block::CodeBlock { source, .. } => source.push_str(text),
            Block::Image { .. } => frame.buf.push_str(text),
            _ if links => write_tokenized(text, at_boundary, tags, &mut frame.buf),
            _ => escape_html(text, &mut frame.buf),
        }

        self.at_boundary = ends_at_boundary(text, at_boundary);
    }

    /// Soft break: a new `<p>` line inside paragraphs, a newline elsewhere.
    fn line_break(&mut self, break_after: bool) {
        let frame = self.top();
        match &mut frame.block {
            Block::Paragraph { lines } => {
                let mut html = std::mem::take(&mut frame.buf);
                html.truncate(html.trim_end_matches([' ', '\t']).len());
                lines.push(Line { html, break_after });
            }
            Block::Image { .. } => frame.buf.push(' '),
            Block::CodeBlock { source, .. } => source.push('\n'),
            _ if break_after => frame.buf.push_str("<br>\n"),
            _ => frame.buf.push('\n'),
        }
        self.at_boundary = true;
    }

    fn hard_break(&mut self) {
        self.line_break(true);
    }

    /// Marks the enclosing item as a task. Its index is claimed when the item
    /// closes, so nested tasks are numbered before their parent.
    fn task_marker(&mut self, checked: bool) {
        let Some(position) = self.frames.iter().rposition(|f| matches!(f.block, Block::Item { .. })) else {
            return;
        };

        self.frames[position].block = Block::Item { task: Some(checked) };
        self.at_boundary = true;
    }

    fn close_frame(&mut self) {
        if self.frames.len() <= 1 {
            return;
        }
        let Some(frame) = self.frames.pop() else {
            return;
        };

        let html = match frame.block {
            Block::Root => frame.buf,
            Block::Paragraph { lines } => render_paragraph(lines, frame.buf),
            Block::Item { task } => {
                let todo = task.map(|checked| {
                    let (index, id) = self.ctx.next_todo();
                    Todo { index, id, checked }
                });
                render_item(todo, &frame.buf)
            }
            Block::CodeBlock { language, source } => self.render_code_block(language, &source),
            Block::Image { dest, title } => render_image(&dest, &title, &frame.buf),
        };

        self.top().buf.push_str(&html);
        self.at_boundary = false;
    }

    fn render_code_block(&mut self, language: Option<String>, source: &str) -> String {
        let mut html = String::from(r#"<pre class="group">"#);
        html.push_str(COPY_BUTTON);

        match &language {
            Some(lang) => {
                if lang == self.diagram_language {
                    html.push_str("<span hidden>");
                    escape_html(source, &mut html);
                    html.push_str("</span>");
                    self.ctx.push_diagram(lang, source);
                }
                html.push_str(r#"<code class="language-"#);
                escape_html(lang, &mut html);
                html.push_str(r#"">"#);
            }
            None => html.push_str("<code>"),
        }

        escape_html(source, &mut html);
        html.push_str("</code></pre>\n");
        html
    }

    fn finish(mut self) -> String {
        self.flush_text();
        while self.frames.len() > 1 {
            self.close_frame();
        }
        self.frames.pop().map(|frame| frame.buf).unwrap_or_default()
    }

    fn top(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::new(Block::Root));
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Buffer for element markup; `None` where only raw text belongs (image alt, code).
    fn markup_buf(&mut self) -> Option<&mut String> {
        let frame = self.top();
        match frame.block {
            Block::Image { .. } | Block::CodeBlock { .. } => None,
            _ => Some(&mut frame.buf),
        }
    }

    /// Hashtags only render inside paragraphs; bare URLs are linked anywhere outside a link.
    fn tags_enabled(&self) -> bool {
        self.link_depth == 0
            && self.heading_depth == 0
            && self.cell_depth == 0
            && matches!(self.frames.last().map(|f| &f.block), Some(Block::Paragraph { .. }))
    }

    /// Whether the source line ending at this soft break has trailing whitespace.
    fn has_trailing_whitespace(&self, range: &Range<usize>) -> bool {
        let start = range.start.min(self.source.len());
        let line_end = self.source[start..]
            .find(['\n', '\r'])
            .map(|offset| start + offset)
            .unwrap_or(self.source.len());

        self.source[..line_end].ends_with([' ', '\t'])
    }
}

fn push_title(markup: &mut String, title: &str) {
    if !title.is_empty() {
        markup.push_str(r#" title=""#);
        escape_html(title, markup);
        markup.push('"');
    }
}

fn render_paragraph(mut lines: Vec<Line>, last: String) -> String {
    lines.push(Line { html: last, break_after: false });

    let mut html = String::new();
    for line in lines {
        html.push_str("<p>");
        html.push_str(&line.html);
        html.push_str("</p>");
        if line.break_after {
            html.push_str("<br>");
        }
    }
    html.push('\n');
    html
}

fn render_item(todo: Option<Todo>, content: &str) -> String {
    match todo {
        None => format!(r#"<li class="li-simple">{}</li>"#, content) + "\n",
        Some(Todo { index, id, checked }) => {
            let id = escaped(&id);
            let checked = if checked { " checked" } else { "" };
            format!(
                r#"<li class="flex flex-row"><input type="checkbox" class="todo-block" data-memo-todo-id="{index}" id="{id}"{checked}><label for="{id}">{content}</label></li>"#
            ) + "\n"
        }
    }
}

fn render_image(dest: &str, title: &str, alt: &str) -> String {
    let mut html = String::from(r#"<img src=""#);
    escape_html(dest, &mut html);
    html.push_str(r#"" alt=""#);
    escape_html(alt, &mut html);
    html.push('"');
    push_title(&mut html, title);
    html.push('>');
    html
}
