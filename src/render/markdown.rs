//! Assistant narrative output.
//!
//! The assistant answers in markdown. It is parsed with pulldown-cmark and
//! reduced to a small set of blocks; anything outside that set is shown as
//! literal text or dropped. Raw HTML is never interpreted, link targets and
//! image sources are discarded, and escape sequences are stripped.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::util::strip_ansi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledText {
    pub text: String,
    pub style: SpanStyle,
}

/// Inline runs. A run whose text is `"\n"` is a hard line break.
pub type Inline = Vec<StyledText>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, spans: Inline },
    Paragraph(Inline),
    ListItem { depth: usize, marker: String, spans: Inline },
    CodeBlock(String),
    Rule,
}

/// Parse markdown into the allow-listed block set.
pub fn parse_narrative(input: &str) -> Vec<Block> {
    // Escape sequences can straddle text events, so strip before parsing
    let input = strip_ansi(input);
    let parser = Parser::new_ext(&input, Options::empty());
    let mut reducer = Reducer::default();
    for event in parser {
        reducer.event(event);
    }
    reducer.finish()
}

#[derive(Default)]
struct Reducer {
    blocks: Vec<Block>,
    spans: Inline,
    emphasis: usize,
    strong: usize,
    heading: Option<u8>,
    code_block: Option<String>,
    html_block: bool,
    /// None = bullet list, Some(n) = ordered list at item n
    list_stack: Vec<Option<u64>>,
    item_marker: Option<String>,
}

impl Reducer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush();
                self.heading = Some(level as u8);
            }
            Event::End(TagEnd::Heading(_)) => self.flush(),

            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                // Loose list items wrap their text in paragraphs
                if self.item_marker.is_none() {
                    self.flush();
                }
            }

            Event::Start(Tag::CodeBlock(_)) => {
                self.flush();
                self.code_block = Some(String::new());
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(code) = self.code_block.take() {
                    let code = strip_ansi(code.trim_end_matches('\n'));
                    self.blocks.push(Block::CodeBlock(code));
                }
            }

            Event::Start(Tag::HtmlBlock) => {
                self.flush();
                self.html_block = true;
            }
            Event::End(TagEnd::HtmlBlock) => {
                self.html_block = false;
                self.flush();
            }

            Event::Start(Tag::List(start)) => {
                // A nested list ends the text of the item that contains it
                self.flush();
                self.list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.list_stack.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(Some(counter)) => {
                        let marker = format!("{counter}.");
                        *counter += 1;
                        marker
                    }
                    _ => if depth == 0 { "•" } else { "◦" }.to_string(),
                };
                self.item_marker = Some(marker);
            }
            Event::End(TagEnd::Item) => self.flush(),

            Event::Start(Tag::Emphasis) => self.emphasis += 1,
            Event::End(TagEnd::Emphasis) => self.emphasis = self.emphasis.saturating_sub(1),
            Event::Start(Tag::Strong) => self.strong += 1,
            Event::End(TagEnd::Strong) => self.strong = self.strong.saturating_sub(1),

            Event::Text(text) => {
                if let Some(code) = self.code_block.as_mut() {
                    code.push_str(&text);
                } else {
                    self.push_text(&text, false);
                }
            }
            Event::Code(text) => self.push_text(&text, true),
            Event::Html(html) | Event::InlineHtml(html) => {
                let html = if self.html_block {
                    html.trim_end_matches('\n').to_string()
                } else {
                    html.to_string()
                };
                if self.html_block && !self.spans.is_empty() {
                    self.push_break();
                }
                self.push_text(&html, false);
            }
            Event::SoftBreak => self.push_text(" ", false),
            Event::HardBreak => self.push_break(),
            Event::Rule => {
                self.flush();
                self.blocks.push(Block::Rule);
            }

            // Links keep their text, images their alt text; targets are dropped
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str, code: bool) {
        let text = strip_ansi(text);
        if text.is_empty() {
            return;
        }
        let style = SpanStyle {
            emphasis: self.emphasis > 0,
            strong: self.strong > 0,
            code,
        };
        match self.spans.last_mut() {
            Some(last) if last.style == style && last.text != "\n" => last.text.push_str(&text),
            _ => self.spans.push(StyledText { text, style }),
        }
    }

    fn push_break(&mut self) {
        self.spans.push(StyledText {
            text: "\n".to_string(),
            style: SpanStyle::default(),
        });
    }

    fn flush(&mut self) {
        let marker = self.item_marker.take();
        let heading = self.heading.take();
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);

        let block = if let Some(level) = heading {
            Block::Heading { level, spans }
        } else if let Some(marker) = marker {
            Block::ListItem {
                depth: self.list_stack.len().saturating_sub(1),
                marker,
                spans,
            }
        } else {
            Block::Paragraph(spans)
        };
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

/// Flatten blocks back into plain text lines.
#[allow(dead_code)]
pub fn plain_text(blocks: &[Block]) -> String {
    fn inline(spans: &Inline) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    blocks
        .iter()
        .map(|block| match block {
            Block::Heading { spans, .. } | Block::Paragraph(spans) => inline(spans),
            Block::ListItem {
                depth,
                marker,
                spans,
            } => format!("{}{} {}", "  ".repeat(*depth), marker, inline(spans)),
            Block::CodeBlock(code) => code.clone(),
            Block::Rule => "---".to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
