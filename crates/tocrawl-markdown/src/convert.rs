//! HTML to Markdown conversion over a parsed tree.
//!
//! Text is emitted as-is: Markdown punctuation found in the page is not escaped.

use lazy_static::lazy_static;
use regex::Regex;
use tocrawl_scraper::node::Node;
use tocrawl_scraper::{ElementRef, Html};
use tocrawl_tree::NodeRef;

lazy_static! {
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

const SKIPPED: &[&str] = &["script", "style", "noscript", "template", "head"];

const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "nav", "aside", "figure",
    "figcaption", "body", "html", "dl", "dt", "dd", "li", "center", "form",
];

/// Converts a whole parsed document or fragment to Markdown.
pub fn html_to_markdown(html: &Html) -> String {
    let mut writer = Writer::default();
    writer.children(&html.tree.root());
    writer.finish()
}

/// Converts the subtree of `element`, the element itself included.
pub fn element_to_markdown(element: &ElementRef) -> String {
    let mut writer = Writer::default();
    writer.node(element);
    writer.finish()
}

#[derive(Default)]
struct Writer {
    out: String,
    /// Inside a list item, blocks are separated by a single newline.
    tight: bool,
}

impl Writer {
    fn nested(&self) -> Self {
        Writer {
            out: String::new(),
            tight: self.tight,
        }
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                if !self.at_line_start() && !self.out.ends_with(' ') {
                    self.out.push(' ');
                }
            } else {
                self.out.push(c);
            }
        }
    }

    fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn line_break(&mut self) {
        while self.out.ends_with(' ') {
            self.out.pop();
        }
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    fn block_break(&mut self) {
        self.line_break();
        if !self.tight && !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        normalize(&self.out)
    }

    /// Renders the children of `node` with a fresh writer, trimmed.
    fn inline(&self, node: &NodeRef<Node>) -> String {
        let mut writer = self.nested();
        writer.children(node);
        writer.finish()
    }

    fn children(&mut self, node: &NodeRef<Node>) {
        for child in node.children() {
            self.node(&child);
        }
    }

    fn node(&mut self, node: &NodeRef<Node>) {
        let Some(element) = ElementRef::wrap(node.clone()) else {
            if let Some(text) = node.map_value(|v| v.as_text().map(|t| t.to_string())).flatten() {
                self.text(&text);
            } else if node
                .map_value(|v| v.is_document() || v.is_fragment())
                .unwrap_or(false)
            {
                self.children(node);
            }
            return;
        };
        let name = element.name();

        match name.as_str() {
            _ if SKIPPED.contains(&name.as_str()) => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(name.as_bytes()[1] - b'0');
                let content = self.inline(node).replace('\n', " ");
                self.block_break();
                if !content.is_empty() {
                    self.raw(&format!("{} {}", "#".repeat(level), content));
                }
                self.block_break();
            }
            "br" => self.line_break(),
            "hr" => {
                self.block_break();
                self.raw("---");
                self.block_break();
            }
            "strong" | "b" => self.wrap_inline(node, "**"),
            "em" | "i" => self.wrap_inline(node, "*"),
            "code" => {
                let code = element.inner_text();
                let code = code.split_whitespace().collect::<Vec<_>>().join(" ");
                if !code.is_empty() {
                    self.raw(&format!("`{code}`"));
                }
            }
            "pre" => {
                let code = element.inner_text();
                self.block_break();
                self.raw("```\n");
                self.raw(code.trim_matches('\n'));
                self.raw("\n```");
                self.block_break();
            }
            "a" => {
                let content = self.inline(node);
                match element.attr("href") {
                    _ if content.is_empty() => {}
                    Some(href) => self.raw(&format!("[{content}]({})", target(&href, &element))),
                    None => self.raw(&content),
                }
            }
            "img" => {
                if let Some(src) = element.attr("src") {
                    let alt = element.attr("alt").unwrap_or_default();
                    self.raw(&format!("![{}]({})", collapse(&alt), target(&src, &element)));
                }
            }
            "ul" | "ol" => self.list(&element, name == "ol"),
            "blockquote" => {
                let content = {
                    let mut writer = Writer::default();
                    writer.children(node);
                    writer.finish()
                };
                self.block_break();
                let quoted: Vec<String> = content
                    .lines()
                    .map(|line| if line.is_empty() { ">".to_owned() } else { format!("> {line}") })
                    .collect();
                self.raw(&quoted.join("\n"));
                self.block_break();
            }
            "table" => self.table(&element),
            _ if BLOCKS.contains(&name.as_str()) => {
                self.block_break();
                self.children(node);
                self.block_break();
            }
            _ => self.children(node),
        }
    }

    fn wrap_inline(&mut self, node: &NodeRef<Node>, marker: &str) {
        let content = self.inline(node);
        if content.is_empty() {
            return;
        }
        if self.out.ends_with(|c: char| c.is_alphanumeric()) {
            self.out.push(' ');
        }
        self.raw(&format!("{marker}{content}{marker}"));
    }

    fn list(&mut self, list: &ElementRef, ordered: bool) {
        let items: Vec<String> = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.name() == "li")
            .enumerate()
            .map(|(i, li)| {
                let mut writer = Writer {
                    out: String::new(),
                    tight: true,
                };
                writer.children(&li);
                let marker = if ordered {
                    format!("{}. ", i + 1)
                } else {
                    "- ".to_owned()
                };
                indent_item(&marker, &writer.finish())
            })
            .collect();
        if items.is_empty() {
            return;
        }

        if self.tight {
            self.line_break();
        } else {
            self.block_break();
        }
        self.raw(&items.join("\n"));
        self.block_break();
    }

    fn table(&mut self, table: &ElementRef) {
        let rows: Vec<Vec<String>> = table
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.name() == "tr")
            .filter(|tr| {
                // Skip rows of nested tables.
                tr.ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.name() == "table")
                    .map_or(false, |owner| owner == *table)
            })
            .map(|tr| {
                tr.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.name().as_str(), "td" | "th"))
                    .map(|cell| self.inline(&cell).replace('\n', " ").replace('|', r"\|"))
                    .collect()
            })
            .filter(|cells: &Vec<String>| !cells.is_empty())
            .collect();
        let Some(columns) = rows.iter().map(Vec::len).max() else {
            return;
        };

        let render = |cells: &[String]| {
            let mut line = String::from("|");
            for i in 0..columns {
                line.push(' ');
                line.push_str(cells.get(i).map_or("", String::as_str));
                line.push_str(" |");
            }
            line
        };

        self.block_break();
        self.raw(&render(&rows[0]));
        self.raw("\n|");
        self.raw(&" --- |".repeat(columns));
        for row in &rows[1..] {
            self.raw("\n");
            self.raw(&render(row));
        }
        self.block_break();
    }
}

fn target(url: &str, element: &ElementRef) -> String {
    match element.attr("title") {
        Some(title) if !title.trim().is_empty() => {
            format!("{url} \"{}\"", collapse(&title).replace('"', "\\\""))
        }
        _ => url.to_owned(),
    }
}

/// Attribute text on a single line: link and image syntax must not span lines.
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn indent_item(marker: &str, content: &str) -> String {
    let pad = " ".repeat(marker.len());
    let mut lines = content.lines();
    let mut item = format!("{marker}{}", lines.next().unwrap_or_default());
    for line in lines {
        item.push('\n');
        if !line.is_empty() {
            item.push_str(&pad);
            item.push_str(line);
        }
    }
    item
}

/// Trims trailing spaces, collapses runs of blank lines outside code fences and trims the
/// whole text.
fn normalize(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut in_fence = false;
    let mut pending = String::new();
    for line in markdown.split('\n') {
        if line.trim_start().starts_with("```") {
            if !in_fence {
                out.push_str(&BLANK_LINES.replace_all(&pending, "\n\n"));
                pending.clear();
            }
            in_fence = !in_fence;
        }
        let target = if in_fence || line.trim_start().starts_with("```") {
            &mut out
        } else {
            &mut pending
        };
        target.push_str(if in_fence { line } else { line.trim_end() });
        target.push('\n');
    }
    out.push_str(&BLANK_LINES.replace_all(&pending, "\n\n"));
    out.trim().to_owned()
}
