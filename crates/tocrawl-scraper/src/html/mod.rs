//! HTML documents and fragments.

mod tree_sink;

use std::borrow::Cow;
use std::rc::Rc;

use html5ever::driver;
use html5ever::tree_builder::QuirksMode;
use html5ever::QualName;
use tendril::TendrilSink;
use tocrawl_tree::Tree;

use self::tree_sink::HtmlSink;
use crate::element_ref::{ElementRef, Select};
use crate::node::Node;
use crate::selector::Selector;

/// An HTML tree.
///
/// Parsing does not fail hard. Instead, the `quirks_mode` is set and errors are added to the
/// `errors` field. The `tree` will still be populated as best as possible.
///
/// Cloning an `Html` shares the underlying tree.
#[derive(Debug, Clone)]
pub struct Html {
    /// Parse errors.
    pub errors: Vec<Cow<'static, str>>,

    /// The quirks mode.
    pub quirks_mode: QuirksMode,

    /// The node tree.
    pub tree: Rc<Tree<Node>>,
}

impl Html {
    /// Creates an empty HTML document.
    pub fn new_document() -> Self {
        Html {
            errors: Vec::new(),
            quirks_mode: QuirksMode::NoQuirks,
            tree: Tree::new(Node::Document),
        }
    }

    /// Creates an empty HTML fragment.
    pub fn new_fragment() -> Self {
        Html {
            errors: Vec::new(),
            quirks_mode: QuirksMode::NoQuirks,
            tree: Tree::new(Node::Fragment),
        }
    }

    /// Parses a string of HTML as a document.
    pub fn parse_document(document: &str) -> Self {
        let parser = driver::parse_document(HtmlSink::new(Self::new_document()), Default::default());
        parser.one(document)
    }

    /// Parses a string of HTML as a fragment.
    pub fn parse_fragment(fragment: &str) -> Self {
        let parser = driver::parse_fragment(
            HtmlSink::new(Self::new_fragment()),
            Default::default(),
            QualName::new(None, ns!(html), local_name!("body")),
            Vec::new(),
        );
        parser.one(fragment)
    }

    /// Returns an iterator over elements matching a selector.
    pub fn select<'a>(&self, selector: &'a Selector) -> Select<'a> {
        self.root_element().select(selector)
    }

    /// Returns the root `<html>` element.
    ///
    /// The parser always creates one, for fragments as well. A tree built by hand without it
    /// yields its root node instead.
    pub fn root_element(&self) -> ElementRef {
        self.tree
            .root()
            .children()
            .find_map(ElementRef::wrap)
            .unwrap_or_else(|| ElementRef::new(self.tree.root()))
    }

    /// Serializes the tree back to HTML.
    ///
    /// Fragments serialize their content only, without the `<html>` wrapper the parser adds.
    pub fn html(&self) -> String {
        let root = self.root_element();
        if self.tree.root().map_value(Node::is_fragment).unwrap_or(false) {
            root.inner_html()
        } else {
            root.html()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Html;
    use super::Selector;

    #[test]
    fn root_element_fragment() {
        let html = Html::parse_fragment(r#"<a href="http://github.com">1</a>"#);
        let root_ref = html.root_element();
        let selector = Selector::parse("a").unwrap();
        let href = root_ref.select(&selector).next().unwrap();
        assert_eq!(href.inner_html(), "1");
        assert_eq!(href.attr("href").unwrap(), "http://github.com");
    }

    #[test]
    fn root_element_document_doctype() {
        let html = Html::parse_document("<!DOCTYPE html>\n<title>abc</title>");
        let selector = Selector::parse("title").unwrap();
        let title = html.select(&selector).next().unwrap();
        assert_eq!(title.inner_html(), "abc");
    }

    #[test]
    fn root_element_document_comment() {
        let html = Html::parse_document("<!-- comment --><title>abc</title>");
        let selector = Selector::parse("title").unwrap();
        let title = html.select(&selector).next().unwrap();
        assert_eq!(title.inner_html(), "abc");
    }

    #[test]
    fn fragment_html_drops_wrapper() {
        let html = Html::parse_fragment("<p>one</p><p>two</p>");
        assert_eq!(html.html(), "<p>one</p><p>two</p>");
    }

    #[test]
    fn adjacent_text_is_merged() {
        let html = Html::parse_fragment("<p>a&amp;b</p>");
        let selector = Selector::parse("p").unwrap();
        let p = html.select(&selector).next().unwrap();
        assert_eq!(p.children().count(), 1);
        assert_eq!(p.inner_text(), "a&b");
    }
}
