//! Element references.

mod element;
mod serializable;

use std::iter::FusedIterator;
use std::ops::Deref;

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use tocrawl_tree::iter::{Edge, Traverse};
use tocrawl_tree::NodeRef;

use crate::node::{Element, Node};
use crate::selector::Selector;

/// Wrapper around a reference to an element node.
///
/// This wrapper implements the `Element` trait from the `selectors` crate, which allows
/// it to be matched against CSS selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRef {
    node: NodeRef<Node>,
}

impl ElementRef {
    pub(crate) fn new(node: NodeRef<Node>) -> Self {
        ElementRef { node }
    }

    /// Wraps a `NodeRef` only if it references a `Node::Element`.
    pub fn wrap(node: NodeRef<Node>) -> Option<Self> {
        match node.map_value(Node::is_element) {
            Some(true) => Some(ElementRef::new(node)),
            _ => None,
        }
    }

    /// Maps a function to the `Element` referenced by `self`.
    pub fn map_value<F, R>(&self, map_fn: F) -> Option<R>
    where
        F: FnOnce(&Element) -> R,
    {
        self.node.map_value(|v| v.as_element().map(map_fn)).flatten()
    }

    /// Returns the element's local name, empty if the node is gone.
    pub fn name(&self) -> String {
        self.map_value(|v| v.name().to_owned()).unwrap_or_default()
    }

    /// Returns the value of an attribute.
    pub fn attr(&self, attr: &str) -> Option<String> {
        self.map_value(|v| v.attr(attr).map(str::to_owned)).flatten()
    }

    /// Sets an attribute in place. Returns false if the node is gone.
    pub fn set_attr(&self, attr: &str, value: &str) -> bool {
        let mut is_element = false;
        self.node.update_value(|v| {
            if let Some(element) = v.as_element_mut() {
                element.set_attr(attr, value);
                is_element = true;
            }
        });
        is_element
    }

    /// Detaches this element, and its subtree, from the document.
    pub fn remove(self) {
        let mut node = self.node;
        node.detach();
    }

    /// Returns an iterator over descendent elements matching a selector.
    pub fn select<'a>(&self, selector: &'a Selector) -> Select<'a> {
        let mut inner = self.traverse();
        inner.next(); // Skip Edge::Open(self).

        Select {
            scope: self.clone(),
            inner,
            selector,
        }
    }

    fn serialize(&self, traversal_scope: TraversalScope) -> String {
        let opts = SerializeOpts {
            scripting_enabled: false,
            traversal_scope,
            create_missing_parent: false,
        };
        let mut buf = Vec::new();
        // Writing into a Vec does not fail.
        let _ = serialize(&mut buf, self, opts);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Returns the HTML of this element.
    pub fn html(&self) -> String {
        self.serialize(TraversalScope::IncludeNode)
    }

    /// Returns the inner HTML of this element.
    pub fn inner_html(&self) -> String {
        self.serialize(TraversalScope::ChildrenOnly(None))
    }

    /// Returns all the descendent text nodes content concatenated.
    pub fn inner_text(&self) -> String {
        let mut all_text = String::new();
        for edge in self.traverse() {
            if let Edge::Open(node) = edge {
                node.map_value(|v| {
                    if let Node::Text(ref text) = v {
                        all_text.push_str(text);
                    }
                });
            }
        }
        all_text
    }
}

impl Deref for ElementRef {
    type Target = NodeRef<Node>;

    fn deref(&self) -> &NodeRef<Node> {
        &self.node
    }
}

/// Iterator over descendent elements matching a selector.
#[derive(Debug, Clone)]
pub struct Select<'a> {
    scope: ElementRef,
    inner: Traverse<Node>,
    selector: &'a Selector,
}

impl Iterator for Select<'_> {
    type Item = ElementRef;

    fn next(&mut self) -> Option<ElementRef> {
        for edge in &mut self.inner {
            if let Edge::Open(node) = edge {
                if let Some(element) = ElementRef::wrap(node) {
                    if self
                        .selector
                        .matches_with_scope(&element, Some(self.scope.clone()))
                    {
                        return Some(element);
                    }
                }
            }
        }
        None
    }
}

impl FusedIterator for Select<'_> {}

#[cfg(test)]
mod tests {
    use crate::html::Html;
    use crate::selector::Selector;

    #[test]
    fn test_scope() {
        let html = r"
            <div>
                <b>1</b>
                <span>
                    <span><b>2</b></span>
                    <b>3</b>
                </span>
            </div>
        ";
        let fragment = Html::parse_fragment(html);
        let sel1 = Selector::parse("div > span").unwrap();
        let sel2 = Selector::parse(":scope > b").unwrap();

        let element1 = fragment.select(&sel1).next().unwrap();
        let element2 = element1.select(&sel2).next().unwrap();
        assert_eq!(element2.inner_html(), "3");
    }

    #[test]
    fn scope_direct_children_only() {
        let html = r#"
            <ul id="toc">
                <li>a<ul><li>a.1</li></ul></li>
                <li>b</li>
            </ul>
        "#;
        let fragment = Html::parse_fragment(html);
        let ul = fragment
            .select(&Selector::parse("#toc").unwrap())
            .next()
            .unwrap();
        let items: Vec<_> = ul
            .select(&Selector::parse(":scope > li").unwrap())
            .map(|li| li.inner_text())
            .collect();
        assert_eq!(items, vec!["aa.1", "b"]);
    }

    #[test]
    fn set_attr_shows_in_html() {
        let fragment = Html::parse_fragment(r#"<img src="/a.png" alt="x">"#);
        let sel = Selector::parse("img").unwrap();
        let img = fragment.select(&sel).next().unwrap();
        assert!(img.set_attr("src", "https://example.com/a.png"));
        assert_eq!(
            img.attr("src").as_deref(),
            Some("https://example.com/a.png")
        );
        assert_eq!(
            fragment.html(),
            r#"<img src="https://example.com/a.png" alt="x">"#
        );
    }

    #[test]
    fn remove_detaches_subtree() {
        let fragment = Html::parse_fragment("<p>keep</p><div><a>drop</a></div><p>too</p>");
        let sel = Selector::parse("div").unwrap();
        let div = fragment.select(&sel).next().unwrap();
        div.remove();
        assert_eq!(fragment.html(), "<p>keep</p><p>too</p>");
        assert!(fragment
            .select(&Selector::parse("a").unwrap())
            .next()
            .is_none());
    }

    #[test]
    fn inner_text_concatenates() {
        let fragment = Html::parse_fragment("<div>Hello <b>big</b> world</div>");
        let div = fragment
            .select(&Selector::parse("div").unwrap())
            .next()
            .unwrap();
        assert_eq!(div.inner_text(), "Hello big world");
        assert_eq!(div.name(), "div");
    }
}
