//! HTML nodes.

use std::fmt;
use std::ops::Deref;

use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, QualName};
use selectors::attr::CaseSensitivity;

/// An HTML node.
#[derive(Clone, PartialEq, Eq)]
pub enum Node {
    /// The document root.
    Document,

    /// The fragment root.
    Fragment,

    /// A doctype.
    Doctype(Doctype),

    /// A comment.
    Comment(Comment),

    /// Text.
    Text(Text),

    /// An element.
    Element(Element),

    /// A processing instruction.
    ProcessingInstruction(ProcessingInstruction),
}

impl Node {
    pub fn is_document(&self) -> bool {
        matches!(*self, Node::Document)
    }

    pub fn is_fragment(&self) -> bool {
        matches!(*self, Node::Fragment)
    }

    pub fn is_doctype(&self) -> bool {
        matches!(*self, Node::Doctype(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(*self, Node::Comment(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(*self, Node::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(*self, Node::Element(_))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match *self {
            Node::Text(ref text) => Some(text),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match *self {
            Node::Element(ref element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match *self {
            Node::Element(ref mut element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Node::Document => write!(f, "Document"),
            Node::Fragment => write!(f, "Fragment"),
            Node::Doctype(ref d) => write!(f, "Doctype({:?})", d),
            Node::Comment(ref c) => write!(f, "Comment({:?})", c),
            Node::Text(ref t) => write!(f, "Text({:?})", t),
            Node::Element(ref e) => write!(f, "Element({:?})", e),
            Node::ProcessingInstruction(ref pi) => write!(f, "ProcessingInstruction({:?})", pi),
        }
    }
}

/// A doctype.
#[derive(Clone, PartialEq, Eq)]
pub struct Doctype {
    pub name: StrTendril,
    pub public_id: StrTendril,
    pub system_id: StrTendril,
}

impl Doctype {
    pub fn name(&self) -> &str {
        self.name.deref()
    }
}

impl fmt::Debug for Doctype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "<!DOCTYPE {} PUBLIC {:?} {:?}>",
            self.name, self.public_id, self.system_id
        )
    }
}

/// An HTML comment.
#[derive(Clone, PartialEq, Eq)]
pub struct Comment {
    pub comment: StrTendril,
}

impl Deref for Comment {
    type Target = str;

    fn deref(&self) -> &str {
        self.comment.deref()
    }
}

impl fmt::Debug for Comment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<!-- {:?} -->", self.deref())
    }
}

/// HTML text.
#[derive(Clone, PartialEq, Eq)]
pub struct Text {
    pub text: StrTendril,
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        self.text.deref()
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.deref())
    }
}

/// A processing instruction.
#[derive(Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub target: StrTendril,
    pub data: StrTendril,
}

impl fmt::Debug for ProcessingInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<?{} {}?>", self.target.deref(), self.data.deref())
    }
}

/// An HTML element.
///
/// Attributes keep their source order, which serialization preserves.
#[derive(Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QualName,
    pub attrs: Vec<(QualName, StrTendril)>,
}

impl Element {
    pub fn new(name: QualName, attributes: Vec<Attribute>) -> Self {
        let attrs = attributes
            .into_iter()
            .map(|attr| (attr.name, attr.value))
            .collect();
        Element { name, attrs }
    }

    /// Returns the element's local name.
    pub fn name(&self) -> &str {
        self.name.local.deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str, case_sensitive: CaseSensitivity) -> bool {
        self.attr("class").map_or(false, |classes| {
            classes
                .split_whitespace()
                .any(|c| case_sensitive.eq(c.as_bytes(), class.as_bytes()))
        })
    }

    /// Returns the value of a non-namespaced attribute.
    pub fn attr(&self, attr: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name.ns == ns!() && name.local.deref() == attr)
            .map(|(_, value)| value.deref())
    }

    /// Sets a non-namespaced attribute, replacing any previous value.
    pub fn set_attr(&mut self, attr: &str, value: &str) {
        let value = StrTendril::from_slice(value);
        match self
            .attrs
            .iter_mut()
            .find(|(name, _)| name.ns == ns!() && name.local.deref() == attr)
        {
            Some((_, current)) => *current = value,
            None => self
                .attrs
                .push((QualName::new(None, ns!(), LocalName::from(attr)), value)),
        }
    }

    /// Returns an iterator over the element's attributes as `(name, value)` pairs.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs
            .iter()
            .map(|(name, value)| (name.local.deref(), value.deref()))
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}", self.name())?;
        for (name, value) in self.attrs() {
            write!(f, " {}={:?}", name, value)?;
        }
        write!(f, ">")
    }
}
