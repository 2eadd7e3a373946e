//! HTML parsing, CSS selection and in-place editing on top of [`tocrawl_tree`].

#[macro_use]
extern crate html5ever;

pub mod atoms;
pub mod element_ref;
pub mod html;
pub mod node;
pub mod selector;

pub use crate::element_ref::ElementRef;
pub use crate::html::Html;
pub use crate::node::Node;
pub use crate::selector::{Selector, SelectorError};
