use std::io::Error;

use html5ever::serialize::{Serialize, Serializer, TraversalScope};
use tocrawl_tree::iter::Edge;

use crate::element_ref::ElementRef;
use crate::node::Node;

impl Serialize for ElementRef {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> Result<(), Error>
    where
        S: Serializer,
    {
        let children_only = traversal_scope == TraversalScope::ChildrenOnly(None);
        for edge in self.traverse() {
            match edge {
                Edge::Open(node) => {
                    if children_only && node == **self {
                        continue;
                    }

                    node.map_value(|v| match *v {
                        Node::Doctype(ref doctype) => serializer.write_doctype(doctype.name()),
                        Node::Comment(ref comment) => serializer.write_comment(comment),
                        Node::Text(ref text) => serializer.write_text(text),
                        Node::ProcessingInstruction(ref pi) => {
                            serializer.write_processing_instruction(&pi.target, &pi.data)
                        }
                        Node::Element(ref elem) => {
                            let attrs = elem.attrs.iter().map(|(k, v)| (k, &v[..]));
                            serializer.start_elem(elem.name.clone(), attrs)
                        }
                        Node::Document | Node::Fragment => Ok(()),
                    })
                    .transpose()?;
                }

                Edge::Close(node) => {
                    if children_only && node == **self {
                        continue;
                    }

                    node.map_value(|v| match v.as_element() {
                        Some(elem) => serializer.end_elem(elem.name.clone()),
                        None => Ok(()),
                    })
                    .transpose()?;
                }
            }
        }

        Ok(())
    }
}
