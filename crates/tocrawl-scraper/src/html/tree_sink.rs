use std::borrow::Cow;
use std::collections::HashMap;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::Attribute;
use html5ever::{ExpandedName, LocalName, QualName};
use tocrawl_tree::{NodeId, TreeError};

use super::Html;
use crate::node::{Comment, Doctype, Element, Node, ProcessingInstruction, Text};

/// Builds an [`Html`] tree from the html5ever tree builder callbacks.
///
/// Element names are kept on the side so that `elem_name` can hand out borrows that outlive
/// the tree's `RefCell` guards.
pub(super) struct HtmlSink {
    html: Html,
    names: HashMap<NodeId, QualName>,
    unnamed: QualName,
}

impl HtmlSink {
    pub(super) fn new(html: Html) -> Self {
        HtmlSink {
            html,
            names: HashMap::new(),
            unnamed: QualName::new(None, ns!(), LocalName::from("")),
        }
    }

    fn record<T>(&mut self, result: Result<T, TreeError>) {
        if let Err(err) = result {
            self.html.errors.push(Cow::Owned(err.to_string()));
        }
    }

    fn append_text_to(&mut self, parent: NodeId, text: StrTendril) -> Result<(), TreeError> {
        let mut parent = self.html.tree.get(parent).ok_or(TreeError::Missing(parent))?;
        let last_text = parent
            .last_child()
            .filter(|last| last.map_value(Node::is_text).unwrap_or(false));
        match last_text {
            Some(last) => {
                last.update_value(|v| {
                    if let Node::Text(ref mut t) = v {
                        t.text.push_tendril(&text);
                    }
                });
                Ok(())
            }
            None => parent.append(Node::Text(Text { text })).map(drop),
        }
    }

    fn insert_before(
        &mut self,
        sibling: NodeId,
        new_node: NodeOrText<NodeId>,
    ) -> Result<(), TreeError> {
        if let NodeOrText::AppendNode(id) = new_node {
            if let Some(mut node) = self.html.tree.get(id) {
                node.detach();
            }
        }

        let mut sibling = self
            .html
            .tree
            .get(sibling)
            .ok_or(TreeError::Missing(sibling))?;
        if sibling.parent().is_none() {
            return Ok(());
        }

        match new_node {
            NodeOrText::AppendNode(id) => sibling.insert_id_before(id).map(drop),
            NodeOrText::AppendText(text) => {
                let prev_text = sibling
                    .prev_sibling()
                    .filter(|prev| prev.map_value(Node::is_text).unwrap_or(false));
                match prev_text {
                    Some(prev) => {
                        prev.update_value(|v| {
                            if let Node::Text(ref mut t) = v {
                                t.text.push_tendril(&text);
                            }
                        });
                        Ok(())
                    }
                    None => sibling.insert_before(Node::Text(Text { text })).map(drop),
                }
            }
        }
    }
}

/// Note: `<template>` contents are kept as a fragment child of the template element.
impl TreeSink for HtmlSink {
    type Output = Html;
    type Handle = NodeId;

    fn finish(self) -> Html {
        self.html
    }

    fn parse_error(&mut self, msg: Cow<'static, str>) {
        self.html.errors.push(msg);
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.html.quirks_mode = mode;
    }

    fn get_document(&mut self) -> Self::Handle {
        self.html.tree.root().id()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    // The tree builder only asks for names of handles it got from `create_element`.
    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> ExpandedName<'a> {
        match self.names.get(target) {
            Some(name) => name.expanded(),
            None => self.unnamed.expanded(),
        }
    }

    fn create_element(
        &mut self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let is_template = name.expanded() == expanded_name!(html "template");

        let node_id = self
            .html
            .tree
            .orphan(Node::Element(Element::new(name.clone(), attrs)));
        self.names.insert(node_id, name);

        if is_template {
            let appended = match self.html.tree.get(node_id) {
                Some(mut template) => template.append(Node::Fragment).map(drop),
                None => Err(TreeError::Missing(node_id)),
            };
            self.record(appended);
        }

        node_id
    }

    fn create_comment(&mut self, text: StrTendril) -> Self::Handle {
        self.html
            .tree
            .orphan(Node::Comment(Comment { comment: text }))
    }

    fn create_pi(&mut self, target: StrTendril, data: StrTendril) -> Self::Handle {
        self.html
            .tree
            .orphan(Node::ProcessingInstruction(ProcessingInstruction {
                target,
                data,
            }))
    }

    fn append_doctype_to_document(
        &mut self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let doctype = Doctype {
            name,
            public_id,
            system_id,
        };
        let appended = self.html.tree.root().append(Node::Doctype(doctype));
        self.record(appended);
    }

    // Adjacent text nodes are merged.
    fn append(&mut self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let appended = match child {
            NodeOrText::AppendNode(id) => match self.html.tree.get(*parent) {
                Some(mut parent) => parent.append_id(id).map(drop),
                None => Err(TreeError::Missing(*parent)),
            },
            NodeOrText::AppendText(text) => self.append_text_to(*parent, text),
        };
        self.record(appended);
    }

    fn append_before_sibling(&mut self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let inserted = self.insert_before(*sibling, new_node);
        self.record(inserted);
    }

    fn append_based_on_parent_node(
        &mut self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self
            .html
            .tree
            .get(*element)
            .map_or(false, |el| el.parent().is_some());
        if has_parent {
            self.append_before_sibling(element, child)
        } else {
            self.append(prev_element, child)
        }
    }

    fn remove_from_parent(&mut self, target: &Self::Handle) {
        if let Some(mut node) = self.html.tree.get(*target) {
            node.detach();
        }
    }

    fn reparent_children(&mut self, node: &Self::Handle, new_parent: &Self::Handle) {
        if let Some(mut new_parent) = self.html.tree.get(*new_parent) {
            new_parent.reparent_from_id_append(*node);
        }
    }

    fn add_attrs_if_missing(&mut self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let Some(node) = self.html.tree.get(*target) else {
            return;
        };
        node.update_value(|v| {
            if let Some(element) = v.as_element_mut() {
                for attr in attrs {
                    if !element.attrs.iter().any(|(name, _)| *name == attr.name) {
                        element.attrs.push((attr.name, attr.value));
                    }
                }
            }
        });
    }

    fn get_template_contents(&mut self, target: &Self::Handle) -> Self::Handle {
        self.html
            .tree
            .get(*target)
            .and_then(|template| template.first_child())
            .map_or(*target, |contents| contents.id())
    }

    fn mark_script_already_started(&mut self, _node: &Self::Handle) {}
}
