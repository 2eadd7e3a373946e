use html5ever::Namespace;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching;
use selectors::{Element, OpaqueElement};

use crate::atoms::{CssLocalName, CssString};
use crate::element_ref::ElementRef;
use crate::node::Node;
use crate::selector::{NonTSPseudoClass, PseudoElement, Simple};

/// Note: will never match against non-tree-structure pseudo-classes.
impl Element for ElementRef {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        // A dangling reference gets an identity that matches no scope.
        self.node
            .map_value(OpaqueElement::new)
            .unwrap_or_else(|| OpaqueElement::new(self))
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.map_value(|v1| other.map_value(|v2| v1.name == v2.name))
            .flatten()
            .unwrap_or(false)
    }

    fn imported_part(&self, _: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.prev_siblings().find_map(ElementRef::wrap)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.next_siblings().find_map(ElementRef::wrap)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.children().find_map(ElementRef::wrap)
    }

    fn is_html_element_in_html_document(&self) -> bool {
        self.map_value(|v| v.name.ns == ns!(html)).unwrap_or(false)
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.map_value(|v| v.name.local == name.0).unwrap_or(false)
    }

    fn has_namespace(&self, namespace: &Namespace) -> bool {
        self.map_value(|v| &v.name.ns == namespace).unwrap_or(false)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Namespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        self.map_value(|v| {
            v.attrs.iter().any(|(key, value)| {
                !matches!(*ns, NamespaceConstraint::Specific(url) if *url != key.ns)
                    && local_name.0 == key.local
                    && operation.eval_str(value)
            })
        })
        .unwrap_or(false)
    }

    fn match_non_ts_pseudo_class(
        &self,
        _pc: &NonTSPseudoClass,
        _context: &mut matching::MatchingContext<Self::Impl>,
    ) -> bool {
        false
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut matching::MatchingContext<Self::Impl>,
    ) -> bool {
        false
    }

    fn is_link(&self) -> bool {
        self.map_value(|v| v.name() == "link").unwrap_or(false)
    }

    fn is_html_slot_element(&self) -> bool {
        self.map_value(|v| v.name() == "slot").unwrap_or(false)
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.map_value(|v| match v.id() {
            Some(val) => case_sensitivity.eq(id.0.as_bytes(), val.as_bytes()),
            None => false,
        })
        .unwrap_or(false)
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.map_value(|v| v.has_class(&name.0, case_sensitivity))
            .unwrap_or(false)
    }

    fn is_empty(&self) -> bool {
        !self.children().any(|child| {
            child
                .map_value(|v| v.is_element() || v.is_text())
                .unwrap_or(false)
        })
    }

    fn is_root(&self) -> bool {
        self.parent()
            .map_or(false, |parent| parent.map_value(Node::is_document).unwrap_or(false))
    }

    fn apply_selector_flags(&self, _flags: matching::ElementSelectorFlags) {}
}

#[cfg(test)]
mod tests {
    use selectors::attr::CaseSensitivity;
    use selectors::Element;

    use crate::atoms::CssLocalName;
    use crate::html::Html;
    use crate::selector::Selector;

    #[test]
    fn test_has_id() {
        let sel = Selector::parse("p").unwrap();

        let fragment = Html::parse_fragment("<p id='link_id_456'>hey there</p>");
        let element = fragment.select(&sel).next().unwrap();
        assert!(element.has_id(
            &CssLocalName::from("link_id_456"),
            CaseSensitivity::CaseSensitive
        ));

        let fragment = Html::parse_fragment("<p>hey there</p>");
        let element = fragment.select(&sel).next().unwrap();
        assert!(!element.has_id(
            &CssLocalName::from("any_link_id"),
            CaseSensitivity::CaseSensitive
        ));
    }

    #[test]
    fn test_has_class() {
        let sel = Selector::parse("p").unwrap();

        let fragment = Html::parse_fragment("<p class='my_class'>hey there</p>");
        let element = fragment.select(&sel).next().unwrap();
        assert!(element.has_class(
            &CssLocalName::from("my_class"),
            CaseSensitivity::CaseSensitive
        ));

        let fragment = Html::parse_fragment("<p>hey there</p>");
        let element = fragment.select(&sel).next().unwrap();
        assert!(!element.has_class(
            &CssLocalName::from("my_class"),
            CaseSensitivity::CaseSensitive
        ));
    }

    #[test]
    fn test_sibling_and_child_elements() {
        let fragment = Html::parse_fragment("<ul><li>a</li> <li>b</li></ul>");
        let ul = fragment
            .select(&Selector::parse("ul").unwrap())
            .next()
            .unwrap();
        let first = ul.first_element_child().unwrap();
        assert_eq!(first.inner_text(), "a");
        let second = first.next_sibling_element().unwrap();
        assert_eq!(second.inner_text(), "b");
        assert_eq!(second.prev_sibling_element(), Some(first));
        assert!(second.is_same_type(&ul.first_element_child().unwrap()));
    }

    #[test]
    fn test_attribute_selectors() {
        let fragment = Html::parse_fragment(
            r#"<a href="https://its.example.com/db/x">a</a><a href="/local">b</a><a>c</a>"#,
        );
        let sel = Selector::parse(r#"a[href^="https://"]"#).unwrap();
        let found: Vec<_> = fragment.select(&sel).map(|a| a.inner_text()).collect();
        assert_eq!(found, vec!["a"]);

        let sel = Selector::parse("a[href]").unwrap();
        assert_eq!(fragment.select(&sel).count(), 2);
    }
}
