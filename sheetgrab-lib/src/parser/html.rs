//! Parses HTML into the DOM tree defined in `crate::dom::dom_tree`.
//!
//! html5ever drives the parse; `SheetgrabTreeSink` only keeps what the
//! stylesheet scan needs: elements with their attributes, and text.

use crate::dom::dom_tree;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, NodeOrText, QuirksMode, TreeSink},
    LocalName, Namespace, QualName,
};
use log::debug;
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

type Handle = Rc<RefCell<dom_tree::Node>>;

/// Creates a DOM tree from the provided HTML content.
///
/// Parsing never fails: malformed markup is recovered from the way a browser
/// would, and the individual parse errors are logged at `debug` level.
pub fn create_dom_tree(html_content: &str) -> dom_tree::Document {
    let tree_sink = SheetgrabTreeSink::new();
    html5ever::parse_document(tree_sink, Default::default()).one(html_content)
}

/// A TreeSink building the `dom_tree::Document` used by the stylesheet scan.
pub struct SheetgrabTreeSink {
    document: dom_tree::Document,
}

impl SheetgrabTreeSink {
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
        }
    }
}

impl Default for SheetgrabTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct SinkElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for SinkElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

fn children_of(node: &mut dom_tree::Node) -> Option<&mut Vec<Handle>> {
    match node {
        dom_tree::Node::DocumentRoot(root) => Some(&mut root.children),
        dom_tree::Node::Element(elem) => Some(&mut elem.children),
        dom_tree::Node::Text(_) => None,
    }
}

fn into_handle(child: NodeOrText<Handle>) -> Handle {
    match child {
        NodeOrText::AppendNode(node) => node,
        NodeOrText::AppendText(text) => {
            Rc::new(RefCell::new(dom_tree::Node::Text(text.to_string())))
        }
    }
}

/// Finds the parent of `target` and its index among the parent's children.
///
/// Nodes do not keep parent links, so this walks down from `node`.
fn locate(node: &Handle, target: &Handle) -> Option<(Handle, usize)> {
    match &*node.borrow() {
        dom_tree::Node::DocumentRoot(root) => locate_in(node, &root.children, target),
        dom_tree::Node::Element(elem) => locate_in(node, &elem.children, target),
        dom_tree::Node::Text(_) => None,
    }
}

fn locate_in(node: &Handle, children: &[Handle], target: &Handle) -> Option<(Handle, usize)> {
    match children.iter().position(|child| Rc::ptr_eq(child, target)) {
        Some(index) => Some((node.clone(), index)),
        None => children.iter().find_map(|child| locate(child, target)),
    }
}

impl TreeSink for SheetgrabTreeSink {
    type Handle = Handle;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = SinkElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        debug!("HTML parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        match &*target.borrow() {
            dom_tree::Node::Element(elem) => SinkElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            },
            // The tree builder only asks for names of open elements.
            _ => SinkElemName {
                ns: Namespace::from(""),
                local: LocalName::from(""),
            },
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: html5ever::interface::ElementFlags,
    ) -> Self::Handle {
        let mut element = dom_tree::ElementNode::new(name.local.to_string(), name);
        element.attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        Rc::new(RefCell::new(dom_tree::Node::Element(element)))
    }

    /// Comments carry no style information; they become empty text nodes.
    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        Rc::new(RefCell::new(dom_tree::Node::Text(String::new())))
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        let combined = format!("{} {}", target, data);
        Rc::new(RefCell::new(dom_tree::Node::Text(combined)))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let child = into_handle(child);
        if let Some(children) = children_of(&mut parent.borrow_mut()) {
            children.push(child);
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if locate(&self.document.root, element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
        });
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    // Stylesheet collection does not depend on the compatibility mode.
    fn set_quirks_mode(&self, mode: QuirksMode) {
        debug!("Document quirks mode: {:?}", mode);
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let Some((parent, index)) = locate(&self.document.root, sibling) else {
            return;
        };
        let child = into_handle(child);
        let mut node = parent.borrow_mut();
        if let Some(children) = children_of(&mut node) {
            children.insert(index, child);
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        if let dom_tree::Node::Element(elem) = &mut *target.borrow_mut() {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if !elem.attributes.iter().any(|(k, _)| k == &key) {
                    elem.attributes.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        let Some((parent, index)) = locate(&self.document.root, target) else {
            return;
        };
        let mut node = parent.borrow_mut();
        if let Some(children) = children_of(&mut node) {
            children.remove(index);
        }
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let moved = match children_of(&mut node.borrow_mut()) {
            Some(children) => std::mem::take(children),
            None => return,
        };
        if let Some(children) = children_of(&mut new_parent.borrow_mut()) {
            children.extend(moved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tags(document: &dom_tree::Document) -> Vec<String> {
        let mut tags = Vec::new();
        document.for_each_element(|elem| tags.push(elem.tag.clone()));
        tags
    }

    #[test]
    fn test_basic_structure() {
        let document = create_dom_tree(
            r#"<!DOCTYPE html>
            <html>
                <head><title>Test</title></head>
                <body><h1>Hello</h1><p>World</p></body>
            </html>"#,
        );

        assert_eq!(
            tags(&document),
            vec!["html", "head", "title", "body", "h1", "p"]
        );
        let doctype = document.doctype.borrow();
        assert_eq!(doctype.as_ref().map(|d| d.name.as_str()), Some("html"));
    }

    #[test]
    fn test_style_text_is_kept_raw() {
        let document = create_dom_tree("<style>a > b { color: red }</style>");
        let mut texts = Vec::new();
        document.for_each_element(|elem| {
            if elem.tag == "style" {
                texts.push(elem.text_content());
            }
        });
        assert_eq!(texts, vec!["a > b { color: red }".to_string()]);
    }

    #[test]
    fn test_attributes_keep_source_order() {
        let document = create_dom_tree(r#"<link rel="stylesheet" href="a.css" media="print">"#);
        let mut attrs = Vec::new();
        document.for_each_element(|elem| {
            if elem.tag == "link" {
                attrs = elem.attributes.clone();
            }
        });
        assert_eq!(
            attrs,
            vec![
                ("rel".to_string(), "stylesheet".to_string()),
                ("href".to_string(), "a.css".to_string()),
                ("media".to_string(), "print".to_string()),
            ]
        );
    }

    #[test]
    fn test_template_contents_are_not_visited() {
        let document = create_dom_tree("<template><style>p{}</style></template><style></style>");
        let styles = {
            let mut count = 0;
            document.for_each_element(|elem| {
                if elem.tag == "style" {
                    count += 1;
                }
            });
            count
        };
        assert_eq!(styles, 1);
    }

    fn texts_and_tags(node: &Handle, out: &mut Vec<String>) {
        match &*node.borrow() {
            dom_tree::Node::DocumentRoot(root) => {
                root.children.iter().for_each(|child| texts_and_tags(child, out))
            }
            dom_tree::Node::Element(elem) => {
                out.push(elem.tag.clone());
                elem.children.iter().for_each(|child| texts_and_tags(child, out));
            }
            dom_tree::Node::Text(text) if !text.trim().is_empty() => out.push(text.clone()),
            dom_tree::Node::Text(_) => {}
        }
    }

    #[test]
    fn test_table_text_is_foster_parented() {
        let document =
            create_dom_tree("<body><table>x<style>p{}</style><tr><td>y</td></tr></table></body>");
        let mut nodes = Vec::new();
        texts_and_tags(&document.root, &mut nodes);
        assert_eq!(
            nodes,
            vec!["html", "head", "body", "x", "table", "style", "p{}", "tbody", "tr", "td", "y"]
        );
    }

    #[test]
    fn test_misnested_formatting_keeps_single_style() {
        let document = create_dom_tree("<b>1<p>2</b>3<style>i{}</style></p>");
        let mut nodes = Vec::new();
        texts_and_tags(&document.root, &mut nodes);
        assert_eq!(
            nodes,
            vec!["html", "head", "body", "b", "1", "p", "b", "2", "3", "style", "i{}"]
        );
    }
}
