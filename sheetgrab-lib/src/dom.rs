use html5ever::QualName;
use std::cell::RefCell;
use std::rc::Rc;

pub mod dom_tree {
    use super::*;

    #[derive(Debug, Clone)]
    pub enum Node {
        DocumentRoot(DocumentRootNode),
        Element(ElementNode),
        Text(String),
    }

    #[derive(Debug, Clone)]
    pub struct DocumentRootNode {
        pub children: Vec<Rc<RefCell<Node>>>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        pub attributes: Vec<(String, String)>,
        pub children: Vec<Rc<RefCell<Node>>>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: Rc<RefCell<Node>>,
        pub doctype: RefCell<Option<Doctype>>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
    }

    impl DocumentRootNode {
        pub fn new() -> Self {
            DocumentRootNode {
                children: Vec::new(),
            }
        }
    }

    impl Default for DocumentRootNode {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ElementNode {
        pub fn new(tag: String, qual_name: QualName) -> Self {
            ElementNode {
                tag,
                qual_name,
                attributes: Vec::new(),
                children: Vec::new(),
            }
        }

        /// Returns the value of the first attribute named `name` (ASCII case-insensitive).
        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }

        /// Concatenates the direct text children of this element.
        ///
        /// The parser may split raw text (e.g. the body of a `<style>`) into
        /// several adjacent text nodes, so they are joined back here.
        pub fn text_content(&self) -> String {
            let mut text = String::new();
            for child in &self.children {
                if let Node::Text(chunk) = &*child.borrow() {
                    text.push_str(chunk);
                }
            }
            text
        }
    }

    impl Document {
        /// Visits every element in document (pre-order) order.
        ///
        /// Contents of `<template>` elements are inert and are not visited.
        pub fn for_each_element<F>(&self, mut visit: F)
        where
            F: FnMut(&ElementNode),
        {
            walk(&self.root, &mut visit);
        }
    }

    fn walk<F>(node: &Rc<RefCell<Node>>, visit: &mut F)
    where
        F: FnMut(&ElementNode),
    {
        match &*node.borrow() {
            Node::DocumentRoot(root) => {
                for child in &root.children {
                    walk(child, visit);
                }
            }
            Node::Element(elem) => {
                visit(elem);
                if elem.tag.eq_ignore_ascii_case("template") {
                    return;
                }
                for child in &elem.children {
                    walk(child, visit);
                }
            }
            Node::Text(_) => {}
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Rc::new(RefCell::new(Node::DocumentRoot(DocumentRootNode::new()))),
            doctype: RefCell::new(None),
        }
    }
}
