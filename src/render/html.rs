//! Minimal structured HTML builder. Markup is assembled as a node tree and
//! serialized with a single escaping pass covering `& < > " '`, so no
//! interpolated request data can ever land in the output unescaped.

use html_escape::encode_safe;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Trusted, pre-built markup. Reserved for the doctype and the `<style>`
    /// payload; never fed with request data.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

const VOID_TAGS: &[&str] = &["meta", "link", "col", "br", "hr", "img"];

pub fn el(tag: &'static str) -> Element {
    Element {
        tag,
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

pub fn text(content: impl Into<String>) -> Node {
    Node::Text(content.into())
}

pub fn raw(markup: impl Into<String>) -> Node {
    Node::Raw(markup.into())
}

impl Element {
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, content: impl Into<String>) -> Self {
        self.child(Node::Text(content.into()))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(4096);
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&encode_safe(value));
            out.push('"');
        }

        if VOID_TAGS.contains(&self.tag) {
            out.push_str(" />");
            return;
        }

        out.push('>');
        for child in &self.children {
            child.write(out);
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

impl Node {
    fn write(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write(out),
            Node::Text(content) => out.push_str(&encode_safe(content)),
            Node::Raw(markup) => out.push_str(markup),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Serialize a root element as a complete `<!doctype html>` document.
pub fn document(root: Element) -> String {
    format!("<!doctype html>\n{}", root.to_html())
}
