//! Immutable node arena and the element views over it.

use crate::XmlError;

/// Index of a node inside its owning [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<NodeId>,
}

/// A parsed XML document. Owns every node; never mutated after parsing.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Document {
    /// View of the document's root element.
    pub fn root(&self) -> Element<'_> {
        self.element(self.root)
    }

    /// Id of the root element.
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// View of an arbitrary node by id.
    pub fn element(&self, id: NodeId) -> Element<'_> {
        debug_assert!(id.index() < self.nodes.len());
        Element { doc: self, id }
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// Incremental builder shared by both parser backends and the fragment
/// streamer. Nodes are appended as elements open and wired to their parent
/// when they close.
#[derive(Debug, Default)]
pub(crate) struct DocumentBuilder {
    nodes: Vec<NodeData>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
}

impl DocumentBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn open(
        &mut self,
        tag: String,
        attrs: Vec<(String, String)>,
    ) -> Result<NodeId, XmlError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(XmlError::Syntax(format!(
                "unexpected second root element <{tag}>"
            )));
        }
        let id = NodeId(
            u32::try_from(self.nodes.len())
                .map_err(|_| XmlError::Syntax("document has too many nodes".into()))?,
        );
        self.nodes.push(NodeData {
            tag,
            attrs,
            text: None,
            children: Vec::new(),
        });
        if let Some(&parent) = self.stack.last() {
            self.nodes[parent.index()].children.push(id);
        } else {
            self.root = Some(id);
        }
        self.stack.push(id);
        Ok(id)
    }

    pub(crate) fn close(&mut self) -> Result<(), XmlError> {
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| XmlError::Syntax("unbalanced closing tag".into()))
    }

    pub(crate) fn text(&mut self, piece: &str) {
        if piece.is_empty() {
            return;
        }
        if let Some(&current) = self.stack.last() {
            let node = &mut self.nodes[current.index()];
            match &mut node.text {
                Some(text) => text.push_str(piece),
                None => node.text = Some(piece.to_string()),
            }
        }
    }

    pub(crate) fn finish(self) -> Result<Document, XmlError> {
        if !self.stack.is_empty() {
            return Err(XmlError::Syntax("input ended inside an element".into()));
        }
        let root = self
            .root
            .ok_or_else(|| XmlError::Syntax("no root element".into()))?;
        Ok(Document {
            nodes: self.nodes,
            root,
        })
    }
}

/// Read-only view of one node. Cheap to copy; holds the owning document and
/// an index, nothing else.
#[derive(Debug, Clone, Copy)]
pub struct Element<'doc> {
    doc: &'doc Document,
    id: NodeId,
}

impl<'doc> Element<'doc> {
    /// Tag name of the element.
    pub fn tag(&self) -> &'doc str {
        &self.doc.node(self.id).tag
    }

    /// Arena id of the element, for re-deriving a view later.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Text content, or `None` when the element holds no text.
    pub fn text(&self) -> Option<&'doc str> {
        self.doc.node(self.id).text.as_deref()
    }

    /// All attributes in document order.
    pub fn attrs(&self) -> impl Iterator<Item = (&'doc str, &'doc str)> {
        self.doc
            .node(self.id)
            .attrs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Attribute value by name, or `None` when absent.
    pub fn attr(&self, name: &str) -> Option<&'doc str> {
        self.doc
            .node(self.id)
            .attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    fn trimmed_attr(&self, name: &str) -> Option<&'doc str> {
        match self.attr(name).map(str::trim) {
            Some("") | None => None,
            Some(value) => Some(value),
        }
    }

    /// Integer attribute. Accepts decimal and `0x`-prefixed hex. Absent or
    /// empty → `Ok(None)`; present but malformed → [`XmlError::Coercion`].
    pub fn attr_int(&self, name: &str) -> Result<Option<i64>, XmlError> {
        let Some(value) = self.trimmed_attr(name) else {
            return Ok(None);
        };
        let parsed = if let Some(hex) = value.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else {
            value.parse()
        };
        parsed
            .map(Some)
            .map_err(|_| XmlError::coercion(name, value, "an integer"))
    }

    /// Hexadecimal attribute without a prefix, as used for CRC values.
    pub fn attr_hex(&self, name: &str) -> Result<Option<u32>, XmlError> {
        let Some(value) = self.trimmed_attr(name) else {
            return Ok(None);
        };
        u32::from_str_radix(value, 16)
            .map(Some)
            .map_err(|_| XmlError::coercion(name, value, "a hexadecimal number"))
    }

    /// Hex digest attribute decoded to raw bytes, as used for SHA1 values.
    pub fn attr_hex_bytes(&self, name: &str) -> Result<Option<Vec<u8>>, XmlError> {
        fn hex_digit(byte: u8) -> Option<u8> {
            match byte {
                b'0'..=b'9' => Some(byte - b'0'),
                b'a'..=b'f' => Some(byte - b'a' + 10),
                b'A'..=b'F' => Some(byte - b'A' + 10),
                _ => None,
            }
        }
        let Some(value) = self.trimmed_attr(name) else {
            return Ok(None);
        };
        if value.len() % 2 != 0 {
            return Err(XmlError::coercion(name, value, "an even-length hex digest"));
        }
        let mut bytes = Vec::with_capacity(value.len() / 2);
        for pair in value.as_bytes().chunks(2) {
            match (hex_digit(pair[0]), hex_digit(pair[1])) {
                (Some(high), Some(low)) => bytes.push(high << 4 | low),
                _ => return Err(XmlError::coercion(name, value, "a hex digest")),
            }
        }
        Ok(Some(bytes))
    }

    /// Boolean attribute following the listing convention of `yes`/`no`.
    /// Absent → `default`; any other value → [`XmlError::Coercion`].
    pub fn attr_yes_no(&self, name: &str, default: bool) -> Result<bool, XmlError> {
        match self.trimmed_attr(name) {
            None => Ok(default),
            Some("yes") => Ok(true),
            Some("no") => Ok(false),
            Some(other) => Err(XmlError::coercion(name, other, "\"yes\" or \"no\"")),
        }
    }

    /// Lazy iteration over direct children; each view is built when yielded.
    /// The iterator is restartable: call again for a fresh walk.
    pub fn children(&self) -> Children<'doc> {
        Children {
            doc: self.doc,
            ids: self.doc.node(self.id).children.iter(),
        }
    }

    /// Direct children with a matching tag.
    pub fn children_named<'t>(&self, tag: &'t str) -> ChildrenNamed<'doc, 't> {
        ChildrenNamed {
            inner: self.children(),
            tag,
        }
    }

    /// First direct child with a matching tag, or `None`.
    pub fn first_child(&self, tag: &str) -> Option<Element<'doc>> {
        self.children_named(tag).next()
    }

    /// Text of the first direct child with a matching tag.
    pub fn child_text(&self, tag: &str) -> Option<&'doc str> {
        self.first_child(tag).and_then(|child| child.text())
    }

    /// Document-order walk over every descendant with a matching tag.
    pub fn descendants_named<'t>(&self, tag: &'t str) -> DescendantsNamed<'doc, 't> {
        let mut stack: Vec<NodeId> = self.doc.node(self.id).children.clone();
        stack.reverse();
        DescendantsNamed {
            doc: self.doc,
            stack,
            tag,
        }
    }
}

/// Iterator over direct children of an element.
#[derive(Debug)]
pub struct Children<'doc> {
    doc: &'doc Document,
    ids: std::slice::Iter<'doc, NodeId>,
}

impl<'doc> Iterator for Children<'doc> {
    type Item = Element<'doc>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|&id| self.doc.element(id))
    }
}

/// Iterator over direct children filtered by tag.
#[derive(Debug)]
pub struct ChildrenNamed<'doc, 'tag> {
    inner: Children<'doc>,
    tag: &'tag str,
}

impl<'doc> Iterator for ChildrenNamed<'doc, '_> {
    type Item = Element<'doc>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|el| el.tag() == self.tag)
    }
}

/// Depth-first iterator over descendants filtered by tag.
#[derive(Debug)]
pub struct DescendantsNamed<'doc, 'tag> {
    doc: &'doc Document,
    stack: Vec<NodeId>,
    tag: &'tag str,
}

impl<'doc> Iterator for DescendantsNamed<'doc, '_> {
    type Item = Element<'doc>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let node = self.doc.node(id);
            for &child in node.children.iter().rev() {
                self.stack.push(child);
            }
            if node.tag == self.tag {
                return Some(self.doc.element(id));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, XmlError};

    const FIXTURE: &str = r#"
        <machine name="puckman" sourcefile="pacman.cpp" isdevice="no">
            <description>PuckMan (Japan set 1)</description>
            <year>1980</year>
            <rom name="pm1_prg1.6e" size="2048" crc="f36e88ab" sha1="813cecf44bf5464b1aed64b36f5047e4c79ba176"/>
            <rom name="pm1_prg2.6k" size="2048" crc="618bd9b3"/>
            <display type="raster" rotate="90" width="288" height="224"/>
        </machine>
    "#;

    #[test]
    fn attr_lookup_and_text() {
        let doc = parse(FIXTURE.as_bytes()).expect("parse fixture");
        let machine = doc.root();
        assert_eq!(machine.tag(), "machine");
        assert_eq!(machine.attr("name"), Some("puckman"));
        assert_eq!(machine.attr("cloneof"), None);
        assert_eq!(machine.child_text("description"), Some("PuckMan (Japan set 1)"));
        assert_eq!(machine.child_text("manufacturer"), None);
    }

    #[test]
    fn absent_attribute_never_errors() {
        let doc = parse(FIXTURE.as_bytes()).expect("parse fixture");
        let machine = doc.root();
        assert_eq!(machine.attr_int("missing").unwrap(), None);
        assert_eq!(machine.attr_hex("missing").unwrap(), None);
        assert_eq!(machine.attr_hex_bytes("missing").unwrap(), None);
        assert!(!machine.attr_yes_no("missing", false).unwrap());
        assert!(machine.attr_yes_no("missing", true).unwrap());
    }

    #[test]
    fn malformed_attribute_raises_coercion() {
        let doc = parse(FIXTURE.as_bytes()).expect("parse fixture");
        let machine = doc.root();
        let err = machine.attr_int("name").unwrap_err();
        assert!(matches!(err, XmlError::Coercion { .. }));
        let err = machine.attr_yes_no("sourcefile", false).unwrap_err();
        assert!(matches!(err, XmlError::Coercion { .. }));
    }

    #[test]
    fn typed_coercions() {
        let doc = parse(FIXTURE.as_bytes()).expect("parse fixture");
        let machine = doc.root();
        let rom = machine.first_child("rom").expect("first rom");
        assert_eq!(rom.attr_int("size").unwrap(), Some(2048));
        assert_eq!(rom.attr_hex("crc").unwrap(), Some(0xF36E_88AB));
        let sha1 = rom.attr_hex_bytes("sha1").unwrap().expect("sha1 present");
        assert_eq!(sha1.len(), 20);
        assert_eq!(sha1[0], 0x81);
        assert!(!machine.attr_yes_no("isdevice", true).unwrap());
        let display = machine.first_child("display").expect("display");
        assert_eq!(display.attr_int("rotate").unwrap(), Some(90));
    }

    #[test]
    fn child_iteration_is_restartable() {
        let doc = parse(FIXTURE.as_bytes()).expect("parse fixture");
        let machine = doc.root();
        let first: Vec<_> = machine.children_named("rom").map(|el| el.attr("name")).collect();
        let second: Vec<_> = machine.children_named("rom").map(|el| el.attr("name")).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn descendants_walk_in_document_order() {
        let xml = r#"<a><b name="1"><c name="2"/></b><c name="3"/></a>"#;
        let doc = parse(xml.as_bytes()).expect("parse");
        let names: Vec<_> = doc
            .root()
            .descendants_named("c")
            .filter_map(|el| el.attr("name"))
            .collect();
        assert_eq!(names, ["2", "3"]);
    }

    #[test]
    fn second_root_is_a_syntax_error() {
        let err = parse(b"<a/><b/>").unwrap_err();
        assert!(matches!(err, XmlError::Syntax(_)));
    }
}
