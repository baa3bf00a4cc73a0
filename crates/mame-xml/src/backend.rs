//! Parser backends. Both produce structurally identical [`Document`]s; the
//! selection is made once at configuration time and downstream code never
//! sees which one ran.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::arena::{Document, DocumentBuilder};
use crate::XmlError;

/// Which parser implementation to use for whole-document parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum XmlBackend {
    /// Streaming event parser; always available.
    #[default]
    Builtin,
    /// DOM fast path (roxmltree). Falls back to the built-in parser when the
    /// `roxmltree` feature is not compiled in.
    Fast,
}

impl XmlBackend {
    /// The fastest backend compiled into this build.
    pub fn preferred() -> Self {
        if cfg!(feature = "roxmltree") {
            XmlBackend::Fast
        } else {
            XmlBackend::Builtin
        }
    }
}

/// Parse a whole document with the built-in event parser.
pub fn parse(bytes: &[u8]) -> Result<Document, XmlError> {
    parse_events(bytes)
}

/// Parse a whole document with the selected backend.
pub fn parse_with(bytes: &[u8], backend: XmlBackend) -> Result<Document, XmlError> {
    match backend {
        XmlBackend::Builtin => parse_events(bytes),
        #[cfg(feature = "roxmltree")]
        XmlBackend::Fast => parse_dom(bytes),
        #[cfg(not(feature = "roxmltree"))]
        XmlBackend::Fast => {
            tracing::warn!("fast XML backend not compiled in, using built-in parser");
            parse_events(bytes)
        }
    }
}

pub(crate) fn collect_attrs(event: &BytesStart<'_>) -> Result<Vec<(String, String)>, XmlError> {
    let mut attrs = Vec::new();
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Syntax(err.to_string()))?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Syntax(err.to_string()))?
            .into_owned();
        attrs.push((name, value));
    }
    Ok(attrs)
}

pub(crate) fn tag_name(event: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(event.name().as_ref()).into_owned()
}

fn parse_events(bytes: &[u8]) -> Result<Document, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut builder = DocumentBuilder::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                builder.open(tag_name(&e), collect_attrs(&e)?)?;
            }
            Ok(Event::Empty(e)) => {
                builder.open(tag_name(&e), collect_attrs(&e)?)?;
                builder.close()?;
            }
            Ok(Event::End(_)) => builder.close()?,
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|err| XmlError::Syntax(err.to_string()))?;
                builder.text(&text);
            }
            Ok(Event::CData(data)) => {
                builder.text(&String::from_utf8_lossy(data.as_ref()));
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(XmlError::Syntax(err.to_string())),
            // declarations, doctype, comments, processing instructions
            Ok(_) => {}
        }
        buf.clear();
    }

    builder.finish()
}

#[cfg(feature = "roxmltree")]
fn parse_dom(bytes: &[u8]) -> Result<Document, XmlError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| XmlError::Syntax(format!("invalid UTF-8: {err}")))?;
    let dom = roxmltree::Document::parse(text).map_err(|err| XmlError::Syntax(err.to_string()))?;
    let mut builder = DocumentBuilder::new();
    build_dom_node(&mut builder, dom.root_element())?;
    builder.finish()
}

#[cfg(feature = "roxmltree")]
fn build_dom_node(
    builder: &mut DocumentBuilder,
    node: roxmltree::Node<'_, '_>,
) -> Result<(), XmlError> {
    let attrs = node
        .attributes()
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();
    builder.open(node.tag_name().name().to_string(), attrs)?;
    for child in node.children() {
        if child.is_element() {
            build_dom_node(builder, child)?;
        } else if child.is_text() {
            // mirror the event backend's trim_text behaviour
            if let Some(text) = child.text() {
                builder.text(text.trim());
            }
        }
    }
    builder.close()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0"?>
        <!-- listing excerpt -->
        <mame build="0.262">
            <machine name="puckman">
                <description>PuckMan &amp; friends</description>
                <rom name="pm1_prg1.6e" size="2048"/>
            </machine>
            <machine name="pacman" cloneof="puckman">
                <description>Pac-Man</description>
            </machine>
        </mame>
    "#;

    #[test]
    fn event_parse_builds_the_tree() {
        let doc = parse(FIXTURE.as_bytes()).expect("parse");
        let root = doc.root();
        assert_eq!(root.tag(), "mame");
        assert_eq!(root.attr("build"), Some("0.262"));
        let machines: Vec<_> = root.children_named("machine").collect();
        assert_eq!(machines.len(), 2);
        assert_eq!(
            machines[0].child_text("description"),
            Some("PuckMan & friends")
        );
        assert_eq!(machines[1].attr("cloneof"), Some("puckman"));
    }

    #[test]
    fn unparseable_input_is_a_syntax_error() {
        assert!(matches!(
            parse(b"<mame><machine></mame>"),
            Err(XmlError::Syntax(_))
        ));
        assert!(matches!(parse(b"not xml at all"), Err(XmlError::Syntax(_))));
    }

    #[test]
    fn backend_selection_parses_either_way() {
        let via_builtin = parse_with(FIXTURE.as_bytes(), XmlBackend::Builtin).expect("builtin");
        let via_fast = parse_with(FIXTURE.as_bytes(), XmlBackend::Fast).expect("fast");
        assert!(documents_equal(&via_builtin, &via_fast));
    }

    #[cfg(feature = "roxmltree")]
    #[test]
    fn backends_produce_identical_documents() {
        let a = parse_with(FIXTURE.as_bytes(), XmlBackend::Builtin).expect("builtin");
        let b = parse_with(FIXTURE.as_bytes(), XmlBackend::Fast).expect("fast");
        assert!(documents_equal(&a, &b));
    }

    fn documents_equal(a: &Document, b: &Document) -> bool {
        elements_equal(a.root(), b.root())
    }

    fn elements_equal(a: crate::Element<'_>, b: crate::Element<'_>) -> bool {
        if a.tag() != b.tag() || a.text() != b.text() {
            return false;
        }
        if !a.attrs().eq(b.attrs()) {
            return false;
        }
        let lhs: Vec<_> = a.children().collect();
        let rhs: Vec<_> = b.children().collect();
        lhs.len() == rhs.len()
            && lhs
                .into_iter()
                .zip(rhs)
                .all(|(x, y)| elements_equal(x, y))
    }
}
