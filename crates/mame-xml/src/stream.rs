//! Streaming extraction of record subtrees from large listings.
//!
//! A full `-listxml` dump runs to hundreds of megabytes; this reader walks
//! the event stream and materialises one small [`Document`] per record tag,
//! so callers never hold the whole listing in memory.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::arena::{Document, DocumentBuilder};
use crate::backend::{collect_attrs, tag_name};
use crate::XmlError;

/// Iterator over `<TAG>...</TAG>` subtrees of an XML stream, each yielded as
/// its own document. Always event-based, regardless of the configured
/// whole-document backend.
pub struct FragmentReader<R: BufRead> {
    reader: Reader<R>,
    tag: String,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> FragmentReader<R> {
    /// Scan `input` for subtrees rooted at elements named `tag`.
    pub fn new(input: R, tag: &str) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);
        FragmentReader {
            reader,
            tag: tag.to_string(),
            buf: Vec::new(),
            done: false,
        }
    }

    fn read_fragment(&mut self, builder: &mut DocumentBuilder) -> Result<Document, XmlError> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => {
                    builder.open(tag_name(&e), collect_attrs(&e)?)?;
                }
                Ok(Event::Empty(e)) => {
                    builder.open(tag_name(&e), collect_attrs(&e)?)?;
                    builder.close()?;
                }
                Ok(Event::End(_)) => {
                    builder.close()?;
                    if builder.depth() == 0 {
                        let finished = std::mem::take(builder);
                        return finished.finish();
                    }
                }
                Ok(Event::Text(text)) => {
                    let text = text
                        .unescape()
                        .map_err(|err| XmlError::Syntax(err.to_string()))?;
                    builder.text(&text);
                }
                Ok(Event::CData(data)) => {
                    builder.text(&String::from_utf8_lossy(data.as_ref()));
                }
                Ok(Event::Eof) => {
                    return Err(XmlError::Syntax(format!(
                        "input ended inside a <{}> record",
                        self.tag
                    )));
                }
                Err(err) => return Err(XmlError::Syntax(err.to_string())),
                Ok(_) => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for FragmentReader<R> {
    type Item = Result<Document, XmlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // decide on owned data first: the event borrows the read buffer,
        // which read_fragment needs back
        enum Step {
            Open(Result<Vec<(String, String)>, XmlError>),
            Leaf(Result<Vec<(String, String)>, XmlError>),
            Eof,
            Fail(XmlError),
            Skip,
        }
        loop {
            self.buf.clear();
            let step = match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) if tag_name(&e) == self.tag => Step::Open(collect_attrs(&e)),
                Ok(Event::Empty(e)) if tag_name(&e) == self.tag => Step::Leaf(collect_attrs(&e)),
                Ok(Event::Eof) => Step::Eof,
                Err(err) => Step::Fail(XmlError::Syntax(err.to_string())),
                // anything outside a record: surrounding elements, text, doctype
                Ok(_) => Step::Skip,
            };
            match step {
                Step::Open(attrs) => {
                    let mut builder = DocumentBuilder::new();
                    let opened =
                        attrs.and_then(|attrs| builder.open(self.tag.clone(), attrs).map(|_| ()));
                    if let Err(err) = opened {
                        self.done = true;
                        return Some(Err(err));
                    }
                    let fragment = self.read_fragment(&mut builder);
                    if fragment.is_err() {
                        self.done = true;
                    }
                    return Some(fragment);
                }
                Step::Leaf(attrs) => {
                    let mut builder = DocumentBuilder::new();
                    let doc = attrs.and_then(|attrs| {
                        builder.open(self.tag.clone(), attrs)?;
                        builder.close()?;
                        builder.finish()
                    });
                    if doc.is_err() {
                        self.done = true;
                    }
                    return Some(doc);
                }
                Step::Eof => {
                    self.done = true;
                    return None;
                }
                Step::Fail(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
                Step::Skip => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<?xml version="1.0"?>
        <!DOCTYPE mame [ <!ELEMENT mame (machine*)> ]>
        <mame build="0.262">
            <machine name="puckman">
                <description>PuckMan</description>
                <rom name="pm1_prg1.6e" size="2048"/>
                <rom name="pm1_prg2.6k" size="2048"/>
            </machine>
            <machine name="pacman" cloneof="puckman">
                <description>Pac-Man</description>
            </machine>
            <machine name="maketrax"/>
        </mame>
    "#;

    #[test]
    fn yields_one_document_per_record() {
        let fragments: Vec<_> = FragmentReader::new(LISTING.as_bytes(), "machine")
            .collect::<Result<_, _>>()
            .expect("stream listing");
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].root().attr("name"), Some("puckman"));
        assert_eq!(fragments[0].root().children_named("rom").count(), 2);
        assert_eq!(fragments[1].root().attr("cloneof"), Some("puckman"));
        assert_eq!(fragments[2].root().children().count(), 0);
    }

    #[test]
    fn surrounding_document_is_ignored() {
        let fragments: Vec<_> = FragmentReader::new(LISTING.as_bytes(), "rom")
            .collect::<Result<_, _>>()
            .expect("stream roms");
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].root().attr("name"), Some("pm1_prg1.6e"));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut reader = FragmentReader::new(&b""[..], "machine");
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncated_record_surfaces_a_syntax_error() {
        let input = r#"<mame><machine name="puckman"><rom name="a""#;
        let mut reader = FragmentReader::new(input.as_bytes(), "machine");
        let first = reader.next().expect("one item");
        assert!(first.is_err());
        assert!(reader.next().is_none());
    }
}
