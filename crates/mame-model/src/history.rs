//! Model over MAME's `history.xml`: entries of free text applicable to
//! systems, software items, or both at once.

use std::sync::Arc;

use mame_xml::{parse_with, Document, Element, XmlBackend, XmlError};

/// A parsed `history.xml` document.
#[derive(Debug)]
pub struct HistoryXml {
    doc: Arc<Document>,
}

impl HistoryXml {
    pub fn new(doc: Document) -> Self {
        HistoryXml { doc: Arc::new(doc) }
    }

    pub fn parse(bytes: &[u8], backend: XmlBackend) -> Result<Self, XmlError> {
        Ok(HistoryXml::new(parse_with(bytes, backend)?))
    }

    /// Iterate all `<entry>` elements.
    pub fn entries(&self) -> impl Iterator<Item = HistoryEntryElement<'_>> {
        self.doc
            .root()
            .children_named("entry")
            .map(|el| HistoryEntryElement { el })
    }

    /// `(system basename, entry text)` pairs, one per system an entry with
    /// text applies to.
    pub fn system_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries().flat_map(|entry| {
            let text = entry.text();
            entry
                .systems()
                .filter_map(move |system| text.map(|t| (system, t)))
                .collect::<Vec<_>>()
        })
    }

    /// `(list basename, software basename, entry text)` triples.
    pub fn software_entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.entries().flat_map(|entry| {
            let text = entry.text();
            entry
                .software_items()
                .filter_map(move |(list, software)| text.map(|t| (list, software, t)))
                .collect::<Vec<_>>()
        })
    }
}

/// One `<entry>` element. An entry can apply to systems and software at the
/// same time (the ST-V titles do).
#[derive(Debug, Clone, Copy)]
pub struct HistoryEntryElement<'doc> {
    el: Element<'doc>,
}

impl<'doc> HistoryEntryElement<'doc> {
    /// The entry body.
    pub fn text(&self) -> Option<&'doc str> {
        self.el.child_text("text")
    }

    /// Basenames of the systems this entry covers.
    pub fn systems(&self) -> impl Iterator<Item = &'doc str> {
        self.el
            .first_child("systems")
            .into_iter()
            .flat_map(|systems| systems.children_named("system"))
            .filter_map(|system| system.attr("name"))
    }

    /// `(list, software)` pairs this entry covers.
    pub fn software_items(&self) -> impl Iterator<Item = (&'doc str, &'doc str)> {
        self.el
            .first_child("software")
            .into_iter()
            .flat_map(|software| software.children_named("item"))
            .filter_map(|item| Some((item.attr("list")?, item.attr("name")?)))
    }
}
