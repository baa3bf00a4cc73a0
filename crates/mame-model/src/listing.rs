//! Iteration over machine records in a listing document.

use std::collections::BTreeMap;
use std::sync::Arc;

use mame_xml::{parse_with, ChildrenNamed, Document, XmlBackend, XmlError};
use tracing::warn;

use crate::machine::MachineElement;

/// Iterate the `<machine>` records that are direct children of the listing
/// root, in document order. Records missing their `name` attribute, or
/// failing scalar coercion, are skipped with a warning; a single stub record
/// must not abort the scan. Re-invoking re-walks the document.
pub fn machine_elements(doc: &Arc<Document>) -> Machines<'_> {
    Machines {
        doc,
        inner: doc.root().children_named("machine"),
    }
}

/// Iterator over the machine records of a listing document.
pub struct Machines<'a> {
    doc: &'a Arc<Document>,
    inner: ChildrenNamed<'a, 'static>,
}

impl Iterator for Machines<'_> {
    type Item = MachineElement;

    fn next(&mut self) -> Option<Self::Item> {
        for el in self.inner.by_ref() {
            match MachineElement::new(Arc::clone(self.doc), el.id()) {
                Ok(machine) => return Some(machine),
                Err(err) => {
                    warn!(error = %err, "skipping malformed <machine> record");
                }
            }
        }
        None
    }
}

/// A whole machine listing, held as one document.
#[derive(Debug)]
pub struct MachineListing {
    doc: Arc<Document>,
}

impl MachineListing {
    pub fn new(doc: Document) -> Self {
        MachineListing { doc: Arc::new(doc) }
    }

    /// Parse a saved `-listxml` dump with the selected backend.
    pub fn parse(bytes: &[u8], backend: XmlBackend) -> Result<Self, XmlError> {
        Ok(MachineListing::new(parse_with(bytes, backend)?))
    }

    /// The `build` attribute of the listing root: the emitting MAME version.
    pub fn build_version(&self) -> Option<&str> {
        self.doc.root().attr("build")
    }

    /// Iterate the machine records; restartable.
    pub fn machines(&self) -> Machines<'_> {
        machine_elements(&self.doc)
    }

    /// Materialise the listing into a basename-keyed map. Basenames are
    /// unique within a listing snapshot; a duplicate keeps the first record.
    pub fn to_map(&self) -> BTreeMap<String, MachineElement> {
        let mut map = BTreeMap::new();
        for machine in self.machines() {
            let basename = machine.basename().to_string();
            if map.contains_key(&basename) {
                warn!(machine = %basename, "duplicate basename in listing, keeping first");
                continue;
            }
            map.insert(basename, machine);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mame_xml::parse;

    const LISTING: &str = r#"
        <mame build="0.262 (mame0262)">
            <machine name="puckman">
                <description>PuckMan</description>
            </machine>
            <machine>
                <description>stub with no name</description>
            </machine>
            <machine name="pacman" cloneof="puckman" romof="puckman">
                <description>Pac-Man</description>
            </machine>
        </mame>
    "#;

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let listing = MachineListing::new(parse(LISTING.as_bytes()).unwrap());
        let names: Vec<_> = listing
            .machines()
            .map(|m| m.basename().to_string())
            .collect();
        assert_eq!(names, ["puckman", "pacman"]);
    }

    #[test]
    fn reiteration_yields_identical_results() {
        let listing = MachineListing::new(parse(LISTING.as_bytes()).unwrap());
        let first: Vec<_> = listing
            .machines()
            .map(|m| m.basename().to_string())
            .collect();
        let second: Vec<_> = listing
            .machines()
            .map(|m| m.basename().to_string())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn listing_metadata_and_map() {
        let listing = MachineListing::new(parse(LISTING.as_bytes()).unwrap());
        assert_eq!(listing.build_version(), Some("0.262 (mame0262)"));
        let map = listing.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["pacman"].clone_of(), Some("puckman"));
    }
}
