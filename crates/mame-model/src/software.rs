//! Software list documents: `<softwarelist>` from `-getsoftlist` output or
//! the hash-path `.xml` files.

use std::sync::{Arc, OnceLock};

use mame_xml::{parse_with, Document, Element, NodeId, XmlBackend, XmlError};
use tracing::warn;

use crate::{attr_u64, coercion, required_attr, DumpStatus, ModelError};

/// A repeated name/value pair, used for `<info>`, `<sharedfeat>` and part
/// `<feature>` elements. Names may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoPair {
    pub name: String,
    pub value: Option<String>,
}

impl InfoPair {
    fn from_element(el: &Element<'_>, tag: &'static str) -> Result<Self, ModelError> {
        Ok(InfoPair {
            name: el
                .attr("name")
                .map(str::to_string)
                .ok_or(ModelError::MissingAttribute { tag, attr: "name" })?,
            value: el.attr("value").map(str::to_string),
        })
    }
}

/// Byte order of a data area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    Big,
    #[default]
    Little,
}

/// One ROM file inside a data area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareRom {
    pub name: Option<String>,
    pub size: Option<u64>,
    pub crc: Option<u32>,
    pub sha1: Option<Vec<u8>>,
    pub offset: Option<i64>,
    /// Fill value used with certain load flags.
    pub value: Option<String>,
    pub status: DumpStatus,
    /// Raw load flag (`load16_byte`, `fill`, `continue`, ...).
    pub load_flag: Option<String>,
}

impl SoftwareRom {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        Ok(SoftwareRom {
            name: el.attr("name").map(str::to_string),
            size: attr_u64(el, "size")?,
            crc: el.attr_hex("crc")?,
            sha1: el.attr_hex_bytes("sha1")?,
            offset: el.attr_int("offset")?,
            value: el.attr("value").map(str::to_string),
            status: DumpStatus::from_attr(el, "status")?,
            load_flag: el.attr("loadflag").map(str::to_string),
        })
    }
}

/// A `<dataarea>` block: a sized region and the ROMs loaded into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataArea {
    pub name: String,
    pub size: Option<u64>,
    /// Bus width in bits: 8, 16, 32 or 64.
    pub width: i64,
    pub endianness: Endianness,
    pub roms: Vec<SoftwareRom>,
}

impl DataArea {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        let endianness = match el.attr("endianness") {
            None | Some("little") => Endianness::Little,
            Some("big") => Endianness::Big,
            Some(other) => return Err(coercion("endianness", other, "big or little").into()),
        };
        Ok(DataArea {
            name: required_attr(el, "dataarea", "name")?,
            size: attr_u64(el, "size")?,
            width: el.attr_int("width")?.unwrap_or(8),
            endianness,
            roms: el
                .children_named("rom")
                .map(|rom| SoftwareRom::from_element(&rom))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// One disk image inside a disk area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareDisk {
    pub name: String,
    pub sha1: Option<Vec<u8>>,
    pub status: DumpStatus,
    pub writeable: bool,
}

/// A `<diskarea>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskArea {
    pub name: String,
    pub disks: Vec<SoftwareDisk>,
}

impl DiskArea {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        let disks = el
            .children_named("disk")
            .map(|disk| {
                Ok(SoftwareDisk {
                    name: required_attr(&disk, "disk", "name")?,
                    sha1: disk.attr_hex_bytes("sha1")?,
                    status: DumpStatus::from_attr(&disk, "status")?,
                    // software lists spell this "writeable"
                    writeable: disk.attr_yes_no("writeable", false)?,
                })
            })
            .collect::<Result<_, ModelError>>()?;
        Ok(DiskArea {
            name: required_attr(el, "diskarea", "name")?,
            disks,
        })
    }
}

/// One loadable `<part>` of a software item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwarePart {
    pub name: String,
    pub interface: Option<String>,
    pub features: Vec<InfoPair>,
    pub data_areas: Vec<DataArea>,
    pub disk_areas: Vec<DiskArea>,
}

impl SoftwarePart {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        Ok(SoftwarePart {
            name: required_attr(el, "part", "name")?,
            interface: el.attr("interface").map(str::to_string),
            features: el
                .children_named("feature")
                .map(|f| InfoPair::from_element(&f, "feature"))
                .collect::<Result<_, _>>()?,
            data_areas: el
                .children_named("dataarea")
                .map(|area| DataArea::from_element(&area))
                .collect::<Result<_, _>>()?,
            disk_areas: el
                .children_named("diskarea")
                .map(|area| DiskArea::from_element(&area))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Value of a named feature, when present.
    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features
            .iter()
            .find(|pair| pair.name == name)
            .and_then(|pair| pair.value.as_deref())
    }
}

/// How well a software item runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoftwareSupport {
    #[default]
    Supported,
    Partial,
    Unsupported,
}

/// One `<software>` item in a list.
#[derive(Debug)]
pub struct SoftwareElement {
    doc: Arc<Document>,
    node: NodeId,
    basename: String,
    description: Option<String>,
    clone_of: Option<String>,
    supported: SoftwareSupport,
    year: Option<String>,
    publisher: Option<String>,
    infos: OnceLock<Vec<InfoPair>>,
    shared_features: OnceLock<Vec<InfoPair>>,
    parts: OnceLock<Vec<SoftwarePart>>,
}

impl SoftwareElement {
    pub fn new(doc: Arc<Document>, node: NodeId) -> Result<Self, ModelError> {
        let el = doc.element(node);
        let basename = required_attr(&el, "software", "name")?;
        let supported = match el.attr("supported") {
            None | Some("yes") => SoftwareSupport::Supported,
            Some("partial") => SoftwareSupport::Partial,
            Some("no") => SoftwareSupport::Unsupported,
            Some(other) => return Err(coercion("supported", other, "yes, partial or no").into()),
        };
        Ok(SoftwareElement {
            basename,
            description: el.child_text("description").map(str::to_string),
            clone_of: el.attr("cloneof").map(str::to_string),
            supported,
            year: el.child_text("year").map(str::to_string),
            publisher: el.child_text("publisher").map(str::to_string),
            infos: OnceLock::new(),
            shared_features: OnceLock::new(),
            parts: OnceLock::new(),
            doc,
            node,
        })
    }

    fn element(&self) -> Element<'_> {
        self.doc.element(self.node)
    }

    /// Short identifier, unique within the owning list.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Human readable name; falls back to the basename.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.basename)
    }

    pub fn clone_of(&self) -> Option<&str> {
        self.clone_of.as_deref()
    }

    pub fn supported(&self) -> SoftwareSupport {
        self.supported
    }

    pub fn raw_year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    pub fn year(&self) -> Option<i64> {
        self.year.as_deref().and_then(|y| y.parse().ok())
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    /// Compatibility notes; only emitted when reading hash files directly,
    /// the `-getsoftlist` DTD drops the element.
    pub fn notes(&self) -> Option<&str> {
        self.element().child_text("notes")
    }

    /// `<info>` pairs; names may repeat.
    pub fn infos(&self) -> Result<&[InfoPair], ModelError> {
        if let Some(infos) = self.infos.get() {
            return Ok(infos);
        }
        let parsed = self
            .element()
            .children_named("info")
            .map(|info| InfoPair::from_element(&info, "info"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.infos.get_or_init(|| parsed))
    }

    /// `<sharedfeat>` pairs shared with the machine.
    pub fn shared_features(&self) -> Result<&[InfoPair], ModelError> {
        if let Some(feats) = self.shared_features.get() {
            return Ok(feats);
        }
        let parsed = self
            .element()
            .children_named("sharedfeat")
            .map(|feat| InfoPair::from_element(&feat, "sharedfeat"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.shared_features.get_or_init(|| parsed))
    }

    /// Loadable parts; extracted on first access.
    pub fn parts(&self) -> Result<&[SoftwarePart], ModelError> {
        if let Some(parts) = self.parts.get() {
            return Ok(parts);
        }
        let parsed = self
            .element()
            .children_named("part")
            .map(|part| SoftwarePart::from_element(&part))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.parts.get_or_init(|| parsed))
    }

    /// Part by name.
    pub fn part(&self, name: &str) -> Result<Option<&SoftwarePart>, ModelError> {
        Ok(self.parts()?.iter().find(|part| part.name == name))
    }

    /// First value of a named `<info>` pair.
    pub fn info(&self, name: &str) -> Result<Option<&str>, ModelError> {
        Ok(self
            .infos()?
            .iter()
            .find(|pair| pair.name == name)
            .and_then(|pair| pair.value.as_deref()))
    }
}

/// One `<softwarelist>` document.
#[derive(Debug)]
pub struct SoftwareListElement {
    doc: Arc<Document>,
    node: NodeId,
    basename: String,
    description: Option<String>,
    software: OnceLock<Vec<SoftwareElement>>,
}

impl SoftwareListElement {
    pub fn new(doc: Arc<Document>, node: NodeId) -> Result<Self, ModelError> {
        let el = doc.element(node);
        Ok(SoftwareListElement {
            basename: required_attr(&el, "softwarelist", "name")?,
            description: el.attr("description").map(str::to_string),
            software: OnceLock::new(),
            doc,
            node,
        })
    }

    /// Build from a whole document. `-getsoftlist` wraps the list in a
    /// `<softwarelists>` root; hash files have `<softwarelist>` at the top.
    pub fn from_document(doc: Document) -> Result<Self, ModelError> {
        let doc = Arc::new(doc);
        let root = doc.root();
        let node = if root.tag() == "softwarelist" {
            root.id()
        } else {
            root.first_child("softwarelist")
                .map(|el| el.id())
                .ok_or(ModelError::MissingAttribute {
                    tag: "softwarelist",
                    attr: "name",
                })?
        };
        SoftwareListElement::new(doc, node)
    }

    /// Parse software list XML with the selected backend.
    pub fn parse(bytes: &[u8], backend: XmlBackend) -> Result<Self, XmlError> {
        let doc = parse_with(bytes, backend)?;
        SoftwareListElement::from_document(doc).map_err(|err| match err {
            ModelError::Xml(err) => err,
            other => XmlError::Syntax(other.to_string()),
        })
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Human readable name; falls back to the basename.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.basename)
    }

    /// All software items, in document order. Items missing their `name`
    /// are skipped with a warning.
    pub fn software(&self) -> &[SoftwareElement] {
        self.software.get_or_init(|| {
            self.doc
                .element(self.node)
                .children_named("software")
                .filter_map(
                    |el| match SoftwareElement::new(Arc::clone(&self.doc), el.id()) {
                        Ok(software) => Some(software),
                        Err(err) => {
                            warn!(error = %err, "skipping malformed <software> record");
                            None
                        }
                    },
                )
                .collect()
        })
    }

    /// Software item by basename.
    pub fn get(&self, basename: &str) -> Option<&SoftwareElement> {
        self.software()
            .iter()
            .find(|software| software.basename() == basename)
    }

    pub fn len(&self) -> usize {
        self.software().len()
    }

    pub fn is_empty(&self) -> bool {
        self.software().is_empty()
    }
}
