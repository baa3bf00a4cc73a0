//! Typed models over MAME's XML documents.
//!
//! A listing record wraps its arena document and pulls the cheap scalar
//! attributes out eagerly; everything expensive (ROM tables, input trees,
//! software parts) is extracted on first access and cached. Records that are
//! missing their identifying attribute are skipped with a warning rather than
//! aborting a whole-listing scan, since real `-listxml` output occasionally
//! contains stub records.

mod history;
mod listing;
mod machine;
mod software;

pub use history::{HistoryEntryElement, HistoryXml};
pub use listing::{machine_elements, MachineListing, Machines};
pub use machine::{
    BiosSet, ChipEntry, ChipKind, ControlInfo, DiskEntry, DisplayEntry, DisplayKind, DriverInfo,
    DriverStatus, FeatureCondition, FeatureStatus, InputInfo, MachineElement, MediaDevice,
    RamOption, RomEntry, SoftwareListRef, SoftwareListStatus,
};
pub use software::{
    DataArea, DiskArea, Endianness, InfoPair, SoftwareDisk, SoftwareElement, SoftwareListElement,
    SoftwarePart, SoftwareRom, SoftwareSupport,
};

use mame_xml::{Element, XmlError};
use thiserror::Error;

/// Error type produced when building typed models from parsed documents.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A record lacks an attribute the model cannot exist without.
    #[error("<{tag}> record is missing required attribute '{attr}'")]
    MissingAttribute {
        tag: &'static str,
        attr: &'static str,
    },
    /// The underlying document or an attribute coercion failed.
    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// Dump quality of a ROM or disk image, shared between machine listings and
/// software lists. Missing attribute means a good dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpStatus {
    #[default]
    Good,
    BadDump,
    NoDump,
}

impl DumpStatus {
    fn from_attr(el: &Element<'_>, name: &str) -> Result<Self, XmlError> {
        match el.attr(name) {
            None | Some("good") => Ok(DumpStatus::Good),
            Some("baddump") => Ok(DumpStatus::BadDump),
            Some("nodump") => Ok(DumpStatus::NoDump),
            Some(other) => Err(coercion(name, other, "good, baddump or nodump")),
        }
    }
}

pub(crate) fn coercion(name: &str, value: &str, expected: &'static str) -> XmlError {
    XmlError::Coercion {
        name: name.to_string(),
        value: value.to_string(),
        expected,
    }
}

pub(crate) fn required_attr(
    el: &Element<'_>,
    tag: &'static str,
    attr: &'static str,
) -> Result<String, ModelError> {
    el.attr(attr)
        .map(str::to_string)
        .ok_or(ModelError::MissingAttribute { tag, attr })
}

pub(crate) fn attr_u64(el: &Element<'_>, name: &str) -> Result<Option<u64>, XmlError> {
    match el.attr_int(name)? {
        None => Ok(None),
        Some(value) => u64::try_from(value)
            .map(Some)
            .map_err(|_| coercion(name, &value.to_string(), "a non-negative integer")),
    }
}

pub(crate) fn attr_f64(el: &Element<'_>, name: &str) -> Result<Option<f64>, XmlError> {
    match el.attr(name).map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| coercion(name, value, "a number")),
    }
}
