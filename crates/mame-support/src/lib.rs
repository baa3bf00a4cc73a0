//! Loaders for MAME's auxiliary text databases: category `.ini` folders,
//! `.dat` files, and the history database.
//!
//! Everything here is optional by design: a missing file or folder loads as
//! an empty mapping and lookups simply return nothing, so an absent support
//! file degrades functionality without breaking the caller. Damaged lines
//! inside an otherwise valid file are skipped with a warning; only a file
//! that is unparseable as a whole surfaces an error.

mod category;
mod dat;
mod history;
mod mameinfo;

pub use category::{parse_category_text, parse_nplayers_text, CategoryFolder, CategoryMap};
pub use dat::{load_dat, load_dat_async, parse_dat_text, DatFolder};
pub use history::{HistoryDb, HistoryText};
pub use mameinfo::MameInfoEntry;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use mame_xml::XmlError;

/// Error type produced by support-file loaders.
#[derive(Debug, Error)]
pub enum SupportError {
    /// The file exists but could not be parsed at all.
    #[error("unparseable support file {}: {detail}", path.display())]
    Unparseable { path: PathBuf, detail: String },
    /// Reading the file failed for a reason other than absence.
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Xml(#[from] XmlError),
}
