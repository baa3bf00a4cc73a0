//! Read-only configuration passed into every component at construction.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use mame_xml::XmlBackend;

fn default_software_from_hash_files() -> bool {
    true
}

/// Everything the facade needs to know about one MAME installation. Built
/// once, read-only thereafter. Locating the executable and the support
/// folders is the caller's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MameSettings {
    /// Path to the MAME executable.
    pub executable_path: PathBuf,
    /// Saved `-listxml` output to read instead of shelling out, making the
    /// executable itself optional.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
    /// Category folder (`categorypath` in ui.ini).
    #[serde(default)]
    pub category_path: Option<PathBuf>,
    /// Dat folder holding `history.xml`, `mameinfo.dat`, ... (`historypath`
    /// in ui.ini).
    #[serde(default)]
    pub dats_path: Option<PathBuf>,
    /// Folders holding software list `.xml` files (`hashpath` in mame.ini).
    #[serde(default)]
    pub hash_paths: Vec<PathBuf>,
    /// XML parser selection for whole-document parses.
    #[serde(default = "XmlBackend::preferred")]
    pub xml_backend: XmlBackend,
    /// Read software lists from the hash-path files instead of
    /// `-getsoftlist`: avoids a subprocess, and the files carry the notes
    /// field that the command's DTD drops.
    #[serde(default = "default_software_from_hash_files")]
    pub software_from_hash_files: bool,
}

impl MameSettings {
    pub fn new(executable_path: impl Into<PathBuf>) -> Self {
        MameSettings {
            executable_path: executable_path.into(),
            snapshot_path: None,
            category_path: None,
            dats_path: None,
            hash_paths: Vec::new(),
            xml_backend: XmlBackend::preferred(),
            software_from_hash_files: true,
        }
    }

    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn with_categories(mut self, path: impl Into<PathBuf>) -> Self {
        self.category_path = Some(path.into());
        self
    }

    pub fn with_dats(mut self, path: impl Into<PathBuf>) -> Self {
        self.dats_path = Some(path.into());
        self
    }

    pub fn with_hash_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hash_paths.push(path.into());
        self
    }

    pub fn with_backend(mut self, backend: XmlBackend) -> Self {
        self.xml_backend = backend;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates() {
        let settings = MameSettings::new("/usr/bin/mame")
            .with_snapshot("/data/listxml.xml")
            .with_categories("/data/folders")
            .with_dats("/data/dats")
            .with_hash_path("/usr/share/mame/hash")
            .with_hash_path("/home/me/hash");
        assert_eq!(settings.executable_path, PathBuf::from("/usr/bin/mame"));
        assert_eq!(settings.hash_paths.len(), 2);
        assert!(settings.software_from_hash_files);
    }

    #[test]
    fn serde_round_trip_fills_defaults() {
        let settings: MameSettings =
            serde_json::from_str(r#"{"executable_path": "/usr/bin/mame"}"#).expect("deserialize");
        assert!(settings.snapshot_path.is_none());
        assert!(settings.hash_paths.is_empty());
        assert!(settings.software_from_hash_files);
        let text = serde_json::to_string(&settings).expect("serialize");
        assert!(text.contains("executable_path"));
    }
}
