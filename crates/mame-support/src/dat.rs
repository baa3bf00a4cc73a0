//! Text `.dat` databases (`history.dat`, `mameinfo.dat`, `messinfo.dat`)
//! and a lazily-caching view over a folder of them.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use mame_xml::XmlBackend;

use crate::history::HistoryDb;
use crate::{HistoryText, SupportError};

/// Parse `.dat` records: `$info=KEY` opens a record, `$end` closes it, and
/// the first body line (the `$mame`/`$bio` marker) is dropped. The key is
/// kept byte-for-byte, comma lists included.
pub fn parse_dat_text(text: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("$info=") {
            if let Some((key, _)) = current.take() {
                warn!(%key, "dat record was not closed with $end");
            }
            current = Some((rest.to_string(), Vec::new()));
        } else if line == "$end" {
            if let Some((key, lines)) = current.take() {
                let body = lines.iter().skip(1).copied().collect::<Vec<_>>().join("\n");
                entries.insert(key, body);
            }
        } else if let Some((_, lines)) = &mut current {
            lines.push(line);
        }
    }
    entries
}

/// Load one `.dat` file. Missing file → empty mapping.
pub fn load_dat(path: &Path) -> Result<BTreeMap<String, String>, SupportError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(parse_dat_text(&String::from_utf8_lossy(&bytes))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(err) => Err(err.into()),
    }
}

/// Async variant of [`load_dat`].
pub async fn load_dat_async(path: &Path) -> Result<BTreeMap<String, String>, SupportError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(parse_dat_text(&String::from_utf8_lossy(&bytes))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(err) => Err(err.into()),
    }
}

type DatCache = BTreeMap<String, Arc<BTreeMap<String, String>>>;

/// A folder of `.dat` files plus `history.xml`. Each file is parsed on
/// first use and cached for the life of the value.
#[derive(Debug)]
pub struct DatFolder {
    path: PathBuf,
    backend: XmlBackend,
    dats: Mutex<DatCache>,
    history: Mutex<Option<Option<Arc<HistoryDb>>>>,
}

impl DatFolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DatFolder {
            path: path.into(),
            backend: XmlBackend::default(),
            dats: Mutex::new(BTreeMap::new()),
            history: Mutex::new(None),
        }
    }

    /// Select the XML backend used for `history.xml`.
    pub fn with_backend(path: impl Into<PathBuf>, backend: XmlBackend) -> Self {
        DatFolder {
            backend,
            ..DatFolder::new(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dat_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.dat"))
    }

    fn cached_dat(&self, name: &str) -> Option<Arc<BTreeMap<String, String>>> {
        self.dats
            .lock()
            .expect("dat cache lock poisoned")
            .get(name)
            .cloned()
    }

    fn store_dat(&self, name: &str, dat: BTreeMap<String, String>) -> Arc<BTreeMap<String, String>> {
        let dat = Arc::new(dat);
        self.dats
            .lock()
            .expect("dat cache lock poisoned")
            .insert(name.to_string(), Arc::clone(&dat));
        dat
    }

    /// The whole mapping of `NAME.dat`, parsed on first use.
    pub fn dat(&self, name: &str) -> Result<Arc<BTreeMap<String, String>>, SupportError> {
        if let Some(dat) = self.cached_dat(name) {
            return Ok(dat);
        }
        let path = self.dat_path(name);
        debug!(file = %path.display(), "loading dat file");
        Ok(self.store_dat(name, load_dat(&path)?))
    }

    /// Async variant of [`dat`](Self::dat).
    pub async fn dat_async(&self, name: &str) -> Result<Arc<BTreeMap<String, String>>, SupportError> {
        if let Some(dat) = self.cached_dat(name) {
            return Ok(dat);
        }
        let path = self.dat_path(name);
        debug!(file = %path.display(), "loading dat file");
        let dat = load_dat_async(&path).await?;
        Ok(self.store_dat(name, dat))
    }

    /// Entry text for a basename in `NAME.dat`.
    pub fn entry(&self, name: &str, basename: &str) -> Result<Option<String>, SupportError> {
        Ok(self.dat(name)?.get(basename).cloned())
    }

    /// Async variant of [`entry`](Self::entry).
    pub async fn entry_async(
        &self,
        name: &str,
        basename: &str,
    ) -> Result<Option<String>, SupportError> {
        Ok(self.dat_async(name).await?.get(basename).cloned())
    }

    fn cached_history(&self) -> Option<Option<Arc<HistoryDb>>> {
        self.history
            .lock()
            .expect("history cache lock poisoned")
            .clone()
    }

    fn store_history(&self, db: Option<HistoryDb>) -> Option<Arc<HistoryDb>> {
        let db = db.map(Arc::new);
        *self.history.lock().expect("history cache lock poisoned") = Some(db.clone());
        db
    }

    /// The history database from `history.xml`, loaded on first use.
    /// `None` when the file does not exist.
    pub fn history_db(&self) -> Result<Option<Arc<HistoryDb>>, SupportError> {
        if let Some(db) = self.cached_history() {
            return Ok(db);
        }
        let db = HistoryDb::load(&self.path.join("history.xml"), self.backend)?;
        Ok(self.store_history(db))
    }

    /// Async variant of [`history_db`](Self::history_db).
    pub async fn history_db_async(&self) -> Result<Option<Arc<HistoryDb>>, SupportError> {
        if let Some(db) = self.cached_history() {
            return Ok(db);
        }
        let db = HistoryDb::load_async(&self.path.join("history.xml"), self.backend).await?;
        Ok(self.store_history(db))
    }

    /// History entry for a system basename.
    pub fn history(&self, basename: &str) -> Result<Option<HistoryText>, SupportError> {
        Ok(self
            .history_db()?
            .and_then(|db| db.system_entry(basename)))
    }

    /// Async variant of [`history`](Self::history).
    pub async fn history_async(&self, basename: &str) -> Result<Option<HistoryText>, SupportError> {
        Ok(self
            .history_db_async()
            .await?
            .and_then(|db| db.system_entry(basename)))
    }

    /// History entry for a software item.
    pub fn software_history(
        &self,
        list: &str,
        software: &str,
    ) -> Result<Option<HistoryText>, SupportError> {
        Ok(self
            .history_db()?
            .and_then(|db| db.software_entry(list, software)))
    }

    /// Async variant of [`software_history`](Self::software_history).
    pub async fn software_history_async(
        &self,
        list: &str,
        software: &str,
    ) -> Result<Option<HistoryText>, SupportError> {
        Ok(self
            .history_db_async()
            .await?
            .and_then(|db| db.software_entry(list, software)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DAT: &str = "\
$info=puckman
$mame
0.100 [Namco]

WIP:
- Fixed colours
$end
$info=pacman,pacmanf
$mame
Clone of puckman.
$end
";

    #[test]
    fn records_round_trip() {
        let entries = parse_dat_text(DAT);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries["puckman"],
            "0.100 [Namco]\n\nWIP:\n- Fixed colours"
        );
        // comma keys are kept byte-for-byte
        assert_eq!(entries["pacman,pacmanf"], "Clone of puckman.");
    }

    #[test]
    fn marker_line_is_dropped() {
        let entries = parse_dat_text("$info=a\n$bio\nBody text\n$end\n");
        assert_eq!(entries["a"], "Body text");
    }

    #[test]
    fn missing_file_loads_empty() {
        let entries = load_dat(Path::new("/nonexistent/mamekit/mameinfo.dat")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn folder_caches_per_file() {
        let dir = std::env::temp_dir().join(format!("mamekit-dats-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create dat folder");
        fs::write(dir.join("mameinfo.dat"), DAT).expect("write dat");

        let folder = DatFolder::new(&dir);
        let entry = folder.entry("mameinfo", "puckman").unwrap();
        assert!(entry.is_some());
        // rewrite the file; the cached parse must win
        fs::write(dir.join("mameinfo.dat"), "$info=other\n$mame\nx\n$end\n").unwrap();
        assert!(folder.entry("mameinfo", "puckman").unwrap().is_some());
        // a dat that does not exist resolves to nothing
        assert_eq!(folder.entry("messinfo", "puckman").unwrap(), None);
        // and a folder without history.xml has no history db
        assert!(folder.history_db().unwrap().is_none());
        assert!(folder.history("puckman").unwrap().is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn async_folder_matches_sync() {
        let dir = std::env::temp_dir().join(format!("mamekit-dats-async-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create dat folder");
        fs::write(dir.join("history.dat"), DAT).expect("write dat");

        let folder = DatFolder::new(&dir);
        let entry = folder.entry_async("history", "pacman,pacmanf").await.unwrap();
        assert_eq!(entry.as_deref(), Some("Clone of puckman."));
        assert!(folder.history_db_async().await.unwrap().is_none());
        let _ = fs::remove_dir_all(&dir);
    }
}
