//! High level facade over a MAME installation.
//!
//! [`Mame`] glues the workspace crates together: machine listings (from the
//! frontend or a saved snapshot), software lists (from hash files or
//! `-getsoftlist`), category folders, dat databases, and ROM verification.
//!
//! ```rust,no_run
//! use mamekit::{Mame, MameSettings};
//!
//! # fn run() -> Result<(), mamekit::MameError> {
//! let settings = MameSettings::new("/usr/bin/mame")
//!     .with_snapshot("/data/mame/listxml.xml")
//!     .with_categories("/data/mame/folders")
//!     .with_dats("/data/mame/dats");
//! let mame = Mame::new(settings);
//! for machine in mame.runnable_machines()? {
//!     let machine = machine?;
//!     println!("{}: {:?}", machine, machine.genre());
//! }
//! let report = mame.verify_roms_report(&["puckman"])?;
//! println!("{:?}", report.romsets[0].status);
//! # Ok(())
//! # }
//! ```

mod catlist;
mod machine;
mod settings;
mod software;

pub use catlist::{CatlistCategory, MachineKind};
pub use machine::{display_aspect_ratio, display_resolution, Machine};
pub use settings::MameSettings;
pub use software::{Software, SoftwareList};

pub use mame_frontend as frontend;
pub use mame_model as model;
pub use mame_support as support;
pub use mame_xml as xml;

use std::collections::BTreeMap;
use std::fs::File;
use std::future::Future;
use std::io::BufReader;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, warn};

use mame_frontend::{
    FrontendError, MachineStream, MameExecutable, SoftwareVerification, VerifyReport,
};
use mame_model::{MachineElement, ModelError, SoftwareListElement};
use mame_support::{CategoryFolder, DatFolder, SupportError};
use mame_xml::{FragmentReader, XmlError};

/// Error type produced by the facade.
#[derive(Debug, Error)]
pub enum MameError {
    #[error("machine not found: {0}")]
    MachineNotFound(String),
    #[error("software list not found: {0}")]
    SoftwareListNotFound(String),
    #[error(transparent)]
    Frontend(#[from] FrontendError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Support(#[from] SupportError),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl MameError {
    fn from_frontend(err: FrontendError) -> Self {
        match err {
            FrontendError::MachineNotFound(name) => MameError::MachineNotFound(name),
            FrontendError::SoftwareListNotFound(name) => MameError::SoftwareListNotFound(name),
            other => MameError::Frontend(other),
        }
    }
}

type SnapshotMap = BTreeMap<String, Arc<MachineElement>>;

/// Entry point: one MAME installation as described by [`MameSettings`].
///
/// Everything is read-only after construction except in-process caches (the
/// category folder, the snapshot index, and the dat folder's per-file
/// caches).
#[derive(Debug)]
pub struct Mame {
    settings: MameSettings,
    executable: MameExecutable,
    dats: Option<Arc<DatFolder>>,
    categories: Mutex<Option<Arc<CategoryFolder>>>,
    snapshot: Mutex<Option<Arc<SnapshotMap>>>,
}

impl Mame {
    pub fn new(settings: MameSettings) -> Self {
        let executable =
            MameExecutable::with_backend(&settings.executable_path, settings.xml_backend);
        let dats = settings
            .dats_path
            .as_ref()
            .map(|path| Arc::new(DatFolder::with_backend(path, settings.xml_backend)));
        Mame {
            executable,
            dats,
            categories: Mutex::new(None),
            snapshot: Mutex::new(None),
            settings,
        }
    }

    pub fn settings(&self) -> &MameSettings {
        &self.settings
    }

    /// The underlying executable wrapper, for operations not lifted here.
    pub fn executable(&self) -> &MameExecutable {
        &self.executable
    }

    /// The dat folder, when one is configured.
    pub fn dat_folder(&self) -> Option<&Arc<DatFolder>> {
        self.dats.as_ref()
    }

    /// The loaded category folder, when one is configured. Loaded once and
    /// cached for the life of this value.
    pub fn category_folder(&self) -> Result<Option<Arc<CategoryFolder>>, MameError> {
        let Some(path) = self.settings.category_path.as_deref() else {
            return Ok(None);
        };
        if let Some(folder) = self.cached_categories() {
            return Ok(Some(folder));
        }
        let folder = Arc::new(CategoryFolder::load(path)?);
        Ok(Some(self.store_categories(folder)))
    }

    /// Async variant of [`category_folder`](Self::category_folder).
    pub async fn category_folder_async(&self) -> Result<Option<Arc<CategoryFolder>>, MameError> {
        let Some(path) = self.settings.category_path.as_deref() else {
            return Ok(None);
        };
        if let Some(folder) = self.cached_categories() {
            return Ok(Some(folder));
        }
        let folder = Arc::new(CategoryFolder::load_async(path).await?);
        Ok(Some(self.store_categories(folder)))
    }

    fn cached_categories(&self) -> Option<Arc<CategoryFolder>> {
        self.categories
            .lock()
            .expect("category cache lock poisoned")
            .clone()
    }

    fn store_categories(&self, folder: Arc<CategoryFolder>) -> Arc<CategoryFolder> {
        *self
            .categories
            .lock()
            .expect("category cache lock poisoned") = Some(Arc::clone(&folder));
        folder
    }

    /// MAME's version string.
    pub fn version(&self) -> Result<String, MameError> {
        self.executable.version().map_err(MameError::from_frontend)
    }

    /// Async variant of [`version`](Self::version).
    pub async fn version_async(&self) -> Result<String, MameError> {
        self.executable
            .version_async()
            .await
            .map_err(MameError::from_frontend)
    }

    fn cached_snapshot(&self) -> Option<Arc<SnapshotMap>> {
        self.snapshot
            .lock()
            .expect("snapshot cache lock poisoned")
            .clone()
    }

    fn store_snapshot(&self, map: SnapshotMap) -> Arc<SnapshotMap> {
        let map = Arc::new(map);
        *self.snapshot.lock().expect("snapshot cache lock poisoned") = Some(Arc::clone(&map));
        map
    }

    fn index_snapshot(
        fragments: impl Iterator<Item = Result<mame_xml::Document, XmlError>>,
    ) -> Result<SnapshotMap, MameError> {
        let mut map = SnapshotMap::new();
        for fragment in fragments {
            match MachineElement::from_document(fragment?) {
                Ok(machine) => {
                    map.insert(machine.basename().to_string(), Arc::new(machine));
                }
                Err(err) => warn!(error = %err, "skipping malformed <machine> record"),
            }
        }
        Ok(map)
    }

    fn snapshot_map(&self) -> Result<Option<Arc<SnapshotMap>>, MameError> {
        let Some(path) = self.settings.snapshot_path.as_deref() else {
            return Ok(None);
        };
        if let Some(map) = self.cached_snapshot() {
            return Ok(Some(map));
        }
        debug!(file = %path.display(), "indexing listing snapshot");
        let file = BufReader::new(File::open(path)?);
        let map = Self::index_snapshot(FragmentReader::new(file, "machine"))?;
        Ok(Some(self.store_snapshot(map)))
    }

    async fn snapshot_map_async(&self) -> Result<Option<Arc<SnapshotMap>>, MameError> {
        let Some(path) = self.settings.snapshot_path.as_deref() else {
            return Ok(None);
        };
        if let Some(map) = self.cached_snapshot() {
            return Ok(Some(map));
        }
        debug!(file = %path.display(), "indexing listing snapshot");
        let bytes = tokio::fs::read(path).await?;
        let map = Self::index_snapshot(FragmentReader::new(&bytes[..], "machine"))?;
        Ok(Some(self.store_snapshot(map)))
    }

    fn lookup_element(&self, basename: &str) -> Result<Arc<MachineElement>, MameError> {
        if let Some(map) = self.snapshot_map()? {
            return map
                .get(basename)
                .cloned()
                .ok_or_else(|| MameError::MachineNotFound(basename.to_string()));
        }
        self.executable
            .machine_xml(basename)
            .map(Arc::new)
            .map_err(MameError::from_frontend)
    }

    async fn lookup_element_async(&self, basename: &str) -> Result<Arc<MachineElement>, MameError> {
        if let Some(map) = self.snapshot_map_async().await? {
            return map
                .get(basename)
                .cloned()
                .ok_or_else(|| MameError::MachineNotFound(basename.to_string()));
        }
        self.executable
            .machine_xml_async(basename)
            .await
            .map(Arc::new)
            .map_err(MameError::from_frontend)
    }

    fn effective_bios_basename(
        element: &MachineElement,
        parent: Option<&Machine>,
    ) -> Option<String> {
        match (element.rom_of(), element.clone_of()) {
            // for clone sets romof names the parent; the real BIOS is
            // whatever the parent points at
            (Some(rom_of), Some(clone_of)) if rom_of == clone_of => parent
                .and_then(|machine| machine.element.rom_of())
                .map(str::to_string),
            (rom_of, _) => rom_of.map(str::to_string),
        }
    }

    fn build_machine(
        &self,
        element: Arc<MachineElement>,
        cats: &Option<Arc<CategoryFolder>>,
    ) -> Result<Machine, MameError> {
        let parent = match element.clone_of() {
            Some(parent) => {
                let parent_element = self.lookup_element(parent)?;
                Some(Box::new(self.build_machine(parent_element, cats)?))
            }
            None => None,
        };
        let bios = match Self::effective_bios_basename(&element, parent.as_deref()) {
            Some(bios_name) if bios_name != element.basename() => {
                let bios_element = self.lookup_element(&bios_name)?;
                Some(Box::new(self.build_machine(bios_element, cats)?))
            }
            _ => None,
        };
        Ok(Machine {
            element,
            parent,
            bios,
            categories: cats.clone(),
            dats: self.dats.clone(),
        })
    }

    fn build_machine_async<'a>(
        &'a self,
        element: Arc<MachineElement>,
        cats: &'a Option<Arc<CategoryFolder>>,
    ) -> Pin<Box<dyn Future<Output = Result<Machine, MameError>> + 'a>> {
        Box::pin(async move {
            let parent = match element.clone_of() {
                Some(parent) => {
                    let parent_element = self.lookup_element_async(parent).await?;
                    Some(Box::new(self.build_machine_async(parent_element, cats).await?))
                }
                None => None,
            };
            let bios = match Self::effective_bios_basename(&element, parent.as_deref()) {
                Some(bios_name) if bios_name != element.basename() => {
                    let bios_element = self.lookup_element_async(&bios_name).await?;
                    Some(Box::new(self.build_machine_async(bios_element, cats).await?))
                }
                _ => None,
            };
            Ok(Machine {
                element,
                parent,
                bios,
                categories: cats.clone(),
                dats: self.dats.clone(),
            })
        })
    }

    /// One machine with its parent, BIOS and support data resolved.
    pub fn machine(&self, basename: &str) -> Result<Machine, MameError> {
        let cats = self.category_folder()?;
        let element = self.lookup_element(basename)?;
        self.build_machine(element, &cats)
    }

    /// Async variant of [`machine`](Self::machine).
    pub async fn machine_async(&self, basename: &str) -> Result<Machine, MameError> {
        let cats = self.category_folder_async().await?;
        let element = self.lookup_element_async(basename).await?;
        self.build_machine_async(element, &cats).await
    }

    /// Every machine record: from the snapshot file when configured,
    /// otherwise streamed out of `-listxml`. This is the fallback path that
    /// keeps the executable optional.
    pub fn machine_elements(&self) -> Result<MachineElements, MameError> {
        match self.settings.snapshot_path.as_deref() {
            Some(path) => {
                let file = BufReader::new(File::open(path)?);
                Ok(MachineElements::Snapshot(FragmentReader::new(
                    file, "machine",
                )))
            }
            None => Ok(MachineElements::Tool(
                self.executable
                    .stream_machines()
                    .map_err(MameError::from_frontend)?,
            )),
        }
    }

    /// Async variant of [`machine_elements`](Self::machine_elements),
    /// collected.
    pub async fn machine_elements_async(&self) -> Result<Vec<MachineElement>, MameError> {
        match self.settings.snapshot_path.as_deref() {
            Some(path) => {
                let bytes = tokio::fs::read(path).await?;
                let mut machines = Vec::new();
                for fragment in FragmentReader::new(&bytes[..], "machine") {
                    match MachineElement::from_document(fragment?) {
                        Ok(machine) => machines.push(machine),
                        Err(err) => warn!(error = %err, "skipping malformed <machine> record"),
                    }
                }
                Ok(machines)
            }
            None => self
                .executable
                .all_machines_async()
                .await
                .map_err(MameError::from_frontend),
        }
    }

    /// Every machine, wrapped.
    pub fn machines(&self) -> Result<MachinesIter<'_>, MameError> {
        Ok(MachinesIter {
            mame: self,
            cats: self.category_folder()?,
            inner: self.machine_elements()?,
            runnable_only: false,
        })
    }

    /// Machines that can actually be started: runnable and not a device.
    pub fn runnable_machines(&self) -> Result<MachinesIter<'_>, MameError> {
        Ok(MachinesIter {
            mame: self,
            cats: self.category_folder()?,
            inner: self.machine_elements()?,
            runnable_only: true,
        })
    }

    async fn collect_machines_async(&self, runnable_only: bool) -> Result<Vec<Machine>, MameError> {
        let cats = self.category_folder_async().await?;
        let elements = self.machine_elements_async().await?;
        let mut machines = Vec::with_capacity(elements.len());
        for element in elements {
            if runnable_only && !(element.is_runnable() && !element.is_device()) {
                continue;
            }
            machines.push(self.build_machine_async(Arc::new(element), &cats).await?);
        }
        Ok(machines)
    }

    /// Async variant of [`machines`](Self::machines).
    pub async fn machines_async(&self) -> Result<Vec<Machine>, MameError> {
        self.collect_machines_async(false).await
    }

    /// Async variant of [`runnable_machines`](Self::runnable_machines).
    pub async fn runnable_machines_async(&self) -> Result<Vec<Machine>, MameError> {
        self.collect_machines_async(true).await
    }

    fn hash_file_list(&self, name: &str) -> Result<Option<SoftwareListElement>, MameError> {
        for dir in &self.settings.hash_paths {
            let path = dir.join(format!("{name}.xml"));
            match std::fs::read(&path) {
                Ok(bytes) => {
                    debug!(file = %path.display(), "reading software list from hash file");
                    return Ok(Some(SoftwareListElement::parse(
                        &bytes,
                        self.settings.xml_backend,
                    )?));
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(None)
    }

    async fn hash_file_list_async(
        &self,
        name: &str,
    ) -> Result<Option<SoftwareListElement>, MameError> {
        for dir in &self.settings.hash_paths {
            let path = dir.join(format!("{name}.xml"));
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!(file = %path.display(), "reading software list from hash file");
                    return Ok(Some(SoftwareListElement::parse(
                        &bytes,
                        self.settings.xml_backend,
                    )?));
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(None)
    }

    fn use_hash_files(&self) -> bool {
        self.settings.software_from_hash_files && !self.settings.hash_paths.is_empty()
    }

    /// One software list, from the hash-path files when configured and
    /// preferred, else via `-getsoftlist`.
    pub fn software_list(&self, name: &str) -> Result<SoftwareList, MameError> {
        let element = if self.use_hash_files() {
            self.hash_file_list(name)?
                .ok_or_else(|| MameError::SoftwareListNotFound(name.to_string()))?
        } else {
            self.executable
                .software_list(name)
                .map_err(MameError::from_frontend)?
        };
        Ok(SoftwareList::new(element, self.dats.clone()))
    }

    /// Async variant of [`software_list`](Self::software_list).
    pub async fn software_list_async(&self, name: &str) -> Result<SoftwareList, MameError> {
        let element = if self.use_hash_files() {
            self.hash_file_list_async(name)
                .await?
                .ok_or_else(|| MameError::SoftwareListNotFound(name.to_string()))?
        } else {
            self.executable
                .software_list_async(name)
                .await
                .map_err(MameError::from_frontend)?
        };
        Ok(SoftwareList::new(element, self.dats.clone()))
    }

    /// Basenames of every software list the frontend knows.
    pub fn software_list_names(&self) -> Result<Vec<String>, MameError> {
        self.executable
            .software_list_names()
            .map_err(MameError::from_frontend)
    }

    /// Async variant of [`software_list_names`](Self::software_list_names).
    pub async fn software_list_names_async(&self) -> Result<Vec<String>, MameError> {
        self.executable
            .software_list_names_async()
            .await
            .map_err(MameError::from_frontend)
    }

    /// Quick ROM check by exit status.
    pub fn verify_roms(&self, basename: &str) -> Result<bool, MameError> {
        self.executable
            .verify_roms(basename)
            .map_err(MameError::from_frontend)
    }

    /// Async variant of [`verify_roms`](Self::verify_roms).
    pub async fn verify_roms_async(&self, basename: &str) -> Result<bool, MameError> {
        self.executable
            .verify_roms_async(basename)
            .await
            .map_err(MameError::from_frontend)
    }

    /// Detailed ROM verification; empty slice verifies everything.
    pub fn verify_roms_report(&self, basenames: &[&str]) -> Result<VerifyReport, MameError> {
        self.executable
            .verify_roms_report(basenames)
            .map_err(MameError::from_frontend)
    }

    /// Async variant of [`verify_roms_report`](Self::verify_roms_report).
    pub async fn verify_roms_report_async(
        &self,
        basenames: &[&str],
    ) -> Result<VerifyReport, MameError> {
        self.executable
            .verify_roms_report_async(basenames)
            .await
            .map_err(MameError::from_frontend)
    }

    /// Sample set check by exit status.
    pub fn verify_samples(&self, basename: &str) -> Result<bool, MameError> {
        self.executable
            .verify_samples(basename)
            .map_err(MameError::from_frontend)
    }

    /// Async variant of [`verify_samples`](Self::verify_samples).
    pub async fn verify_samples_async(&self, basename: &str) -> Result<bool, MameError> {
        self.executable
            .verify_samples_async(basename)
            .await
            .map_err(MameError::from_frontend)
    }

    /// Usable software of one list.
    pub fn verify_software_list(
        &self,
        name: &str,
    ) -> Result<Vec<SoftwareVerification>, MameError> {
        self.executable
            .verify_software_list(name)
            .map_err(MameError::from_frontend)
    }

    /// Async variant of [`verify_software_list`](Self::verify_software_list).
    pub async fn verify_software_list_async(
        &self,
        name: &str,
    ) -> Result<Vec<SoftwareVerification>, MameError> {
        self.executable
            .verify_software_list_async(name)
            .await
            .map_err(MameError::from_frontend)
    }
}

/// Iterator over machine records, from either source.
pub enum MachineElements {
    Snapshot(FragmentReader<BufReader<File>>),
    Tool(MachineStream),
}

impl Iterator for MachineElements {
    type Item = Result<MachineElement, MameError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MachineElements::Snapshot(fragments) => loop {
                match fragments.next() {
                    Some(Ok(doc)) => match MachineElement::from_document(doc) {
                        Ok(machine) => return Some(Ok(machine)),
                        Err(err) => {
                            warn!(error = %err, "skipping malformed <machine> record");
                        }
                    },
                    Some(Err(err)) => return Some(Err(err.into())),
                    None => return None,
                }
            },
            MachineElements::Tool(stream) => stream
                .next()
                .map(|result| result.map_err(MameError::from_frontend)),
        }
    }
}

/// Iterator over wrapped machines.
pub struct MachinesIter<'a> {
    mame: &'a Mame,
    cats: Option<Arc<CategoryFolder>>,
    inner: MachineElements,
    runnable_only: bool,
}

impl Iterator for MachinesIter<'_> {
    type Item = Result<Machine, MameError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Err(err) => return Some(Err(err)),
                Ok(element) => {
                    if self.runnable_only && !(element.is_runnable() && !element.is_device()) {
                        continue;
                    }
                    return Some(self.mame.build_machine(Arc::new(element), &self.cats));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const LISTING: &str = r#"<?xml version="1.0"?>
<mame build="0.262 (mame0262)">
    <machine name="neogeo" isbios="yes">
        <description>Neo-Geo MV-6F</description>
        <year>1990</year>
    </machine>
    <machine name="z80" isdevice="yes" runnable="no">
        <description>Zilog Z80</description>
    </machine>
    <machine name="puckman" sourcefile="pacman.cpp">
        <description>PuckMan (Japan set 1)</description>
        <year>1980</year>
        <manufacturer>Namco</manufacturer>
        <input players="2" coins="2"/>
    </machine>
    <machine>
        <description>nameless stub</description>
    </machine>
    <machine name="mslug" romof="neogeo">
        <description>Metal Slug - Super Vehicle-001</description>
        <year>1996</year>
    </machine>
    <machine name="mslugbl" cloneof="mslug" romof="mslug">
        <description>Metal Slug (bootleg)</description>
        <year>1996</year>
    </machine>
</mame>
"#;

    const CATLIST: &str = "\
[Arcade: Maze / Collect]
puckman

[Arcade: Shooter / Run and Gun]
mslug
";

    struct Fixture {
        root: PathBuf,
    }

    impl Fixture {
        fn new(tag: &str) -> Self {
            let root = std::env::temp_dir().join(format!(
                "mamekit-facade-{}-{tag}",
                std::process::id()
            ));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(root.join("folders")).expect("create folders dir");
            fs::create_dir_all(root.join("hash")).expect("create hash dir");
            fs::write(root.join("listxml.xml"), LISTING).expect("write snapshot");
            fs::write(root.join("folders/catlist.ini"), CATLIST).expect("write catlist");
            Fixture { root }
        }

        fn settings(&self) -> MameSettings {
            // the executable does not exist: everything must come from files
            MameSettings::new("/nonexistent/path/to/mame")
                .with_snapshot(self.root.join("listxml.xml"))
                .with_categories(self.root.join("folders"))
                .with_hash_path(self.root.join("hash"))
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    #[test]
    fn snapshot_makes_the_executable_optional() {
        let fixture = Fixture::new("snapshot");
        let mame = Mame::new(fixture.settings());
        let names: Vec<_> = mame
            .machine_elements()
            .unwrap()
            .map(|m| m.map(|m| m.basename().to_string()))
            .collect::<Result<_, _>>()
            .unwrap();
        // the nameless stub is skipped, everything else is there
        assert_eq!(names, ["neogeo", "z80", "puckman", "mslug", "mslugbl"]);
    }

    #[test]
    fn runnable_filter_drops_devices() {
        let fixture = Fixture::new("runnable");
        let mame = Mame::new(fixture.settings());
        let names: Vec<_> = mame
            .runnable_machines()
            .unwrap()
            .map(|m| m.map(|m| m.basename().to_string()))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(names, ["neogeo", "puckman", "mslug", "mslugbl"]);
    }

    #[test]
    fn machine_resolves_parent_bios_and_categories() {
        let fixture = Fixture::new("machine");
        let mame = Mame::new(fixture.settings());

        let clone = mame.machine("mslugbl").unwrap();
        assert_eq!(clone.parent_basename(), Some("mslug"));
        assert_eq!(
            clone.parent_name(),
            Some("Metal Slug - Super Vehicle-001")
        );
        // romof == cloneof, so the BIOS comes through the parent
        assert_eq!(clone.bios_basename(), Some("neogeo"));
        assert_eq!(clone.bios_name(), Some("Neo-Geo MV-6F"));
        // the clone is not in catlist.ini; the parent's section applies
        assert_eq!(clone.genre().as_deref(), Some("Shooter"));

        let puckman = mame.machine("puckman").unwrap();
        assert_eq!(puckman.genre().as_deref(), Some("Maze"));
        assert_eq!(puckman.kind().unwrap(), MachineKind::Arcade);
        assert!(puckman.parent().is_none());

        let bios = mame.machine("neogeo").unwrap();
        assert_eq!(bios.kind().unwrap(), MachineKind::Bios);

        assert!(matches!(
            mame.machine("nonexistent").unwrap_err(),
            MameError::MachineNotFound(_)
        ));
    }

    #[test]
    fn verification_needs_the_tool() {
        let fixture = Fixture::new("verify");
        let mame = Mame::new(fixture.settings());
        assert!(matches!(
            mame.verify_roms("puckman").unwrap_err(),
            MameError::Frontend(FrontendError::ToolUnavailable { .. })
        ));
    }

    #[test]
    fn software_list_from_hash_file() {
        let fixture = Fixture::new("softlist");
        fs::write(
            fixture.root.join("hash/nes.xml"),
            r#"<softwarelist name="nes" description="NES cartridges">
                <software name="smb"><description>Super Mario Bros.</description></software>
            </softwarelist>"#,
        )
        .expect("write hash file");
        let mame = Mame::new(fixture.settings());
        let list = mame.software_list("nes").unwrap();
        assert_eq!(list.name(), "NES cartridges");
        assert_eq!(list.software_count(), 1);
        assert_eq!(list.get("smb").unwrap().id(), "nes:smb");
        assert!(matches!(
            mame.software_list("a2600").unwrap_err(),
            MameError::SoftwareListNotFound(_)
        ));
    }

    #[tokio::test]
    async fn async_paths_match_sync() {
        let fixture = Fixture::new("async");
        let mame = Mame::new(fixture.settings());
        let machines = mame.runnable_machines_async().await.unwrap();
        assert_eq!(machines.len(), 4);
        let clone = mame.machine_async("mslugbl").await.unwrap();
        assert_eq!(clone.bios_basename(), Some("neogeo"));
        let elements = mame.machine_elements_async().await.unwrap();
        assert_eq!(elements.len(), 5);
    }
}
