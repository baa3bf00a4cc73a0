//! The machine wrapper: one listing record joined with its clone parent,
//! BIOS, and everything the support files know about it.

use std::collections::BTreeSet;
use std::sync::Arc;

use mame_model::{ChipEntry, ChipKind, DisplayEntry, DumpStatus, MachineElement};
use mame_support::{CategoryFolder, DatFolder, HistoryText, MameInfoEntry};

use crate::catlist::{CatlistCategory, MachineKind};
use crate::MameError;

/// Pixel count of a display, when its dimensions are known.
pub fn display_resolution(display: &DisplayEntry) -> Option<i64> {
    Some(display.width? * display.height?)
}

/// Reduced aspect ratio of a display, e.g. `(4, 3)`.
pub fn display_aspect_ratio(display: &DisplayEntry) -> Option<(i64, i64)> {
    fn gcd(a: i64, b: i64) -> i64 {
        if b == 0 {
            a
        } else {
            gcd(b, a % b)
        }
    }
    let (width, height) = (display.width?, display.height?);
    if width <= 0 || height <= 0 {
        return None;
    }
    let divisor = gcd(width, height);
    Some((width / divisor, height / divisor))
}

/// Machine-name prefixes that mark a specific platform (and with it a
/// machine kind the category file cannot see).
const PLATFORM_PREFIXES: [(&str, MachineKind); 2] = [
    ("Game & Watch", MachineKind::LcdHandheld),
    ("R-Zone", MachineKind::ConsoleCartridge),
];

/// Parenthesised name suffixes doing the same.
const PLATFORM_SUFFIXES: [(&str, MachineKind); 3] = [
    ("XaviXPORT", MachineKind::ConsoleCartridge),
    ("CPS Changer", MachineKind::ConsoleCartridge),
    ("Domyos Interactive System", MachineKind::ConsoleCartridge),
];

/// One machine with its relations resolved and its support data reachable.
#[derive(Debug)]
pub struct Machine {
    pub(crate) element: Arc<MachineElement>,
    pub(crate) parent: Option<Box<Machine>>,
    pub(crate) bios: Option<Box<Machine>>,
    pub(crate) categories: Option<Arc<CategoryFolder>>,
    pub(crate) dats: Option<Arc<DatFolder>>,
}

impl Machine {
    /// The underlying listing record.
    pub fn element(&self) -> &MachineElement {
        &self.element
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        self.element.description()
    }

    pub fn basename(&self) -> &str {
        self.element.basename()
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.element.manufacturer()
    }

    /// The resolved clone parent.
    pub fn parent(&self) -> Option<&Machine> {
        self.parent.as_deref()
    }

    pub fn parent_basename(&self) -> Option<&str> {
        self.element.clone_of()
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_deref().map(Machine::name)
    }

    /// The resolved BIOS machine.
    pub fn bios(&self) -> Option<&Machine> {
        self.bios.as_deref()
    }

    pub fn bios_name(&self) -> Option<&str> {
        self.bios.as_deref().map(Machine::name)
    }

    /// Basename of the BIOS set. For clone sets `romof` names the parent,
    /// so the real BIOS is whatever the parent points at.
    pub fn bios_basename(&self) -> Option<&str> {
        match (self.element.rom_of(), self.element.clone_of()) {
            (Some(rom_of), Some(clone_of)) if rom_of == clone_of => self
                .parent
                .as_deref()
                .and_then(Machine::bios_basename),
            (rom_of, _) => rom_of,
        }
    }

    fn category_of(&self, cat: &str, fallback_parent: bool) -> Option<&str> {
        let folder = self.categories.as_deref()?;
        folder
            .category_of(cat, self.basename())
            .or_else(|| match (fallback_parent, self.parent_basename()) {
                (true, Some(parent)) => folder.category_of(cat, parent),
                _ => None,
            })
    }

    fn categories_of(&self, cat: &str, fallback_parent: bool) -> Vec<&str> {
        let Some(folder) = self.categories.as_deref() else {
            return Vec::new();
        };
        let found = folder.categories_of(cat, self.basename());
        if found.is_empty() && fallback_parent {
            if let Some(parent) = self.parent_basename() {
                return folder.categories_of(cat, parent);
            }
        }
        found
    }

    /// Raw catlist section. A clone set newer than the category file is
    /// assumed to be the same sort of thing as its parent.
    pub fn catlist_full(&self) -> Option<&str> {
        self.category_of("catlist", true)
    }

    pub fn catlist(&self) -> Option<CatlistCategory> {
        self.catlist_full().map(CatlistCategory::parse)
    }

    pub fn genre(&self) -> Option<String> {
        self.catlist()
            .and_then(|cat| cat.genre().map(str::to_string))
    }

    pub fn subgenre(&self) -> Option<String> {
        self.catlist()
            .and_then(|cat| cat.subgenre().map(str::to_string))
    }

    fn platform_prefix(&self) -> Option<(&'static str, MachineKind)> {
        PLATFORM_PREFIXES
            .into_iter()
            .find(|(prefix, _)| self.name().starts_with(&format!("{prefix}: ")))
    }

    fn platform_suffix(&self) -> Option<(&'static str, MachineKind)> {
        let (_, tail) = self.name().split_once(" (")?;
        PLATFORM_SUFFIXES
            .into_iter()
            .find(|(suffix, _)| tail.contains(suffix))
    }

    fn is_arcade(&self) -> Result<bool, MameError> {
        if self
            .catlist()
            .is_some_and(|cat| cat.kind() == MachineKind::Arcade)
        {
            return Ok(true);
        }
        Ok(self.element.coin_slots()? > 0)
    }

    /// Classify the machine, preferring the name markers, then the BIOS
    /// flag, then the category file, then the coin-slot heuristic.
    pub fn kind(&self) -> Result<MachineKind, MameError> {
        if let Some((_, kind)) = self.platform_prefix() {
            return Ok(kind);
        }
        if let Some((_, kind)) = self.platform_suffix() {
            return Ok(kind);
        }
        if self.element.is_bios() {
            return Ok(MachineKind::Bios);
        }
        if let Some(cat) = self.catlist() {
            return Ok(cat.kind());
        }
        if self.is_arcade()? {
            return Ok(MachineKind::Arcade);
        }
        if self.element.is_mechanical() {
            return Ok(MachineKind::Mechanical);
        }
        Ok(MachineKind::Other)
    }

    /// Platform name for display purposes.
    pub fn platform(&self) -> Result<String, MameError> {
        if let Some((prefix, _)) = self.platform_prefix() {
            return Ok(prefix.to_string());
        }
        if let Some((suffix, _)) = self.platform_suffix() {
            return Ok(suffix.to_string());
        }
        Ok(self.kind()?.label().to_string())
    }

    /// Series this machine belongs to, per `series.ini`.
    pub fn series(&self) -> Vec<&str> {
        self.categories_of("series", true)
    }

    pub fn languages(&self) -> Vec<&str> {
        self.categories_of("languages", false)
    }

    pub fn cabinet_types(&self) -> Vec<&str> {
        self.categories_of("cabinets", false)
    }

    /// MAME version the machine first appeared in, per `version.ini`.
    pub fn version_added(&self) -> Option<&str> {
        self.category_of("version", false)
    }

    pub fn has_free_play(&self) -> bool {
        self.category_of("freeplay", false).is_some()
    }

    pub fn monochrome_kind(&self) -> Option<&str> {
        self.category_of("monochrome", false)
    }

    /// Rating band name from `bestgames.ini`, e.g. `90 to 100 (Best Games)`.
    pub fn bestgames_rating_name(&self) -> Option<&str> {
        self.category_of("bestgames", false)
    }

    /// Upper bound of the rating band as a score.
    pub fn bestgames_rating(&self) -> Option<i64> {
        let name = self.bestgames_rating_name()?;
        let first = name.split(' ').next()?;
        first.parse::<i64>().ok().map(|low| low + 10)
    }

    /// Whether the machine is flagged mature; `None` when nothing says
    /// either way.
    pub fn is_mature(&self) -> Option<bool> {
        if self.category_of("mature", true).is_some() {
            return Some(true);
        }
        if self.category_of("not_mature", true).is_some() {
            return Some(false);
        }
        self.catlist().map(|cat| cat.is_mature())
    }

    /// Player-count description from `nplayers.ini`, falling back to the
    /// raw input count.
    pub fn players_description(&self) -> Result<String, MameError> {
        if let Some(folder) = self.categories.as_deref() {
            if let Some(nplayers) = folder.category_of("nplayers", self.basename()) {
                return Ok(nplayers.to_string());
            }
        }
        let players = self
            .element
            .input()?
            .and_then(|input| input.players)
            .unwrap_or(0);
        Ok(players.to_string())
    }

    /// History entry for this machine.
    pub fn history(&self) -> Result<Option<HistoryText>, MameError> {
        match self.dats.as_deref() {
            Some(dats) => Ok(dats.history(self.basename())?),
            None => Ok(None),
        }
    }

    /// Async variant of [`history`](Self::history).
    pub async fn history_async(&self) -> Result<Option<HistoryText>, MameError> {
        match self.dats.as_deref() {
            Some(dats) => Ok(dats.history_async(self.basename()).await?),
            None => Ok(None),
        }
    }

    /// Parsed `mameinfo.dat` entry.
    pub fn mameinfo(&self) -> Result<Option<MameInfoEntry>, MameError> {
        match self.dats.as_deref() {
            Some(dats) => Ok(dats
                .entry("mameinfo", self.basename())?
                .map(|text| MameInfoEntry::parse(&text))),
            None => Ok(None),
        }
    }

    /// Leading part of the `messinfo.dat` entry, before the DRIVER block.
    pub fn messinfo_summary(&self) -> Result<Option<String>, MameError> {
        let Some(dats) = self.dats.as_deref() else {
            return Ok(None);
        };
        Ok(dats.entry("messinfo", self.basename())?.map(|text| {
            text.split_once("\nDRIVER:")
                .map(|(head, _)| head.to_string())
                .unwrap_or(text)
        }))
    }

    /// Whether a usable set needs CHD images.
    pub fn requires_chds(&self) -> Result<bool, MameError> {
        Ok(self.element.disks()?.iter().any(|disk| !disk.optional))
    }

    /// Whether the machine needs no ROM files at all (every ROM entry is an
    /// undumped placeholder).
    pub fn is_romless(&self) -> Result<bool, MameError> {
        if self.requires_chds()? {
            return Ok(false);
        }
        Ok(self
            .element
            .roms()?
            .iter()
            .all(|rom| rom.status == DumpStatus::NoDump))
    }

    /// Tags of media slots that take removable images.
    pub fn media_slot_tags(&self) -> Result<BTreeSet<&str>, MameError> {
        Ok(self
            .element
            .media_devices()?
            .iter()
            .filter(|dev| !dev.fixed_image)
            .filter_map(|dev| dev.tag.as_deref())
            .collect())
    }

    /// Types of media slots that take removable images.
    pub fn media_slot_kinds(&self) -> Result<BTreeSet<&str>, MameError> {
        Ok(self
            .element
            .media_devices()?
            .iter()
            .filter(|dev| dev.tag.is_some() && !dev.fixed_image)
            .map(|dev| dev.kind.as_str())
            .collect())
    }

    pub fn has_mandatory_slots(&self) -> Result<bool, MameError> {
        Ok(self
            .element
            .media_devices()?
            .iter()
            .any(|dev| dev.mandatory))
    }

    /// Software lists this machine can load from.
    pub fn software_list_names(&self) -> Result<BTreeSet<&str>, MameError> {
        Ok(self
            .element
            .software_lists()?
            .iter()
            .map(|list| list.name.as_str())
            .collect())
    }

    pub fn control_kinds(&self) -> Result<Vec<&str>, MameError> {
        Ok(self
            .element
            .input()?
            .map(|input| input.control_kinds())
            .unwrap_or_default())
    }

    pub fn cpus(&self) -> Result<Vec<&ChipEntry>, MameError> {
        Ok(self
            .element
            .chips()?
            .iter()
            .filter(|chip| chip.kind == ChipKind::Cpu)
            .collect())
    }

    pub fn audio_chips(&self) -> Result<Vec<&ChipEntry>, MameError> {
        Ok(self
            .element
            .chips()?
            .iter()
            .filter(|chip| chip.kind == ChipKind::Audio)
            .collect())
    }

    /// Decade of release as its starting year, even when the exact year has
    /// a `?` in it.
    pub fn decade(&self) -> Option<i64> {
        let year = self.element.raw_year()?;
        year.get(..3)?.parse::<i64>().ok().map(|y| y * 10)
    }

    pub fn century(&self) -> Option<i64> {
        let year = self.element.raw_year()?;
        year.get(..2)?.parse::<i64>().ok().map(|y| y * 100)
    }
}

impl std::fmt::Display for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.basename(), self.name())
    }
}
