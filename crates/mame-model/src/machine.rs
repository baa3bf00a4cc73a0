//! One `<machine>` record from `-listxml` output and its typed sub-structures.

use std::sync::{Arc, OnceLock};

use mame_xml::{Document, Element, NodeId, XmlError};
use tracing::warn;

use crate::{attr_f64, attr_u64, coercion, required_attr, DumpStatus, ModelError};

/// One ROM file required by a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomEntry {
    pub name: String,
    pub size: Option<u64>,
    pub crc: Option<u32>,
    pub sha1: Option<Vec<u8>>,
    pub region: Option<String>,
    /// Name of the matching file in the parent set, for merged sets.
    pub merge: Option<String>,
    /// BIOS option this ROM belongs to, when set.
    pub bios: Option<String>,
    pub offset: u64,
    pub status: DumpStatus,
    pub optional: bool,
}

impl RomEntry {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        Ok(RomEntry {
            name: required_attr(el, "rom", "name")?,
            size: attr_u64(el, "size")?,
            crc: el.attr_hex("crc")?,
            sha1: el.attr_hex_bytes("sha1")?,
            region: el.attr("region").map(str::to_string),
            merge: el.attr("merge").map(str::to_string),
            bios: el.attr("bios").map(str::to_string),
            offset: attr_u64(el, "offset")?.unwrap_or(0),
            status: DumpStatus::from_attr(el, "status")?,
            optional: el.attr_yes_no("optional", false)?,
        })
    }
}

/// One CHD disk image required by a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskEntry {
    pub name: String,
    pub sha1: Option<Vec<u8>>,
    pub region: Option<String>,
    pub merge: Option<String>,
    pub index: Option<i64>,
    pub writable: bool,
    pub status: DumpStatus,
    pub optional: bool,
}

impl DiskEntry {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        Ok(DiskEntry {
            name: required_attr(el, "disk", "name")?,
            sha1: el.attr_hex_bytes("sha1")?,
            region: el.attr("region").map(str::to_string),
            merge: el.attr("merge").map(str::to_string),
            index: el.attr_int("index")?,
            writable: el.attr_yes_no("writable", false)?,
            status: DumpStatus::from_attr(el, "status")?,
            optional: el.attr_yes_no("optional", false)?,
        })
    }
}

/// CPU or audio chip classification of a `<chip>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipKind {
    Cpu,
    Audio,
}

/// One emulated chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipEntry {
    pub name: String,
    pub tag: Option<String>,
    pub kind: ChipKind,
    /// Clock speed in Hz.
    pub clock_hz: Option<i64>,
}

impl ChipEntry {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        let kind = match el.attr("type") {
            Some("cpu") => ChipKind::Cpu,
            Some("audio") => ChipKind::Audio,
            Some(other) => return Err(coercion("type", other, "cpu or audio").into()),
            None => return Err(ModelError::MissingAttribute { tag: "chip", attr: "type" }),
        };
        Ok(ChipEntry {
            name: required_attr(el, "chip", "name")?,
            tag: el.attr("tag").map(str::to_string),
            kind,
            clock_hz: el.attr_int("clock")?,
        })
    }
}

/// Display technology reported for a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Raster,
    Vector,
    Lcd,
    Svg,
    Unknown,
}

/// One screen attached to a machine.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEntry {
    pub tag: Option<String>,
    pub kind: DisplayKind,
    /// Rotation in degrees: 0, 90, 180 or 270.
    pub rotate: Option<i64>,
    pub flip_x: bool,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Refresh rate in Hz.
    pub refresh: Option<f64>,
    pub pixel_clock: Option<i64>,
}

impl DisplayEntry {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        let kind = match el.attr("type") {
            Some("raster") => DisplayKind::Raster,
            Some("vector") => DisplayKind::Vector,
            Some("lcd") => DisplayKind::Lcd,
            Some("svg") => DisplayKind::Svg,
            Some("unknown") | None => DisplayKind::Unknown,
            Some(other) => {
                return Err(coercion("type", other, "raster, vector, lcd, svg or unknown").into())
            }
        };
        Ok(DisplayEntry {
            tag: el.attr("tag").map(str::to_string),
            kind,
            rotate: el.attr_int("rotate")?,
            flip_x: el.attr_yes_no("flipx", false)?,
            width: el.attr_int("width")?,
            height: el.attr_int("height")?,
            refresh: attr_f64(el, "refresh")?,
            pixel_clock: el.attr_int("pixclock")?,
        })
    }
}

/// One selectable BIOS option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiosSet {
    pub name: String,
    pub description: Option<String>,
    pub default: bool,
}

impl BiosSet {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        Ok(BiosSet {
            name: required_attr(el, "biosset", "name")?,
            description: el.attr("description").map(str::to_string),
            default: el.attr_yes_no("default", false)?,
        })
    }
}

/// Whether a software list is native to the machine family or compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftwareListStatus {
    Original,
    Compatible,
}

/// A `<softwarelist>` reference inside a machine record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareListRef {
    pub tag: Option<String>,
    pub name: String,
    pub status: SoftwareListStatus,
    /// Compatibility filter; a leading `!` negates the match.
    pub filter: Option<String>,
}

impl SoftwareListRef {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        let status = match el.attr("status") {
            Some("original") | None => SoftwareListStatus::Original,
            Some("compatible") => SoftwareListStatus::Compatible,
            Some(other) => return Err(coercion("status", other, "original or compatible").into()),
        };
        Ok(SoftwareListRef {
            tag: el.attr("tag").map(str::to_string),
            name: required_attr(el, "softwarelist", "name")?,
            status,
            filter: el.attr("filter").map(str::to_string),
        })
    }
}

/// A `<device>` media slot (cartridge port, floppy drive, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDevice {
    pub kind: String,
    pub tag: Option<String>,
    pub fixed_image: bool,
    pub mandatory: bool,
    pub interface: Option<String>,
    /// File extensions the slot accepts.
    pub extensions: Vec<String>,
    /// `(name, briefname)` of the slot instance.
    pub instance: Option<(String, String)>,
}

impl MediaDevice {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        let instance = match el.first_child("instance") {
            Some(inst) => Some((
                required_attr(&inst, "instance", "name")?,
                required_attr(&inst, "instance", "briefname")?,
            )),
            None => None,
        };
        Ok(MediaDevice {
            kind: required_attr(el, "device", "type")?,
            tag: el.attr("tag").map(str::to_string),
            // these two use "1", not the usual yes/no convention
            fixed_image: el.attr("fixed_image") == Some("1"),
            mandatory: el.attr("mandatory") == Some("1"),
            interface: el.attr("interface").map(str::to_string),
            extensions: el
                .children_named("extension")
                .filter_map(|ext| ext.attr("name").map(str::to_string))
                .collect(),
            instance,
        })
    }
}

/// One physical control (joystick, paddle, ...) in an input block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlInfo {
    /// Control type string; the DTD deliberately leaves the set open.
    pub kind: String,
    /// Player number, starting at 1.
    pub player: i64,
    pub buttons: i64,
    pub required_buttons: i64,
    /// Joystick ways descriptor, e.g. `8` or `vertical2`.
    pub ways: Option<String>,
    pub reverse: bool,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub sensitivity: Option<i64>,
    pub keydelta: Option<i64>,
}

impl ControlInfo {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        Ok(ControlInfo {
            kind: required_attr(el, "control", "type")?,
            player: el.attr_int("player")?.unwrap_or(1),
            buttons: el.attr_int("buttons")?.unwrap_or(0),
            required_buttons: el.attr_int("reqbuttons")?.unwrap_or(0),
            ways: el.attr("ways").map(str::to_string),
            reverse: el.attr_yes_no("reverse", false)?,
            minimum: el.attr_int("minimum")?,
            maximum: el.attr_int("maximum")?,
            sensitivity: el.attr_int("sensitivity")?,
            keydelta: el.attr_int("keydelta")?,
        })
    }
}

/// The `<input>` block of a machine record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputInfo {
    pub players: Option<i64>,
    pub coin_slots: Option<i64>,
    pub service: bool,
    pub tilt: bool,
    pub controls: Vec<ControlInfo>,
}

impl InputInfo {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        Ok(InputInfo {
            players: el.attr_int("players")?,
            coin_slots: el.attr_int("coins")?,
            service: el.attr_yes_no("service", false)?,
            tilt: el.attr_yes_no("tilt", false)?,
            controls: el
                .children_named("control")
                .map(|c| ControlInfo::from_element(&c))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Distinct control type strings.
    pub fn control_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.controls.iter().map(|c| c.kind.as_str()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }
}

/// Emulation quality reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Good,
    Imperfect,
    Preliminary,
}

impl DriverStatus {
    fn parse(name: &str, value: &str) -> Result<Self, XmlError> {
        match value {
            "good" => Ok(DriverStatus::Good),
            "imperfect" => Ok(DriverStatus::Imperfect),
            "preliminary" => Ok(DriverStatus::Preliminary),
            other => Err(coercion(name, other, "good, imperfect or preliminary")),
        }
    }
}

/// The `<driver>` block of a machine record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    pub status: DriverStatus,
    pub emulation: DriverStatus,
    pub cocktail: Option<DriverStatus>,
    pub savestate_supported: bool,
    pub requires_artwork: bool,
    pub unofficial: bool,
    pub no_sound_hardware: bool,
    pub incomplete: bool,
}

impl DriverInfo {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        let status = el
            .attr("status")
            .ok_or(ModelError::MissingAttribute { tag: "driver", attr: "status" })?;
        let emulation = el
            .attr("emulation")
            .ok_or(ModelError::MissingAttribute { tag: "driver", attr: "emulation" })?;
        Ok(DriverInfo {
            status: DriverStatus::parse("status", status)?,
            emulation: DriverStatus::parse("emulation", emulation)?,
            cocktail: el
                .attr("cocktail")
                .map(|v| DriverStatus::parse("cocktail", v))
                .transpose()?,
            savestate_supported: el.attr("savestate") == Some("supported"),
            // the four flags below only exist in newer listings; absence
            // means the friendly default
            requires_artwork: el.attr_yes_no("requiresartwork", false)?,
            unofficial: el.attr_yes_no("unofficial", false)?,
            no_sound_hardware: el.attr_yes_no("nosoundhardware", false)?,
            incomplete: el.attr_yes_no("incomplete", false)?,
        })
    }
}

/// Emulation status of one machine feature; a feature that works is simply
/// not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStatus {
    Imperfect,
    Unemulated,
}

/// One `<feature>` caveat on a machine record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCondition {
    /// Feature type string (graphics, sound, protection, ...).
    pub kind: String,
    pub status: Option<FeatureStatus>,
}

impl FeatureCondition {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        // status and overall seem mutually exclusive in practice
        let raw = el.attr("status").or_else(|| el.attr("overall"));
        let status = match raw {
            None => None,
            Some("imperfect") => Some(FeatureStatus::Imperfect),
            Some("unemulated") => Some(FeatureStatus::Unemulated),
            Some(other) => return Err(coercion("status", other, "imperfect or unemulated").into()),
        };
        Ok(FeatureCondition {
            kind: required_attr(el, "feature", "type")?,
            status,
        })
    }
}

/// One selectable RAM size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamOption {
    pub name: Option<String>,
    pub default: bool,
    /// Size in bytes, from the element text.
    pub size: Option<i64>,
}

impl RamOption {
    fn from_element(el: &Element<'_>) -> Result<Self, ModelError> {
        let size = match el.text().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(
                text.parse()
                    .map_err(|_| coercion("ramoption", text, "a size in bytes"))?,
            ),
        };
        Ok(RamOption {
            name: el.attr("name").map(str::to_string),
            default: el.attr_yes_no("default", false)?,
            size,
        })
    }
}

/// One `<machine>` record. Cheap scalars are captured at construction;
/// sub-structures are extracted on first access and cached.
#[derive(Debug)]
pub struct MachineElement {
    doc: Arc<Document>,
    node: NodeId,
    basename: String,
    description: Option<String>,
    source_file: Option<String>,
    clone_of: Option<String>,
    rom_of: Option<String>,
    sample_of: Option<String>,
    year: Option<String>,
    manufacturer: Option<String>,
    is_bios: bool,
    is_device: bool,
    is_mechanical: bool,
    runnable: bool,
    roms: OnceLock<Vec<RomEntry>>,
    disks: OnceLock<Vec<DiskEntry>>,
    chips: OnceLock<Vec<ChipEntry>>,
    displays: OnceLock<Vec<DisplayEntry>>,
    bios_sets: OnceLock<Vec<BiosSet>>,
    device_refs: OnceLock<Vec<String>>,
    samples: OnceLock<Vec<String>>,
    software_lists: OnceLock<Vec<SoftwareListRef>>,
    media_devices: OnceLock<Vec<MediaDevice>>,
    slot_names: OnceLock<Vec<String>>,
    ram_options: OnceLock<Vec<RamOption>>,
    features: OnceLock<Vec<FeatureCondition>>,
    input: OnceLock<Option<InputInfo>>,
    driver: OnceLock<Option<DriverInfo>>,
}

impl MachineElement {
    /// Build a machine model from a node inside `doc`.
    pub fn new(doc: Arc<Document>, node: NodeId) -> Result<Self, ModelError> {
        let el = doc.element(node);
        let basename = required_attr(&el, "machine", "name")?;
        let description = el.child_text("description").map(str::to_string);
        if description.is_none() {
            warn!(machine = %basename, "<machine> element has missing description");
        }
        Ok(MachineElement {
            basename,
            description,
            source_file: el.attr("sourcefile").map(str::to_string),
            clone_of: el.attr("cloneof").map(str::to_string),
            rom_of: el.attr("romof").map(str::to_string),
            sample_of: el.attr("sampleof").map(str::to_string),
            year: el.child_text("year").map(str::to_string),
            manufacturer: el.child_text("manufacturer").map(str::to_string),
            is_bios: el.attr_yes_no("isbios", false)?,
            is_device: el.attr_yes_no("isdevice", false)?,
            is_mechanical: el.attr_yes_no("ismechanical", false)?,
            // the DTD defaults runnable to yes; only devices say no
            runnable: el.attr_yes_no("runnable", true)?,
            roms: OnceLock::new(),
            disks: OnceLock::new(),
            chips: OnceLock::new(),
            displays: OnceLock::new(),
            bios_sets: OnceLock::new(),
            device_refs: OnceLock::new(),
            samples: OnceLock::new(),
            software_lists: OnceLock::new(),
            media_devices: OnceLock::new(),
            slot_names: OnceLock::new(),
            ram_options: OnceLock::new(),
            features: OnceLock::new(),
            input: OnceLock::new(),
            driver: OnceLock::new(),
            doc,
            node,
        })
    }

    /// Build a machine model from a single-record document, as produced by
    /// the fragment streamer.
    pub fn from_document(doc: Document) -> Result<Self, ModelError> {
        let doc = Arc::new(doc);
        let root = doc.root_id();
        MachineElement::new(doc, root)
    }

    fn element(&self) -> Element<'_> {
        self.doc.element(self.node)
    }

    fn cached<'a, T>(
        &'a self,
        cell: &'a OnceLock<T>,
        build: impl FnOnce(Element<'_>) -> Result<T, ModelError>,
    ) -> Result<&'a T, ModelError> {
        if let Some(value) = cell.get() {
            return Ok(value);
        }
        let value = build(self.element())?;
        Ok(cell.get_or_init(|| value))
    }

    /// Unique short identifier of the machine within its listing.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Human readable name; falls back to the basename when the record has
    /// no description.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.basename)
    }

    /// Driver source file inside the MAME tree.
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Basename of the clone parent, when this is a clone set.
    pub fn clone_of(&self) -> Option<&str> {
        self.clone_of.as_deref()
    }

    /// Basename of the set ROMs are shared with; for clone sets this is the
    /// parent, so resolve through the parent to find the BIOS.
    pub fn rom_of(&self) -> Option<&str> {
        self.rom_of.as_deref()
    }

    /// Basename of the shared sample set.
    pub fn sample_of(&self) -> Option<&str> {
        self.sample_of.as_deref()
    }

    /// Release year as written, which may contain `?` placeholders.
    pub fn raw_year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    /// Release year, when it parses as a number.
    pub fn year(&self) -> Option<i64> {
        self.year.as_deref().and_then(|y| y.parse().ok())
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    pub fn is_bios(&self) -> bool {
        self.is_bios
    }

    pub fn is_device(&self) -> bool {
        self.is_device
    }

    pub fn is_mechanical(&self) -> bool {
        self.is_mechanical
    }

    pub fn is_runnable(&self) -> bool {
        self.runnable
    }

    /// ROM files the machine needs.
    pub fn roms(&self) -> Result<&[RomEntry], ModelError> {
        self.cached(&self.roms, |el| {
            el.children_named("rom")
                .map(|rom| RomEntry::from_element(&rom))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// CHD disk images the machine needs.
    pub fn disks(&self) -> Result<&[DiskEntry], ModelError> {
        self.cached(&self.disks, |el| {
            el.children_named("disk")
                .map(|disk| DiskEntry::from_element(&disk))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Emulated chips.
    pub fn chips(&self) -> Result<&[ChipEntry], ModelError> {
        self.cached(&self.chips, |el| {
            el.children_named("chip")
                .map(|chip| ChipEntry::from_element(&chip))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Attached screens.
    pub fn displays(&self) -> Result<&[DisplayEntry], ModelError> {
        self.cached(&self.displays, |el| {
            el.children_named("display")
                .map(|display| DisplayEntry::from_element(&display))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Selectable BIOS options.
    pub fn bios_sets(&self) -> Result<&[BiosSet], ModelError> {
        self.cached(&self.bios_sets, |el| {
            el.children_named("biosset")
                .map(|set| BiosSet::from_element(&set))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// The default BIOS option, when one is marked.
    pub fn default_bios(&self) -> Result<Option<&BiosSet>, ModelError> {
        Ok(self.bios_sets()?.iter().find(|set| set.default))
    }

    /// Basenames of devices the machine pulls in.
    pub fn device_refs(&self) -> Result<&[String], ModelError> {
        self.cached(&self.device_refs, |el| {
            el.children_named("device_ref")
                .map(|dev| required_attr(&dev, "device_ref", "name"))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Names of sound sample files.
    pub fn samples(&self) -> Result<&[String], ModelError> {
        self.cached(&self.samples, |el| {
            el.children_named("sample")
                .map(|sample| required_attr(&sample, "sample", "name"))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Software lists usable with this machine.
    pub fn software_lists(&self) -> Result<&[SoftwareListRef], ModelError> {
        self.cached(&self.software_lists, |el| {
            el.children_named("softwarelist")
                .map(|list| SoftwareListRef::from_element(&list))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Media slots (`<device>` elements).
    pub fn media_devices(&self) -> Result<&[MediaDevice], ModelError> {
        self.cached(&self.media_devices, |el| {
            el.children_named("device")
                .map(|dev| MediaDevice::from_element(&dev))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Names of pluggable slots.
    pub fn slot_names(&self) -> Result<&[String], ModelError> {
        self.cached(&self.slot_names, |el| {
            el.children_named("slot")
                .map(|slot| required_attr(&slot, "slot", "name"))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Selectable RAM sizes.
    pub fn ram_options(&self) -> Result<&[RamOption], ModelError> {
        self.cached(&self.ram_options, |el| {
            el.children_named("ramoption")
                .map(|opt| RamOption::from_element(&opt))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// Feature caveats.
    pub fn features(&self) -> Result<&[FeatureCondition], ModelError> {
        self.cached(&self.features, |el| {
            el.children_named("feature")
                .map(|feature| FeatureCondition::from_element(&feature))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// The input block, when present.
    pub fn input(&self) -> Result<Option<&InputInfo>, ModelError> {
        self.cached(&self.input, |el| {
            el.first_child("input")
                .map(|input| InputInfo::from_element(&input))
                .transpose()
        })
        .map(Option::as_ref)
    }

    /// The driver block, when present.
    pub fn driver(&self) -> Result<Option<&DriverInfo>, ModelError> {
        self.cached(&self.driver, |el| {
            el.first_child("driver")
                .map(|driver| DriverInfo::from_element(&driver))
                .transpose()
        })
        .map(Option::as_ref)
    }

    /// Number of coin slots, zero when there is no input block.
    pub fn coin_slots(&self) -> Result<i64, ModelError> {
        Ok(self
            .input()?
            .and_then(|input| input.coin_slots)
            .unwrap_or(0))
    }

    /// Number of sound channels, zero when there is no sound block.
    pub fn sound_channels(&self) -> Result<i64, ModelError> {
        match self.element().first_child("sound") {
            Some(sound) => Ok(sound.attr_int("channels")?.unwrap_or(0)),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mame_xml::parse;

    const MACHINE: &str = r#"
        <machine name="puckman" sourcefile="pacman.cpp" sampleof="pacman">
            <description>PuckMan (Japan set 1)</description>
            <year>1980</year>
            <manufacturer>Namco</manufacturer>
            <biosset name="set1" description="Standard" default="yes"/>
            <rom name="pm1_prg1.6e" size="2048" crc="f36e88ab" sha1="813cecf44bf5464b1aed64b36f5047e4c79ba176" region="maincpu"/>
            <rom name="pm1_prg2.6k" size="2048" crc="618bd9b3" status="baddump"/>
            <rom name="missing.bin" size="2048" status="nodump" optional="yes"/>
            <disk name="hdd" sha1="aa13cecf44bf5464b1aed64b36f5047e4c79ba17" index="0"/>
            <device_ref name="z80"/>
            <sample name="pacman_die"/>
            <chip type="cpu" tag="maincpu" name="Zilog Z80" clock="3072000"/>
            <chip type="audio" tag="namco" name="Namco"/>
            <display tag="screen" type="raster" rotate="90" width="288" height="224" refresh="60.606061"/>
            <sound channels="1"/>
            <input players="2" coins="2" service="yes">
                <control type="joy" player="1" buttons="0" ways="4"/>
                <control type="joy" player="2" buttons="0" ways="4"/>
            </input>
            <driver status="good" emulation="good" savestate="supported"/>
            <feature type="sound" status="imperfect"/>
            <device type="cartslot" tag="cart" mandatory="1" interface="nes_cart">
                <instance name="cartridge" briefname="cart"/>
                <extension name="nes"/>
                <extension name="unf"/>
            </device>
            <slot name="cart"/>
            <softwarelist tag="cart_list" name="nes" status="original"/>
            <ramoption name="64K" default="yes">65536</ramoption>
        </machine>
    "#;

    fn machine() -> MachineElement {
        let doc = parse(MACHINE.as_bytes()).expect("parse machine");
        MachineElement::from_document(doc).expect("build machine")
    }

    #[test]
    fn eager_scalars() {
        let machine = machine();
        assert_eq!(machine.basename(), "puckman");
        assert_eq!(machine.description(), "PuckMan (Japan set 1)");
        assert_eq!(machine.year(), Some(1980));
        assert_eq!(machine.manufacturer(), Some("Namco"));
        assert_eq!(machine.sample_of(), Some("pacman"));
        assert!(machine.is_runnable());
        assert!(!machine.is_device());
        assert!(!machine.is_bios());
    }

    #[test]
    fn rom_entries_are_typed() {
        let machine = machine();
        let roms = machine.roms().expect("roms");
        assert_eq!(roms.len(), 3);
        assert_eq!(roms[0].name, "pm1_prg1.6e");
        assert_eq!(roms[0].size, Some(2048));
        assert_eq!(roms[0].crc, Some(0xF36E_88AB));
        assert_eq!(roms[0].status, DumpStatus::Good);
        assert_eq!(roms[1].status, DumpStatus::BadDump);
        assert_eq!(roms[2].status, DumpStatus::NoDump);
        assert!(roms[2].optional);
        // second access hits the cache and yields the same data
        assert_eq!(machine.roms().expect("cached roms").len(), 3);
    }

    #[test]
    fn nested_structures() {
        let machine = machine();
        assert_eq!(machine.device_refs().unwrap(), ["z80"]);
        assert_eq!(machine.samples().unwrap(), ["pacman_die"]);
        let chips = machine.chips().unwrap();
        assert_eq!(chips[0].kind, ChipKind::Cpu);
        assert_eq!(chips[0].clock_hz, Some(3_072_000));
        assert_eq!(chips[1].kind, ChipKind::Audio);
        let displays = machine.displays().unwrap();
        assert_eq!(displays[0].kind, DisplayKind::Raster);
        assert_eq!(displays[0].rotate, Some(90));
        let input = machine.input().unwrap().expect("input block");
        assert_eq!(input.players, Some(2));
        assert_eq!(input.control_kinds(), ["joy"]);
        assert!(input.service);
        let driver = machine.driver().unwrap().expect("driver block");
        assert_eq!(driver.status, DriverStatus::Good);
        assert!(driver.savestate_supported);
        assert_eq!(machine.coin_slots().unwrap(), 2);
        assert_eq!(machine.sound_channels().unwrap(), 1);
    }

    #[test]
    fn media_and_software_lists() {
        let machine = machine();
        let media = machine.media_devices().unwrap();
        assert_eq!(media.len(), 1);
        assert!(media[0].mandatory);
        assert_eq!(media[0].extensions, ["nes", "unf"]);
        assert_eq!(
            media[0].instance,
            Some(("cartridge".to_string(), "cart".to_string()))
        );
        let lists = machine.software_lists().unwrap();
        assert_eq!(lists[0].name, "nes");
        assert_eq!(lists[0].status, SoftwareListStatus::Original);
        let ram = machine.ram_options().unwrap();
        assert_eq!(ram[0].size, Some(65536));
        assert!(ram[0].default);
        let bios = machine.default_bios().unwrap().expect("default bios");
        assert_eq!(bios.name, "set1");
    }

    #[test]
    fn missing_name_is_an_error() {
        let doc = parse(b"<machine><description>stub</description></machine>").unwrap();
        let err = MachineElement::from_document(doc).unwrap_err();
        assert!(matches!(
            err,
            ModelError::MissingAttribute { tag: "machine", attr: "name" }
        ));
    }

    #[test]
    fn malformed_rom_surfaces_coercion() {
        let doc = parse(
            br#"<machine name="broken"><rom name="a.bin" size="lots"/></machine>"#,
        )
        .unwrap();
        let machine = MachineElement::from_document(doc).unwrap();
        assert!(matches!(
            machine.roms().unwrap_err(),
            ModelError::Xml(XmlError::Coercion { .. })
        ));
    }
}
