//! History database: lookup tables built from `history.xml`, and the
//! `- SECTION -` text format the entry bodies use.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use mame_model::HistoryXml;
use mame_xml::XmlBackend;

use crate::SupportError;

/// Immutable lookup tables over a parsed `history.xml`.
#[derive(Debug)]
pub struct HistoryDb {
    systems: BTreeMap<String, String>,
    software: BTreeMap<(String, String), String>,
}

impl HistoryDb {
    /// Flatten a history document into lookup tables.
    pub fn from_xml(xml: &HistoryXml) -> Self {
        let systems = xml
            .system_entries()
            .map(|(basename, text)| (basename.to_string(), text.to_string()))
            .collect();
        let software = xml
            .software_entries()
            .map(|(list, software, text)| ((list.to_string(), software.to_string()), text.to_string()))
            .collect();
        HistoryDb { systems, software }
    }

    /// Load `history.xml` from disk; `None` when the file does not exist.
    pub fn load(path: &Path, backend: XmlBackend) -> Result<Option<Self>, SupportError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(HistoryDb::from_xml(&HistoryXml::parse(
                &bytes, backend,
            )?))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Async variant of [`load`](Self::load).
    pub async fn load_async(path: &Path, backend: XmlBackend) -> Result<Option<Self>, SupportError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(HistoryDb::from_xml(&HistoryXml::parse(
                &bytes, backend,
            )?))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Raw entry text for a system.
    pub fn system_text(&self, basename: &str) -> Option<&str> {
        self.systems.get(basename).map(String::as_str)
    }

    /// Raw entry text for a software item.
    pub fn software_text(&self, list: &str, software: &str) -> Option<&str> {
        self.software
            .get(&(list.to_string(), software.to_string()))
            .map(String::as_str)
    }

    /// Parsed entry for a system.
    pub fn system_entry(&self, basename: &str) -> Option<HistoryText> {
        self.system_text(basename).map(HistoryText::parse)
    }

    /// Parsed entry for a software item.
    pub fn software_entry(&self, list: &str, software: &str) -> Option<HistoryText> {
        self.software_text(list, software).map(HistoryText::parse)
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn software_count(&self) -> usize {
        self.software.len()
    }
}

/// One history entry body, split into its `- SECTION -` delimited sections.
/// The leading free text is stored under the empty section name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryText {
    sections: BTreeMap<String, String>,
}

fn section_header(line: &str) -> Option<&str> {
    let trimmed = line.trim_end();
    let name = trimmed.strip_prefix("- ")?.strip_suffix(" -")?;
    if name.is_empty() {
        return None;
    }
    Some(name)
}

impl HistoryText {
    /// Split an entry body into sections.
    pub fn parse(text: &str) -> Self {
        let mut sections = BTreeMap::new();
        let mut current = String::new();
        let mut lines: Vec<&str> = Vec::new();
        for line in text.lines() {
            if let Some(name) = section_header(line) {
                sections.insert(current, lines.join("\n").trim().to_string());
                current = name.to_string();
                lines.clear();
            } else {
                lines.push(line);
            }
        }
        sections.insert(current, lines.join("\n").trim().to_string());
        HistoryText { sections }
    }

    /// A section body by header name.
    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }

    /// All sections, the preamble included under the empty name.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .iter()
            .map(|(name, body)| (name.as_str(), body.as_str()))
    }

    fn start(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        let Some(start) = self.section("") else {
            return (None, None, None);
        };
        let (first, rest) = match start.split_once('\n') {
            Some((first, rest)) => (first, Some(rest)),
            None => (start, None),
        };
        // leading stanza: "TYPE published N years ago:"
        let stanza = first
            .trim()
            .strip_suffix(" years ago:")
            .and_then(|head| head.split_once(" published "));
        match stanza {
            Some((kind, age)) => (
                Some(kind),
                Some(age),
                rest.map(str::trim).filter(|text| !text.is_empty()),
            ),
            None => (None, None, Some(start)),
        }
    }

    /// The publication kind from the leading stanza, e.g. `Arcade Video game`.
    pub fn kind(&self) -> Option<&str> {
        self.start().0
    }

    /// Years since publication, relative to the history file's release.
    pub fn age(&self) -> Option<i64> {
        self.start().1.and_then(|age| age.trim().parse().ok())
    }

    /// The descriptive text after the stanza.
    pub fn description(&self) -> Option<&str> {
        self.start().2
    }

    pub fn technical(&self) -> Option<&str> {
        self.section("TECHNICAL")
    }

    pub fn trivia(&self) -> Option<&str> {
        self.section("TRIVIA")
    }

    pub fn tips_and_tricks(&self) -> Option<&str> {
        self.section("TIPS AND TRICKS")
    }

    pub fn updates(&self) -> Option<&str> {
        self.section("UPDATES")
    }

    pub fn scoring(&self) -> Option<&str> {
        self.section("SCORING")
    }

    pub fn series(&self) -> Option<&str> {
        self.section("SERIES")
    }

    pub fn staff(&self) -> Option<&str> {
        self.section("STAFF")
    }

    pub fn ports(&self) -> Option<&str> {
        self.section("PORTS")
    }

    pub fn cast(&self) -> Option<&str> {
        self.section("CAST OF CHARACTERS")
    }

    /// Sections other than the well-known set above.
    pub fn other_sections(&self) -> impl Iterator<Item = (&str, &str)> {
        const KNOWN: [&str; 10] = [
            "",
            "TECHNICAL",
            "TRIVIA",
            "TIPS AND TRICKS",
            "UPDATES",
            "SCORING",
            "SERIES",
            "STAFF",
            "PORTS",
            "CAST OF CHARACTERS",
        ];
        self.sections
            .iter()
            .filter(|(name, _)| !KNOWN.contains(&name.as_str()))
            .map(|(name, body)| (name.as_str(), body.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mame_xml::parse;

    const ENTRY: &str = "\
Arcade Video game published 45 years ago:

Puck Man was the original maze chase.

- TECHNICAL -

Namco Pac-Man hardware.
Z80 @ 3.072 MHz.

- TRIVIA -

Inspired by a pizza.

- STAFF -

Designed by Toru Iwatani.

- OBSCURE -

Nothing here.
";

    #[test]
    fn sections_split_on_headers() {
        let entry = HistoryText::parse(ENTRY);
        assert_eq!(entry.kind(), Some("Arcade Video game"));
        assert_eq!(entry.age(), Some(45));
        assert_eq!(
            entry.description(),
            Some("Puck Man was the original maze chase.")
        );
        assert_eq!(
            entry.technical(),
            Some("Namco Pac-Man hardware.\nZ80 @ 3.072 MHz.")
        );
        assert_eq!(entry.trivia(), Some("Inspired by a pizza."));
        assert_eq!(entry.staff(), Some("Designed by Toru Iwatani."));
        assert_eq!(entry.scoring(), None);
        let other: Vec<_> = entry.other_sections().collect();
        assert_eq!(other, [("OBSCURE", "Nothing here.")]);
    }

    #[test]
    fn entry_without_stanza_is_all_description() {
        let entry = HistoryText::parse("Just some text.\nOn two lines.");
        assert_eq!(entry.kind(), None);
        assert_eq!(entry.age(), None);
        assert_eq!(entry.description(), Some("Just some text.\nOn two lines."));
    }

    const HISTORY_XML: &str = r#"
        <history version="2.60">
            <entry>
                <systems><system name="puckman"/></systems>
                <text>Arcade Video game published 45 years ago:

Puck Man.

- TRIVIA -

Maze chase.</text>
            </entry>
            <entry>
                <software><item list="nes" name="smb"/></software>
                <text>Console cart.</text>
            </entry>
        </history>
    "#;

    #[test]
    fn db_lookups() {
        let xml = HistoryXml::new(parse(HISTORY_XML.as_bytes()).unwrap());
        let db = HistoryDb::from_xml(&xml);
        assert_eq!(db.system_count(), 1);
        assert_eq!(db.software_count(), 1);
        let entry = db.system_entry("puckman").expect("puckman entry");
        assert_eq!(entry.trivia(), Some("Maze chase."));
        assert_eq!(db.software_text("nes", "smb"), Some("Console cart."));
        assert!(db.system_entry("pacman").is_none());
        assert!(db.software_entry("nes", "zelda").is_none());
    }

    #[test]
    fn missing_file_is_none() {
        let db = HistoryDb::load(
            Path::new("/nonexistent/mamekit/history.xml"),
            XmlBackend::Builtin,
        )
        .unwrap();
        assert!(db.is_none());
    }
}
