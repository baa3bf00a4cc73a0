//! Section classifier for `mameinfo.dat` entry bodies.
//!
//! The format is ad hoc: prose sections (`WIP:`, `NOTE:`), list sections
//! (`BIOS:`, `ROMS:`), `Recommended Games` groups with an optional genre in
//! parentheses, and a handful of single-value lines (`LEVELS:`,
//! `ARCADE RELEASE:`). `Romset:`/`CHD:` lines are noise and dropped.

use std::collections::BTreeMap;

const PROSE_SECTIONS: [&str; 13] = [
    "WIP:",
    "CHANGES:",
    "TODO:",
    "TEST MODE:",
    "Bugs:",
    "NOTE:",
    "NOTES:",
    "SETUP:",
    "SETUP and TEST MODE:",
    "SERVICE MODE:",
    "SETUP/SERVICE MODE:",
    "STORY:",
    "HOW TO PLAY:",
];

const LIST_SECTIONS: [&str; 4] = ["BIOS:", "DEVICE:", "ROMS:", "Other Emulators:"];

/// One `mameinfo.dat` entry split into its sections. The leading version
/// line lands in the `summary` prose section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MameInfoEntry {
    /// Prose sections by name, `summary` included.
    pub sections: BTreeMap<String, String>,
    /// Item-list sections (BIOS, DEVICE, ROMS, Other Emulators).
    pub list_sections: BTreeMap<String, Vec<String>>,
    /// Recommended games, keyed by genre (`Games` when none is given).
    pub recommended_games: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SectionKind {
    Prose,
    List,
    Recommended,
}

impl MameInfoEntry {
    pub fn parse(contents: &str) -> Self {
        let contents = contents.strip_prefix("$mame\n").unwrap_or(contents);
        let mut entry = MameInfoEntry::default();
        let mut section = "summary".to_string();
        let mut kind = SectionKind::Prose;
        let mut lines: Vec<String> = Vec::new();

        fn finish(
            entry: &mut MameInfoEntry,
            section: &str,
            kind: SectionKind,
            lines: &mut Vec<String>,
        ) {
            let kept: Vec<String> = lines.drain(..).filter(|line| !line.is_empty()).collect();
            match kind {
                SectionKind::Recommended => {
                    let genre = section
                        .strip_prefix("Recommended Games (")
                        .and_then(|rest| rest.strip_suffix(')'))
                        .unwrap_or("Games");
                    entry.recommended_games.insert(genre.to_string(), kept);
                }
                SectionKind::List => {
                    entry.list_sections.insert(section.to_string(), kept);
                }
                SectionKind::Prose => {
                    // single-value sections (Levels, Release date) are set
                    // directly; stray lines after them append rather than
                    // clobber
                    let body = kept.join("\n");
                    if !body.is_empty() || !entry.sections.contains_key(section) {
                        let slot = entry.sections.entry(section.to_string()).or_default();
                        if !slot.is_empty() && !body.is_empty() {
                            slot.push('\n');
                        }
                        slot.push_str(&body);
                    }
                }
            }
        }

        for line in contents.lines() {
            if PROSE_SECTIONS.contains(&line) {
                finish(&mut entry, &section, kind, &mut lines);
                section = line.trim_end_matches(':').to_string();
                kind = SectionKind::Prose;
            } else if LIST_SECTIONS.contains(&line) {
                finish(&mut entry, &section, kind, &mut lines);
                section = line.trim_end_matches(':').to_string();
                kind = SectionKind::List;
            } else if line.starts_with("Recommended Games") {
                // sometimes there is no colon and nothing to recommend
                finish(&mut entry, &section, kind, &mut lines);
                section = line.trim_end_matches(':').to_string();
                kind = SectionKind::Recommended;
            } else if let Some(levels) = line.strip_prefix("LEVELS:") {
                // not always numeric, e.g. "50-30-45 (Cookie & Bibi ...)"
                finish(&mut entry, &section, kind, &mut lines);
                section = "Levels".to_string();
                kind = SectionKind::Prose;
                entry
                    .sections
                    .insert("Levels".to_string(), levels.trim().to_string());
            } else if let Some(release) = line.strip_prefix("ARCADE RELEASE:") {
                finish(&mut entry, &section, kind, &mut lines);
                section = "Release date".to_string();
                kind = SectionKind::Prose;
                entry
                    .sections
                    .insert("Release date".to_string(), release.trim().to_string());
            } else if line.starts_with("Romset:") || line.starts_with("CHD:") {
                continue;
            } else {
                let line = line
                    .strip_prefix("- ")
                    .or_else(|| line.strip_prefix("* "))
                    .unwrap_or(line);
                lines.push(line.trim().to_string());
            }
        }
        finish(&mut entry, &section, kind, &mut lines);
        entry
    }

    /// The leading version/author blurb.
    pub fn summary(&self) -> Option<&str> {
        self.sections.get("summary").map(String::as_str)
    }

    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = "\
0.26 [Nicola Salmoria]

Romset: 20 kb
ARCADE RELEASE: 1980/May/22

WIP:
- 0.262: Fixed sprite wraparound
- 0.100: Promoted to working

BIOS:
- pacbios

LEVELS: 255 (endless)

Recommended Games (Maze):
pacman
mspacman

Recommended Games:
galaga
";

    #[test]
    fn sections_classify_by_kind() {
        let entry = MameInfoEntry::parse(ENTRY);
        assert_eq!(entry.summary(), Some("0.26 [Nicola Salmoria]"));
        assert_eq!(entry.section("Release date"), Some("1980/May/22"));
        assert_eq!(
            entry.section("WIP"),
            Some("0.262: Fixed sprite wraparound\n0.100: Promoted to working")
        );
        assert_eq!(entry.list_sections["BIOS"], ["pacbios"]);
        assert_eq!(entry.section("Levels"), Some("255 (endless)"));
        assert_eq!(entry.recommended_games["Maze"], ["pacman", "mspacman"]);
        assert_eq!(entry.recommended_games["Games"], ["galaga"]);
        // the Romset noise line is gone
        assert!(!entry.sections.values().any(|body| body.contains("Romset")));
    }

    #[test]
    fn marker_prefix_is_tolerated() {
        let entry = MameInfoEntry::parse("$mame\n0.30 [Someone]\n");
        assert_eq!(entry.summary(), Some("0.30 [Someone]"));
    }
}
