//! Line-format parsing of `-verifyroms` and `-verifysoftlist` output.
//!
//! The grammar is a versioned contract with the frontend: summary lines read
//! `romset NAME [PARENT] is STATUS`, and any detail about a bad set is
//! printed on the lines *before* its summary line.

use serde::Serialize;

/// Overall verdict for one romset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RomsetStatus {
    Good,
    /// Some files are missing or flawed but the set still runs.
    BestAvailable,
    Bad,
    /// The frontend could not find the set at all.
    NotFound,
    /// The set needs no ROMs (devices say this; romless machines report
    /// best-available instead).
    NoRoms,
}

impl RomsetStatus {
    /// Whether the set is usable as-is.
    pub fn is_okay(self) -> bool {
        matches!(self, RomsetStatus::Good | RomsetStatus::BestAvailable)
    }
}

/// Classified reason a single file was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileIssue {
    NotFound,
    BadChecksum,
    NeedsRedump,
    NoGoodDump,
    WrongLength,
    Other,
}

/// One flagged file within a romset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub issue: FileIssue,
    /// The detail line as printed.
    pub line: String,
}

/// Parsed outcome of verifying one romset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RomsetVerification {
    pub basename: String,
    /// Parent set named in brackets on the summary line, when present.
    pub parent: Option<String>,
    pub status: RomsetStatus,
    /// Per-file issues parsed out of the detail lines.
    pub files: Vec<FileReport>,
    /// Detail lines that did not name a file (checksum continuations etc).
    pub notes: Vec<String>,
}

impl RomsetVerification {
    pub fn is_okay(&self) -> bool {
        self.status.is_okay()
    }

    pub(crate) fn status_only(basename: &str, status: RomsetStatus) -> Self {
        RomsetVerification {
            basename: basename.to_string(),
            parent: None,
            status,
            files: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// One verified software item from `-verifysoftlist` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftwareVerification {
    pub list: String,
    pub software: String,
    pub status: RomsetStatus,
}

/// Whole-invocation result of a `-verifyroms` run. The frontend exits
/// non-zero whenever any set fails verification, so the raw exit code rides
/// along with the parsed romsets instead of becoming an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub romsets: Vec<RomsetVerification>,
    /// Raw exit code; `None` when the process died to a signal.
    pub exit_code: Option<i32>,
}

impl VerifyReport {
    /// Whether every verified set is usable.
    pub fn all_okay(&self) -> bool {
        self.romsets.iter().all(RomsetVerification::is_okay)
    }
}

fn parse_status(word: &str) -> Option<RomsetStatus> {
    match word {
        "good" => Some(RomsetStatus::Good),
        "best available" => Some(RomsetStatus::BestAvailable),
        "bad" => Some(RomsetStatus::Bad),
        _ => None,
    }
}

/// `romset NAME [PARENT] is STATUS` → `(name, parent, status)`.
fn parse_romset_line(line: &str) -> Option<(&str, Option<&str>, RomsetStatus)> {
    let rest = line.strip_prefix("romset ")?;
    let (head, status) = rest.rsplit_once(" is ")?;
    let status = parse_status(status.trim())?;
    let head = head.trim();
    match head.split_once(' ') {
        None if !head.is_empty() => Some((head, None, status)),
        None => None,
        Some((name, bracketed)) => {
            let parent = bracketed.trim().strip_prefix('[')?.strip_suffix(']')?;
            Some((name, Some(parent), status))
        }
    }
}

/// Detail lines look like `SET: FILE (SIZE bytes) - REASON`. Continuation
/// lines (expected/found checksums) carry no ` - ` separator and are kept as
/// notes.
fn parse_file_line(line: &str) -> Option<FileReport> {
    let (left, reason) = line.rsplit_once(" - ")?;
    let issue = if reason.starts_with("NOT FOUND") {
        FileIssue::NotFound
    } else if reason.contains("INCORRECT CHECKSUM") || reason.contains("WRONG CHECKSUMS") {
        FileIssue::BadChecksum
    } else if reason.contains("NEEDS REDUMP") {
        FileIssue::NeedsRedump
    } else if reason.contains("NO GOOD DUMP") {
        FileIssue::NoGoodDump
    } else if reason.contains("WRONG LENGTH") {
        FileIssue::WrongLength
    } else {
        FileIssue::Other
    };
    let body = left
        .split_once(':')
        .map(|(_, rest)| rest)
        .unwrap_or(left)
        .trim();
    let file = body.split(" (").next().unwrap_or(body).trim();
    if file.is_empty() {
        return None;
    }
    Some(FileReport {
        file: file.to_string(),
        issue,
        line: line.to_string(),
    })
}

/// Parse the stdout of a `-verifyroms` run. Detail lines are attributed to
/// the next summary line; the trailing `N romsets found, N were OK` counter
/// is dropped.
pub fn parse_verify_roms(stdout: &str) -> Vec<RomsetVerification> {
    let mut results = Vec::new();
    let mut files = Vec::new();
    let mut notes = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((basename, parent, status)) = parse_romset_line(line) {
            results.push(RomsetVerification {
                basename: basename.to_string(),
                parent: parent.map(str::to_string),
                status,
                files: std::mem::take(&mut files),
                notes: std::mem::take(&mut notes),
            });
        } else if !line.contains("were OK") {
            match parse_file_line(line) {
                Some(report) => files.push(report),
                None => notes.push(line.to_string()),
            }
        }
    }
    results
}

/// Parse the stdout of a `-verifysoftlist` run. Only usable items appear in
/// the output with a summary line; anything else is diagnostics.
pub fn parse_verify_softlist(stdout: &str) -> Vec<SoftwareVerification> {
    let mut results = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix("romset ") else {
            continue;
        };
        let Some((head, status)) = rest.rsplit_once(" is ") else {
            continue;
        };
        let Some(status) = parse_status(status.trim()) else {
            continue;
        };
        if !status.is_okay() {
            continue;
        }
        let Some((list, software)) = head.trim().split_once(':') else {
            continue;
        };
        if list.is_empty() || software.is_empty() {
            continue;
        }
        results.push(SoftwareVerification {
            list: list.to_string(),
            software: software.to_string(),
            status,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERIFYROMS: &str = "\
puckman   : pm1-3.1m (4096 bytes) - NEEDS REDUMP
romset puckman is best available
gauntlet  : 136037-104.9a (32768 bytes) - INCORRECT CHECKSUM:
EXPECTED: CRC(6fb8f3a5) SHA1(aa13cecf44bf5464b1aed64b36f5047e4c79ba17)
   FOUND: CRC(00000000)
gauntlet  : 136037-120.16r (16384 bytes) - NOT FOUND
romset gauntlet [gauntlet2] is bad
romset pacman is good
3 romsets found, 2 were OK.
";

    #[test]
    fn detail_lines_attach_to_the_following_summary() {
        let results = parse_verify_roms(VERIFYROMS);
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].basename, "puckman");
        assert_eq!(results[0].status, RomsetStatus::BestAvailable);
        assert!(results[0].is_okay());
        assert_eq!(results[0].files.len(), 1);
        assert_eq!(results[0].files[0].file, "pm1-3.1m");
        assert_eq!(results[0].files[0].issue, FileIssue::NeedsRedump);

        assert_eq!(results[1].basename, "gauntlet");
        assert_eq!(results[1].parent.as_deref(), Some("gauntlet2"));
        assert_eq!(results[1].status, RomsetStatus::Bad);
        assert!(!results[1].is_okay());
        assert_eq!(results[1].files.len(), 2);
        assert_eq!(results[1].files[0].issue, FileIssue::BadChecksum);
        assert_eq!(results[1].files[1].issue, FileIssue::NotFound);
        assert_eq!(results[1].files[1].file, "136037-120.16r");
        // checksum continuations end up as notes
        assert_eq!(results[1].notes.len(), 2);

        assert_eq!(results[2].basename, "pacman");
        assert_eq!(results[2].status, RomsetStatus::Good);
        assert!(results[2].files.is_empty());
    }

    #[test]
    fn counter_line_is_dropped() {
        let results = parse_verify_roms("romset a is good\n1 romsets found, 1 were OK.\n");
        assert_eq!(results.len(), 1);
        assert!(results[0].notes.is_empty());
    }

    #[test]
    fn unrecognised_output_parses_to_nothing() {
        assert!(parse_verify_roms("something entirely different\n").is_empty());
        assert!(parse_verify_roms("").is_empty());
    }

    const VERIFYSOFTLIST: &str = "\
romset nes:smb is good
romset nes:smbb is best available
romset nes:broken is bad
no romsets found for software list \"a2600\"
2 romsets found, 2 were OK.
";

    #[test]
    fn softlist_yields_only_usable_items() {
        let results = parse_verify_softlist(VERIFYSOFTLIST);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].list, "nes");
        assert_eq!(results[0].software, "smb");
        assert_eq!(results[0].status, RomsetStatus::Good);
        assert_eq!(results[1].software, "smbb");
        assert_eq!(results[1].status, RomsetStatus::BestAvailable);
    }
}
