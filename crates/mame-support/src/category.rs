//! Category folder files: `catlist.ini`, `series.ini`, `nplayers.ini` and
//! friends. The common format is `[Section]` headers followed by bare
//! basenames; `nplayers.ini` instead holds `basename=value` pairs.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;

use tracing::warn;

use crate::SupportError;

/// Section name → basenames listed under it. Keys are case-sensitive.
pub type CategoryMap = BTreeMap<String, BTreeSet<String>>;

/// Parse the bare-basename category format. Malformed lines are skipped
/// with a warning; basenames before the first section header have nowhere
/// to go and count as malformed.
pub fn parse_category_text(text: &str) -> CategoryMap {
    let mut map = CategoryMap::new();
    let mut current: Option<String> = None;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('[') {
            match rest.strip_suffix(']') {
                Some(section) => {
                    map.entry(section.to_string()).or_default();
                    current = Some(section.to_string());
                }
                None => warn!(%line, "skipping malformed section header"),
            }
        } else if let Some(section) = &current {
            map.entry(section.clone())
                .or_default()
                .insert(line.to_string());
        } else {
            warn!(%line, "skipping basename outside any section");
        }
    }
    map
}

/// Parse the `nplayers.ini` format and invert it: the value (`2P sim`,
/// `4P alt`, ...) becomes the section, the key is the basename.
pub fn parse_nplayers_text(text: &str) -> CategoryMap {
    let mut map = CategoryMap::new();
    let mut in_section = false;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = line == "[NPlayers]";
            continue;
        }
        if !in_section {
            continue;
        }
        match line.split_once('=') {
            Some((basename, value)) => {
                map.entry(value.trim().to_string())
                    .or_default()
                    .insert(basename.trim().to_string());
            }
            None => warn!(%line, "skipping malformed nplayers line"),
        }
    }
    map
}

fn read_optional(path: &Path) -> Result<Option<String>, SupportError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn parse_file(stem: &str, path: &Path, text: &str) -> Result<CategoryMap, SupportError> {
    let map = if stem == "nplayers" {
        parse_nplayers_text(text)
    } else {
        parse_category_text(text)
    };
    // a file with real content but not a single section is not this format
    let has_content = text.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with(';')
    });
    if map.is_empty() && has_content {
        return Err(SupportError::Unparseable {
            path: path.to_path_buf(),
            detail: "no category sections found".into(),
        });
    }
    Ok(map)
}

fn ini_stem(path: &Path) -> Option<String> {
    let is_ini = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ini"));
    if !is_ini {
        return None;
    }
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

/// Every `.ini` file of a category folder, read into memory once and keyed
/// by file stem. Immutable after loading.
#[derive(Debug, Default)]
pub struct CategoryFolder {
    cats: BTreeMap<String, CategoryMap>,
}

impl CategoryFolder {
    /// Load every `.ini` file under `dir`. A missing folder loads as empty;
    /// an unparseable file inside it is fatal for that file only and is
    /// reported by a warning here.
    pub fn load(dir: &Path) -> Result<Self, SupportError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(CategoryFolder::default())
            }
            Err(err) => return Err(err.into()),
        };
        let mut cats = BTreeMap::new();
        for entry in entries {
            let path = entry?.path();
            let Some(stem) = ini_stem(&path) else {
                continue;
            };
            let Some(text) = read_optional(&path)? else {
                continue;
            };
            match parse_file(&stem, &path, &text) {
                Ok(map) => {
                    cats.insert(stem, map);
                }
                Err(err) => warn!(file = %path.display(), error = %err, "skipping category file"),
            }
        }
        Ok(CategoryFolder { cats })
    }

    /// Async variant of [`load`](Self::load).
    pub async fn load_async(dir: &Path) -> Result<Self, SupportError> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(CategoryFolder::default())
            }
            Err(err) => return Err(err.into()),
        };
        let mut cats = BTreeMap::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(stem) = ini_stem(&path) else {
                continue;
            };
            let text = match tokio::fs::read(&path).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            match parse_file(&stem, &path, &text) {
                Ok(map) => {
                    cats.insert(stem, map);
                }
                Err(err) => warn!(file = %path.display(), error = %err, "skipping category file"),
            }
        }
        Ok(CategoryFolder { cats })
    }

    /// Stems of the files that loaded.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.cats.keys().map(String::as_str)
    }

    /// The raw section map of one file.
    pub fn sections(&self, cat_name: &str) -> Option<&CategoryMap> {
        self.cats.get(cat_name)
    }

    /// Every section of `cat_name` that lists `basename`.
    pub fn categories_of(&self, cat_name: &str, basename: &str) -> Vec<&str> {
        let Some(cat) = self.cats.get(cat_name) else {
            return Vec::new();
        };
        cat.iter()
            .filter(|(_, names)| names.contains(basename))
            .map(|(section, _)| section.as_str())
            .collect()
    }

    /// The single section expected to list `basename`; warns and keeps the
    /// first when several do.
    pub fn category_of(&self, cat_name: &str, basename: &str) -> Option<&str> {
        let sections = self.categories_of(cat_name, basename);
        if sections.len() > 1 {
            warn!(cat = %cat_name, machine = %basename, "more than one section, using first");
        }
        sections.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CATLIST: &str = "\
; comment line
[Arcade: Maze]
puckman
pacman

[Arcade: Shooter]
galaga
";

    const NPLAYERS: &str = "\
[NPlayers]
puckman=1P
pacman=2P alt
galaga=2P alt
";

    #[test]
    fn sections_collect_their_basenames() {
        let map = parse_category_text(CATLIST);
        assert_eq!(map.len(), 2);
        assert!(map["Arcade: Maze"].contains("puckman"));
        assert!(map["Arcade: Maze"].contains("pacman"));
        assert!(map["Arcade: Shooter"].contains("galaga"));
    }

    #[test]
    fn nplayers_is_inverted() {
        let map = parse_nplayers_text(NPLAYERS);
        assert!(map["1P"].contains("puckman"));
        assert!(map["2P alt"].contains("pacman"));
        assert!(map["2P alt"].contains("galaga"));
    }

    fn folder_with(files: &[(&str, &str)]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mamekit-cats-{}-{}",
            std::process::id(),
            files.len()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create category folder");
        for (name, content) in files {
            fs::write(dir.join(name), content).expect("write category file");
        }
        dir
    }

    #[test]
    fn folder_round_trip() {
        let dir = folder_with(&[("catlist.ini", CATLIST), ("nplayers.ini", NPLAYERS)]);
        let folder = CategoryFolder::load(&dir).expect("load folder");
        assert_eq!(folder.file_names().collect::<Vec<_>>(), ["catlist", "nplayers"]);
        // every basename written into the fixture resolves to its section
        assert_eq!(folder.category_of("catlist", "puckman"), Some("Arcade: Maze"));
        assert_eq!(folder.category_of("catlist", "galaga"), Some("Arcade: Shooter"));
        assert_eq!(folder.category_of("nplayers", "pacman"), Some("2P alt"));
        assert_eq!(folder.category_of("catlist", "unknown"), None);
        assert_eq!(folder.categories_of("missing-file", "puckman"), Vec::<&str>::new());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_folder_loads_empty() {
        let folder =
            CategoryFolder::load(Path::new("/nonexistent/mamekit/cats")).expect("load missing");
        assert!(folder.is_empty());
        assert_eq!(folder.category_of("catlist", "puckman"), None);
    }

    #[tokio::test]
    async fn async_load_matches_sync() {
        let dir = folder_with(&[("catlist.ini", CATLIST)]);
        let sync = CategoryFolder::load(&dir).expect("sync load");
        let via_async = CategoryFolder::load_async(&dir).await.expect("async load");
        assert_eq!(
            sync.categories_of("catlist", "pacman"),
            via_async.categories_of("catlist", "pacman")
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unparseable_file_is_rejected() {
        let err = parse_file(
            "catlist",
            Path::new("catlist.ini"),
            "just some prose\nwith no sections\n",
        )
        .unwrap_err();
        assert!(matches!(err, SupportError::Unparseable { .. }));
    }
}
