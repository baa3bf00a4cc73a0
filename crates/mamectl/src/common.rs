use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use mamekit::xml::XmlBackend;
use mamekit::MameSettings;

pub fn build_settings(
    mame: PathBuf,
    snapshot: Option<PathBuf>,
    cats: Option<PathBuf>,
    dats: Option<PathBuf>,
    hash_paths: Vec<PathBuf>,
    fast_xml: bool,
) -> MameSettings {
    let mut settings = MameSettings::new(mame);
    settings.snapshot_path = snapshot;
    settings.category_path = cats;
    settings.dats_path = dats;
    settings.hash_paths = hash_paths;
    settings.xml_backend = if fast_xml {
        XmlBackend::Fast
    } else {
        XmlBackend::preferred()
    };
    settings
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_carry_all_paths() {
        let settings = build_settings(
            PathBuf::from("/usr/bin/mame"),
            Some(PathBuf::from("/data/listxml.xml")),
            None,
            Some(PathBuf::from("/data/dats")),
            vec![PathBuf::from("/data/hash")],
            false,
        );
        assert_eq!(settings.executable_path, PathBuf::from("/usr/bin/mame"));
        assert_eq!(settings.snapshot_path, Some(PathBuf::from("/data/listxml.xml")));
        assert!(settings.category_path.is_none());
        assert_eq!(settings.hash_paths.len(), 1);
    }
}
