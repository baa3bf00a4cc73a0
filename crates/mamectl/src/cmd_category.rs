use std::collections::BTreeMap;

use anyhow::{bail, Result};

use mamekit::Mame;

use crate::common;

pub fn run(mame: &Mame, basename: &str, json: bool) -> Result<()> {
    let Some(folder) = mame.category_folder()? else {
        bail!("no category folder configured, pass --cats");
    };

    let mut hits: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for file in folder.file_names() {
        let sections = folder.categories_of(file, basename);
        if !sections.is_empty() {
            hits.insert(
                file.to_string(),
                sections.into_iter().map(str::to_string).collect(),
            );
        }
    }

    if json {
        common::print_json(&hits)?;
        return Ok(());
    }

    if hits.is_empty() {
        println!("no category entries for {basename}");
        return Ok(());
    }
    for (file, sections) in &hits {
        println!("{:<14} {}", format!("{file}:"), sections.join(", "));
    }
    Ok(())
}
