use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::Serialize;

use mamekit::Mame;

use crate::common;

#[derive(Serialize)]
struct HistoryDetail {
    kind: Option<String>,
    age: Option<i64>,
    description: Option<String>,
    sections: BTreeMap<String, String>,
}

pub fn run(mame: &Mame, basename: &str, json: bool) -> Result<()> {
    let Some(dats) = mame.dat_folder() else {
        bail!("no dat folder configured, pass --dats");
    };
    let Some(entry) = dats.history(basename)? else {
        println!("no history entry for {basename}");
        return Ok(());
    };

    if json {
        let detail = HistoryDetail {
            kind: entry.kind().map(str::to_string),
            age: entry.age(),
            description: entry.description().map(str::to_string),
            sections: entry
                .sections()
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, body)| (name.to_string(), body.to_string()))
                .collect(),
        };
        common::print_json(&detail)?;
        return Ok(());
    }

    if let Some(description) = entry.description() {
        println!("{description}");
    }
    for (name, body) in entry.sections() {
        if name.is_empty() || body.is_empty() {
            continue;
        }
        println!("\n- {name} -\n{body}");
    }
    Ok(())
}
