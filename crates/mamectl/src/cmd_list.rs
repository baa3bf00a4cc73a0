use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use mamekit::Mame;

use crate::common;

#[derive(Serialize)]
struct MachineRow {
    basename: String,
    description: String,
    year: Option<i64>,
    manufacturer: Option<String>,
    device: bool,
}

pub fn run(mame: &Mame, runnable: bool, limit: Option<usize>, json: bool) -> Result<()> {
    let mut rows = Vec::new();
    for element in mame.machine_elements()? {
        let element = element?;
        if runnable && !(element.is_runnable() && !element.is_device()) {
            continue;
        }
        rows.push(MachineRow {
            basename: element.basename().to_string(),
            description: element.description().to_string(),
            year: element.year(),
            manufacturer: element.manufacturer().map(str::to_string),
            device: element.is_device(),
        });
        if limit.is_some_and(|limit| rows.len() >= limit) {
            break;
        }
    }
    debug!(machines = rows.len(), "collected listing rows");

    if json {
        common::print_json(&rows)?;
    } else {
        for row in &rows {
            println!("{:<16} {}", row.basename, row.description);
        }
        println!("{} machines", rows.len());
    }
    Ok(())
}
