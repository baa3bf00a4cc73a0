use anyhow::Result;
use serde::Serialize;

use mamekit::Mame;

use crate::common;

#[derive(Serialize)]
struct MachineDetail {
    basename: String,
    name: String,
    year: Option<i64>,
    manufacturer: Option<String>,
    source_file: Option<String>,
    parent: Option<String>,
    bios: Option<String>,
    kind: String,
    platform: String,
    genre: Option<String>,
    subgenre: Option<String>,
    players: String,
    controls: Vec<String>,
    rom_count: usize,
    romless: bool,
    requires_chds: bool,
    software_lists: Vec<String>,
}

pub async fn run(mame: &Mame, basename: &str, json: bool) -> Result<()> {
    let machine = mame.machine_async(basename).await?;
    let detail = MachineDetail {
        basename: machine.basename().to_string(),
        name: machine.name().to_string(),
        year: machine.element().year(),
        manufacturer: machine.manufacturer().map(str::to_string),
        source_file: machine.element().source_file().map(str::to_string),
        parent: machine.parent_name().map(str::to_string),
        bios: machine.bios_name().map(str::to_string),
        kind: machine.kind()?.label().to_string(),
        platform: machine.platform()?,
        genre: machine.genre(),
        subgenre: machine.subgenre(),
        players: machine.players_description()?,
        controls: machine
            .control_kinds()?
            .into_iter()
            .map(str::to_string)
            .collect(),
        rom_count: machine.element().roms()?.len(),
        romless: machine.is_romless()?,
        requires_chds: machine.requires_chds()?,
        software_lists: machine
            .software_list_names()?
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    if json {
        common::print_json(&detail)?;
        return Ok(());
    }

    println!("{:<14} {}", "basename:", detail.basename);
    println!("{:<14} {}", "name:", detail.name);
    if let Some(year) = detail.year {
        println!("{:<14} {year}", "year:");
    }
    if let Some(manufacturer) = &detail.manufacturer {
        println!("{:<14} {manufacturer}", "manufacturer:");
    }
    if let Some(parent) = &detail.parent {
        println!("{:<14} {parent}", "clone of:");
    }
    if let Some(bios) = &detail.bios {
        println!("{:<14} {bios}", "bios:");
    }
    println!("{:<14} {}", "kind:", detail.kind);
    match (&detail.genre, &detail.subgenre) {
        (Some(genre), Some(subgenre)) => println!("{:<14} {genre} / {subgenre}", "genre:"),
        (Some(genre), None) => println!("{:<14} {genre}", "genre:"),
        _ => {}
    }
    println!("{:<14} {}", "players:", detail.players);
    if !detail.controls.is_empty() {
        println!("{:<14} {}", "controls:", detail.controls.join(", "));
    }
    println!(
        "{:<14} {}{}",
        "roms:",
        detail.rom_count,
        if detail.romless { " (romless)" } else { "" }
    );
    if !detail.software_lists.is_empty() {
        println!("{:<14} {}", "softlists:", detail.software_lists.join(", "));
    }
    Ok(())
}
