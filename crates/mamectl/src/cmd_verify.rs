use anyhow::Result;

use mamekit::frontend::RomsetStatus;
use mamekit::Mame;

use crate::common;

fn status_label(status: RomsetStatus) -> &'static str {
    match status {
        RomsetStatus::Good => "good",
        RomsetStatus::BestAvailable => "best available",
        RomsetStatus::Bad => "bad",
        RomsetStatus::NotFound => "not found",
        RomsetStatus::NoRoms => "no roms",
    }
}

pub async fn run(mame: &Mame, basenames: &[String], json: bool) -> Result<()> {
    let refs: Vec<&str> = basenames.iter().map(String::as_str).collect();
    let report = mame.verify_roms_report_async(&refs).await?;

    if json {
        common::print_json(&report)?;
        return Ok(());
    }

    for result in &report.romsets {
        println!("{:<16} {}", result.basename, status_label(result.status));
        for file in &result.files {
            println!("    {}", file.line);
        }
    }
    let okay = report.romsets.iter().filter(|result| result.is_okay()).count();
    println!("{} romsets checked, {} usable", report.romsets.len(), okay);
    Ok(())
}
