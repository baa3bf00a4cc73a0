use anyhow::Result;
use serde::Serialize;

use mamekit::model::SoftwareSupport;
use mamekit::Mame;

use crate::common;

#[derive(Serialize)]
struct SoftwareRow {
    basename: String,
    description: String,
    year: Option<i64>,
    publisher: Option<String>,
    supported: &'static str,
}

fn support_label(support: SoftwareSupport) -> &'static str {
    match support {
        SoftwareSupport::Supported => "yes",
        SoftwareSupport::Partial => "partial",
        SoftwareSupport::Unsupported => "no",
    }
}

pub async fn run(mame: &Mame, name: &str, json: bool) -> Result<()> {
    let list = mame.software_list_async(name).await?;
    let rows: Vec<SoftwareRow> = list
        .software()
        .map(|software| SoftwareRow {
            basename: software.basename().to_string(),
            description: software.name().to_string(),
            year: software.year(),
            publisher: software.publisher().map(str::to_string),
            supported: support_label(software.supported()),
        })
        .collect();

    if json {
        common::print_json(&rows)?;
        return Ok(());
    }

    println!("{} ({})", list.name(), list.basename());
    for row in &rows {
        println!("{:<16} {}", row.basename, row.description);
    }
    println!("{} software items", rows.len());
    Ok(())
}
