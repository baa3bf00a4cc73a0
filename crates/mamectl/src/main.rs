use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mamekit::Mame;

mod cmd_category;
mod cmd_history;
mod cmd_list;
mod cmd_show;
mod cmd_softlist;
mod cmd_verify;
mod common;

#[derive(Parser, Debug)]
#[command(name = "mamectl", version, about = "MAME listing and romset CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    /// Path to the MAME executable
    #[arg(long, default_value = "mame")]
    mame: PathBuf,
    /// Saved -listxml output to read instead of running MAME
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Category folder holding catlist.ini and friends
    #[arg(long)]
    cats: Option<PathBuf>,
    /// Dat folder holding history.xml, mameinfo.dat, ...
    #[arg(long)]
    dats: Option<PathBuf>,
    /// Software list hash path (repeatable)
    #[arg(long = "hash-path")]
    hash_paths: Vec<PathBuf>,
    /// Prefer the fast XML backend
    #[arg(long)]
    fast_xml: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the frontend version
    Version,
    /// List machines
    List {
        /// Only machines that can be started (no devices)
        #[arg(long)]
        runnable: bool,
        /// Stop after this many machines
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one machine in detail
    Show { basename: String },
    /// Verify romsets and report per-file issues
    Verify { basenames: Vec<String> },
    /// Show a software list
    Softlist { name: String },
    /// Show the history entry for a machine
    History { basename: String },
    /// Show every category-file entry for a machine
    Category { basename: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .init();

    let json = cli.json;
    let settings = common::build_settings(
        cli.mame,
        cli.snapshot,
        cli.cats,
        cli.dats,
        cli.hash_paths,
        cli.fast_xml,
    );
    let mame = Mame::new(settings);

    match cli.cmd {
        Cmd::Version => {
            println!("{}", mame.version_async().await?);
        }
        Cmd::List { runnable, limit } => cmd_list::run(&mame, runnable, limit, json)?,
        Cmd::Show { basename } => cmd_show::run(&mame, &basename, json).await?,
        Cmd::Verify { basenames } => cmd_verify::run(&mame, &basenames, json).await?,
        Cmd::Softlist { name } => cmd_softlist::run(&mame, &name, json).await?,
        Cmd::History { basename } => cmd_history::run(&mame, &basename, json)?,
        Cmd::Category { basename } => cmd_category::run(&mame, &basename, json)?,
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_defaults() {
        let cli = Cli::parse_from(["mamectl", "list"]);
        match cli.cmd {
            Cmd::List { runnable, limit } => {
                assert!(!runnable);
                assert_eq!(limit, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parse_verify_basenames() {
        let cli = Cli::parse_from(["mamectl", "--json", "verify", "puckman", "pacman"]);
        assert!(cli.json);
        match cli.cmd {
            Cmd::Verify { basenames } => assert_eq!(basenames, ["puckman", "pacman"]),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parse_hash_paths_accumulate() {
        let cli = Cli::parse_from([
            "mamectl",
            "--hash-path",
            "/a",
            "--hash-path",
            "/b",
            "softlist",
            "nes",
        ]);
        assert_eq!(cli.hash_paths, [PathBuf::from("/a"), PathBuf::from("/b")]);
    }
}
