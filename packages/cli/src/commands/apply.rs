use super::open_session;
use anyhow::{Context, Result};
use blockpage_editor::{EditSession, Mutation};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Page JSON file
    pub input: PathBuf,

    /// JSON array of mutations to replay
    #[arg(short, long)]
    pub script: PathBuf,

    /// Undo this many steps after the script runs
    #[arg(long, default_value = "0")]
    pub undo: usize,

    /// Write the page here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Outcome of replaying a script
#[derive(Debug, Default, PartialEq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub skipped: usize,
    pub undone: usize,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let mut session = open_session(&args.input, cwd)?;

    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read {}", args.script.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid mutation script {}", args.script.display()))?;

    let summary = replay(&mut session, mutations, args.undo);
    let json = session.to_json()?;

    match &args.output {
        Some(output) => {
            fs::write(output, json)?;
            println!(
                "{} Applied {} mutations to {} → {}",
                "✓".green(),
                summary.applied,
                args.input.display(),
                output.display()
            );
            if summary.skipped > 0 {
                println!("   {} {}", "Skipped:".yellow(), summary.skipped);
            }
            if summary.undone > 0 {
                println!("   Undone: {}", summary.undone);
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

pub fn replay(session: &mut EditSession, mutations: Vec<Mutation>, undo: usize) -> ReplaySummary {
    let mut summary = ReplaySummary::default();

    for mutation in mutations {
        let name = mutation.name();
        match session.apply(mutation) {
            Some(_) => summary.applied += 1,
            None => {
                tracing::warn!(mutation = name, "Skipped mutation");
                summary.skipped += 1;
            }
        }
    }

    while summary.undone < undo && session.undo() {
        summary.undone += 1;
    }

    summary
}
