use super::open_session;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Page JSON file
    pub input: PathBuf,

    /// Print the outline as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let session = open_session(&args.input, cwd)?;
    let document = session.document();
    let outline = document.outline();

    if args.json {
        let entries: Vec<serde_json::Value> = outline
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "id": entry.id,
                    "type": entry.block_type,
                    "depth": entry.depth,
                    "slot": entry.slot,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("📄 {}", args.input.display().to_string().bright_white().bold());
    println!();

    let registry = session.registry();
    let mut unknown = 0;
    for entry in &outline {
        let indent = "  ".repeat(entry.depth + 1);
        let slot = entry
            .slot
            .as_ref()
            .map(|slot| format!("{}: ", slot).dimmed().to_string())
            .unwrap_or_default();

        let label = match registry.get(&entry.block_type) {
            Some(definition) => definition.name.green().to_string(),
            None => {
                unknown += 1;
                format!("{} (unknown)", entry.block_type).yellow().to_string()
            }
        };

        println!("{}{}{} {}", indent, slot, label, entry.id.dimmed());
    }

    println!();
    println!("   Top-level blocks: {}", document.len());
    println!("   Total blocks: {}", document.total_blocks());
    if unknown > 0 {
        println!("   {} {}", "Unknown types:".yellow(), unknown);
    }

    Ok(())
}
