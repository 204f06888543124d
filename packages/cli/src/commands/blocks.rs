use crate::config::Config;
use anyhow::Result;
use blockpage_editor::BlockDefinition;
use clap::Args;
use colored::Colorize;
use std::collections::BTreeMap;

#[derive(Args, Debug)]
pub struct BlocksArgs {
    /// Only list this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn blocks(args: BlocksArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.registry(cwd)?;

    let selected: BTreeMap<&str, &BlockDefinition> = registry
        .types()
        .filter_map(|block_type| registry.get(block_type).map(|def| (block_type, def)))
        .filter(|(_, def)| {
            args.category
                .as_deref()
                .map_or(true, |category| def.category == category)
        })
        .collect();

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    for (category, types) in registry.by_category() {
        let types: Vec<&str> = types
            .into_iter()
            .filter(|block_type| selected.contains_key(block_type))
            .collect();
        if types.is_empty() {
            continue;
        }

        println!("{}", category.bright_blue().bold());
        for block_type in types {
            let definition = selected[block_type];
            let container = if definition.is_container() {
                " [container]".dimmed().to_string()
            } else {
                String::new()
            };
            println!(
                "  {} {} ({} fields){}",
                block_type.green(),
                definition.name,
                definition.schema.len(),
                container
            );
        }
        println!();
    }

    Ok(())
}
