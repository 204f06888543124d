use crate::config::Config;
use anyhow::Result;
use blockpage_editor::{Block, BlockRegistry, DEFAULT_CONFIG_NAME};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Name of the starter page file
    #[arg(short, long, default_value = "page.json")]
    pub page: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Blockpage project...".bright_blue().bold());

    // Starter page built from registry defaults
    let page_path = PathBuf::from(cwd).join(&args.page);
    if !page_path.exists() {
        let registry = BlockRegistry::builtin();
        let page: Vec<Block> = ["hero", "text", "button"]
            .iter()
            .enumerate()
            .map(|(i, block_type)| registry.instantiate(block_type).with_id(format!("block-{}", i + 1)))
            .collect();
        fs::write(&page_path, Block::list_to_json(&page)?)?;
        println!("  {} Created {}", "✓".green(), args.page);
    }

    let config_json = serde_json::to_string_pretty(&Config::default())?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: blockpage inspect {}", args.page);
    println!("  2. Run: blockpage render {} --viewport mobile", args.page);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_config_and_page() {
        let dir = TempDir::new().unwrap();
        let cwd = dir.path().to_str().unwrap();

        init(
            InitArgs {
                page: "home.json".to_string(),
                force: false,
            },
            cwd,
        )
        .unwrap();

        let config = Config::load(cwd).unwrap();
        assert_eq!(config.editor.version_limit, 20);

        let page = fs::read_to_string(dir.path().join("home.json")).unwrap();
        let blocks = Block::list_from_json(&page).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].block_type, "hero");
        assert!(blocks[0].prop("title").is_some());
    }
}
