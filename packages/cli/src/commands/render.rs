use super::open_session;
use anyhow::Result;
use blockpage_editor::Viewport;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Page JSON file
    pub input: PathBuf,

    /// Viewport to resolve for (desktop, tablet, mobile)
    #[arg(short, long, default_value = "desktop")]
    pub viewport: String,

    /// Write the render tree here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let viewport: Viewport = args.viewport.parse()?;

    let mut session = open_session(&args.input, cwd)?;
    session.set_viewport(viewport);

    let tree = session.preview();
    let placeholders = tree.iter().filter(|node| node.is_placeholder()).count();
    let json = serde_json::to_string_pretty(&tree)?;

    match &args.output {
        Some(output) => {
            fs::write(output, json)?;
            let (width, height) = viewport.dimensions();
            println!(
                "{} Rendered {} for {} ({}x{}) → {}",
                "✓".green(),
                args.input.display(),
                viewport,
                width,
                height,
                output.display()
            );
            if placeholders > 0 {
                println!("   {} {}", "Placeholders:".yellow(), placeholders);
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}
