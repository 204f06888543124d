pub mod apply;
pub mod blocks;
pub mod init;
pub mod inspect;
pub mod render;

pub use apply::{apply, ApplyArgs};
pub use blocks::{blocks, BlocksArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use render::{render, RenderArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use blockpage_editor::{Block, EditSession};
use std::fs;
use std::path::Path;

/// Open a page file in a fresh session
pub fn open_session(path: &Path, cwd: &str) -> Result<EditSession> {
    let config = Config::load(cwd)?;
    let registry = config.registry(cwd)?;

    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let blocks = Block::list_from_json(&content)
        .with_context(|| format!("Invalid page {}", path.display()))?;

    let session_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "page".to_string());

    // Registry first: loading conforms nested blocks to its schema
    let mut session = EditSession::new(session_id, &config.editor).with_registry(registry);
    session.load(blocks)?;
    Ok(session)
}
