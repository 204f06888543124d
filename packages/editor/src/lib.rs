//! # Blockpage Editor
//!
//! Core editing engine for block-based landing pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: canvas, settings panel, navigator     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ EditSession: the page editor's one store    │
//! │  - Mutations with snapshot undo/redo        │
//! │  - Clipboard, versions, save gate           │
//! │  - Keyboard shortcuts                       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Document: arena of blocks (id → node)       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ preview: registry + viewport → render tree  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Blocks are the source of truth**: previews are derived views
//! 2. **Ids are unique across the whole page**, nested blocks included
//! 3. **Undo covers content only**: selection, visibility, clipboard and
//!    versions are outside history
//! 4. **Bad references are no-ops**: the session never surfaces errors for
//!    missing ids or out-of-range indices
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blockpage_editor::{Block, EditSession, EditorConfig, Viewport};
//!
//! let mut session = EditSession::new("page-1", &EditorConfig::default());
//!
//! let id = session.add_block(Block::new("heading").with_prop("text", "Hello")).unwrap();
//! session.undo();
//! session.redo();
//!
//! let v1 = session.save_version(Some("v1"));
//! session.set_viewport(Viewport::Mobile);
//! let tree = session.preview();
//! ```

mod block;
mod clipboard;
mod clock;
mod config;
mod document;
mod errors;
mod history;
mod identity;
mod mutations;
mod preview;
mod registry;
mod responsive;
mod session;
mod shortcuts;
mod versions;

pub use block::{Block, BlockId, PropValue, Props};
pub use clipboard::Clipboard;
pub use clock::{format_millis, Clock, SystemClock};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::{Document, Forest, IdPolicy, Location, OutlineEntry, ParentRef};
pub use errors::EditorError;
pub use history::{History, DEFAULT_HISTORY_LIMIT};
pub use identity::{assign_ids, clone_with_fresh_ids, get_seed, strip_ids, IdGenerator};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use preview::{preview, PreviewNode, PreviewOptions};
pub use registry::{BlockDefinition, BlockRegistry, FieldKind, FieldSchema};
pub use responsive::{resolve_json, ParseViewportError, ResponsiveValue, Viewport};
pub use session::{EditSession, SaveHandler};
pub use shortcuts::{EventTarget, KeyEvent, Shortcut};
pub use versions::{Version, VersionManager, DEFAULT_VERSION_LIMIT};

