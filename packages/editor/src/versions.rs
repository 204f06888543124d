//! # Version Snapshots
//!
//! Named, user-visible save points, independent of undo/redo.
//!
//! - Saving prepends a deep copy of the page, newest first
//! - Past the limit, the oldest version (by `createdAt`) is evicted
//! - Restoring hands back a fresh deep copy; the stored version is never
//!   aliased or mutated
//!
//! The list serializes as JSON so hosts can keep it alongside the page:
//!
//! ```text
//! [ { "id": "...", "label": "v1", "blocks": [...], "createdAt": 1704067200000 } ]
//! ```

use crate::block::Block;
use crate::clock::{format_millis, Clock};
use crate::identity::IdGenerator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Default number of retained versions
pub const DEFAULT_VERSION_LIMIT: usize = 20;

/// A named snapshot of the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub blocks: Vec<Block>,

    /// Milliseconds since Unix epoch
    pub created_at: u64,
}

impl Version {
    /// Creation time as RFC3339
    pub fn created_at_rfc3339(&self) -> String {
        format_millis(self.created_at)
    }
}

/// Bounded list of version snapshots, newest first
#[derive(Debug)]
pub struct VersionManager {
    versions: Vec<Version>,
    limit: usize,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
}

impl VersionManager {
    pub fn new(limit: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            versions: Vec::new(),
            limit,
            clock,
            ids: IdGenerator::from_seed("version"),
        }
    }

    /// Capture `blocks` as a new version and return its id
    pub fn save(&mut self, label: Option<String>, blocks: Vec<Block>) -> String {
        let id = self.fresh_id();
        let version = Version {
            id: id.clone(),
            label,
            blocks,
            created_at: self.clock.now_millis(),
        };
        debug!(version_id = %id, label = ?version.label, "Saved version");

        self.versions.insert(0, version);
        self.evict();
        id
    }

    /// Deep copy of a version's blocks
    pub fn restore(&self, id: &str) -> Option<Vec<Block>> {
        self.get(id).map(|version| version.blocks.clone())
    }

    /// Remove a version; returns false if it does not exist
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.versions.len();
        self.versions.retain(|version| version.id != id);
        self.versions.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Version> {
        self.versions.iter().find(|version| version.id == id)
    }

    /// Newest first
    pub fn list(&self) -> &[Version] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Replace the list with previously persisted versions
    pub fn load(&mut self, mut versions: Vec<Version>) {
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.versions = versions;
        self.evict();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.versions)
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let versions: Vec<Version> = serde_json::from_str(json)?;
        self.load(versions);
        Ok(())
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.ids.new_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn evict(&mut self) {
        while self.limit > 0 && self.versions.len() > self.limit {
            // Ties go to the entry furthest down the list (saved earlier)
            let oldest = self
                .versions
                .iter()
                .enumerate()
                .rev()
                .min_by_key(|(_, version)| version.created_at)
                .map(|(index, _)| index);

            if let Some(index) = oldest {
                let evicted = self.versions.remove(index);
                debug!(version_id = %evicted.id, "Evicted oldest version");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn manager(limit: usize) -> VersionManager {
        VersionManager::new(limit, Arc::new(FixedClock::default()))
    }

    fn page(content: &str) -> Vec<Block> {
        vec![Block::new("text").with_id("a").with_prop("content", content)]
    }

    #[test]
    fn test_save_prepends() {
        let mut versions = manager(20);
        let first = versions.save(Some("v1".to_string()), page("one"));
        let second = versions.save(None, page("two"));

        assert_eq!(versions.list()[0].id, second);
        assert_eq!(versions.list()[1].id, first);
        assert_eq!(versions.get(&first).unwrap().label.as_deref(), Some("v1"));
        assert!(versions.list()[0].created_at > versions.list()[1].created_at);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut versions = manager(20);
        let first = versions.save(Some("v0".to_string()), page("0"));
        let second = versions.save(Some("v1".to_string()), page("1"));
        for i in 2..21 {
            versions.save(Some(format!("v{}", i)), page(&i.to_string()));
        }

        assert_eq!(versions.len(), 20);
        assert!(versions.get(&first).is_none());
        assert!(versions.get(&second).is_some());
    }

    #[test]
    fn test_restore_returns_independent_copy() {
        let mut versions = manager(20);
        let id = versions.save(None, page("one"));

        let mut restored = versions.restore(&id).unwrap();
        restored[0].props.insert("content".to_string(), "changed".into());

        assert_eq!(versions.restore(&id).unwrap(), page("one"));
        assert!(versions.restore("missing").is_none());
    }

    #[test]
    fn test_delete() {
        let mut versions = manager(20);
        let id = versions.save(None, page("one"));

        assert!(!versions.delete("missing"));
        assert!(versions.delete(&id));
        assert!(versions.is_empty());
    }

    #[test]
    fn test_json_roundtrip_orders_newest_first() {
        let mut versions = manager(2);
        versions.save(Some("old".to_string()), page("1"));
        versions.save(Some("new".to_string()), page("2"));
        let json = versions.to_json().unwrap();
        assert!(json.contains("\"createdAt\""));

        let mut loaded = manager(1);
        loaded.load_json(&json).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.list()[0].label.as_deref(), Some("new"));

        // Fresh ids never collide with loaded ones
        let loaded_id = loaded.list()[0].id.clone();
        let a = loaded.save(None, page("3"));
        let b = loaded.save(None, page("4"));
        assert_ne!(a, loaded_id);
        assert_ne!(b, loaded_id);
        assert_ne!(a, b);
    }

    #[test]
    fn test_created_at_rfc3339() {
        let mut versions = manager(20);
        let id = versions.save(None, vec![]);
        assert_eq!(
            versions.get(&id).unwrap().created_at_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }
}
