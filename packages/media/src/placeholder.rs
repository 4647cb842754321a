//! # Placeholder Store
//!
//! Overlay of local previews for imports still in flight. The overlay is
//! not part of the document: it is an immutable snapshot that is
//! replaced on every dispatched transaction.
//!
//! ## Transition
//!
//! ```text
//! snapshot(v) ──map anchors through tr──▶ apply tagged action ──▶ snapshot(v+1)
//! ```
//!
//! - Anchors whose token was deleted become unresolvable; the entry is
//!   kept until its explicit `Remove` so it is detached exactly once.
//! - At most one [`PlaceholderAction`] rides on a transaction (it is
//!   stored as typed metadata).
//! - Entries are keyed by [`PlaceholderId`], never by content, so two
//!   imports of the same file do not collide.

use std::sync::Arc;

use ara_editor::{Assoc, Transaction};

use crate::Dimensions;

/// Opaque identity of one in-flight import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(u64);

impl std::fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "placeholder-{}", self.0)
    }
}

/// Monotonic generator of placeholder ids
#[derive(Debug, Default)]
pub struct PlaceholderIds {
    last: u64,
}

impl PlaceholderIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> PlaceholderId {
        self.last += 1;
        PlaceholderId(self.last)
    }
}

/// Local preview shown while the upload runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewElement {
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
    pub dimensions: Dimensions,
}

/// One tracked preview
#[derive(Debug, Clone)]
pub struct PlaceholderEntry {
    pub id: PlaceholderId,
    pub preview: Arc<PreviewElement>,
    anchor: Option<usize>,
}

impl PlaceholderEntry {
    /// Current anchor, `None` once the surrounding content was deleted
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn dimensions(&self) -> Dimensions {
        self.preview.dimensions
    }
}

/// Tagged action carried by a transaction
#[derive(Debug, Clone)]
pub enum PlaceholderAction {
    Add {
        id: PlaceholderId,
        preview: Arc<PreviewElement>,
        /// Anchor in post-transaction coordinates
        anchor: usize,
    },
    Remove {
        id: PlaceholderId,
    },
}

/// Immutable overlay snapshot
#[derive(Debug, Clone, Default)]
pub struct PlaceholderSet {
    entries: Vec<PlaceholderEntry>,
}

impl PlaceholderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the snapshot that follows `tr`
    pub fn apply(&self, tr: &Transaction) -> Self {
        let mapping = tr.mapping();

        let mut entries: Vec<PlaceholderEntry> = self
            .entries
            .iter()
            .map(|entry| {
                let anchor = entry.anchor.and_then(|pos| {
                    let mapped = mapping.map_result(pos, Assoc::After);
                    if mapped.deleted {
                        tracing::debug!(id = %entry.id, pos, "placeholder anchor deleted");
                        None
                    } else {
                        Some(mapped.pos)
                    }
                });

                PlaceholderEntry {
                    id: entry.id,
                    preview: Arc::clone(&entry.preview),
                    anchor,
                }
            })
            .collect();

        match tr.meta::<PlaceholderAction>() {
            Some(PlaceholderAction::Add { id, preview, anchor }) => {
                if entries.iter().any(|entry| entry.id == *id) {
                    tracing::warn!(%id, "placeholder already tracked, ignoring add");
                } else {
                    tracing::debug!(%id, anchor, "placeholder added");
                    entries.push(PlaceholderEntry {
                        id: *id,
                        preview: Arc::clone(preview),
                        anchor: Some(*anchor),
                    });
                }
            }
            Some(PlaceholderAction::Remove { id }) => {
                let before = entries.len();
                entries.retain(|entry| entry.id != *id);
                if entries.len() == before {
                    tracing::debug!(%id, "remove for unknown placeholder");
                } else {
                    tracing::debug!(%id, "placeholder removed");
                }
            }
            None => {}
        }

        Self { entries }
    }

    /// Current anchor of `id`; `None` when it is gone or was invalidated
    pub fn find(&self, id: PlaceholderId) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .and_then(|entry| entry.anchor)
    }

    /// Whether `id` is still tracked, resolvable or not
    pub fn contains(&self, id: PlaceholderId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Previews to display, in insertion order
    pub fn render(&self) -> Vec<(usize, Arc<PreviewElement>)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.anchor.map(|pos| (pos, Arc::clone(&entry.preview))))
            .collect()
    }

    pub fn entries(&self) -> &[PlaceholderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ara_editor::{Document, EditSession};

    fn preview(name: &str) -> Arc<PreviewElement> {
        Arc::new(PreviewElement {
            file_name: name.to_string(),
            mime: "image/png".to_string(),
            bytes: Arc::from(vec![1u8, 2, 3]),
            dimensions: Dimensions { width: 10, height: 5 },
        })
    }

    fn add(session: &mut EditSession, set: &PlaceholderSet, id: PlaceholderId, anchor: usize) -> PlaceholderSet {
        let mut tr = session.transaction();
        tr.set_meta(PlaceholderAction::Add { id, preview: preview("a.png"), anchor });
        let next = set.apply(&tr);
        session.dispatch(tr).unwrap();
        next
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = PlaceholderIds::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_add_then_find() {
        let mut session = EditSession::new("t", Document::from_paragraphs(["one", "two"]));
        let mut ids = PlaceholderIds::new();
        let id = ids.next_id();

        let set = add(&mut session, &PlaceholderSet::new(), id, 5);

        assert_eq!(set.find(id), Some(5));
        assert_eq!(set.render().len(), 1);
        assert_eq!(set.render()[0].1.file_name, "a.png");
    }

    #[test]
    fn test_anchor_follows_edits() {
        let mut session = EditSession::new("t", Document::from_paragraphs(["one", "two"]));
        let id = PlaceholderIds::new().next_id();
        let set = add(&mut session, &PlaceholderSet::new(), id, 5);

        let mut tr = session.transaction();
        tr.insert_text(1, "zero ").unwrap();
        let set = set.apply(&tr);
        session.dispatch(tr).unwrap();

        assert_eq!(set.find(id), Some(10));
    }

    #[test]
    fn test_deleted_anchor_is_invalidated_but_tracked() {
        let mut session = EditSession::new("t", Document::from_paragraphs(["one", "two"]));
        let id = PlaceholderIds::new().next_id();
        // Anchor before "two"
        let set = add(&mut session, &PlaceholderSet::new(), id, 5);

        let mut tr = session.transaction();
        tr.delete(5, 10).unwrap();
        let set = set.apply(&tr);
        session.dispatch(tr).unwrap();

        assert_eq!(set.find(id), None);
        assert!(set.contains(id));
        assert!(set.render().is_empty());

        let mut tr = session.transaction();
        tr.set_meta(PlaceholderAction::Remove { id });
        let set = set.apply(&tr);

        assert!(!set.contains(id));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_targets_identity_only() {
        let mut session = EditSession::new("t", Document::from_paragraphs(["one"]));
        let mut ids = PlaceholderIds::new();
        let first = ids.next_id();
        let second = ids.next_id();

        let set = add(&mut session, &PlaceholderSet::new(), first, 0);
        let set = add(&mut session, &set, second, 0);
        assert_eq!(set.len(), 2);

        let mut tr = session.transaction();
        tr.set_meta(PlaceholderAction::Remove { id: first });
        let set = set.apply(&tr);

        assert_eq!(set.find(first), None);
        assert_eq!(set.find(second), Some(0));
    }

    #[test]
    fn test_duplicate_add_ignored() {
        let mut session = EditSession::new("t", Document::from_paragraphs(["one"]));
        let id = PlaceholderIds::new().next_id();

        let set = add(&mut session, &PlaceholderSet::new(), id, 0);
        let set = add(&mut session, &set, id, 5);

        assert_eq!(set.len(), 1);
        assert_eq!(set.find(id), Some(0));
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let mut session = EditSession::new("t", Document::from_paragraphs(["one"]));
        let id = PlaceholderIds::new().next_id();
        let empty = PlaceholderSet::new();

        let set = add(&mut session, &empty, id, 0);

        assert!(empty.is_empty());
        assert_eq!(set.len(), 1);
    }
}
