//! # Edit Session
//!
//! One editor's view of a document: the current document, selection and
//! version, plus a bounded history of the position maps of recent
//! transactions.
//!
//! Transactions are applied strictly one at a time. A transaction built
//! against an older version is rejected rather than rebased; callers
//! that captured a position earlier (for example before an async fetch)
//! re-resolve it with [`EditSession::map_since`].

use std::collections::VecDeque;

use crate::{Assoc, Document, EditorError, MapResult, Mapping, Selection, Transaction};

/// Default number of transactions kept for [`EditSession::map_since`]
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Single edit session
#[derive(Debug)]
pub struct EditSession {
    /// Session identifier
    pub id: String,

    document: Document,
    selection: Selection,

    /// Incremented on every dispatched transaction
    version: u64,

    /// Mappings of the most recent transactions, oldest first
    history: VecDeque<Mapping>,
    history_limit: usize,
}

/// Outcome of dispatching a transaction
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// Version after the transaction
    pub version: u64,

    /// Position changes made by the transaction
    pub mapping: Mapping,
}

impl EditSession {
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self::with_history_limit(id, document, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(id: impl Into<String>, document: Document, history_limit: usize) -> Self {
        Self {
            id: id.into(),
            document,
            selection: Selection::default(),
            version: 0,
            history: VecDeque::new(),
            history_limit,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the selection (must lie inside the document)
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), EditorError> {
        let size = self.document.content_size();
        if selection.anchor > size || selection.head > size {
            return Err(EditorError::InvalidSelection {
                anchor: selection.anchor,
                head: selection.head,
                size,
            });
        }

        self.selection = selection;
        Ok(())
    }

    /// Start a transaction against the current state
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.document.clone(), self.selection, self.version)
    }

    /// Apply a transaction
    pub fn dispatch(&mut self, tr: Transaction) -> Result<DispatchResult, EditorError> {
        if tr.base_version() != self.version {
            return Err(EditorError::StaleTransaction {
                base: tr.base_version(),
                current: self.version,
            });
        }

        let steps = tr.steps().len();
        let (document, mapping, selection) = tr.into_parts();

        self.document = document;
        self.selection = selection;
        self.version += 1;

        self.history.push_back(mapping.clone());
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }

        tracing::trace!(session = %self.id, version = self.version, steps, "transaction applied");

        Ok(DispatchResult {
            version: self.version,
            mapping,
        })
    }

    /// Map a position captured at `version` to the current document
    ///
    /// Returns `None` when `version` is in the future or older than the
    /// retained history.
    pub fn map_since(&self, version: u64, pos: usize, assoc: Assoc) -> Option<MapResult> {
        if version > self.version {
            return None;
        }

        let behind = (self.version - version) as usize;
        if behind > self.history.len() {
            return None;
        }

        let mut result = MapResult { pos, deleted: false };
        for mapping in self.history.iter().skip(self.history.len() - behind) {
            let step = mapping.map_result(result.pos, assoc);
            result.pos = step.pos;
            result.deleted |= step.deleted;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = EditSession::new("client-1", Document::from_paragraphs(["abc"]));

        assert_eq!(session.id, "client-1");
        assert_eq!(session.version(), 0);
        assert_eq!(session.selection(), Selection::cursor(0));
    }

    #[test]
    fn test_dispatch_increments_version() {
        let mut session = EditSession::new("client-1", Document::from_paragraphs(["abc"]));

        let mut tr = session.transaction();
        tr.insert_text(1, "x").unwrap();
        let result = session.dispatch(tr).unwrap();

        assert_eq!(result.version, 1);
        assert_eq!(session.document().text(), "xabc");

        // Metadata-only transactions still advance the version
        let result = session.dispatch(session.transaction()).unwrap();
        assert_eq!(result.version, 2);
        assert!(result.mapping.is_empty());
    }

    #[test]
    fn test_stale_transaction_rejected() {
        let mut session = EditSession::new("client-1", Document::from_paragraphs(["abc"]));

        let stale = session.transaction();
        session.dispatch(session.transaction()).unwrap();

        assert!(matches!(
            session.dispatch(stale),
            Err(EditorError::StaleTransaction { base: 0, current: 1 })
        ));
    }

    #[test]
    fn test_set_selection_bounds() {
        let mut session = EditSession::new("client-1", Document::from_paragraphs(["abc"]));

        assert!(session.set_selection(Selection::new(1, 4)).is_ok());
        assert!(session.set_selection(Selection::new(1, 9)).is_err());
        assert_eq!(session.selection(), Selection::new(1, 4));
    }

    #[test]
    fn test_map_since_replays_history() {
        let mut session = EditSession::new("client-1", Document::from_paragraphs(["abc", "def"]));
        let captured = session.version();

        let mut tr = session.transaction();
        tr.insert_text(1, "12").unwrap();
        session.dispatch(tr).unwrap();

        let mut tr = session.transaction();
        tr.split(2).unwrap();
        session.dispatch(tr).unwrap();

        // Start of "def" was 6: +2 for the text, +2 for the split
        let mapped = session.map_since(captured, 6, Assoc::Before).unwrap();
        assert_eq!(mapped, MapResult { pos: 10, deleted: false });

        assert!(session.map_since(captured + 5, 6, Assoc::Before).is_none());
    }

    #[test]
    fn test_map_since_reports_deleted() {
        let mut session = EditSession::new("client-1", Document::from_paragraphs(["abc", "def"]));
        let captured = session.version();

        let mut tr = session.transaction();
        tr.delete(5, 10).unwrap();
        session.dispatch(tr).unwrap();

        let mapped = session.map_since(captured, 7, Assoc::Before).unwrap();
        assert!(mapped.deleted);
        assert_eq!(mapped.pos, 5);
    }

    #[test]
    fn test_history_limit() {
        let mut session = EditSession::with_history_limit("client-1", Document::from_paragraphs(["a"]), 2);

        for _ in 0..3 {
            session.dispatch(session.transaction()).unwrap();
        }

        assert!(session.map_since(0, 1, Assoc::After).is_none());
        assert!(session.map_since(1, 1, Assoc::After).is_some());
    }
}
