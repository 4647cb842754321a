//! Editor host: the single writer of an editing session
//!
//! Every transaction, whether from the user or from the import pipeline,
//! goes through [`EditorHost::dispatch`] so the placeholder overlay is
//! recomputed in lockstep with the document.

use ara_editor::{Document, EditSession, EditorError, Selection, Transaction};

use crate::PlaceholderSet;

#[derive(Debug)]
pub struct EditorHost {
    session: EditSession,
    placeholders: PlaceholderSet,
}

impl EditorHost {
    pub fn new(session: EditSession) -> Self {
        Self {
            session,
            placeholders: PlaceholderSet::new(),
        }
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn document(&self) -> &Document {
        self.session.document()
    }

    /// Current overlay snapshot
    pub fn placeholders(&self) -> &PlaceholderSet {
        &self.placeholders
    }

    pub fn transaction(&self) -> Transaction {
        self.session.transaction()
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<(), EditorError> {
        self.session.set_selection(selection)
    }

    /// Apply a transaction to the document and the overlay together
    ///
    /// Returns the new document version. A rejected transaction leaves
    /// both untouched.
    pub fn dispatch(&mut self, tr: Transaction) -> Result<u64, EditorError> {
        let next = self.placeholders.apply(&tr);
        let result = self.session.dispatch(tr)?;
        self.placeholders = next;
        Ok(result.version)
    }

    pub fn into_document(self) -> Document {
        self.session.document().clone()
    }
}
