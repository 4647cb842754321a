//! # Transactions
//!
//! A transaction groups the mutations of one atomic edit. It is built
//! from a session snapshot and applies each mutation to a working copy
//! as soon as it is added, so later steps see the effect of earlier
//! ones and positions can be read back through [`Transaction::mapping`].
//!
//! Transactions also carry typed metadata. Plugins tag a transaction
//! with a value of their own type and read it back when the transaction
//! is dispatched; there is at most one value per type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Assoc, Block, Document, Mapping, Mutation, MutationError, StepMap};

/// Text selection between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Collapsed selection
    pub fn cursor(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn map(&self, map: &StepMap) -> Self {
        Self {
            anchor: map.map(self.anchor, Assoc::After),
            head: map.map(self.head, Assoc::After),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::cursor(0)
    }
}

/// Atomic, sequenced edit
pub struct Transaction {
    doc: Document,
    base_version: u64,
    steps: Vec<Mutation>,
    mapping: Mapping,
    selection: Selection,
    meta: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Transaction {
    pub(crate) fn new(doc: Document, selection: Selection, base_version: u64) -> Self {
        Self {
            doc,
            base_version,
            steps: Vec::new(),
            mapping: Mapping::new(),
            selection,
            meta: HashMap::new(),
        }
    }

    /// Apply a mutation to the working document
    ///
    /// On error the transaction is left untouched.
    pub fn step(&mut self, mutation: Mutation) -> Result<&mut Self, MutationError> {
        let map = mutation.apply(&mut self.doc)?;

        self.selection = self.selection.map(&map);
        self.mapping.push(map);
        self.steps.push(mutation);

        Ok(self)
    }

    pub fn insert_text(&mut self, pos: usize, text: impl Into<String>) -> Result<&mut Self, MutationError> {
        self.step(Mutation::InsertText { pos, text: text.into() })
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, MutationError> {
        self.step(Mutation::DeleteRange { from, to })
    }

    pub fn split(&mut self, pos: usize) -> Result<&mut Self, MutationError> {
        self.step(Mutation::SplitBlock { pos })
    }

    pub fn insert_block(&mut self, pos: usize, block: Block) -> Result<&mut Self, MutationError> {
        self.step(Mutation::InsertBlock { pos, block })
    }

    /// Delete the selected content and collapse the selection
    pub fn delete_selection(&mut self) -> Result<&mut Self, MutationError> {
        if self.selection.is_empty() {
            return Ok(self);
        }

        let (from, to) = (self.selection.from(), self.selection.to());
        self.delete(from, to)?;
        self.selection = Selection::cursor(from);
        Ok(self)
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = selection;
        self
    }

    /// Attach metadata, replacing any previous value of the same type
    pub fn set_meta<T: Any + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.meta.insert(TypeId::of::<T>(), Box::new(value));
        self
    }

    pub fn meta<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.meta
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Working document after all steps so far
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn steps(&self) -> &[Mutation] {
        &self.steps
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Session version this transaction was built against
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub(crate) fn into_parts(self) -> (Document, Mapping, Selection) {
        (self.doc, self.mapping, self.selection)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("base_version", &self.base_version)
            .field("steps", &self.steps)
            .field("selection", &self.selection)
            .field("meta_entries", &self.meta.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tag(&'static str);

    fn transaction(paragraphs: &[&str]) -> Transaction {
        Transaction::new(Document::from_paragraphs(paragraphs.iter().copied()), Selection::default(), 0)
    }

    #[test]
    fn test_steps_see_previous_steps() {
        let mut tr = transaction(&["hello"]);
        tr.split(3).unwrap();
        // Position 5 is the start of the second half after the split
        tr.insert_text(5, ">").unwrap();

        assert_eq!(tr.doc().text(), "he\n>llo");
        assert_eq!(tr.mapping().len(), 2);
        assert!(tr.doc_changed());
    }

    #[test]
    fn test_failed_step_leaves_transaction_untouched() {
        let mut tr = transaction(&["ab"]);
        assert!(tr.insert_text(0, "x").is_err());

        assert!(!tr.doc_changed());
        assert_eq!(tr.doc().text(), "ab");
    }

    #[test]
    fn test_selection_follows_mapping() {
        let mut tr = transaction(&["abc"]);
        tr.set_selection(Selection::new(2, 3));
        tr.insert_text(1, "xy").unwrap();

        assert_eq!(tr.selection(), Selection::new(4, 5));
    }

    #[test]
    fn test_delete_selection_collapses() {
        let mut tr = transaction(&["abcd"]);
        tr.set_selection(Selection::new(4, 2));
        tr.delete_selection().unwrap();

        assert_eq!(tr.doc().text(), "ad");
        assert_eq!(tr.selection(), Selection::cursor(2));
    }

    #[test]
    fn test_typed_meta() {
        let mut tr = transaction(&["a"]);
        assert!(tr.meta::<Tag>().is_none());

        tr.set_meta(Tag("first"));
        tr.set_meta(Tag("second"));
        tr.set_meta(7u32);

        assert_eq!(tr.meta::<Tag>(), Some(&Tag("second")));
        assert_eq!(tr.meta::<u32>(), Some(&7));
        assert!(!tr.doc_changed());
    }
}
