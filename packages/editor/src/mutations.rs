//! # Document Mutations
//!
//! Low-level operations on a [`Document`]. Every mutation validates
//! against the current document, applies itself, and returns the
//! [`StepMap`] describing how positions moved.
//!
//! ## Mutation Semantics
//!
//! ### InsertText
//! - Position must be inside a textblock
//!
//! ### SplitBlock
//! - Position must be inside a textblock
//! - Inserts a close/open token pair, so positions after it shift by 2
//!
//! ### InsertBlock
//! - Position must be a block boundary (blocks never nest)
//!
//! ### DeleteRange
//! - Range inside one textblock: removes characters
//! - Both ends on block boundaries: removes whole blocks
//! - Both ends inside textblocks: trims the two blocks, drops the
//!   blocks between them and joins what is left
//! - From inside a textblock to a boundary: trims the end of that
//!   textblock and drops the whole blocks up to the boundary
//! - From a boundary to inside a textblock: drops the whole blocks
//!   before that textblock and trims its start

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{char_to_byte, Block, Document, ResolvedPos};
use crate::{MapRange, StepMap};

/// Document mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    /// Insert text inside a textblock
    InsertText { pos: usize, text: String },

    /// Delete the content between two positions
    DeleteRange { from: usize, to: usize },

    /// Split the enclosing textblock in two at a position
    SplitBlock { pos: usize },

    /// Insert a block at a block boundary
    InsertBlock { pos: usize, block: Block },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Position {pos} is outside the document (size {size})")]
    OutOfRange { pos: usize, size: usize },

    #[error("Position {0} is not inside a textblock")]
    NotInTextblock(usize),

    #[error("Position {0} is not on a block boundary")]
    NotABoundary(usize),

    #[error("Invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },
}

impl Mutation {
    /// Apply mutation with validation, returning its position map
    pub fn apply(&self, doc: &mut Document) -> Result<StepMap, MutationError> {
        match self {
            Mutation::InsertText { pos, text } => Self::apply_insert_text(doc, *pos, text),
            Mutation::DeleteRange { from, to } => Self::apply_delete(doc, *from, *to),
            Mutation::SplitBlock { pos } => Self::apply_split(doc, *pos),
            Mutation::InsertBlock { pos, block } => Self::apply_insert_block(doc, *pos, block),
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::InsertText { pos, .. } | Mutation::SplitBlock { pos } => {
                match doc.resolve(*pos)? {
                    ResolvedPos::Text { .. } => Ok(()),
                    ResolvedPos::Boundary { .. } => Err(MutationError::NotInTextblock(*pos)),
                }
            }

            Mutation::InsertBlock { pos, .. } => match doc.resolve(*pos)? {
                ResolvedPos::Boundary { .. } => Ok(()),
                ResolvedPos::Text { .. } => Err(MutationError::NotABoundary(*pos)),
            },

            Mutation::DeleteRange { from, to } => {
                if from > to {
                    return Err(MutationError::InvalidRange { from: *from, to: *to });
                }

                doc.resolve(*from)?;
                doc.resolve(*to)?;
                Ok(())
            }
        }
    }

    fn apply_insert_text(doc: &mut Document, pos: usize, text: &str) -> Result<StepMap, MutationError> {
        let (index, offset) = match doc.resolve(pos)? {
            ResolvedPos::Text { index, offset, .. } => (index, offset),
            ResolvedPos::Boundary { .. } => return Err(MutationError::NotInTextblock(pos)),
        };

        if let Block::Paragraph { text: content } = &mut doc.blocks[index] {
            let byte = char_to_byte(content, offset);
            content.insert_str(byte, text);
        }

        Ok(StepMap::single(pos, 0, text.chars().count()))
    }

    fn apply_split(doc: &mut Document, pos: usize) -> Result<StepMap, MutationError> {
        let (index, offset) = match doc.resolve(pos)? {
            ResolvedPos::Text { index, offset, .. } => (index, offset),
            ResolvedPos::Boundary { .. } => return Err(MutationError::NotInTextblock(pos)),
        };

        let tail = match &mut doc.blocks[index] {
            Block::Paragraph { text } => {
                let byte = char_to_byte(text, offset);
                text.split_off(byte)
            }
            Block::Image(_) => return Err(MutationError::NotInTextblock(pos)),
        };

        doc.blocks.insert(index + 1, Block::Paragraph { text: tail });

        Ok(StepMap::single(pos, 0, 2))
    }

    fn apply_insert_block(doc: &mut Document, pos: usize, block: &Block) -> Result<StepMap, MutationError> {
        let index = match doc.resolve(pos)? {
            ResolvedPos::Boundary { index } => index,
            ResolvedPos::Text { .. } => return Err(MutationError::NotABoundary(pos)),
        };

        doc.blocks.insert(index, block.clone());

        Ok(StepMap::single(pos, 0, block.node_size()))
    }

    fn apply_delete(doc: &mut Document, from: usize, to: usize) -> Result<StepMap, MutationError> {
        if from > to {
            return Err(MutationError::InvalidRange { from, to });
        }
        if from == to {
            doc.resolve(from)?;
            return Ok(StepMap::empty());
        }

        match (doc.resolve(from)?, doc.resolve(to)?) {
            (
                ResolvedPos::Boundary { index: first },
                ResolvedPos::Boundary { index: last },
            ) => {
                doc.blocks.drain(first..last);
            }

            (
                ResolvedPos::Text { index: first, offset: head, .. },
                ResolvedPos::Text { index: last, offset: tail, .. },
            ) => {
                let rest = match &doc.blocks[last] {
                    Block::Paragraph { text } => text[char_to_byte(text, tail)..].to_string(),
                    Block::Image(_) => String::new(),
                };

                if let Block::Paragraph { text } = &mut doc.blocks[first] {
                    let byte = char_to_byte(text, head);
                    text.truncate(byte);
                    text.push_str(&rest);
                }

                if last > first {
                    doc.blocks.drain(first + 1..=last);
                }
            }

            (
                ResolvedPos::Text { index: first, offset: head, end, .. },
                ResolvedPos::Boundary { index: last },
            ) => {
                if let Block::Paragraph { text } = &mut doc.blocks[first] {
                    let byte = char_to_byte(text, head);
                    text.truncate(byte);
                }
                doc.blocks.drain(first + 1..last);

                // The close token of the trimmed block survives
                return Ok(StepMap::from_ranges([
                    MapRange { start: from, old_size: end - from, new_size: 0 },
                    MapRange { start: end + 1, old_size: to - end - 1, new_size: 0 },
                ]));
            }

            (
                ResolvedPos::Boundary { index: first },
                ResolvedPos::Text { index: last, offset: tail, start, .. },
            ) => {
                if let Block::Paragraph { text } = &mut doc.blocks[last] {
                    let byte = char_to_byte(text, tail);
                    text.replace_range(..byte, "");
                }
                doc.blocks.drain(first..last);

                // The open token of the trimmed block survives
                return Ok(StepMap::from_ranges([
                    MapRange { start: from, old_size: start - 1 - from, new_size: 0 },
                    MapRange { start, old_size: to - start, new_size: 0 },
                ]));
            }
        }

        Ok(StepMap::single(from, to - from, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Assoc, ImageNode};

    fn image() -> Block {
        Block::Image(ImageNode {
            src: "/files/key".to_string(),
            alt: "pic".to_string(),
            width: 1,
            height: 1,
        })
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::InsertText {
            pos: 3,
            text: "Hello World".to_string(),
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_insert_text() {
        let mut doc = Document::from_paragraphs(["hllo"]);
        let map = Mutation::InsertText { pos: 2, text: "e".to_string() }
            .apply(&mut doc)
            .unwrap();

        assert_eq!(doc.text(), "hello");
        assert_eq!(map.map(5, Assoc::After), 6);
    }

    #[test]
    fn test_insert_text_rejects_boundary() {
        let mut doc = Document::from_paragraphs(["a"]);
        let result = Mutation::InsertText { pos: 0, text: "x".to_string() }.apply(&mut doc);

        assert_eq!(result, Err(MutationError::NotInTextblock(0)));
        assert_eq!(doc.text(), "a");
    }

    #[test]
    fn test_split_block() {
        // <p>hello</p>: split between "he" and "llo"
        let mut doc = Document::from_paragraphs(["hello"]);
        let map = Mutation::SplitBlock { pos: 3 }.apply(&mut doc).unwrap();

        assert_eq!(doc.blocks, vec![Block::paragraph("he"), Block::paragraph("llo")]);
        assert_eq!(doc.content_size(), 9);
        assert_eq!(map.map(3, Assoc::After), 5);
        // Between the two halves
        assert_eq!(doc.resolve(4).unwrap(), ResolvedPos::Boundary { index: 1 });
    }

    #[test]
    fn test_insert_block_requires_boundary() {
        let mut doc = Document::from_paragraphs(["ab", "cd"]);

        assert_eq!(
            Mutation::InsertBlock { pos: 2, block: image() }.apply(&mut doc),
            Err(MutationError::NotABoundary(2))
        );

        Mutation::InsertBlock { pos: 4, block: image() }.apply(&mut doc).unwrap();
        assert!(matches!(doc.blocks[1], Block::Image(_)));
        assert_eq!(doc.content_size(), 9);
    }

    #[test]
    fn test_delete_within_block() {
        let mut doc = Document::from_paragraphs(["hello"]);
        Mutation::DeleteRange { from: 2, to: 4 }.apply(&mut doc).unwrap();
        assert_eq!(doc.text(), "hlo");
    }

    #[test]
    fn test_delete_whole_blocks() {
        // <p>ab</p><p>cd</p><p>ef</p> → drop the middle paragraph
        let mut doc = Document::from_paragraphs(["ab", "cd", "ef"]);
        let map = Mutation::DeleteRange { from: 4, to: 8 }.apply(&mut doc).unwrap();

        assert_eq!(doc.blocks, vec![Block::paragraph("ab"), Block::paragraph("ef")]);
        assert!(map.map_result(4, Assoc::After).deleted);
        assert!(!map.map_result(8, Assoc::After).deleted);
    }

    #[test]
    fn test_delete_across_blocks_joins() {
        // "ab|c" .. "d|ef": keep "ab" + "ef"
        let mut doc = Document::from_paragraphs(["abc", "xyz", "def"]);
        let from = 3;
        let to = doc.block_start(2) + 2;

        Mutation::DeleteRange { from, to }.apply(&mut doc).unwrap();

        assert_eq!(doc.blocks, vec![Block::paragraph("abef")]);
    }

    #[test]
    fn test_delete_text_to_boundary() {
        // "a|b" .. end of "cd": keep "a", drop "cd"
        let mut doc = Document::from_paragraphs(["ab", "cd", "ef"]);
        let map = Mutation::DeleteRange { from: 2, to: 8 }.apply(&mut doc).unwrap();

        assert_eq!(doc.blocks, vec![Block::paragraph("a"), Block::paragraph("ef")]);
        assert_eq!(map.map(8, Assoc::Before), 3);
        assert_eq!(map.map(9, Assoc::After), 4);
        assert!(map.map_result(5, Assoc::After).deleted);
    }

    #[test]
    fn test_delete_boundary_to_text() {
        // start of "cd" .. "e|f": drop "cd", keep "f"
        let mut doc = Document::from_paragraphs(["ab", "cd", "ef"]);
        let map = Mutation::DeleteRange { from: 4, to: 10 }.apply(&mut doc).unwrap();

        assert_eq!(doc.blocks, vec![Block::paragraph("ab"), Block::paragraph("f")]);
        assert_eq!(map.map(2, Assoc::After), 2);
        assert_eq!(map.map(10, Assoc::After), 5);
        assert_eq!(doc.resolve(5).unwrap(), ResolvedPos::Text { index: 1, start: 5, end: 6, offset: 0 });
    }

    #[test]
    fn test_delete_text_to_boundary_keeps_empty_block() {
        let mut doc = Document::from_paragraphs(["ab", "cd"]);
        Mutation::DeleteRange { from: 1, to: 4 }.apply(&mut doc).unwrap();

        assert_eq!(doc.blocks, vec![Block::paragraph(""), Block::paragraph("cd")]);
    }

    #[test]
    fn test_validate_matches_apply() {
        let doc = Document::from_paragraphs(["ab"]);

        assert!(Mutation::SplitBlock { pos: 2 }.validate(&doc).is_ok());
        assert!(Mutation::SplitBlock { pos: 0 }.validate(&doc).is_err());
        assert!(Mutation::InsertBlock { pos: 4, block: image() }.validate(&doc).is_ok());
        assert!(Mutation::DeleteRange { from: 3, to: 1 }.validate(&doc).is_err());
    }
}
