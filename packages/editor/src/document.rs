//! # Document
//!
//! Block document edited by a single session.
//!
//! A document is a flat list of blocks. Positions are integer offsets
//! counted in tokens:
//!
//! ```text
//!  0   1 2 3 4   5   6   7
//!  | <p> a b c </p> |<img>|
//!  ↑               ↑     ↑
//!  boundary   boundary  boundary
//! ```
//!
//! - A paragraph with `n` characters has node size `n + 2` (open token,
//!   content, close token).
//! - An image block is a leaf of size 1.
//! - Position 0 sits before the first block, `content_size()` after the
//!   last one.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{EditorError, MutationError};

/// Image block referencing a remote object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    /// Servable URL of the stored object
    pub src: String,

    /// Accessible text
    pub alt: String,

    /// Decoded pixel width
    pub width: u32,

    /// Decoded pixel height
    pub height: u32,
}

/// Top-level document block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Paragraph { text: String },
    Image(ImageNode),
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Number of position tokens this block occupies
    pub fn node_size(&self) -> usize {
        match self {
            Block::Paragraph { text } => text.chars().count() + 2,
            Block::Image(_) => 1,
        }
    }

    pub fn is_textblock(&self) -> bool {
        matches!(self, Block::Paragraph { .. })
    }

    /// Text content (empty for leaf blocks)
    pub fn text_content(&self) -> &str {
        match self {
            Block::Paragraph { text } => text,
            Block::Image(_) => "",
        }
    }
}

/// A position resolved against a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedPos {
    /// Between two blocks; `index` is the block that follows
    /// (equal to the block count at the end of the document).
    Boundary { index: usize },

    /// Inside the content of a textblock
    Text {
        index: usize,
        /// Position of the first content token
        start: usize,
        /// Position after the last content token
        end: usize,
        /// Character offset into the block text
        offset: usize,
    },
}

/// Editable block document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Build a document of plain paragraphs
    pub fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocks: paragraphs.into_iter().map(Block::paragraph).collect(),
        }
    }

    /// Load a document from a JSON file
    pub fn load(path: &Path) -> Result<Self, EditorError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the document to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), EditorError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Total size of the document content
    pub fn content_size(&self) -> usize {
        self.blocks.iter().map(Block::node_size).sum()
    }

    /// Position directly before the block at `index`
    pub fn block_start(&self, index: usize) -> usize {
        self.blocks.iter().take(index).map(Block::node_size).sum()
    }

    /// Resolve a position to a block boundary or a textblock offset
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, MutationError> {
        let mut cursor = 0;

        for (index, block) in self.blocks.iter().enumerate() {
            if pos == cursor {
                return Ok(ResolvedPos::Boundary { index });
            }

            let size = block.node_size();
            if pos < cursor + size {
                // Leaf blocks have size 1, so only textblocks reach here
                return Ok(ResolvedPos::Text {
                    index,
                    start: cursor + 1,
                    end: cursor + size - 1,
                    offset: pos - cursor - 1,
                });
            }

            cursor += size;
        }

        if pos == cursor {
            Ok(ResolvedPos::Boundary {
                index: self.blocks.len(),
            })
        } else {
            Err(MutationError::OutOfRange {
                pos,
                size: cursor,
            })
        }
    }

    /// Iterate over image blocks
    pub fn images(&self) -> impl Iterator<Item = &ImageNode> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Image(image) => Some(image),
            Block::Paragraph { .. } => None,
        })
    }

    /// Concatenated text of all textblocks, one line per block
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter(|block| block.is_textblock())
            .map(Block::text_content)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Byte index of the `offset`-th character
pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}
