//! # Ara Editor
//!
//! Document model underlying the rich-text editor used for audit
//! comments and notes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ EditSession: document + selection + version │
//! └─────────────────────────────────────────────┘
//!            ↓ transaction()      ↑ dispatch()
//! ┌─────────────────────────────────────────────┐
//! │ Transaction: mutations on a working copy    │
//! │  - each mutation yields a StepMap           │
//! │  - typed metadata for plugins               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Mapping: carries outside positions across   │
//! │ edits and reports deleted ones              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Single writer**: transactions are applied one at a time
//! 2. **Positions are mapped, never guessed**: anything holding a
//!    position outside the document maps it through every transaction
//! 3. **Blocks never nest**: inserted blocks land between blocks
//!
//! ## Usage
//!
//! ```rust
//! use ara_editor::{Assoc, Document, EditSession};
//!
//! let mut session = EditSession::new("notes", Document::from_paragraphs(["hello"]));
//!
//! let mut tr = session.transaction();
//! tr.split(3).unwrap();
//! let result = session.dispatch(tr).unwrap();
//!
//! assert_eq!(session.document().blocks.len(), 2);
//! assert_eq!(result.mapping.map(6, Assoc::After), 8);
//! ```

mod document;
mod errors;
mod mapping;
mod mutations;
mod session;
mod transaction;

pub use document::{Block, Document, ImageNode, ResolvedPos};
pub use errors::EditorError;
pub use mapping::{Assoc, MapRange, MapResult, Mapping, StepMap};
pub use mutations::{Mutation, MutationError};
pub use session::{DispatchResult, EditSession, DEFAULT_HISTORY_LIMIT};
pub use transaction::{Selection, Transaction};
