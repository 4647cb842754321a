//! # Insertion Position Resolver
//!
//! Decides where an imported block lands. Imported media is always a
//! standalone block: a target inside running text splits the paragraph,
//! a target at the very start or end of a paragraph goes before or
//! after it.

use ara_editor::{Assoc, MutationError, ResolvedPos, Transaction};

/// Resolve the block boundary an import at `pos` should use
///
/// Steps needed to get there (deleting the selection, splitting) are
/// added to `tr`. `pos` is given in the coordinates of the document the
/// transaction started from; the result is in the transaction's current
/// coordinates.
pub fn resolve_insert_position(
    tr: &mut Transaction,
    pos: usize,
    replace_selection: bool,
) -> Result<usize, MutationError> {
    let steps_before = tr.mapping().len();
    let mut pos = pos;

    if replace_selection && !tr.selection().is_empty() {
        tr.delete_selection()?;

        // Drop the paragraph if the deletion emptied it
        let cursor = tr.selection().head;
        if let ResolvedPos::Text { start, end, .. } = tr.doc().resolve(cursor)? {
            if start == end {
                tr.delete(start - 1, end + 1)?;
            }
        }

        pos = tr.mapping().map_result_from(steps_before, pos, Assoc::Before).pos;
    }

    match tr.doc().resolve(pos)? {
        ResolvedPos::Boundary { .. } => Ok(pos),
        ResolvedPos::Text { start, .. } if pos == start => Ok(pos - 1),
        ResolvedPos::Text { end, .. } if pos < end => {
            tr.split(pos)?;
            Ok(pos + 1)
        }
        ResolvedPos::Text { .. } => Ok(pos + 1),
    }
}
