//! Empty-line classification for contextual UI anchoring.
//!
//! When the cursor lands on a structurally empty line the UI offers an
//! embed-insertion affordance anchored to that line. This module only
//! decides *which* position qualifies; painting is the host's problem.

use crate::document::{Document, Unit};

/// Anchor region for an empty line: where contextual UI attaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineAnchor {
    /// Unit offset of the line start. For an empty line this is also the
    /// offset of its newline, since the newline is the whole line.
    pub offset: usize,
    /// Zero-based index of the line within the document.
    pub line: usize,
}

/// Classify the line containing `cursor`.
///
/// A line is empty iff it is exactly a bare newline: no text run with
/// nonzero length and no embed. Returns the anchor for an empty line,
/// `None` for a line with content or a cursor past the last unit. Pure
/// and non-suspending; callers de-duplicate repeated outcomes.
pub fn locate_empty_line(doc: &Document, cursor: usize) -> Option<LineAnchor> {
    let mut line_start = 0usize;
    let mut line = 0usize;
    let mut has_content = false;
    let mut index = 0usize;
    for unit in doc.units() {
        match unit {
            Unit::Char('\n') => {
                // First newline at or past the cursor terminates its line.
                if cursor <= index {
                    return (!has_content).then_some(LineAnchor {
                        offset: line_start,
                        line,
                    });
                }
                line_start = index + 1;
                line += 1;
                has_content = false;
            }
            Unit::Char(_) | Unit::Embed(_) => has_content = true,
        }
        index += 1;
    }
    None
}
