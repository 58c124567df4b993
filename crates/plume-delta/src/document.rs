//! The canonical operation-sequence document.
//!
//! A `Document` is an ordered list of [`Op`]s. Length is counted in
//! atomic units: each char of a text run is one unit, each embed is one
//! unit. A document always logically terminates in a newline; when the
//! final run does not carry one, an implicit trailing newline unit is
//! counted (the editing surface renders it). `[{"insert":""}]` therefore
//! has length 1 and is the canonical empty document.

use smol_str::SmolStr;

use crate::error::DocumentError;
use crate::op::{Embed, Op};

/// An immutable ordered sequence of operations.
///
/// Documents are only mutated by transforms returning a new value or by
/// the host editing surface applying an operation batch; every accessor
/// here is read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    ops: Vec<Op>,
}

impl Document {
    /// The empty document: a single bare newline, length 1.
    pub fn empty() -> Self {
        Self {
            ops: vec![Op::text("\n")],
        }
    }

    /// Build a document from an operation list.
    ///
    /// An empty list is rejected as malformed: there is no run to bear
    /// the terminating newline.
    pub fn from_ops(ops: Vec<Op>) -> Result<Self, DocumentError> {
        if ops.is_empty() {
            return Err(DocumentError::NoOperations);
        }
        Ok(Self { ops })
    }

    /// Construct from ops known to be non-empty (transform outputs).
    pub(crate) fn from_ops_unchecked(ops: Vec<Op>) -> Self {
        debug_assert!(!ops.is_empty());
        Self { ops }
    }

    /// Parse the delta JSON serialization: an array of operation records.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let ops: Vec<Op> = serde_json::from_str(json)?;
        Self::from_ops(ops)
    }

    /// Serialize to delta JSON. Inverse of [`Document::from_json`] for
    /// any document not put through a transform.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.ops).expect("delta ops serialize to plain JSON")
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    /// Restartable read-only traversal over operations.
    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }

    /// Restartable traversal over atomic units, implicit terminating
    /// newline included.
    pub fn units(&self) -> Units<'_> {
        Units {
            ops: self.ops.iter(),
            chars: None,
            implicit_newline: !self.has_explicit_terminator(),
        }
    }

    /// Whether the final op is a text run carrying the terminating newline.
    fn has_explicit_terminator(&self) -> bool {
        matches!(self.ops.last(), Some(Op::Text { text, .. }) if text.ends_with('\n'))
    }

    /// Length in atomic units, counting the implicit terminator.
    pub fn len(&self) -> usize {
        let units: usize = self.ops.iter().map(Op::unit_len).sum();
        if self.has_explicit_terminator() {
            units
        } else {
            units + 1
        }
    }

    /// The empty document still has its terminating newline, so emptiness
    /// is `len() == 1`, not zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Concatenated text content, embeds skipped. Mostly useful in tests.
    pub fn text(&self) -> SmolStr {
        let mut out = String::new();
        for op in &self.ops {
            if let Op::Text { text, .. } = op {
                out.push_str(text);
            }
        }
        SmolStr::new(out)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// One atomic content unit: a single char of a text run or a whole embed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit<'a> {
    Char(char),
    Embed(&'a Embed),
}

/// Iterator over the atomic units of a document.
pub struct Units<'a> {
    ops: std::slice::Iter<'a, Op>,
    chars: Option<std::str::Chars<'a>>,
    implicit_newline: bool,
}

impl<'a> Iterator for Units<'a> {
    type Item = Unit<'a>;

    fn next(&mut self) -> Option<Unit<'a>> {
        loop {
            if let Some(chars) = &mut self.chars {
                if let Some(c) = chars.next() {
                    return Some(Unit::Char(c));
                }
                self.chars = None;
            }
            match self.ops.next() {
                Some(Op::Text { text, .. }) => self.chars = Some(text.chars()),
                Some(Op::Embed { embed, .. }) => return Some(Unit::Embed(embed)),
                None => {
                    if self.implicit_newline {
                        self.implicit_newline = false;
                        return Some(Unit::Char('\n'));
                    }
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{AttributeSet, names};
    use crate::op::BlockImagePayload;

    #[test]
    fn test_empty_document_has_length_one() {
        let doc = Document::from_json(r#"[{"insert":""}]"#).unwrap();
        assert_eq!(doc.len(), 1);
        assert!(doc.is_empty());

        assert_eq!(Document::empty().len(), 1);
        assert!(Document::empty().is_empty());
    }

    #[test]
    fn test_length_counts_units_not_ops() {
        let doc = Document::from_json(r#"[{"insert":"hi"},{"insert":"\n"}]"#).unwrap();
        assert_eq!(doc.len(), 3);
        assert!(!doc.is_empty());
        assert_eq!(doc.text(), "hi\n");
    }

    #[test]
    fn test_embed_counts_one_unit() {
        let doc =
            Document::from_json(r#"[{"insert":{"block-image":"a"}},{"insert":"\n"}]"#).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_trailing_embed_gets_implicit_newline() {
        let doc = Document::from_json(r#"[{"insert":{"image":"a"}}]"#).unwrap();
        assert_eq!(doc.len(), 2);
        let units: Vec<_> = doc.units().collect();
        assert_eq!(units.len(), 2);
        assert_eq!(units[1], Unit::Char('\n'));
    }

    #[test]
    fn test_no_operations_is_malformed() {
        assert!(matches!(
            Document::from_json("[]"),
            Err(DocumentError::NoOperations)
        ));
        assert!(matches!(
            Document::from_ops(Vec::new()),
            Err(DocumentError::NoOperations)
        ));
    }

    #[test]
    fn test_malformed_insert_is_parse_error() {
        assert!(matches!(
            Document::from_json(r#"[{"insert":42}]"#),
            Err(DocumentError::Parse(_))
        ));
    }

    #[test]
    fn test_round_trip_is_identical() {
        // The simple-editor fixture: header line, block image, italic run.
        let json = r#"[{"insert":"Open RP"},{"insert":"\n","attributes":{"header":1}},{"insert":{"block-image":{"src":"https://example.com/a.png","width":3840,"height":2160}}},{"insert":"You have my sword...","attributes":{"italic":true}}]"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.to_json(), json);
    }

    #[test]
    fn test_structural_equality() {
        let a = Document::from_ops(vec![
            Op::text("hi"),
            Op::text_with("\n", AttributeSet::of(names::HEADER, 1u8)),
        ])
        .unwrap();
        let b = Document::from_json(r#"[{"insert":"hi"},{"insert":"\n","attributes":{"header":1}}]"#)
            .unwrap();
        assert_eq!(a, b);

        let c = Document::from_ops(vec![Op::text("hi"), Op::text("\n")]).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_units_traverse_text_and_embeds() {
        let doc = Document::from_ops(vec![
            Op::text("ab"),
            Op::embed(Embed::BlockImage(BlockImagePayload::Src("x".into()))),
            Op::text("\n"),
        ])
        .unwrap();
        let units: Vec<_> = doc.units().collect();
        assert_eq!(units.len(), 4);
        assert_eq!(units[0], Unit::Char('a'));
        assert!(matches!(units[2], Unit::Embed(_)));
        assert_eq!(units[3], Unit::Char('\n'));

        // Restartable: a second traversal sees the same thing.
        assert_eq!(doc.units().count(), 4);
    }

    #[test]
    fn test_is_empty_iff_length_one() {
        for json in [
            r#"[{"insert":""}]"#,
            r#"[{"insert":"\n"}]"#,
            r#"[{"insert":"hi"},{"insert":"\n"}]"#,
            r#"[{"insert":{"tweet":{"url":"u"}}}]"#,
        ] {
            let doc = Document::from_json(json).unwrap();
            assert_eq!(doc.is_empty(), doc.len() == 1, "{json}");
        }
    }
}
