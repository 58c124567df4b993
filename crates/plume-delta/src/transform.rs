//! Pure structural transforms over documents.
//!
//! All transforms are total over well-formed documents: they never fail,
//! never mutate their input, and return a new `Document`. Typical use is
//! just before persisting or re-displaying, e.g. rewriting temporary
//! image srcs once an upload finishes.

use std::collections::{HashMap, HashSet};

use smol_str::SmolStr;

use crate::document::Document;
use crate::op::Op;

/// Collect the src of every image embed, deduplicated.
///
/// Covers both legacy `image` and `block-image` operations (either
/// payload form); tweets carry no image reference and are skipped.
pub fn extract_image_references(doc: &Document) -> HashSet<SmolStr> {
    doc.iter()
        .filter_map(|op| match op {
            Op::Embed { embed, .. } => embed.image_src().map(SmolStr::new),
            Op::Text { .. } => None,
        })
        .collect()
}

/// Rewrite image srcs through `mapping`.
///
/// Each image operation whose src is a key gets the mapped value; all
/// other operations pass through untouched. The mapping is applied once
/// per operation, never chained: a value that happens to alias another
/// key is not re-resolved.
pub fn substitute_images(doc: &Document, mapping: &HashMap<SmolStr, SmolStr>) -> Document {
    let ops = doc
        .iter()
        .map(|op| match op {
            Op::Embed { embed, attributes } => {
                match embed.image_src().and_then(|src| mapping.get(src)) {
                    Some(new_src) => Op::Embed {
                        embed: embed.with_image_src(new_src.clone()),
                        attributes: attributes.clone(),
                    },
                    None => op.clone(),
                }
            }
            Op::Text { .. } => op.clone(),
        })
        .collect();
    Document::from_ops_unchecked(ops)
}

/// Strip trailing empty lines, leaving the single terminating newline.
///
/// Unattributed whitespace-only runs at the tail are dropped, then
/// trailing whitespace is trimmed from the last unattributed text run,
/// and finally the terminating newline is restored. Idempotent.
///
/// Attributed runs stop the trim: a block attribute on a newline formats
/// the line before it, so removing one would destroy content. Embeds
/// stop it for the same reason.
pub fn normalize_trailing_whitespace(doc: &Document) -> Document {
    let mut ops = doc.ops().to_vec();
    loop {
        match ops.last_mut() {
            Some(Op::Text {
                text,
                attributes: None,
            }) => {
                if text.chars().all(char::is_whitespace) {
                    ops.pop();
                    continue;
                }
                let trimmed = text.trim_end();
                if trimmed.len() != text.len() {
                    *text = SmolStr::new(trimmed);
                }
                break;
            }
            _ => break,
        }
    }
    if !ends_with_newline(&ops) {
        ops.push(Op::text("\n"));
    }
    Document::from_ops_unchecked(ops)
}

fn ends_with_newline(ops: &[Op]) -> bool {
    matches!(ops.last(), Some(Op::Text { text, .. }) if text.ends_with('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{AttributeSet, names};
    use crate::op::{BlockImagePayload, Embed, TweetPayload};

    fn doc(json: &str) -> Document {
        Document::from_json(json).unwrap()
    }

    #[test]
    fn test_extract_deduplicates_and_skips_tweets() {
        let doc = Document::from_ops(vec![
            Op::embed(Embed::Image("a".into())),
            Op::embed(Embed::BlockImage(BlockImagePayload::Src("b".into()))),
            Op::embed(Embed::BlockImage(BlockImagePayload::Full {
                src: "a".into(),
                width: 1,
                height: 1,
                spoiler: None,
            })),
            Op::embed(Embed::Tweet(TweetPayload::Url("t".into()))),
            Op::text("\n"),
        ])
        .unwrap();

        let refs = extract_image_references(&doc);
        assert_eq!(refs.len(), 2);
        assert!(refs.contains("a"));
        assert!(refs.contains("b"));
        assert!(!refs.contains("t"));
    }

    #[test]
    fn test_extract_on_text_only_document_is_empty() {
        assert!(extract_image_references(&doc(r#"[{"insert":"hi\n"}]"#)).is_empty());
    }

    #[test]
    fn test_substitute_replaces_mapped_srcs() {
        let input = doc(r#"[{"insert":{"block-image":{"src":"a","width":1,"height":2}}}]"#);
        let mapping = HashMap::from([(SmolStr::new("a"), SmolStr::new("b"))]);
        let out = substitute_images(&input, &mapping);
        assert_eq!(
            out.to_json(),
            r#"[{"insert":{"block-image":{"src":"b","width":1,"height":2}}}]"#
        );
        // Input untouched.
        assert_eq!(
            input.to_json(),
            r#"[{"insert":{"block-image":{"src":"a","width":1,"height":2}}}]"#
        );
    }

    #[test]
    fn test_substitute_leaves_unmapped_and_non_images() {
        let input = doc(
            r#"[{"insert":"hi"},{"insert":{"image":"keep"}},{"insert":{"tweet":{"url":"a"}}},{"insert":"\n"}]"#,
        );
        let mapping = HashMap::from([(SmolStr::new("a"), SmolStr::new("b"))]);
        let out = substitute_images(&input, &mapping);
        // "a" is only a tweet url here; nothing matches.
        assert_eq!(out, input);
    }

    #[test]
    fn test_substitute_is_idempotent_for_non_aliasing_mapping() {
        let input = doc(r#"[{"insert":{"image":"a"}},{"insert":{"block-image":"a"}}]"#);
        let mapping = HashMap::from([(SmolStr::new("a"), SmolStr::new("b"))]);
        let once = substitute_images(&input, &mapping);
        let twice = substitute_images(&once, &mapping);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_substitute_applies_aliasing_mapping_once() {
        // b is both a value (for a) and a key (to c): each op is mapped
        // exactly once, never chained a -> b -> c.
        let input = doc(r#"[{"insert":{"image":"a"}},{"insert":{"image":"b"}}]"#);
        let mapping = HashMap::from([
            (SmolStr::new("a"), SmolStr::new("b")),
            (SmolStr::new("b"), SmolStr::new("c")),
        ]);
        let out = substitute_images(&input, &mapping);
        assert_eq!(
            out.to_json(),
            r#"[{"insert":{"image":"b"}},{"insert":{"image":"c"}}]"#
        );
    }

    #[test]
    fn test_normalize_collapses_trailing_empty_lines() {
        let input = doc(r#"[{"insert":"x"},{"insert":"\n"},{"insert":"\n"},{"insert":"\n"}]"#);
        let out = normalize_trailing_whitespace(&input);
        assert_eq!(out.to_json(), r#"[{"insert":"x"},{"insert":"\n"}]"#);
    }

    #[test]
    fn test_normalize_trims_inside_final_run() {
        let input = doc(r#"[{"insert":"x\n\n\n"}]"#);
        let out = normalize_trailing_whitespace(&input);
        assert_eq!(out.to_json(), r#"[{"insert":"x"},{"insert":"\n"}]"#);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for json in [
            r#"[{"insert":"x"},{"insert":"\n"},{"insert":"\n"},{"insert":"\n"}]"#,
            r#"[{"insert":"x\n   \n\n"}]"#,
            r#"[{"insert":""}]"#,
            r#"[{"insert":{"image":"a"}},{"insert":"\n"},{"insert":"\n"}]"#,
            r#"[{"insert":"hi"},{"insert":"\n","attributes":{"blockquote":true}}]"#,
        ] {
            let once = normalize_trailing_whitespace(&doc(json));
            let twice = normalize_trailing_whitespace(&once);
            assert_eq!(once, twice, "{json}");
        }
    }

    #[test]
    fn test_normalize_keeps_content_before_whitespace() {
        // The trailing newlines after the embed go; the embed stays.
        let input = doc(r#"[{"insert":{"block-image":"a"}},{"insert":"\n"},{"insert":"\n"}]"#);
        let out = normalize_trailing_whitespace(&input);
        assert_eq!(
            out.to_json(),
            r#"[{"insert":{"block-image":"a"}},{"insert":"\n"}]"#
        );
    }

    #[test]
    fn test_normalize_keeps_attributed_terminator() {
        // A block attribute on the final newline formats its line; it is
        // content, not removable whitespace.
        let input = doc(r#"[{"insert":"quoted"},{"insert":"\n","attributes":{"blockquote":true}}]"#);
        let out = normalize_trailing_whitespace(&input);
        assert_eq!(out, input);
    }

    #[test]
    fn test_normalize_all_whitespace_document_becomes_empty() {
        let input = doc(r#"[{"insert":"\n"},{"insert":"\n"}]"#);
        let out = normalize_trailing_whitespace(&input);
        assert_eq!(out, Document::empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_normalize_restores_missing_terminator() {
        let input = Document::from_ops(vec![Op::text_with(
            "italic tail",
            AttributeSet::of(names::ITALIC, true),
        )])
        .unwrap();
        let out = normalize_trailing_whitespace(&input);
        assert_eq!(
            out.to_json(),
            r#"[{"insert":"italic tail","attributes":{"italic":true}},{"insert":"\n"}]"#
        );
    }
}
