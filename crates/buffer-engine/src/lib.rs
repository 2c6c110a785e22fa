//! A piece-tree text buffer engine: an in-memory UTF-16 document store
//! supporting fast random-access queries (length, line count, line content,
//! substring extraction) and batched non-overlapping edits without copying
//! the whole document.
//!
//! Five pieces, leaves first: [`buffer_string::BufferString`] (an
//! input-only code-unit sequence), [`leaf::Leaf`] (a mutable, contiguous run
//! of code units plus its line-start index), [`tree::Tree`] (the implicit
//! complete binary tree of leaves, and the edit dispatcher), [`builder::Builder`]
//! (streams chunks into an initial balanced tree), and [`cursor::Cursor`] (a
//! trivial navigation handle). See `DESIGN.md` for how each piece is
//! grounded in `editor-core` and the original `edcore` C++ sources.

pub mod builder;
pub mod buffer_string;
pub mod cursor;
pub mod error;
pub mod instrumentation;
pub mod leaf;
pub mod tree;

pub use builder::Builder;
pub use buffer_string::BufferString;
pub use cursor::Cursor;
pub use error::{BufferError, BufferResult};
pub use instrumentation::{InstrumentationHook, NoopHook};
pub use leaf::{Leaf, LeafEdit};
pub use tree::{Edit, Tree, DEFAULT_IDEAL_LEAF_LENGTH, DEFAULT_MAX_LEAF_LENGTH, DEFAULT_MIN_LEAF_LENGTH};

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    /// spec.md §8 seed scenario 1: mixed terminators.
    #[test]
    fn seed_scenario_mixed_terminators() {
        let mut b = Builder::new();
        b.accept_chunk(&units("a\r\nb\nc\rd"));
        b.finish();
        let tree = b.build();
        assert_eq!(tree.length(), 8);
        assert_eq!(tree.line_count(), 4);

        let lines = [("a", "a\r\n"), ("b", "b\n"), ("c", "c\r"), ("d", "d")];
        for (i, (_content, full)) in lines.iter().enumerate() {
            let (start, end) = tree.find_line(i + 1).unwrap();
            let text = tree.extract_to_string(start, end.offset - start.offset).unwrap();
            assert_eq!(&text, full);
        }
        tree.assert_invariants();
    }

    /// spec.md §8 seed scenario 3: an in-place no-allocate edit batch.
    #[test]
    fn seed_scenario_no_allocate_batch_edit() {
        let mut b = Builder::new();
        b.accept_chunk(&units("abcdefgh"));
        b.finish();
        let mut tree = b.build();
        tree.replace_offset_len(vec![
            Edit { offset: 2, length: 2, text: BufferString::from_units(&units("XY")) },
            Edit { offset: 6, length: 1, text: BufferString::from_units(&units("Z")) },
        ])
        .unwrap();
        let start = tree.find_offset(0).unwrap();
        assert_eq!(tree.extract_to_string(start, tree.length()).unwrap(), "abXYefZh");
        tree.assert_invariants();
    }

    /// spec.md §8 seed scenario 4: a multi-leaf replace spanning many lines.
    #[test]
    fn seed_scenario_multi_leaf_replace() {
        let mut b = Builder::new();
        for _ in 0..64 {
            let mut chunk = vec![b'x' as u16; 1024];
            chunk.push(0x000A);
            b.accept_chunk(&chunk);
        }
        b.finish();
        let mut tree = b.build();
        let original_length = tree.length();
        assert_eq!(original_length, 64 * 1025);
        assert_eq!(tree.line_count(), 65);

        let replacement = vec![b'Y' as u16, b'Y' as u16, 0x000A, b'Z' as u16, b'Z' as u16];
        tree.replace_offset_len(vec![Edit {
            offset: 1024 * 32,
            length: 1024 * 8,
            text: BufferString::from_units(&replacement),
        }])
        .unwrap();

        assert_eq!(tree.length(), original_length - 1024 * 8 + 5);
        tree.assert_invariants();
    }

    /// spec.md §8 seed scenario 5: an overlapping batch is rejected and the
    /// tree is left completely unchanged.
    #[test]
    fn seed_scenario_overlapping_edits_rejected() {
        let mut b = Builder::new();
        b.accept_chunk(&units("abcdefghij"));
        b.finish();
        let mut tree = b.build();
        let before = tree.extract_to_string(tree.find_offset(0).unwrap(), tree.length()).unwrap();

        let err = tree
            .replace_offset_len(vec![
                Edit { offset: 5, length: 3, text: BufferString::Empty },
                Edit { offset: 6, length: 1, text: BufferString::from_units(&units("Q")) },
            ])
            .unwrap_err();
        assert!(matches!(err, BufferError::OverlappingEdits));

        let after = tree.extract_to_string(tree.find_offset(0).unwrap(), tree.length()).unwrap();
        assert_eq!(before, after);
        tree.assert_invariants();
    }

    /// spec.md §8 seed scenario 6: an edit inserting `\n` right after an
    /// existing lonely `\r` must merge into a single CRLF terminator.
    #[test]
    fn seed_scenario_edit_forms_a_crlf_across_the_edit_boundary() {
        let mut b = Builder::new();
        b.accept_chunk(&units("a\rb"));
        b.finish();
        let mut tree = b.build();
        tree.replace_offset_len(vec![Edit::insert(2, BufferString::line_feed())]).unwrap();
        let start = tree.find_offset(0).unwrap();
        assert_eq!(tree.extract_to_string(start, tree.length()).unwrap(), "a\r\nb");
        assert_eq!(tree.line_count(), 2);
        tree.assert_invariants();
    }

    /// spec.md §8 round-trip law: insert then delete the same range is a
    /// no-op on content.
    #[test]
    fn insert_then_delete_same_range_is_a_no_op() {
        let mut b = Builder::new();
        b.accept_chunk(&units("The quick brown fox"));
        b.finish();
        let mut tree = b.build();
        tree.insert_one_offset_len(10, &units("very ")).unwrap();
        tree.delete_one_offset_len(10, 5).unwrap();
        let start = tree.find_offset(0).unwrap();
        assert_eq!(tree.extract_to_string(start, tree.length()).unwrap(), "The quick brown fox");
        tree.assert_invariants();
    }

    /// Exercises the streaming builder against many small chunks to make
    /// sure leaf seams never split a CRLF that crosses an `accept_chunk` call.
    #[test]
    fn many_small_chunks_still_produce_one_crlf_terminator() {
        let mut b = Builder::new();
        for ch in units("one\r\ntwo\r\nthree") {
            b.accept_chunk(&[ch]);
        }
        b.finish();
        let tree = b.build();
        assert_eq!(tree.line_count(), 3);
        tree.assert_invariants();
    }
}
