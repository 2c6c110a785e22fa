//! Streams UTF-16 chunks into an initial balanced [`Tree`], deferring a
//! trailing `\r` or high surrogate across chunk boundaries so no chunk seam
//! ever splits a CRLF pair or a surrogate pair.
//!
//! Grounded on `examples/original_source/src/core/buffer-builder.{h,cc}`
//! (`BufferBuilder::AcceptChunk`/`Finish`/`Build`, and its
//! `buildBufferFromPieces` helper, which recursively halves the piece vector
//! exactly as `spec.md` §4.3 describes); the halving itself is the same
//! recursive-by-half construction as `editor-core`'s
//! `line_index/btree.rs::build_level`, just over leaves instead of B-tree
//! nodes, and already centralized in [`Tree::rebuild_nodes`] so this only
//! needs to hand `Tree::new` a flat `Vec<Leaf>`.

use crate::instrumentation::{InstrumentationHook, NoopHook};
use crate::leaf::Leaf;
use crate::tree::{Tree, DEFAULT_IDEAL_LEAF_LENGTH, DEFAULT_MAX_LEAF_LENGTH, DEFAULT_MIN_LEAF_LENGTH};

const CR: u16 = 0x000D;
const HIGH_SURROGATE_START: u16 = 0xD800;
const HIGH_SURROGATE_END: u16 = 0xDBFF;

/// Accumulates leaves from a stream of chunks. See `spec.md` §4.5 for the
/// *empty → streaming → finalized* state machine this type walks through:
/// [`Self::accept_chunk`] drives *empty*/*streaming* → *streaming*,
/// [`Self::finish`] drives either into *finalized*, and [`Self::build`] is
/// only meaningful after `finish()` has run.
pub struct Builder {
    leafs: Vec<Leaf>,
    has_previous_char: bool,
    previous_char: u16,
    finished: bool,
    min_leaf_length: usize,
    ideal_leaf_length: usize,
    max_leaf_length: usize,
    hook: Box<dyn InstrumentationHook>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::with_hook(Box::new(NoopHook))
    }

    pub fn with_hook(hook: Box<dyn InstrumentationHook>) -> Self {
        Builder {
            leafs: Vec::new(),
            has_previous_char: false,
            previous_char: 0,
            finished: false,
            min_leaf_length: DEFAULT_MIN_LEAF_LENGTH,
            ideal_leaf_length: DEFAULT_IDEAL_LEAF_LENGTH,
            max_leaf_length: DEFAULT_MAX_LEAF_LENGTH,
            hook,
        }
    }

    /// Overrides the leaf-sizing policy the eventual [`Tree::new`] call uses.
    /// Defaults match `tree::DEFAULT_*`.
    pub fn with_leaf_sizes(mut self, min_leaf_length: usize, ideal_leaf_length: usize, max_leaf_length: usize) -> Self {
        self.min_leaf_length = min_leaf_length;
        self.ideal_leaf_length = ideal_leaf_length;
        self.max_leaf_length = max_leaf_length;
        self
    }

    /// Ingests one chunk of code units. A trailing `\r` or high surrogate is
    /// held back rather than written into this chunk's leaf, since it might
    /// combine with the first code unit of the *next* chunk into a single
    /// CRLF pair or surrogate pair.
    pub fn accept_chunk(&mut self, data: &[u16]) {
        debug_assert!(!self.finished, "accept_chunk called after finish()");
        if data.is_empty() {
            return;
        }

        let last = data[data.len() - 1];
        let hold_back_last = last == CR || (HIGH_SURROGATE_START..=HIGH_SURROGATE_END).contains(&last);

        let body_end = if hold_back_last { data.len() - 1 } else { data.len() };
        let mut leaf_data = Vec::with_capacity((self.has_previous_char as usize) + body_end);
        if self.has_previous_char {
            leaf_data.push(self.previous_char);
        }
        leaf_data.extend_from_slice(&data[..body_end]);

        let leaf = Leaf::from_units(&leaf_data);
        self.hook.leaf_created(self.leafs.len(), leaf.length());
        self.leafs.push(leaf);

        self.has_previous_char = hold_back_last;
        self.previous_char = last;
    }

    /// Closes the stream. If no chunk was ever accepted, emits a leaf holding
    /// just the deferred code unit (or an empty leaf, if none was held back).
    /// Otherwise, if a code unit is still held back, it is appended to the
    /// last emitted leaf.
    pub fn finish(&mut self) {
        if self.leafs.is_empty() {
            let leaf = if self.has_previous_char {
                Leaf::from_units(&[self.previous_char])
            } else {
                Leaf::empty()
            };
            self.has_previous_char = false;
            self.leafs.push(leaf);
        } else if self.has_previous_char {
            self.has_previous_char = false;
            let last_index = self.leafs.len() - 1;
            let mut data = self.leafs[last_index].chars().to_vec();
            data.push(self.previous_char);
            self.hook.leaf_dropped(last_index);
            self.leafs[last_index] = Leaf::from_units(&data);
            self.hook.leaf_created(last_index, self.leafs[last_index].length());
        }
        self.finished = true;
    }

    /// Consumes the builder and returns a balanced [`Tree`] over the
    /// accumulated leaves. `finish()` must have been called first.
    pub fn build(self) -> Tree {
        debug_assert!(self.finished, "build() called before finish()");
        Tree::with_hook(self.leafs, self.min_leaf_length, self.ideal_leaf_length, self.max_leaf_length, self.hook)
    }
}
