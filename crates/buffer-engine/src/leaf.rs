//! A mutable leaf of UTF-16 code units with a cached line-start index.
//!
//! Grounded on `examples/original_source/src/core/buffer-piece.{h,cc}`
//! (`BufferPiece`). The original split one-byte and two-byte storage into
//! `OneByteBufferPiece`/`TwoByteBufferPiece` subclasses; this crate always
//! stores `u16` (`editor-core`'s `line_index` tree similarly keeps one
//! concrete leaf shape rather than specializing by content).

use crate::error::{BufferError, BufferResult};

const CR: u16 = 0x000D;
const LF: u16 = 0x000A;

/// A single replacement within one leaf: delete `length` code units starting
/// at `start` and splice in `data`. Mirrors `LeafOffsetLenEdit` (`buffer.h`).
#[derive(Debug, Clone)]
pub struct LeafEdit {
    pub start: usize,
    pub length: usize,
    pub data: Vec<u16>,
}

#[derive(Debug, Clone)]
pub struct Leaf {
    chars: Vec<u16>,
    /// Offsets, one past each line terminator (`\n`, or the `\n` of a
    /// `\r\n` pair, or a lonely `\r`), strictly increasing.
    line_starts: Vec<u32>,
    has_lonely_cr: bool,
}

impl Leaf {
    pub fn from_units(units: &[u16]) -> Self {
        let (line_starts, has_lonely_cr) = Self::scan_line_starts(units);
        Leaf {
            chars: units.to_vec(),
            line_starts,
            has_lonely_cr,
        }
    }

    fn from_parts(chars: Vec<u16>, line_starts: Vec<u32>) -> Self {
        let has_lonely_cr = Self::lonely_cr_flag(&chars, &line_starts);
        Leaf {
            chars,
            line_starts,
            has_lonely_cr,
        }
    }

    pub fn empty() -> Self {
        Leaf {
            chars: Vec::new(),
            line_starts: Vec::new(),
            has_lonely_cr: false,
        }
    }

    pub fn length(&self) -> usize {
        self.chars.len()
    }

    pub fn new_line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_start(&self, index: usize) -> u32 {
        self.line_starts[index]
    }

    pub fn char_at(&self, index: usize) -> u16 {
        self.chars[index]
    }

    pub fn chars(&self) -> &[u16] {
        &self.chars
    }

    pub fn has_lonely_cr(&self) -> bool {
        self.has_lonely_cr
    }

    pub fn mem_usage(&self) -> usize {
        self.chars.capacity() * 2 + self.line_starts.capacity() * 4
    }

    /// Scans raw code units for line terminators, exactly as
    /// `BufferPiece::_rebuildLineStarts` does: a lone `\r` not followed by
    /// `\n` still ends a line, but a `\r\n` pair is one terminator, not two.
    fn scan_line_starts(chars: &[u16]) -> (Vec<u32>, bool) {
        let mut line_starts = Vec::new();
        let mut has_lonely_cr = false;
        let mut i = 0usize;
        while i < chars.len() {
            match chars[i] {
                CR => {
                    if i + 1 < chars.len() && chars[i + 1] == LF {
                        line_starts.push((i + 2) as u32);
                        i += 2;
                    } else {
                        line_starts.push((i + 1) as u32);
                        has_lonely_cr = true;
                        i += 1;
                    }
                }
                LF => {
                    line_starts.push((i + 1) as u32);
                    i += 1;
                }
                _ => i += 1,
            }
        }
        (line_starts, has_lonely_cr)
    }

    fn lonely_cr_flag(chars: &[u16], line_starts: &[u32]) -> bool {
        line_starts.iter().any(|&ls| {
            let ls = ls as usize;
            chars[ls - 1] == CR && (ls == chars.len() || chars[ls] != LF)
        })
    }

    fn rebuild_line_starts(&mut self) {
        let (line_starts, has_lonely_cr) = Self::scan_line_starts(&self.chars);
        self.line_starts = line_starts;
        self.has_lonely_cr = has_lonely_cr;
    }

    pub fn assert_invariants(&self) {
        assert!(self.chars.len() <= self.chars.capacity());
        let mut prev: Option<u32> = None;
        for (i, &ls) in self.line_starts.iter().enumerate() {
            let idx = ls as usize;
            assert!(
                idx > 0 && idx <= self.chars.len(),
                "line start {i} ({ls}) out of range for {} chars",
                self.chars.len()
            );
            if let Some(p) = prev {
                assert!(ls > p, "line starts not strictly increasing at {i}");
            }
            prev = Some(ls);
            let before = self.chars[idx - 1];
            assert!(
                before == LF || before == CR,
                "line start {i} not preceded by a terminator"
            );
            if before == CR && idx < self.chars.len() {
                assert!(self.chars[idx] != LF, "CRLF pair split across line start {i}");
            }
        }
        assert_eq!(self.has_lonely_cr, Self::lonely_cr_flag(&self.chars, &self.line_starts));
    }

    /// Applies a batch of non-overlapping, ascending-by-`start` edits to
    /// this leaf in place. Ported from `BufferPiece::replaceOffsetLen`
    /// (instance form, `buffer-piece.cc`); the original stores `edits`
    /// descending and walks it back-to-front purely so a single reversed
    /// loop can both compute `resultStart` and drive the move-planning pass —
    /// here both passes just walk the ascending list forward, which is the
    /// same computation without the indirection.
    pub fn apply_edits(&mut self, edits: &[LeafEdit]) -> BufferResult<()> {
        if edits.is_empty() {
            return Ok(());
        }
        for w in edits.windows(2) {
            if w[0].start + w[0].length > w[1].start {
                return Err(BufferError::OverlappingEdits);
            }
        }
        let last = edits.last().unwrap();
        if last.start + last.length > self.chars.len() {
            return Err(BufferError::InvalidEditRange);
        }

        let recreate_line_starts = edits.iter().any(|edit| {
            let edit_end = edit.start + edit.length;
            (edit.start > 0 && self.chars[edit.start - 1] == CR)
                || (edit_end > 0 && self.chars[edit_end - 1] == CR)
                || edit.data.last() == Some(&CR)
        });

        let mut result_starts = vec![0usize; edits.len()];
        let mut delta: i64 = 0;
        for (i, edit) in edits.iter().enumerate() {
            result_starts[i] = (edit.start as i64 + delta) as usize;
            delta += edit.data.len() as i64 - edit.length as i64;
        }
        let new_length = (self.chars.len() as i64 + delta) as usize;

        if !self.try_apply_edits_no_allocate(edits, &result_starts, new_length) {
            self.apply_edits_allocate(edits, &result_starts, new_length);
        }

        if recreate_line_starts {
            self.rebuild_line_starts();
        } else {
            self.patch_line_starts_incremental(edits, &result_starts);
        }
        Ok(())
    }

    fn apply_edits_allocate(&mut self, edits: &[LeafEdit], result_starts: &[usize], new_length: usize) {
        let mut target = vec![0u16; new_length];
        let mut orig_from = 0usize;
        for (i, edit) in edits.iter().enumerate() {
            let orig_to = edit.start;
            let count = orig_to - orig_from;
            if count > 0 {
                target[result_starts[i] - count..result_starts[i]]
                    .copy_from_slice(&self.chars[orig_from..orig_to]);
            }
            orig_from = edit.start + edit.length;
            if !edit.data.is_empty() {
                target[result_starts[i]..result_starts[i] + edit.data.len()].copy_from_slice(&edit.data);
            }
        }
        let count = self.chars.len() - orig_from;
        if count > 0 {
            target[new_length - count..new_length].copy_from_slice(&self.chars[orig_from..]);
        }
        self.chars = target;
    }

    fn try_apply_edits_no_allocate(
        &mut self,
        edits: &[LeafEdit],
        result_starts: &[usize],
        new_length: usize,
    ) -> bool {
        if new_length > self.chars.capacity() {
            return false;
        }
        let n = edits.len();
        let mut moves: Vec<MoveOp> = vec![MoveOp::default(); n + 1];
        for (i, edit) in edits.iter().enumerate() {
            let from = edit.start + edit.length;
            let to = if i + 1 < n { edits[i + 1].start } else { self.chars.len() };
            let count = to - from;
            let dest_start = result_starts[i] + edit.data.len();
            moves[i + 1] = MoveOp {
                orig_start: from,
                orig_end: from + count,
                dest_start,
                dest_end: dest_start + count,
            };
        }
        let head_end = edits[0].start;
        moves[0] = MoveOp {
            orig_start: 0,
            orig_end: head_end,
            dest_start: 0,
            dest_end: head_end,
        };

        if !Self::try_or_execute_moves(None, &moves) {
            return false;
        }

        let touch_len = new_length.max(self.chars.len());
        if touch_len > self.chars.len() {
            self.chars.resize(touch_len, 0);
        }
        Self::try_or_execute_moves(Some(&mut self.chars), &moves);

        for (i, edit) in edits.iter().enumerate() {
            if !edit.data.is_empty() {
                let start = result_starts[i];
                self.chars[start..start + edit.data.len()].copy_from_slice(&edit.data);
            }
        }
        self.chars.truncate(new_length);
        true
    }

    /// Two-pointer greedy scheduling of `moves`: a front move can run as
    /// soon as its destination doesn't yet overlap the next move's still-live
    /// source; symmetrically for the back. Returns `false` (without touching
    /// `data`) if some move's destination and the next unconsumed move's
    /// source would clobber each other either way. Mirrors
    /// `_tryOrExecuteEditsInline` (`buffer-piece.cc`).
    fn try_or_execute_moves(mut data: Option<&mut Vec<u16>>, moves: &[MoveOp]) -> bool {
        let mut start_index = 0usize;
        let mut last_index = moves.len() - 1;
        while start_index < last_index {
            let start = &moves[start_index];
            if start.orig_start == start.orig_end {
                start_index += 1;
                continue;
            }
            let next = &moves[start_index + 1];
            if start.dest_end <= next.orig_start {
                if let Some(d) = data.as_deref_mut() {
                    d.copy_within(start.orig_start..start.orig_end, start.dest_start);
                }
                start_index += 1;
                continue;
            }
            let last = &moves[last_index];
            if last.orig_start == last.orig_end {
                last_index -= 1;
                continue;
            }
            let prev = &moves[last_index - 1];
            if last.dest_start >= prev.orig_end {
                if let Some(d) = data.as_deref_mut() {
                    d.copy_within(last.orig_start..last.orig_end, last.dest_start);
                }
                last_index -= 1;
                continue;
            }
            return false;
        }
        if start_index == last_index {
            let m = &moves[start_index];
            if m.orig_start != m.orig_end {
                if let Some(d) = data.as_deref_mut() {
                    d.copy_within(m.orig_start..m.orig_end, m.dest_start);
                }
            }
        }
        true
    }

    fn patch_line_starts_incremental(&mut self, edits: &[LeafEdit], result_starts: &[usize]) {
        let old_starts = std::mem::take(&mut self.line_starts);
        let mut new_starts: Vec<u32> = Vec::with_capacity(old_starts.len());
        let mut idx = 0usize;
        let mut delta: i64 = 0;
        for (i, edit) in edits.iter().enumerate() {
            while idx < old_starts.len() && (old_starts[idx] as usize) <= edit.start {
                new_starts.push((old_starts[idx] as i64 + delta) as u32);
                idx += 1;
            }
            let edit_end = edit.start + edit.length;
            while idx < old_starts.len() && (old_starts[idx] as usize) <= edit_end {
                idx += 1;
            }
            let result_start = result_starts[i];
            let data = &edit.data;
            let mut j = 0usize;
            while j < data.len() {
                match data[j] {
                    CR => {
                        if j + 1 < data.len() && data[j + 1] == LF {
                            new_starts.push((result_start + j + 2) as u32);
                            j += 2;
                        } else {
                            new_starts.push((result_start + j + 1) as u32);
                            j += 1;
                        }
                    }
                    LF => {
                        new_starts.push((result_start + j + 1) as u32);
                        j += 1;
                    }
                    _ => j += 1,
                }
            }
            delta += edit.data.len() as i64 - edit.length as i64;
        }
        while idx < old_starts.len() {
            new_starts.push((old_starts[idx] as i64 + delta) as u32);
            idx += 1;
        }
        self.has_lonely_cr = Self::lonely_cr_flag(&self.chars, &new_starts);
        self.line_starts = new_starts;
    }

    /// Leaf-local fast-path delete, bypassing the general edit-list planner.
    /// Ported from `BufferPiece::deleteOneOffsetLen` (`buffer-piece.cc`),
    /// which tracks whether the char just before the deleted range is a
    /// lonely `\r` so that deleting the gap between it and a following `\n`
    /// correctly merges them into one terminator instead of leaving two.
    pub fn delete_one_offset_len(&mut self, offset: usize, len: usize) -> BufferResult<()> {
        if offset + len > self.chars.len() {
            return Err(BufferError::InvalidEditRange);
        }
        if len == 0 {
            return Ok(());
        }
        if offset == 0 && len == self.chars.len() {
            self.chars.clear();
            self.line_starts.clear();
            self.has_lonely_cr = false;
            return Ok(());
        }

        let line_starts_len = self.line_starts.len();
        let mut delete_from = line_starts_len;
        let mut delete_to = 0usize;
        let mut deleting_case1: Option<usize> = None;

        for i in 0..line_starts_len {
            let line_start = self.line_starts[i] as usize;
            if line_start < offset {
                continue;
            }
            if line_start > offset + len + 1 {
                self.line_starts[i] -= len as u32;
                continue;
            }
            if offset == line_start - 1
                && line_start > 1
                && self.chars[line_start - 2] == CR
                && self.chars[line_start - 1] == LF
            {
                self.line_starts[i] -= 1;
                deleting_case1 = Some(i);
                continue;
            }
            if offset == line_start {
                if self.chars[line_start - 1] == CR {
                    deleting_case1 = Some(i);
                }
                continue;
            }
            if offset + len == line_start - 1 {
                let merges_into_case1 = deleting_case1.is_some() && self.chars[line_start - 1] == LF;
                if merges_into_case1 {
                    let idx = deleting_case1.unwrap();
                    self.line_starts[idx] += 1;
                    // falls through: this entry is now redundant, merged above
                } else {
                    self.line_starts[i] -= len as u32;
                    continue;
                }
            }
            delete_from = delete_from.min(i);
            delete_to = delete_to.max(i + 1);
        }

        if delete_from < delete_to {
            self.line_starts.drain(delete_from..delete_to);
        }
        self.chars.drain(offset..offset + len);
        self.has_lonely_cr = Self::lonely_cr_flag(&self.chars, &self.line_starts);
        Ok(())
    }

    /// Leaf-local fast-path insert. The original (`buffer-piece.cc`) only
    /// handles insertions that land strictly between two existing line
    /// starts (`// TODO assert(false)` for the adjacent case); this delegates
    /// the adjacent case to [`Self::apply_edits`], which already rescans
    /// correctly across a terminator seam.
    ///
    /// Landing strictly between two line starts also means `chars[offset - 1]`
    /// and `chars[offset]` are guaranteed not to be terminator characters
    /// themselves (any CR or LF always has a `line_starts` entry at its own
    /// position or the position right after it, which the adjacency check
    /// above already routes through `apply_edits`). So no CRLF pair can form
    /// at either seam here — the only new line starts this branch can
    /// introduce come from terminators inside `data` itself, which must still
    /// be scanned for.
    pub fn insert_one_offset_len(&mut self, offset: usize, data: &[u16]) -> BufferResult<()> {
        if offset > self.chars.len() {
            return Err(BufferError::InvalidEditRange);
        }
        if data.is_empty() {
            return Ok(());
        }
        let adjacent = self
            .line_starts
            .iter()
            .any(|&ls| (ls as usize) == offset || (ls as usize) == offset + 1);
        if adjacent {
            return self.apply_edits(&[LeafEdit {
                start: offset,
                length: 0,
                data: data.to_vec(),
            }]);
        }
        for ls in self.line_starts.iter_mut() {
            if (*ls as usize) > offset {
                *ls += data.len() as u32;
            }
        }
        let insert_at = self.line_starts.partition_point(|&ls| (ls as usize) <= offset);
        let mut new_starts = Vec::new();
        let mut j = 0usize;
        while j < data.len() {
            match data[j] {
                CR => {
                    if j + 1 < data.len() && data[j + 1] == LF {
                        new_starts.push((offset + j + 2) as u32);
                        j += 2;
                    } else {
                        new_starts.push((offset + j + 1) as u32);
                        j += 1;
                    }
                }
                LF => {
                    new_starts.push((offset + j + 1) as u32);
                    j += 1;
                }
                _ => j += 1,
            }
        }
        self.line_starts.splice(insert_at..insert_at, new_starts);
        self.chars.splice(offset..offset, data.iter().copied());
        self.has_lonely_cr = Self::lonely_cr_flag(&self.chars, &self.line_starts);
        Ok(())
    }

    /// Drops the last code unit, keeping the line-start index in sync.
    /// Used by the tree's leaf-stitching pass to move a `\r` across a leaf
    /// boundary. Ported from `BufferPiece::deleteLastChar`.
    pub fn delete_last_char(&mut self) -> u16 {
        let ret = *self.chars.last().unwrap();
        if let Some(&last_ls) = self.line_starts.last() {
            if last_ls as usize == self.chars.len() {
                self.line_starts.pop();
            }
        }
        self.chars.pop();
        self.has_lonely_cr = Self::lonely_cr_flag(&self.chars, &self.line_starts);
        ret
    }

    /// Prepends a code unit, keeping the line-start index in sync. Used
    /// alongside [`Self::delete_last_char`] to re-pair a `\r`/`\n` split
    /// across a leaf boundary. Ported from `BufferPiece::insertFirstChar`.
    pub fn insert_first_char(&mut self, ch: u16) {
        let already_crlf_with_old_head =
            !self.line_starts.is_empty() && self.line_starts[0] == 1 && self.chars.first() == Some(&LF);
        let insert_line_start = ch == CR && !already_crlf_with_old_head;
        for ls in self.line_starts.iter_mut() {
            *ls += 1;
        }
        if insert_line_start {
            self.line_starts.insert(0, 1);
        }
        self.chars.insert(0, ch);
        self.has_lonely_cr = Self::lonely_cr_flag(&self.chars, &self.line_starts);
    }

    /// Appends `other`'s content onto `self`, shifting its line starts.
    /// Ported from `BufferPiece::join`.
    pub fn merge(&mut self, other: Leaf) {
        if other.chars.is_empty() {
            return;
        }
        let offset = self.chars.len() as u32;
        self.line_starts.extend(other.line_starts.iter().map(|ls| ls + offset));
        self.chars.extend(other.chars);
        self.has_lonely_cr = Self::lonely_cr_flag(&self.chars, &self.line_starts);
    }

    /// Splits this leaf at `at`, returning two leaves whose concatenation
    /// reproduces the original content. `line_starts` is already sorted, so
    /// the split is a partition rather than a full rescan.
    pub fn split_at(&self, at: usize) -> (Leaf, Leaf) {
        let idx = self.line_starts.partition_point(|&ls| (ls as usize) <= at);
        let left = Leaf::from_parts(self.chars[..at].to_vec(), self.line_starts[..idx].to_vec());
        let right = Leaf::from_parts(
            self.chars[at..].to_vec(),
            self.line_starts[idx..].iter().map(|&ls| ls - at as u32).collect(),
        );
        (left, right)
    }

    /// Applies `edits` to a clone of `target`, then splits the result into
    /// one or more leaves no larger than `max_leaf_length`, aiming for
    /// `ideal_leaf_length`. Returns an empty vec if the edits empty the leaf
    /// out entirely. Distinct from the in-place instance method above: this
    /// is the static splitter `Tree::replace_offset_len` dispatches to,
    /// grounded on the free-function `BufferPiece::replaceOffsetLen`
    /// overload in `buffer-piece.h` that returns a vector of pieces rather
    /// than mutating one in place.
    pub fn replace_offset_len(
        target: &Leaf,
        edits: &[LeafEdit],
        ideal_leaf_length: usize,
        max_leaf_length: usize,
    ) -> BufferResult<Vec<Leaf>> {
        let mut working = target.clone();
        working.apply_edits(edits)?;
        if working.length() == 0 {
            return Ok(Vec::new());
        }
        if working.length() <= max_leaf_length {
            return Ok(vec![working]);
        }

        let mut result = Vec::new();
        let mut remaining = working;
        while remaining.length() > max_leaf_length {
            let mut split_at = ideal_leaf_length.min(remaining.length() - 1).max(1);
            if remaining.char_at(split_at - 1) == CR && remaining.char_at(split_at) == LF {
                split_at = if split_at > 1 { split_at - 1 } else { split_at + 1 };
            }
            let (left, right) = remaining.split_at(split_at);
            result.push(left);
            remaining = right;
        }
        result.push(remaining);
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MoveOp {
    orig_start: usize,
    orig_end: usize,
    dest_start: usize,
    dest_end: usize,
}
