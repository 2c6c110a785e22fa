//! A tagged-variant replacement for `edcore`'s `BufferString` class
//! hierarchy (`buffer-string.h`/`.cc`). C++ used virtual dispatch over
//! `SingleOneByteString` / `SingleTwoByteString` / `EmptyString` /
//! `ConcatString` / `SubString`; Rust has no shared-ownership story for that
//! (each subclass held raw `const BufferString *` children with no lifetime
//! tracking), so this is a plain enum over owned data instead.

use std::rc::Rc;

/// Immutable, possibly-structured run of UTF-16 code units, as handed to
/// `Tree::replace_offset_len` for the inserted side of an edit.
#[derive(Debug, Clone)]
pub enum BufferString {
    Empty,
    SingleChar(u16),
    /// Two code units, most commonly the result of `carriage_return()` and
    /// `line_feed()` getting concatenated back together.
    Concat(Rc<BufferString>, Rc<BufferString>),
    Substring {
        target: Rc<BufferString>,
        start: usize,
        length: usize,
    },
    OneByte(Rc<[u8]>),
    TwoByte(Rc<[u16]>),
}

impl BufferString {
    pub fn empty() -> Self {
        BufferString::Empty
    }

    pub fn carriage_return() -> Self {
        BufferString::SingleChar(0x000D)
    }

    pub fn line_feed() -> Self {
        BufferString::SingleChar(0x000A)
    }

    pub fn from_units(units: &[u16]) -> Self {
        match units {
            [] => BufferString::Empty,
            [single] => BufferString::SingleChar(*single),
            _ => BufferString::TwoByte(Rc::from(units)),
        }
    }

    pub fn from_one_byte(bytes: &[u8]) -> Self {
        match bytes {
            [] => BufferString::Empty,
            [single] => BufferString::SingleChar(*single as u16),
            _ => BufferString::OneByte(Rc::from(bytes)),
        }
    }

    pub fn concat(a: BufferString, b: BufferString) -> Self {
        match (&a, &b) {
            (BufferString::Empty, _) => b,
            (_, BufferString::Empty) => a,
            _ => BufferString::Concat(Rc::new(a), Rc::new(b)),
        }
    }

    pub fn substr(target: BufferString, start: usize, length: usize) -> Self {
        if length == 0 {
            return BufferString::Empty;
        }
        if start == 0 && length == target.length() {
            return target;
        }
        BufferString::Substring {
            target: Rc::new(target),
            start,
            length,
        }
    }

    pub fn length(&self) -> usize {
        match self {
            BufferString::Empty => 0,
            BufferString::SingleChar(_) => 1,
            BufferString::Concat(a, b) => a.length() + b.length(),
            BufferString::Substring { length, .. } => *length,
            BufferString::OneByte(bytes) => bytes.len(),
            BufferString::TwoByte(units) => units.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Writes this string's code units into `buffer[start..start + length]`.
    pub fn write(&self, buffer: &mut [u16], start: usize, length: usize) {
        if length == 0 {
            return;
        }
        match self {
            BufferString::Empty => {}
            BufferString::SingleChar(c) => buffer[start] = *c,
            BufferString::Concat(a, b) => {
                let a_len = a.length();
                if start < a_len {
                    let take = length.min(a_len - start);
                    a.write(buffer, start, take);
                    if take < length {
                        b.write(&mut buffer[take..], 0, length - take);
                    }
                } else {
                    b.write(buffer, start - a_len, length);
                }
            }
            BufferString::Substring {
                target,
                start: sub_start,
                ..
            } => target.write(buffer, sub_start + start, length),
            BufferString::OneByte(bytes) => {
                for (i, b) in bytes[start..start + length].iter().enumerate() {
                    buffer[i] = *b as u16;
                }
            }
            BufferString::TwoByte(units) => {
                buffer[..length].copy_from_slice(&units[start..start + length]);
            }
        }
    }

    /// Writes this string as one-byte (Latin-1) characters. Callers should
    /// check [`Self::contains_only_one_byte`] first; out-of-range code units
    /// are truncated to their low byte, same as the original's `writeOneByte`.
    pub fn write_one_byte(&self, buffer: &mut [u8], start: usize, length: usize) {
        if length == 0 {
            return;
        }
        match self {
            BufferString::Empty => {}
            BufferString::SingleChar(c) => buffer[start] = *c as u8,
            BufferString::Concat(a, b) => {
                let a_len = a.length();
                if start < a_len {
                    let take = length.min(a_len - start);
                    a.write_one_byte(buffer, start, take);
                    if take < length {
                        b.write_one_byte(&mut buffer[take..], 0, length - take);
                    }
                } else {
                    b.write_one_byte(buffer, start - a_len, length);
                }
            }
            BufferString::Substring {
                target,
                start: sub_start,
                ..
            } => target.write_one_byte(buffer, sub_start + start, length),
            BufferString::OneByte(bytes) => {
                buffer[..length].copy_from_slice(&bytes[start..start + length]);
            }
            BufferString::TwoByte(units) => {
                for (i, u) in units[start..start + length].iter().enumerate() {
                    buffer[i] = *u as u8;
                }
            }
        }
    }

    /// Cheap hint: may conservatively answer `false` even for strings that
    /// turn out to hold only one-byte data (the original keeps this for
    /// `Substring`/`Concat`, which just defer to their children rather than
    /// rescanning).
    pub fn is_one_byte(&self) -> bool {
        match self {
            BufferString::Empty | BufferString::OneByte(_) => true,
            BufferString::SingleChar(c) => *c <= 0xFF,
            BufferString::Concat(a, b) => a.is_one_byte() && b.is_one_byte(),
            BufferString::Substring { target, .. } => target.is_one_byte(),
            BufferString::TwoByte(_) => false,
        }
    }

    /// May scan. Returns whether every code unit in this string actually
    /// fits in one byte.
    pub fn contains_only_one_byte(&self) -> bool {
        match self {
            BufferString::Empty | BufferString::OneByte(_) => true,
            BufferString::SingleChar(c) => *c <= 0xFF,
            BufferString::Concat(a, b) => a.contains_only_one_byte() && b.contains_only_one_byte(),
            // Matches the original's TODO: a substring could become one-byte
            // even if its target isn't, but it's cheaper to defer.
            BufferString::Substring { target, .. } => target.contains_only_one_byte(),
            BufferString::TwoByte(units) => units.iter().all(|u| *u <= 0xFF),
        }
    }

    /// Materializes this string as a flat `Vec<u16>`, the form the edit
    /// engine actually splices into leaves.
    pub fn to_units(&self) -> Vec<u16> {
        let mut out = vec![0u16; self.length()];
        self.write(&mut out, 0, out.len());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_zero_length() {
        assert_eq!(BufferString::empty().length(), 0);
        assert!(BufferString::empty().is_one_byte());
    }

    #[test]
    fn single_char_round_trips() {
        let s = BufferString::SingleChar(b'x' as u16);
        assert_eq!(s.to_units(), vec![b'x' as u16]);
        assert!(s.is_one_byte());
    }

    #[test]
    fn concat_writes_across_the_seam() {
        let a = BufferString::from_units(&[1, 2, 3]);
        let b = BufferString::from_units(&[4, 5]);
        let joined = BufferString::concat(a, b);
        assert_eq!(joined.length(), 5);
        assert_eq!(joined.to_units(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn substr_reads_the_middle() {
        let s = BufferString::from_units(&[10, 11, 12, 13, 14]);
        let mid = BufferString::substr(s, 1, 3);
        assert_eq!(mid.to_units(), vec![11, 12, 13]);
    }

    #[test]
    fn concat_is_one_byte_only_if_both_sides_are() {
        let a = BufferString::from_units(&[b'a' as u16]);
        let b = BufferString::TwoByte(Rc::from([0x1F600u16].as_slice()));
        let joined = BufferString::concat(a, b);
        assert!(!joined.is_one_byte());
        assert!(!joined.contains_only_one_byte());
    }

    #[test]
    fn carriage_return_and_line_feed_are_distinct_singletons() {
        assert_eq!(BufferString::carriage_return().to_units(), vec![0x000D]);
        assert_eq!(BufferString::line_feed().to_units(), vec![0x000A]);
    }
}
