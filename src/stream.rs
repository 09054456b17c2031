//! Bit-encoded symbol stream with constant-time prepend (component A).
//!
//! A `Stream` is a contiguous buffer of capacity `C >= length L`. The stream
//! occupies the *last* `L` slots; the front holds unused capacity. This
//! layout makes prepend -- the primary write operation during backtrace,
//! which always emits its output in reverse -- a simple decrement of the
//! begin pointer, with no shifting and no reallocation.

use crate::error::{AlignError, Result};
use crate::symbol::Symbol;

/// A prepend-only symbol buffer.
///
/// Invariants: `0 <= begin <= end <= buf.len()`, and `length == end - begin`.
/// Slots outside `[begin, end)` are undefined but reachable (they still
/// exist in `buf`, just not logically part of the stream).
#[derive(Clone)]
pub struct Stream {
    buf: Vec<Symbol>,
    begin: usize,
    end: usize,
}

impl Stream {
    /// Allocate a stream with the given capacity. `begin == end == capacity`
    /// (empty, all space available at the front for prepend).
    pub fn allocate(capacity: usize) -> Stream {
        Stream {
            buf: vec![Symbol::EMPTY; capacity],
            begin: capacity,
            end: capacity,
        }
    }

    /// Build a stream already containing `symbols`, with `extra` additional
    /// front capacity reserved for subsequent prepends (callers size this to
    /// `other_len + 2` for 2-D alignment, `other1_len + other2_len + 3` for
    /// 3-D, per the core contract).
    pub fn from_symbols(symbols: &[Symbol], extra: usize) -> Stream {
        let mut s = Stream::allocate(symbols.len() + extra);
        s.begin = s.buf.len() - symbols.len();
        s.buf[s.begin..].copy_from_slice(symbols);
        s
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Element at logical index `i` (0-based from the start of the stream).
    #[inline]
    pub fn get(&self, i: usize) -> Symbol {
        self.buf[self.begin + i]
    }

    /// Prepend `symbol` to the front of the stream. Fails if there is no
    /// reserved front capacity left; the engines rely on this never
    /// happening given the capacity contract, so this is the one stream
    /// operation that returns an error rather than asserting.
    pub fn prepend(&mut self, symbol: Symbol) -> Result<()> {
        if self.begin == 0 {
            return Err(AlignError::PreconditionViolated(
                "stream prepend with no reserved front capacity",
            ));
        }
        self.begin -= 1;
        self.buf[self.begin] = symbol;
        Ok(())
    }

    /// Reset to an empty stream, retaining capacity. `begin <- end`.
    pub fn reset(&mut self) {
        self.begin = self.end;
    }

    /// Logical contents as a slice, in order.
    pub fn as_slice(&self) -> &[Symbol] {
        &self.buf[self.begin..self.end]
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.as_slice().iter().copied()
    }
}

impl FromIterator<Symbol> for Stream {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        let symbols: Vec<Symbol> = iter.into_iter().collect();
        Stream::from_symbols(&symbols, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepend_grows_from_the_end() {
        let mut s = Stream::allocate(4);
        assert!(s.is_empty());
        s.prepend(Symbol::single(2)).unwrap();
        s.prepend(Symbol::single(1)).unwrap();
        s.prepend(Symbol::single(0)).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.as_slice(), &[Symbol::single(0), Symbol::single(1), Symbol::single(2)]);
    }

    #[test]
    fn prepend_fails_when_capacity_exhausted() {
        let mut s = Stream::allocate(1);
        s.prepend(Symbol::single(0)).unwrap();
        assert!(s.prepend(Symbol::single(1)).is_err());
    }

    #[test]
    fn reset_clears_length_but_keeps_capacity() {
        let mut s = Stream::allocate(3);
        s.prepend(Symbol::single(0)).unwrap();
        let cap = s.capacity();
        s.reset();
        assert_eq!(s.len(), 0);
        assert_eq!(s.capacity(), cap);
    }
}
