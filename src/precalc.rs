//! Precalculation (component D).
//!
//! For a target stream `t` of length `N` and an expanded cost matrix over a
//! `2^K`-state alphabet, produce `P[a][j] = best_cost(a, t[j])` for every
//! ambiguous symbol `a` and every `j`, stored row-major with stride `N` so
//! the hot inner loop of the 2-D/3-D engines reads a contiguous line. The
//! engines never touch the full cost matrix directly; they read only
//! `P[current_symbol_of_opposing_stream][..]` and `P[gap][..]`.

use crate::cost_matrix::CostMatrix;
use crate::stream::Stream;
use crate::symbol::Symbol;

pub struct PrecalcTable<'a> {
    k: u32,
    len: usize,
    table: &'a [i64],
}

impl<'a> PrecalcTable<'a> {
    /// Build the precalc table for `target` against `cm`, writing into
    /// `buf` (obtained from a [`crate::pool::MatrixPool`], already sized by
    /// `MatrixPool::ensure_2d`/`ensure_3d`) and borrowing it back rather
    /// than copying, so a call contributes no heap allocation beyond the
    /// pool's own one-time growth.
    pub fn build(cm: &CostMatrix, target: &Stream, buf: &'a mut [i64]) -> PrecalcTable<'a> {
        let k = cm.k;
        let n = 1usize << k;
        let len = target.len();
        debug_assert!(buf.len() >= n * len);
        for a in 0..n {
            let sym = Symbol(a as u64);
            for j in 0..len {
                buf[a * len + j] = cm.best_cost(sym, target.get(j));
            }
        }
        PrecalcTable { k, len, table: &buf[..n * len] }
    }

    #[inline]
    pub fn row(&self, a: Symbol) -> &[i64] {
        let len = self.len;
        &self.table[a.as_index() * len..a.as_index() * len + len]
    }

    #[inline]
    pub fn cost(&self, a: Symbol, j: usize) -> i64 {
        self.row(a)[j]
    }

    pub fn alphabet_bits(&self) -> u32 {
        self.k
    }
}
