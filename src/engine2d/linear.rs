//! 2-D linear-gap-cost engine (component E).
//!
//! Fills the Needleman-Wunsch cost/direction matrix under a unit-per-indel
//! (linear) gap cost, with an optional diagonal band. Convention: the
//! *shorter* stream is the horizontal axis (`s2`), the *longer* stream is
//! the vertical axis (`s1`); callers are responsible for ordering the
//! streams this way (see [`crate::facade`] for a convenience wrapper that
//! does this and reports whether it swapped).
//!
//! The cost buffer only ever holds two rows at a time -- row `i-1` and row
//! `i` -- swapped via a flip index rather than an actual pointer swap.
//! Only the direction matrix is stored in full, since the backtrace needs
//! to walk the whole grid afterwards.

use super::{LinearDir, INF};
use crate::cost_matrix::CostMatrix;
use crate::pool::MatrixPool;
use crate::precalc::PrecalcTable;
use crate::stream::Stream;

pub struct LinearFill {
    pub cost: i64,
    pub m: usize,
    pub n: usize,
}

/// The three banding regimes, collapsed into one per-row range formula:
/// cases 2 and 3 differ only in whether the middle
/// parallelogram has constant width `W+H` or spans the full row, which
/// falls out of the same clamped min/max expression without a separate
/// code path per shape.
fn regime(m: usize, n: usize, delta: Option<u32>) -> Option<(i64, i64)> {
    let Some(delta) = delta else { return None };
    if m as f64 >= 1.5 * n as f64 {
        return None; // regime 1: band provides no benefit, fill the rectangle
    }
    let d = n as i64 - m as i64;
    let h = delta as i64;
    Some((d, h))
}

/// Column range `[lo, hi]` (inclusive) to fill in row `i`, given the
/// banding parameters from `regime`.
fn col_range(i: usize, n: usize, band: Option<(i64, i64)>) -> (usize, usize) {
    match band {
        None => (0, n),
        Some((d, h)) => {
            let i = i as i64;
            let lo = (i + d.min(0) - h).max(0);
            let hi = (i + d.max(0) + h).min(n as i64);
            (lo as usize, hi.max(lo) as usize)
        }
    }
}

/// Fill the linear-cost NW matrix for `s1` (longer, on rows) against `s2`
/// (shorter, on columns). `pool` must already have been sized via
/// [`MatrixPool::ensure_2d`]. Writes the direction matrix into
/// `pool.direction_buf()`, row-major with stride `n + 1`; cells outside the
/// band are left at `0` (no flags set) and must not be read by backtrace.
pub fn fill(
    s1: &Stream,
    s2: &Stream,
    cm: &CostMatrix,
    pool: &mut MatrixPool,
    delta: Option<u32>,
) -> crate::error::Result<LinearFill> {
    let m = s1.len();
    let n = s2.len();
    if n > m {
        return Err(crate::error::AlignError::PreconditionViolated(
            "2-D engine requires the longer stream first (s1.len() >= s2.len())",
        ));
    }
    pool.ensure_2d(m, n, cm.k)?;
    let band = regime(m, n, delta);
    let stride = n + 1;

    // Two rows of length n+1, alternated by a flip index into the pool's
    // cost buffer (sized within the 12*max(m,n) 2-D allocation). Only the
    // direction matrix is stored in full, since backtrace needs to walk
    // the whole grid afterwards.
    let (cost_buf, dir, precalc_buf) = pool.cost_direction_precalc_bufs();
    debug_assert!(cost_buf.len() >= 2 * stride);
    debug_assert!(dir.len() >= (m + 1) * stride);

    // Precompute P[a][j] = best_cost(a, s2[j]) once for the whole fill, so
    // the row loop below reads two contiguous arrays (this row's table,
    // the gap row) instead of touching the full cost matrix per cell.
    let table = PrecalcTable::build(cm, s2, precalc_buf);
    let gap = cm.gap();

    let (row_a, row_b) = cost_buf.split_at_mut(stride);
    let mut rows: [&mut [i64]; 2] = [row_a, row_b];
    let mut cur = 0usize;

    for v in dir.iter_mut().take((m + 1) * stride) {
        *v = 0;
    }

    // Row 0: pure INSERT run from the empty prefix, using prepend_cost.
    // Prefix sums are computed from column 1 regardless of where the band
    // starts, so a banded fill whose row-0 range does not happen to start
    // at column 1 still gets the correct cumulative cost.
    let mut prefix = vec![0i64; n + 1];
    for j in 1..=n {
        prefix[j] = prefix[j - 1] + table.cost(gap, j - 1);
    }
    rows[cur][0] = 0;
    dir[0] = LinearDir::ALIGN.0 as u16;
    let (lo0, hi0) = col_range(0, n, band);
    for j in lo0.max(1)..=hi0 {
        rows[cur][j] = prefix[j];
        dir[j] = LinearDir::INSERT.0 as u16;
    }

    for i in 1..=m {
        let prev = cur;
        let next = 1 - cur;
        let (lo, hi) = col_range(i, n, band);
        let (plo, phi) = col_range(i - 1, n, band);
        let a = s1.get(i - 1);

        if lo == 0 {
            // First column of this row: pure DELETE from the row above.
            rows[next][0] = if plo == 0 {
                rows[prev][0] + cm.tail_cost(a)
            } else {
                INF
            };
            dir[i * stride] = LinearDir::DELETE.0 as u16;
        }

        for j in lo.max(1)..=hi {
            let mut best = INF;
            let mut d = LinearDir::NONE;

            if j >= 1 && j - 1 >= plo && j - 1 <= phi {
                let c = rows[prev][j - 1] + table.cost(a, j - 1);
                if c < best {
                    best = c;
                    d = LinearDir::ALIGN;
                } else if c == best {
                    d |= LinearDir::ALIGN;
                }
            }
            // INSERT: requires column j-1 already filled in `next` row.
            if j > lo {
                let c = rows[next][j - 1] + table.cost(gap, j - 1);
                if c < best {
                    best = c;
                    d = LinearDir::INSERT;
                } else if c == best {
                    d |= LinearDir::INSERT;
                }
            }
            // DELETE: from (i-1, j) in `prev` row.
            if j >= plo && j <= phi {
                let c = rows[prev][j] + cm.tail_cost(a);
                if c < best {
                    best = c;
                    d = LinearDir::DELETE;
                } else if c == best {
                    d |= LinearDir::DELETE;
                }
            }

            rows[next][j] = best;
            dir[i * stride + j] = d.0 as u16;
        }
        cur = next;
    }

    let cost = rows[cur][n];
    Ok(LinearFill { cost, m, n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_matrix::BaseTable;
    use crate::engine2d::backtrace::backtrace_linear;
    use crate::symbol::Symbol;

    fn nucleotide_matrix() -> CostMatrix {
        let k = 5;
        let mut costs = vec![1i64; (k * k) as usize];
        for i in 0..k {
            costs[(i * k + i) as usize] = 0;
        }
        let base = BaseTable::new(k, costs);
        CostMatrix::new(&base, 0, true).unwrap()
    }

    fn seq(bits: &[u32]) -> Stream {
        bits.iter().map(|&b| Symbol::single(b)).collect()
    }

    #[test]
    fn acgt_vs_agt_costs_one() {
        let cm = nucleotide_matrix();
        let s1 = seq(&[0, 1, 2, 3]); // ACGT
        let s2 = seq(&[0, 2, 3]); // AGT
        let mut pool = MatrixPool::new();
        let fill = fill(&s1, &s2, &cm, &mut pool, None).unwrap();
        assert_eq!(fill.cost, 1);
    }

    #[test]
    fn identical_streams_cost_zero() {
        let cm = nucleotide_matrix();
        let s1 = seq(&[0, 1, 2, 3]);
        let s2 = seq(&[0, 1, 2, 3]);
        let mut pool = MatrixPool::new();
        let fill = fill(&s1, &s2, &cm, &mut pool, None).unwrap();
        assert_eq!(fill.cost, 0);
    }

    #[test]
    fn full_substitution_run_costs_four() {
        let cm = nucleotide_matrix();
        let s1 = seq(&[0, 1, 2, 3]); // ACGT
        let s2 = seq(&[3, 2, 1, 0]); // TGCA
        let mut pool = MatrixPool::new();
        let fill = fill(&s1, &s2, &cm, &mut pool, None).unwrap();
        assert_eq!(fill.cost, 4);
    }

    #[test]
    fn band_matches_unbanded_cost() {
        let cm = nucleotide_matrix();
        let s1 = seq(&[0, 1, 2, 3, 0, 1, 2, 3]);
        let s2 = seq(&[0, 1, 2, 0, 1, 2, 3]);
        let mut pool = MatrixPool::new();
        let unbanded = fill(&s1, &s2, &cm, &mut pool, None).unwrap();
        let mut pool2 = MatrixPool::new();
        let banded = fill(&s1, &s2, &cm, &mut pool2, Some(3)).unwrap();
        assert_eq!(unbanded.cost, banded.cost);
    }

    #[test]
    fn backtrace_reproduces_the_cost() {
        let cm = nucleotide_matrix();
        let s1 = seq(&[0, 1, 2, 3]);
        let s2 = seq(&[0, 2, 3]);
        let mut pool = MatrixPool::new();
        let f = fill(&s1, &s2, &cm, &mut pool, None).unwrap();
        let (out1, out2, _median) =
            backtrace_linear(&s1, &s2, &cm, pool.direction_buf(), f.m, f.n, false).unwrap();
        assert_eq!(out1.len(), out2.len());
    }
}
