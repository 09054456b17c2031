//! Union, ancestor, and verify (component J).
//!
//! Three small utilities over already-aligned streams, kept together
//! because all three walk a finished alignment column by column rather
//! than filling a matrix: `union` for a column-wise merge of two aligned
//! streams, `ancestor_2` for the affine-aware median with block
//! correction, and `verify` for cross-checking an engine's reported cost
//! by recomputing it from the alignment it produced.

use crate::cost_matrix::CostMatrix;
use crate::cost_matrix3::CostMatrix3;
use crate::stream::Stream;
use crate::symbol::Symbol;
use itertools::Itertools;

/// Column-wise union of two equal-length aligned streams.
pub fn union(a: &Stream, b: &Stream) -> Stream {
    assert_eq!(a.len(), b.len());
    a.iter().zip_eq(b.iter()).map(|(x, y)| x.union(y)).collect()
}

/// Ungapped median with affine block correction: like the gapped median's
/// gap-stripped form, but when a run of gap-median columns starts inside
/// what should read as a single gap block in *both* parents (i.e. neither
/// parent actually opens a new gap at that column, because they were
/// already mid-run before it), the spuriously emitted gap is withdrawn
/// rather than counted as a second block.
pub fn ancestor_2(cm: &CostMatrix, parent_a: &Stream, parent_b: &Stream) -> Stream {
    assert_eq!(parent_a.len(), parent_b.len());
    let gap = cm.gap();
    let mut out = Vec::with_capacity(parent_a.len());
    let mut a_in_run = false;
    let mut b_in_run = false;
    for (a, b) in parent_a.iter().zip_eq(parent_b.iter()) {
        let a_gap = a == gap;
        let b_gap = b == gap;
        let median = cm.median(a, b);

        // A column whose median is itself a gap only represents a real,
        // newly opened block if at least one parent is freshly entering
        // its gap run here; if both parents were already inside a run,
        // the block was already accounted for at its opening column and
        // this column is withdrawn.
        let spurious = median == gap && a_gap && b_gap && a_in_run && b_in_run;
        if !spurious {
            out.push(median);
        }

        a_in_run = if a_gap { true } else { false };
        b_in_run = if b_gap { true } else { false };
    }
    out.into_iter().filter(|&s| s != gap).collect()
}

/// Recompute the cost of an already-produced linear-gap alignment from
/// scratch, for cross-checking an engine's reported cost. `out1` and
/// `out2` must be equal length, gapped
/// alignment columns (as produced by a 2-D engine's backtrace, leading-gap
/// prefix included -- that column costs zero against itself and does not
/// skew the total).
pub fn verify_linear(cm: &CostMatrix, out1: &Stream, out2: &Stream) -> i64 {
    out1.iter().zip_eq(out2.iter()).map(|(a, b)| cm.best_cost(a, b)).sum()
}

/// Recompute the cost of an already-produced affine-gap alignment,
/// tracking which of the two streams is currently inside a gap run so
/// gap-open cost is charged once per run rather than once per column.
pub fn verify_affine(cm: &CostMatrix, out1: &Stream, out2: &Stream) -> i64 {
    assert_eq!(out1.len(), out2.len());
    let gap = cm.gap();
    let g = cm.gap_open();
    let mut total = 0i64;
    let mut a_in_run = false;
    let mut b_in_run = false;
    for (a, b) in out1.iter().zip_eq(out2.iter()) {
        let a_gap = a == gap;
        let b_gap = b == gap;

        if a_gap && !b_gap {
            total += cm.prepend_cost(b);
            if !a_in_run {
                total += g;
            }
            a_in_run = true;
            b_in_run = false;
        } else if b_gap && !a_gap {
            total += cm.tail_cost(a);
            if !b_in_run {
                total += g;
            }
            a_in_run = false;
            b_in_run = true;
        } else if !a_gap && !b_gap {
            total += cm.best_cost(a, b);
            a_in_run = false;
            b_in_run = false;
        }
        // a_gap && b_gap (both gap, e.g. the leading gap/gap prefix column):
        // costs nothing and leaves the run flags untouched -- it must not be
        // mistaken for either stream entering or continuing a real gap run,
        // or the next exclusive-gap column would wrongly skip its open charge.
    }
    total
}

/// Recompute the cost of an already-produced three-way linear-gap
/// alignment from scratch, the three-way counterpart of [`verify_linear`]
/// (the checkpointed three-way engine is linear-gap only).
pub fn verify_3d_linear(cm: &CostMatrix3, out1: &Stream, out2: &Stream, out3: &Stream) -> i64 {
    out1.iter()
        .zip_eq(out2.iter())
        .zip_eq(out3.iter())
        .map(|((a, b), c)| cm.best_cost(a, b, c))
        .sum()
}
