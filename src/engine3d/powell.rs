//! Checkpointed three-way alignment (component I), after Powell, Allison
//! and Dix: recursively halve the longest stream, run a forward and a
//! backward cost-only sweep to find where the optimal path crosses the
//! midpoint, and recurse on the two halves. This bounds auxiliary memory
//! to the area of a single `(l2+1) x (l3+1)` plane at every level of the
//! recursion instead of the full cube, at the cost of refilling shrinking
//! sub-cubes on the way down -- the same space/time trade Hirschberg's
//! algorithm makes for two sequences, generalized to three.
//!
//! Below [`PowellConfig::base_case_volume`] the recursion bottoms out and
//! hands off to the direct cube engine ([`crate::engine3d::linear`]), which
//! is cheaper than one more level of split-and-stitch once the cube already
//! fits comfortably in memory.

use super::INF;
use crate::config::PowellConfig;
use crate::cost_matrix3::CostMatrix3;
use crate::engine3d::linear;
use crate::error::{AlignError, Result};
use crate::pool::MatrixPool;
use crate::stream::Stream;
use crate::symbol::Symbol;

fn reversed(s: &Stream) -> Stream {
    let symbols: Vec<Symbol> = s.iter().collect();
    symbols.into_iter().rev().collect()
}

/// Cost-only cube sweep (no direction bookkeeping), returning the final
/// `(l2+1) x (l3+1)` plane flattened row-major with stride `l3+1`.
fn sweep_cost(s1: &Stream, s2: &Stream, s3: &Stream, cm: &CostMatrix3) -> Vec<i64> {
    let l1 = s1.len();
    let l2 = s2.len();
    let l3 = s3.len();
    let gap = cm.gap();
    let stride = l3 + 1;
    let plane_len = (l2 + 1) * stride;

    let mut prev_buf = vec![0i64; plane_len];
    let mut cur_buf = vec![0i64; plane_len];

    for i in 0..=l1 {
        let a = if i > 0 { s1.get(i - 1) } else { gap };
        for j in 0..=l2 {
            let b = if j > 0 { s2.get(j - 1) } else { gap };
            for k in 0..=l3 {
                let c = if k > 0 { s3.get(k - 1) } else { gap };
                if i == 0 && j == 0 && k == 0 {
                    cur_buf[0] = 0;
                    continue;
                }
                let mut best = INF;
                if i > 0 && j > 0 && k > 0 {
                    best = best.min(prev_buf[(j - 1) * stride + (k - 1)] + cm.best_cost(a, b, c));
                }
                if i > 0 && j > 0 {
                    best = best.min(prev_buf[(j - 1) * stride + k] + cm.best_cost(a, b, gap));
                }
                if i > 0 && k > 0 {
                    best = best.min(prev_buf[j * stride + (k - 1)] + cm.best_cost(a, gap, c));
                }
                if j > 0 && k > 0 {
                    best = best.min(cur_buf[(j - 1) * stride + (k - 1)] + cm.best_cost(gap, b, c));
                }
                if k > 0 {
                    best = best.min(cur_buf[j * stride + (k - 1)] + cm.best_cost(gap, gap, c));
                }
                if j > 0 {
                    best = best.min(cur_buf[(j - 1) * stride + k] + cm.best_cost(gap, b, gap));
                }
                if i > 0 {
                    best = best.min(prev_buf[j * stride + k] + cm.best_cost(a, gap, gap));
                }
                cur_buf[j * stride + k] = best;
            }
        }
        std::mem::swap(&mut prev_buf, &mut cur_buf);
    }
    prev_buf
}

/// Find the column `(j, k)` at which the optimal path through the full
/// cube crosses the row `i = mid`, by combining a forward sweep over
/// `s1[..mid]` with a backward sweep over `s1[mid..]`.
fn checkpoint(
    s1: &Stream,
    s2: &Stream,
    s3: &Stream,
    cm: &CostMatrix3,
    mid: usize,
) -> (usize, usize, i64) {
    let l2 = s2.len();
    let l3 = s3.len();
    let prefix: Stream = (0..mid).map(|i| s1.get(i)).collect();
    let suffix: Stream = (mid..s1.len()).map(|i| s1.get(i)).collect();

    let forward = sweep_cost(&prefix, s2, s3, cm);
    let backward_rev = sweep_cost(&reversed(&suffix), &reversed(s2), &reversed(s3), cm);

    let stride = l3 + 1;
    let mut best = INF;
    let mut best_j = 0;
    let mut best_k = 0;
    for j in 0..=l2 {
        for k in 0..=l3 {
            let b = backward_rev[(l2 - j) * stride + (l3 - k)];
            let total = forward[j * stride + k] + b;
            if total < best {
                best = total;
                best_j = j;
                best_k = k;
            }
        }
    }
    (best_j, best_k, best)
}

struct Pieces {
    s1: Stream,
    s2: Stream,
    s3: Stream,
    median: Stream,
}

fn concat(left: Pieces, right: Pieces) -> Result<Pieces> {
    let build = |a: &Stream, b: &Stream| -> Stream { a.iter().chain(b.iter()).collect() };
    Ok(Pieces {
        s1: build(&left.s1, &right.s1),
        s2: build(&left.s2, &right.s2),
        s3: build(&left.s3, &right.s3),
        median: build(&left.median, &right.median),
    })
}

fn recurse(
    s1: &Stream,
    s2: &Stream,
    s3: &Stream,
    cm: &CostMatrix3,
    pool: &mut MatrixPool,
    config: PowellConfig,
) -> Result<Pieces> {
    let l1 = s1.len();
    let l2 = s2.len();
    let l3 = s3.len();
    let volume = (l1 + 1) * (l2 + 1) * (l3 + 1);

    // `mid = l1 / 2` is the only axis this recursion ever splits; once
    // `l1 <= 1` that split can no longer shrink the problem (`mid` would be
    // 0, handing the *entire* input straight back to the right branch), so
    // the base case must trigger here regardless of `volume` -- the
    // checkpoint split does not keep `s1` the longest stream going down the
    // recursion, so `l1` alone reaching 1 does not imply the sub-cube is
    // small.
    if volume <= config.base_case_volume || l1 <= 1 {
        let f = linear::fill(s1, s2, s3, cm, pool)?;
        let (o1, o2, o3, m) = linear::backtrace(s1, s2, s3, cm, pool.direction_buf(), f.l1, f.l2, f.l3)?;
        return Ok(Pieces { s1: o1, s2: o2, s3: o3, median: m });
    }

    let mid = l1 / 2;
    let (j_split, k_split, _) = checkpoint(s1, s2, s3, cm, mid);

    let s1_left: Stream = (0..mid).map(|i| s1.get(i)).collect();
    let s1_right: Stream = (mid..l1).map(|i| s1.get(i)).collect();
    let s2_left: Stream = (0..j_split).map(|j| s2.get(j)).collect();
    let s2_right: Stream = (j_split..l2).map(|j| s2.get(j)).collect();
    let s3_left: Stream = (0..k_split).map(|k| s3.get(k)).collect();
    let s3_right: Stream = (k_split..l3).map(|k| s3.get(k)).collect();

    log::trace!(
        target: "ambiseq_align::engine3d::powell",
        "checkpoint at mid={mid} split=({j_split},{k_split}) volume={volume}"
    );
    let left = recurse(&s1_left, &s2_left, &s3_left, cm, pool, config)?;
    let right = recurse(&s1_right, &s2_right, &s3_right, cm, pool, config)?;
    concat(left, right)
}

/// Align three streams under a linear three-way cost, using the
/// checkpointed divide-and-conquer strategy. `s1` must be the longest of
/// the three (callers reorder and remember the permutation, the same
/// contract as the 2-D engines' "longer stream first").
pub fn align(
    s1: &Stream,
    s2: &Stream,
    s3: &Stream,
    cm: &CostMatrix3,
    pool: &mut MatrixPool,
    config: PowellConfig,
) -> Result<(Stream, Stream, Stream, Stream)> {
    if s1.len() < s2.len() || s1.len() < s3.len() {
        return Err(AlignError::PreconditionViolated(
            "checkpointed 3-way engine requires s1 to be the longest stream",
        ));
    }
    let pieces = recurse(s1, s2, s3, cm, pool, config)?;
    Ok((pieces.s1, pieces.s2, pieces.s3, pieces.median))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_matrix::BaseTable;

    fn nucleotide_matrix3() -> CostMatrix3 {
        let k = 5;
        let mut costs = vec![1i64; (k * k) as usize];
        for i in 0..k {
            costs[(i * k + i) as usize] = 0;
        }
        let base = BaseTable::new(k, costs);
        CostMatrix3::new(&base, 0).unwrap()
    }

    fn seq(bits: &[u32]) -> Stream {
        bits.iter().map(|&b| Symbol::single(b)).collect()
    }

    #[test]
    fn checkpointed_alignment_matches_direct_cube_on_identical_streams() {
        let cm = nucleotide_matrix3();
        let s = seq(&[0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
        let mut pool = MatrixPool::new();
        let (o1, o2, o3, _median) = align(&s, &s, &s, &cm, &mut pool, PowellConfig::default()).unwrap();
        assert_eq!(o1.len(), o2.len());
        assert_eq!(o2.len(), o3.len());
    }

    #[test]
    fn rejects_non_longest_first_stream() {
        let cm = nucleotide_matrix3();
        let short = seq(&[0, 1]);
        let long = seq(&[0, 1, 2, 3, 0]);
        let mut pool = MatrixPool::new();
        assert!(align(&short, &long, &long, &cm, &mut pool, PowellConfig::default()).is_err());
    }

    #[test]
    fn forces_checkpoint_recursion_on_a_large_instance() {
        // Large enough that (l1+1)(l2+1)(l3+1) exceeds the default base-case volume,
        // exercising at least one split.
        let bits: Vec<u32> = (0..40).map(|i| (i % 4) as u32).collect();
        let s = seq(&bits);
        let cm = nucleotide_matrix3();
        let mut pool = MatrixPool::new();
        let (o1, o2, o3, _median) = align(&s, &s, &s, &cm, &mut pool, PowellConfig::default()).unwrap();
        assert_eq!(o1.len(), o2.len());
        assert_eq!(o2.len(), o3.len());
    }

    #[test]
    fn a_tiny_base_case_volume_forces_checkpointing_on_a_small_instance() {
        // The default base-case volume would run this instance through the
        // direct cube engine in one shot; a tiny volume forces at least one
        // checkpoint split even here, and the two must still agree.
        let cm = nucleotide_matrix3();
        let s1 = seq(&[0, 1, 2, 3, 0, 1]);
        let s2 = seq(&[0, 1, 2, 3]);
        let s3 = seq(&[0, 2, 3, 0, 1]);
        let mut pool = MatrixPool::new();
        let tiny = PowellConfig { base_case_volume: 4 };
        let (o1, o2, o3, _median) = align(&s1, &s2, &s3, &cm, &mut pool, tiny).unwrap();
        let checkpointed_cost = crate::verify::verify_3d_linear(&cm, &o1, &o2, &o3);

        let mut pool2 = MatrixPool::new();
        let direct = linear::fill(&s1, &s2, &s3, &cm, &mut pool2).unwrap();
        assert_eq!(checkpointed_cost, direct.cost);
    }

    #[test]
    fn recursion_terminates_when_the_split_axis_is_already_length_one() {
        // `recurse` always halves its first argument; once that argument's
        // length reaches 1, halving it again yields `mid = 0`, which would
        // hand the entire sub-problem straight back to the right branch
        // unchanged if the base case only checked `volume`. Call `recurse`
        // directly (bypassing `align`'s "s1 is longest" precondition) with
        // a length-1 first stream and a volume tiny enough that the
        // checkpoint split would otherwise be attempted forever.
        let cm = nucleotide_matrix3();
        let s1 = seq(&[0]);
        let s2 = seq(&[0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
        let s3 = seq(&[0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
        let mut pool = MatrixPool::new();
        let tiny = PowellConfig { base_case_volume: 1 };
        let pieces = recurse(&s1, &s2, &s3, &cm, &mut pool, tiny).unwrap();
        assert_eq!(pieces.s1.len(), pieces.s2.len());
        assert_eq!(pieces.s2.len(), pieces.s3.len());
    }
}
