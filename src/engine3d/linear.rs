//! Direct 3-D cube fill (component H).
//!
//! Fills the three-way Needleman-Wunsch cube under a linear (unit-per-gap)
//! cost, sweeping the first stream's index `i` with two double-buffered
//! `(l2+1) x (l3+1)` planes rather than materializing the full cube of
//! costs -- only the direction cube is kept in full, since backtrace walks
//! it afterwards. This gives O(L1*L2*L3) time and O(L2*L3) working memory,
//! the same trade the 2-D engine makes between its two-row cost buffer
//! and its full direction matrix.

use super::{Direction3, INF};
use crate::cost_matrix3::CostMatrix3;
use crate::pool::MatrixPool;
use crate::stream::Stream;

pub struct CubeFill {
    pub cost: i64,
    pub l1: usize,
    pub l2: usize,
    pub l3: usize,
}

/// Fill the cube for `s1, s2, s3` under `cm`. Writes the direction cube
/// into `pool.direction_buf()`, row-major with strides `(l2+1)*(l3+1)` for
/// `i` and `(l3+1)` for `j`.
pub fn fill(
    s1: &Stream,
    s2: &Stream,
    s3: &Stream,
    cm: &CostMatrix3,
    pool: &mut MatrixPool,
) -> crate::error::Result<CubeFill> {
    let l1 = s1.len();
    let l2 = s2.len();
    let l3 = s3.len();
    pool.ensure_3d(l1, l2, l3, cm.k)?;
    let gap = cm.gap();

    let plane_stride = l3 + 1;
    let plane_len = (l2 + 1) * plane_stride;
    let dir_i_stride = (l2 + 1) * plane_stride;

    let (cost_buf, dir) = pool.cost_and_direction_bufs();
    debug_assert!(cost_buf.len() >= 2 * plane_len);
    debug_assert!(dir.len() >= (l1 + 1) * dir_i_stride);
    for v in dir.iter_mut().take((l1 + 1) * dir_i_stride) {
        *v = 0;
    }

    let (plane_a, plane_b) = cost_buf.split_at_mut(plane_len);
    let mut planes: [&mut [i64]; 2] = [plane_a, plane_b];
    let mut cur = 0usize;

    for i in 0..=l1 {
        let prev = 1 - cur;
        let a = if i > 0 { s1.get(i - 1) } else { gap };
        for j in 0..=l2 {
            let b = if j > 0 { s2.get(j - 1) } else { gap };
            for k in 0..=l3 {
                let c = if k > 0 { s3.get(k - 1) } else { gap };
                if i == 0 && j == 0 && k == 0 {
                    planes[cur][0] = 0;
                    dir[0] = 0;
                    continue;
                }

                let mut best = INF;
                let mut flags = Direction3::NONE;
                let mut consider = |cost: i64, flag: Direction3, best: &mut i64, flags: &mut Direction3| {
                    if cost < *best {
                        *best = cost;
                        *flags = flag;
                    } else if cost == *best {
                        *flags |= flag;
                    }
                };

                if i > 0 && j > 0 && k > 0 {
                    let c0 = planes[prev][(j - 1) * plane_stride + (k - 1)] + cm.best_cost(a, b, c);
                    consider(c0, Direction3::ALIGN_ALL, &mut best, &mut flags);
                }
                if i > 0 && j > 0 {
                    let c0 = planes[prev][(j - 1) * plane_stride + k] + cm.best_cost(a, b, gap);
                    consider(c0, Direction3::ALIGN_12, &mut best, &mut flags);
                }
                if i > 0 && k > 0 {
                    let c0 = planes[prev][j * plane_stride + (k - 1)] + cm.best_cost(a, gap, c);
                    consider(c0, Direction3::ALIGN_13, &mut best, &mut flags);
                }
                if j > 0 && k > 0 {
                    let c0 = planes[cur][(j - 1) * plane_stride + (k - 1)] + cm.best_cost(gap, b, c);
                    consider(c0, Direction3::ALIGN_23, &mut best, &mut flags);
                }
                if k > 0 {
                    let c0 = planes[cur][j * plane_stride + (k - 1)] + cm.best_cost(gap, gap, c);
                    consider(c0, Direction3::GAP_12, &mut best, &mut flags);
                }
                if j > 0 {
                    let c0 = planes[cur][(j - 1) * plane_stride + k] + cm.best_cost(gap, b, gap);
                    consider(c0, Direction3::GAP_13, &mut best, &mut flags);
                }
                if i > 0 {
                    let c0 = planes[prev][j * plane_stride + k] + cm.best_cost(a, gap, gap);
                    consider(c0, Direction3::GAP_23, &mut best, &mut flags);
                }

                planes[cur][j * plane_stride + k] = best;
                dir[i * dir_i_stride + j * plane_stride + k] = flags.0 as u16;
            }
        }
        cur = prev;
    }

    let cost = planes[1 - cur][l2 * plane_stride + l3];
    Ok(CubeFill { cost, l1, l2, l3 })
}

/// Backtrace the cube's direction grid from `(l1, l2, l3)` to the origin,
/// emitting three aligned streams plus the gapped median.
pub fn backtrace(
    s1: &Stream,
    s2: &Stream,
    s3: &Stream,
    cm: &CostMatrix3,
    dir: &[u16],
    l1: usize,
    l2: usize,
    l3: usize,
) -> crate::error::Result<(Stream, Stream, Stream, Stream)> {
    let plane_stride = l3 + 1;
    let dir_i_stride = (l2 + 1) * plane_stride;
    let extra = l1 + l2 + l3 + 2;
    let mut out1 = Stream::allocate(extra);
    let mut out2 = Stream::allocate(extra);
    let mut out3 = Stream::allocate(extra);
    let mut median = Stream::allocate(extra);
    let gap = cm.gap();

    let mut i = l1;
    let mut j = l2;
    let mut k = l3;
    while i > 0 || j > 0 || k > 0 {
        let flags = Direction3(dir[i * dir_i_stride + j * plane_stride + k] as u8);
        let pick = preferred(flags, i, j, k);
        match pick {
            Direction3::ALIGN_ALL => {
                let (a, b, c) = (s1.get(i - 1), s2.get(j - 1), s3.get(k - 1));
                out1.prepend(a)?;
                out2.prepend(b)?;
                out3.prepend(c)?;
                median.prepend(cm.median(a, b, c))?;
                i -= 1;
                j -= 1;
                k -= 1;
            }
            Direction3::ALIGN_12 => {
                let (a, b) = (s1.get(i - 1), s2.get(j - 1));
                out1.prepend(a)?;
                out2.prepend(b)?;
                out3.prepend(gap)?;
                median.prepend(cm.median(a, b, gap))?;
                i -= 1;
                j -= 1;
            }
            Direction3::ALIGN_13 => {
                let (a, c) = (s1.get(i - 1), s3.get(k - 1));
                out1.prepend(a)?;
                out2.prepend(gap)?;
                out3.prepend(c)?;
                median.prepend(cm.median(a, gap, c))?;
                i -= 1;
                k -= 1;
            }
            Direction3::ALIGN_23 => {
                let (b, c) = (s2.get(j - 1), s3.get(k - 1));
                out1.prepend(gap)?;
                out2.prepend(b)?;
                out3.prepend(c)?;
                median.prepend(cm.median(gap, b, c))?;
                j -= 1;
                k -= 1;
            }
            Direction3::GAP_12 => {
                let c = s3.get(k - 1);
                out1.prepend(gap)?;
                out2.prepend(gap)?;
                out3.prepend(c)?;
                median.prepend(cm.median(gap, gap, c))?;
                k -= 1;
            }
            Direction3::GAP_13 => {
                let b = s2.get(j - 1);
                out1.prepend(gap)?;
                out2.prepend(b)?;
                out3.prepend(gap)?;
                median.prepend(cm.median(gap, b, gap))?;
                j -= 1;
            }
            Direction3::GAP_23 => {
                let a = s1.get(i - 1);
                out1.prepend(a)?;
                out2.prepend(gap)?;
                out3.prepend(gap)?;
                median.prepend(cm.median(a, gap, gap))?;
                i -= 1;
            }
            _ => unreachable!("direction cell with no flags set during backtrace"),
        }
    }

    out1.prepend(gap)?;
    out2.prepend(gap)?;
    out3.prepend(gap)?;

    Ok((out1, out2, out3, median))
}

/// Canonical tie-break: prefer consuming all three streams, then two, then
/// one, in a fixed order, mirroring the 2-D engine's `preferred` tie-break
/// for consistency between the two backtraces. Falls back to whichever flag
/// is actually set and valid at the boundary (some transitions are
/// unavailable once an index has reached zero).
#[inline]
fn preferred(flags: Direction3, i: usize, j: usize, k: usize) -> Direction3 {
    const ORDER: [Direction3; 7] = [
        Direction3::ALIGN_ALL,
        Direction3::ALIGN_12,
        Direction3::ALIGN_13,
        Direction3::ALIGN_23,
        Direction3::GAP_23,
        Direction3::GAP_13,
        Direction3::GAP_12,
    ];
    for candidate in ORDER {
        if !flags.contains(candidate) {
            continue;
        }
        let ok = match candidate {
            Direction3::ALIGN_ALL => i > 0 && j > 0 && k > 0,
            Direction3::ALIGN_12 => i > 0 && j > 0,
            Direction3::ALIGN_13 => i > 0 && k > 0,
            Direction3::ALIGN_23 => j > 0 && k > 0,
            Direction3::GAP_23 => i > 0,
            Direction3::GAP_13 => j > 0,
            Direction3::GAP_12 => k > 0,
            _ => false,
        };
        if ok {
            return candidate;
        }
    }
    Direction3::NONE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_matrix::BaseTable;
    use crate::symbol::Symbol;

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
    fn three_identical_streams_cost_zero() {
        let cm = nucleotide_matrix3();
        let s = seq(&[0, 1, 2, 3]);
        let mut pool = MatrixPool::new();
        let f = fill(&s, &s, &s, &cm, &mut pool).unwrap();
        assert_eq!(f.cost, 0);
    }

    #[test]
    fn one_divergent_stream_costs_less_than_pairwise_sum() {
        // S1=S2=ACGT, S3=AGGT (one substitution vs the consensus); the
        // cube should find a cost no worse than aligning S3 against S1
        // alone under the linear engine (a single mismatch).
        let cm = nucleotide_matrix3();
        let s1 = seq(&[0, 1, 2, 3]);
        let s2 = seq(&[0, 1, 2, 3]);
        let s3 = seq(&[0, 2, 2, 3]);
        let mut pool = MatrixPool::new();
        let f = fill(&s1, &s2, &s3, &cm, &mut pool).unwrap();
        assert!(f.cost <= 2);
    }

    #[test]
    fn backtrace_reproduces_equal_length_alignment() {
        let cm = nucleotide_matrix3();
        let s1 = seq(&[0, 1, 2, 3]);
        let s2 = seq(&[0, 1, 2, 3]);
        let s3 = seq(&[0, 1, 2, 3]);
        let mut pool = MatrixPool::new();
        let f = fill(&s1, &s2, &s3, &cm, &mut pool).unwrap();
        let (out1, out2, out3, _median) =
            backtrace(&s1, &s2, &s3, &cm, pool.direction_buf(), f.l1, f.l2, f.l3).unwrap();
        assert_eq!(out1.len(), out2.len());
        assert_eq!(out2.len(), out3.len());
    }
}
