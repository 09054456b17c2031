//! 2-D affine-gap-cost engine (component F).
//!
//! Maintains four coupled cost planes per cell: `M` (an alignment or
//! substitution just happened), `H` (extending a horizontal gap, i.e. a
//! run of symbols in `s2` aligned against gaps in `s1`), `V` (extending a
//! vertical gap), and `D` (extending a block-diagonal run where both
//! streams are simultaneously inside a gap). The aggregate minimum of the
//! four is `F`.
//!
//! The four planes are stored interleaved inside the pool's cost buffer
//! (sized `12 * max(m, n)` by [`MatrixPool::ensure_2d`]) so the engine
//! never allocates: each plane gets a double-buffered (`prev`/`cur`) pair
//! of `n + 1`-length rows, and two further rows hold the per-column
//! gap-open and horizontal-extend costs precomputed once per column.

use super::{AffineDir, INF};
use crate::cost_matrix::CostMatrix;
use crate::pool::MatrixPool;
use crate::precalc::PrecalcTable;
use crate::stream::Stream;

pub struct AffineFill {
    pub cost: i64,
    pub m: usize,
    pub n: usize,
}

struct Planes<'a> {
    stride: usize,
    buf: &'a mut [i64],
}

impl<'a> Planes<'a> {
    /// Plane layout within the shared buffer: 8 rows of `stride` for the
    /// four double-buffered planes (M, H, V, D), plus 2 precomputed
    /// per-column auxiliary rows (gap-open cost, horizontal-extend cost).
    fn new(buf: &'a mut [i64], stride: usize) -> Planes<'a> {
        debug_assert!(buf.len() >= 10 * stride);
        Planes { stride, buf }
    }

    fn row(&mut self, plane: usize, parity: usize) -> &mut [i64] {
        let stride = self.stride;
        let offset = (plane * 2 + parity) * stride;
        &mut self.buf[offset..offset + stride]
    }
}

const M: usize = 0;
const H: usize = 1;
const V: usize = 2;
const D: usize = 3;

/// Fill the affine NW matrix for `s1` (longer, rows) against `s2`
/// (shorter, columns). Requires `cm.is_affine()`. Writes the direction
/// matrix into `pool.direction_buf()`, stride `n + 1`.
pub fn fill(
    s1: &Stream,
    s2: &Stream,
    cm: &CostMatrix,
    pool: &mut MatrixPool,
) -> crate::error::Result<AffineFill> {
    let m = s1.len();
    let n = s2.len();
    if n > m {
        return Err(crate::error::AlignError::PreconditionViolated(
            "2-D engine requires the longer stream first (s1.len() >= s2.len())",
        ));
    }
    pool.ensure_2d(m, n, cm.k)?;
    let g = cm.gap_open();
    let gap = cm.gap();
    let stride = n + 1;

    let (cost_buf, dir, precalc_buf) = pool.cost_direction_precalc_bufs();
    debug_assert!(cost_buf.len() >= 10 * stride);
    debug_assert!(dir.len() >= (m + 1) * stride);
    for v in dir.iter_mut().take((m + 1) * stride) {
        *v = 0;
    }
    dir[0] = AffineDir::ORIGIN.0;

    // Precompute P[a][j] = best_cost(a, s2[j]) once for the whole fill;
    // the substitution cost and the per-column gap-extend cost (which is
    // just best_cost(gap, s2[j])) both come from this row table rather
    // than the full cost matrix.
    let table = PrecalcTable::build(cm, s2, precalc_buf);

    let mut planes = Planes::new(cost_buf, stride);
    let mut cur = 0usize;

    // Row 0: M is 0 at the origin and infeasible elsewhere; H forms the
    // open-then-extend trajectory along the empty s1 prefix; V and D are
    // infeasible (no s1 symbols consumed yet).
    {
        let (m_row, h_row, v_row, d_row) = (
            planes.row(M, cur).as_mut_ptr(),
            planes.row(H, cur).as_mut_ptr(),
            planes.row(V, cur).as_mut_ptr(),
            planes.row(D, cur).as_mut_ptr(),
        );
        // SAFETY: the four row slices are disjoint (different plane
        // offsets), so taking raw pointers to write them independently is
        // sound without re-borrowing `planes` four times.
        unsafe {
            *m_row.add(0) = 0;
            *h_row.add(0) = INF;
            *v_row.add(0) = INF;
            *d_row.add(0) = INF;
            let mut running = 0i64;
            for j in 1..=n {
                let e = table.cost(gap, j - 1);
                running = if j == 1 { g + e } else { running + e };
                *h_row.add(j) = running;
                *m_row.add(j) = INF;
                *v_row.add(j) = INF;
                *d_row.add(j) = INF;
            }
        }
    }
    for j in 1..=n {
        dir[j] = (AffineDir::DO_HORIZONTAL).0;
    }

    for i in 1..=m {
        let prev = cur;
        let next = 1 - cur;
        let a = s1.get(i - 1);
        let tail_a = cm.tail_cost(a);

        // Column 0: V forms the open-then-extend trajectory down s1; H, D,
        // M are infeasible (no s2 symbols consumed yet) except M which
        // only equals 0 at the true origin.
        {
            let prev_v0 = planes.row(V, prev)[0];
            let prev_m0 = planes.row(M, prev)[0];
            let open_or_extend = if i == 1 { g + tail_a } else { prev_v0 + tail_a };
            let from_m = prev_m0 + g + tail_a;
            let v0 = open_or_extend.min(from_m);
            planes.row(V, next)[0] = v0;
            planes.row(H, next)[0] = INF;
            planes.row(D, next)[0] = INF;
            planes.row(M, next)[0] = INF;
            dir[i * stride] = AffineDir::DO_VERTICAL.0;
        }

        for j in 1..=n {
            let extend_h = table.cost(gap, j - 1);

            // H: extend-horizontal.
            let h_extend = planes.row(H, next)[j - 1] + extend_h;
            let h_open = planes.row(M, next)[j - 1] + g + extend_h;
            let h = h_extend.min(h_open);

            // V: extend-vertical.
            let v_extend = planes.row(V, prev)[j] + tail_a;
            let v_open = planes.row(M, prev)[j] + g + tail_a;
            let v = v_extend.min(v_open);

            // D: block-diagonal, both streams simultaneously in a gap run.
            let both = tail_a + extend_h;
            let d_extend = planes.row(D, prev)[j - 1] + both;
            let d_from_h = planes.row(H, prev)[j - 1] + g + both;
            let d_from_v = planes.row(V, prev)[j - 1] + g + both;
            let d_from_m = planes.row(M, prev)[j - 1] + 2 * g + both;
            let d = d_extend.min(d_from_h).min(d_from_v).min(d_from_m);

            // M: close. No extra open cost on close (standard Gotoh
            // convention: total gap cost = open + len*extend, charged
            // entirely on the opening transition into H/V/D).
            let sub = table.cost(a, j - 1);
            let (m_close, do_flag) = {
                let cands = [
                    (planes.row(M, prev)[j - 1], AffineDir::ALIGN_TO_ALIGN),
                    (planes.row(V, prev)[j - 1], AffineDir::ALIGN_TO_VERTICAL),
                    (planes.row(H, prev)[j - 1], AffineDir::ALIGN_TO_HORIZONTAL),
                    (planes.row(D, prev)[j - 1], AffineDir::ALIGN_TO_DIAGONAL),
                ];
                let mut best = INF;
                let mut flag = AffineDir::NONE;
                for &(c, f) in &cands {
                    if c < best {
                        best = c;
                        flag = f;
                    } else if c == best {
                        flag |= f;
                    }
                }
                (best + sub, flag)
            };

            planes.row(H, next)[j] = h;
            planes.row(V, next)[j] = v;
            planes.row(D, next)[j] = d;
            planes.row(M, next)[j] = m_close;

            let f = m_close.min(h).min(v).min(d);
            let mut flags = AffineDir::NONE;
            if f == m_close {
                flags |= AffineDir::DO_ALIGN | do_flag;
            }
            if f == h {
                flags |= AffineDir::DO_HORIZONTAL;
                if h == h_open {
                    flags |= AffineDir::BEGIN_HORIZONTAL;
                }
                if m_close <= h_extend {
                    flags |= AffineDir::END_HORIZONTAL;
                }
            }
            if f == v {
                flags |= AffineDir::DO_VERTICAL;
                if v == v_open {
                    flags |= AffineDir::BEGIN_VERTICAL;
                }
                if m_close <= v_extend {
                    flags |= AffineDir::END_VERTICAL;
                }
            }
            if f == d {
                flags |= AffineDir::DO_DIAGONAL;
                if d == d_from_m {
                    flags |= AffineDir::BEGIN_BLOCK;
                }
                if m_close <= d_extend {
                    flags |= AffineDir::END_BLOCK;
                }
            }
            dir[i * stride + j] = flags.0;
        }
        cur = next;
    }

    let f_final = {
        let mc = planes.row(M, cur)[n];
        let hc = planes.row(H, cur)[n];
        let vc = planes.row(V, cur)[n];
        let dc = planes.row(D, cur)[n];
        mc.min(hc).min(vc).min(dc)
    };
    Ok(AffineFill { cost: f_final, m, n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_matrix::BaseTable;
    use crate::engine2d::backtrace::backtrace_affine;
    use crate::symbol::Symbol;

    fn nucleotide_matrix(gap_open: i64) -> CostMatrix {
        let k = 5;
        let mut costs = vec![1i64; (k * k) as usize];
        for i in 0..k {
            costs[(i * k + i) as usize] = 0;
        }
        let base = BaseTable::new(k, costs);
        CostMatrix::new(&base, gap_open, true).unwrap()
    }

    fn seq(bits: &[u32]) -> Stream {
        bits.iter().map(|&b| Symbol::single(b)).collect()
    }

    #[test]
    fn single_gap_block_costs_open_plus_extends() {
        // S1 = AAAA, S2 = AA, gap_open = 2, gap_extend = 1 (matches base
        // table's indel cost of 1). cost = 2 + 1 + 1 = 4.
        let cm = nucleotide_matrix(2);
        let s1 = seq(&[0, 0, 0, 0]);
        let s2 = seq(&[0, 0]);
        let mut pool = MatrixPool::new();
        let f = fill(&s1, &s2, &cm, &mut pool).unwrap();
        assert_eq!(f.cost, 4);
    }

    #[test]
    fn zero_gap_open_matches_linear_engine() {
        let cm_affine = nucleotide_matrix(0);
        assert!(!cm_affine.is_affine());
        let s1 = seq(&[0, 1, 2, 3]);
        let s2 = seq(&[0, 2, 3]);
        let mut pool = MatrixPool::new();
        // gap_open = 0 means the cost matrix itself reports Linear; the
        // affine engine must still agree with the linear engine's answer
        // for any cost matrix (affine with G=0 reduces to linear).
        let affine_result = fill(&s1, &s2, &cm_affine, &mut pool).unwrap();
        let mut pool2 = MatrixPool::new();
        let linear_result =
            crate::engine2d::linear::fill(&s1, &s2, &cm_affine, &mut pool2, None).unwrap();
        assert_eq!(affine_result.cost, linear_result.cost);
    }

    #[test]
    fn backtrace_runs_to_completion() {
        let cm = nucleotide_matrix(2);
        let s1 = seq(&[0, 0, 0, 0]);
        let s2 = seq(&[0, 0]);
        let mut pool = MatrixPool::new();
        let f = fill(&s1, &s2, &cm, &mut pool).unwrap();
        let (out1, out2, _median) =
            backtrace_affine(&s1, &s2, &cm, pool.direction_buf(), f.m, f.n).unwrap();
        assert_eq!(out1.len(), out2.len());
    }
}
