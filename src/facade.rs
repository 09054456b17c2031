//! Public entry points and the convenience layer around them: a
//! `swap`-handling wrapper around the 2-D engines (which require the
//! longer stream first), constructors for the expanded cost matrices, and
//! one small `Aligner` trait per arity unifying "linear vs affine" and
//! "direct cube vs checkpointed" call sites.

use crate::config::{AffineGapCost, BandConfig, PowellConfig, WantOutputs};
use crate::cost_matrix::{BaseTable, CostMatrix};
use crate::cost_matrix3::CostMatrix3;
use crate::engine2d::{affine, backtrace, linear};
use crate::engine3d;
use crate::error::{AlignError, Result};
use crate::pool::MatrixPool;
use crate::stream::Stream;
use crate::verify;

/// Build an expanded pairwise cost matrix, validating the base table
/// first (`new` trusts the caller; this always goes through
/// `new_checked`, since every facade entry point is the convenience
/// layer over the lower-level components).
pub fn expand_cost_matrix_2d(base: &BaseTable, gap_open: i64, metric: bool) -> Result<CostMatrix> {
    CostMatrix::new_checked(base, gap_open, metric)
}

/// Build an expanded three-way cost matrix.
pub fn expand_cost_matrix_3d(base: &BaseTable, gap_open: i64) -> Result<CostMatrix3> {
    CostMatrix3::new(base, gap_open)
}

/// Order `(s1, s2)` so the first is the longer, recording whether a swap
/// happened.
fn order_by_length<'a>(s1: &'a Stream, s2: &'a Stream) -> (&'a Stream, &'a Stream, bool) {
    if s1.len() >= s2.len() {
        (s1, s2, false)
    } else {
        (s2, s1, true)
    }
}

/// Linear-gap pairwise alignment: fills the `O(mn)` matrix and backtraces
/// it, with the caller's streams reordered internally so the direct
/// engine's "longer stream first" precondition is always satisfied.
pub fn align_2d_linear(
    s1: &Stream,
    s2: &Stream,
    cm: &CostMatrix,
    pool: &mut MatrixPool,
    band: BandConfig,
    want: WantOutputs,
) -> Result<(i64, Stream, Stream, Option<Stream>)> {
    if !want.is_valid() {
        return Err(AlignError::PreconditionViolated(
            "want_gapped and want_union cannot both be requested: they share one output slot",
        ));
    }
    let (longer, shorter, swapped) = order_by_length(s1, s2);
    log::trace!(target: "ambiseq_align::facade", "align_2d_linear: m={} n={} swapped={}", longer.len(), shorter.len(), swapped);

    let fill = linear::fill(longer, shorter, cm, pool, band.delta)?;
    let (mut out_long, mut out_short, gapped) =
        backtrace::backtrace_linear(longer, shorter, cm, pool.direction_buf(), fill.m, fill.n, swapped)?;
    if swapped {
        std::mem::swap(&mut out_long, &mut out_short);
    }

    let extra = if want.want_union {
        Some(verify::union(&out_long, &out_short))
    } else if want.want_gapped {
        Some(gapped.clone())
    } else if want.want_ungapped {
        Some(backtrace::ungap(cm, &gapped))
    } else {
        None
    };

    log::debug!(target: "ambiseq_align::facade", "align_2d_linear: cost={}", fill.cost);
    Ok((fill.cost, out_long, out_short, extra))
}

/// Affine-gap pairwise alignment: fills the four coupled cost planes and
/// backtraces them.
pub fn align_2d_affine(
    s1: &Stream,
    s2: &Stream,
    cm: &CostMatrix,
    pool: &mut MatrixPool,
    want_medians: bool,
) -> Result<(i64, Stream, Stream, Option<Stream>, Option<Stream>)> {
    let (longer, shorter, swapped) = order_by_length(s1, s2);
    log::trace!(target: "ambiseq_align::facade", "align_2d_affine: m={} n={} swapped={}", longer.len(), shorter.len(), swapped);

    let fill = affine::fill(longer, shorter, cm, pool)?;
    let (mut out_long, mut out_short, gapped) =
        backtrace::backtrace_affine(longer, shorter, cm, pool.direction_buf(), fill.m, fill.n)?;
    if swapped {
        std::mem::swap(&mut out_long, &mut out_short);
    }

    let (ungapped, gapped_opt) = if want_medians {
        (Some(backtrace::ungap(cm, &gapped)), Some(gapped))
    } else {
        (None, None)
    };

    log::debug!(target: "ambiseq_align::facade", "align_2d_affine: cost={}", fill.cost);
    Ok((fill.cost, out_long, out_short, ungapped, gapped_opt))
}

/// Three-way linear-gap alignment via the direct windowed cube fill and
/// its backtrace.
pub fn align_3d(
    s1: &Stream,
    s2: &Stream,
    s3: &Stream,
    cm: &CostMatrix3,
    pool: &mut MatrixPool,
) -> Result<(i64, Stream, Stream, Stream, Stream)> {
    let fill = engine3d::linear::fill(s1, s2, s3, cm, pool)?;
    let (out1, out2, out3, median) =
        engine3d::linear::backtrace(s1, s2, s3, cm, pool.direction_buf(), fill.l1, fill.l2, fill.l3)?;
    Ok((fill.cost, out1, out2, out3, median))
}

/// Three-way checkpointed alignment via Hirschberg-style divide and
/// conquer. Named `(s1, s2, s3)` rather than `(longest, mid, shortest)`
/// because this convenience wrapper sorts the three streams by length
/// internally -- same swap-handling contract as the 2-D wrappers -- and
/// remaps the outputs back to the caller's original argument order
/// before returning.
pub fn align_3d_powell(
    s1: &Stream,
    s2: &Stream,
    s3: &Stream,
    cm: &CostMatrix3,
    _gap: AffineGapCost,
    powell: PowellConfig,
    pool: &mut MatrixPool,
) -> Result<(i64, Stream, Stream, Stream, Option<Stream>, Stream)> {
    log::trace!(
        target: "ambiseq_align::facade",
        "align_3d_powell: s1={} s2={} s3={} base_case_volume={}",
        s1.len(), s2.len(), s3.len(), powell.base_case_volume,
    );
    let mut order = [0usize, 1, 2];
    let lens = [s1.len(), s2.len(), s3.len()];
    order.sort_by_key(|&i| std::cmp::Reverse(lens[i]));
    let slots = [s1, s2, s3];
    let (longest, mid, shortest) = (slots[order[0]], slots[order[1]], slots[order[2]]);

    let (o_longest, o_mid, o_shortest, gapped) =
        engine3d::powell::align(longest, mid, shortest, cm, pool, powell)?;
    let sorted_out = [o_longest, o_mid, o_shortest];
    let mut outputs: [Option<Stream>; 3] = [None, None, None];
    for (slot, &original_index) in order.iter().enumerate() {
        outputs[original_index] = Some(sorted_out[slot].clone());
    }
    let [o1, o2, o3] = outputs.map(|o| o.expect("every slot filled exactly once"));

    let cost = verify::verify_3d_linear(cm, &o1, &o2, &o3);
    let gap = cm.gap();
    let ungapped: Stream = gapped.iter().filter(|&s| s != gap).collect();
    log::debug!(target: "ambiseq_align::facade", "align_3d_powell: cost={}", cost);
    Ok((cost, o1, o2, o3, Some(ungapped), gapped))
}

/// Unifies the 2-D entry points behind one small interface, so call sites
/// can be generic over "linear vs affine" without matching on which
/// concrete aligner they hold.
pub trait PairwiseAligner {
    /// Returns `(cost, out1, out2, extras)`, where `extras` holds whatever
    /// median/union outputs this aligner variant was configured to
    /// produce, in implementation-defined order (documented per impl).
    fn align(&self, s1: &Stream, s2: &Stream, pool: &mut MatrixPool) -> Result<(i64, Stream, Stream, Vec<Stream>)>;
}

/// Linear-gap pairwise aligner, configured with a band and output wants.
pub struct LinearAligner<'a> {
    pub cost_matrix: &'a CostMatrix,
    pub band: BandConfig,
    pub want: WantOutputs,
}

impl<'a> PairwiseAligner for LinearAligner<'a> {
    fn align(&self, s1: &Stream, s2: &Stream, pool: &mut MatrixPool) -> Result<(i64, Stream, Stream, Vec<Stream>)> {
        let (cost, o1, o2, extra) = align_2d_linear(s1, s2, self.cost_matrix, pool, self.band, self.want)?;
        Ok((cost, o1, o2, extra.into_iter().collect()))
    }
}

/// Affine-gap pairwise aligner.
pub struct AffineAligner<'a> {
    pub cost_matrix: &'a CostMatrix,
    pub want_medians: bool,
}

impl<'a> PairwiseAligner for AffineAligner<'a> {
    fn align(&self, s1: &Stream, s2: &Stream, pool: &mut MatrixPool) -> Result<(i64, Stream, Stream, Vec<Stream>)> {
        let (cost, o1, o2, ungapped, gapped) =
            align_2d_affine(s1, s2, self.cost_matrix, pool, self.want_medians)?;
        let mut extras = Vec::new();
        extras.extend(ungapped);
        extras.extend(gapped);
        Ok((cost, o1, o2, extras))
    }
}

/// Unifies the 3-D entry points: the direct cube fill and the
/// checkpointed Powell engine.
pub trait ThreewiseAligner {
    fn align(
        &self,
        s1: &Stream,
        s2: &Stream,
        s3: &Stream,
        pool: &mut MatrixPool,
    ) -> Result<(i64, Stream, Stream, Stream, Vec<Stream>)>;
}

pub struct CubeAligner<'a> {
    pub cost_matrix: &'a CostMatrix3,
}

impl<'a> ThreewiseAligner for CubeAligner<'a> {
    fn align(
        &self,
        s1: &Stream,
        s2: &Stream,
        s3: &Stream,
        pool: &mut MatrixPool,
    ) -> Result<(i64, Stream, Stream, Stream, Vec<Stream>)> {
        let (cost, o1, o2, o3, median) = align_3d(s1, s2, s3, self.cost_matrix, pool)?;
        Ok((cost, o1, o2, o3, vec![median]))
    }
}

pub struct PowellAligner<'a> {
    pub cost_matrix: &'a CostMatrix3,
    pub gap: AffineGapCost,
    pub config: PowellConfig,
}

impl<'a> ThreewiseAligner for PowellAligner<'a> {
    fn align(
        &self,
        s1: &Stream,
        s2: &Stream,
        s3: &Stream,
        pool: &mut MatrixPool,
    ) -> Result<(i64, Stream, Stream, Stream, Vec<Stream>)> {
        let (cost, o1, o2, o3, ungapped, gapped) =
            align_3d_powell(s1, s2, s3, self.cost_matrix, self.gap, self.config, pool)?;
        let mut extras = Vec::new();
        extras.extend(ungapped);
        extras.push(gapped);
        Ok((cost, o1, o2, o3, extras))
    }
}
