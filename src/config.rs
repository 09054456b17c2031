//! Small `Copy` configuration structs, grouping parameters the core
//! components of this crate take as bare arguments into named fields that
//! read as configuration at call sites, in the manner of an
//! `AffineCost<N>`/`LinearCost` parameter object.

/// Diagonal-band width for the linear 2-D engine. `None` fills the full
/// rectangle; `Some(delta)` restricts each row to a band of half-width
/// `delta` around the diagonal.
#[derive(Clone, Copy, Debug, Default)]
pub struct BandConfig {
    pub delta: Option<u32>,
}

impl BandConfig {
    pub const UNBANDED: BandConfig = BandConfig { delta: None };

    pub fn banded(delta: u32) -> BandConfig {
        BandConfig { delta: Some(delta) }
    }
}

/// Which outputs a 2-D linear call should populate: the gapped median, the
/// ungapped median, or the column-wise union of the two aligned streams.
/// `want_gapped` and `want_union` are mutually exclusive -- both populate
/// the same output slot -- and are kept as separate fields here rather
/// than an enum so callers can toggle each independently, with the
/// exclusivity enforced at the call site.
#[derive(Clone, Copy, Debug)]
pub struct WantOutputs {
    pub want_gapped: bool,
    pub want_ungapped: bool,
    pub want_union: bool,
}

impl Default for WantOutputs {
    fn default() -> WantOutputs {
        WantOutputs { want_gapped: true, want_ungapped: false, want_union: false }
    }
}

impl WantOutputs {
    pub fn is_valid(self) -> bool {
        !(self.want_gapped && self.want_union)
    }
}

/// Gap-cost parameters for the affine 2-D and 3-D engines.
#[derive(Clone, Copy, Debug)]
pub struct AffineGapCost {
    pub gap_open: i64,
    pub gap_extend: i64,
}

impl AffineGapCost {
    pub fn linear() -> AffineGapCost {
        AffineGapCost { gap_open: 0, gap_extend: 1 }
    }
}

/// Tuning knobs for the checkpointed three-way engine: the volume below
/// which recursion bottoms out to the direct cube engine. See DESIGN.md
/// for why this crate's Hirschberg-style divide-and-conquer was chosen
/// over a literal finite-state checkpoint-and-resume design.
#[derive(Clone, Copy, Debug)]
pub struct PowellConfig {
    pub base_case_volume: usize,
}

impl Default for PowellConfig {
    fn default() -> PowellConfig {
        PowellConfig { base_case_volume: 8_000 }
    }
}
