//! Example-based alignment scenarios, plus median-column correctness and
//! the 3-D triangle inequality, which are naturally example-based rather
//! than property tests (they need a fixed, specific cost matrix).

use ambiseq_align::config::{AffineGapCost, BandConfig, PowellConfig, WantOutputs};
use ambiseq_align::cost_matrix::BaseTable;
use ambiseq_align::pool::MatrixPool;
use ambiseq_align::stream::Stream;
use ambiseq_align::symbol::Symbol;
use ambiseq_align::{
    align_2d_affine, align_2d_linear, align_3d, align_3d_powell, expand_cost_matrix_2d,
    expand_cost_matrix_3d,
};

const A: u32 = 0;
const C: u32 = 1;
const G: u32 = 2;
const T: u32 = 3;

fn nucleotide_matrix(gap_open: i64) -> ambiseq_align::CostMatrix {
    let k = 5;
    let mut costs = vec![1i64; (k * k) as usize];
    for i in 0..k {
        costs[(i * k + i) as usize] = 0;
    }
    let base = BaseTable::new(k, costs);
    expand_cost_matrix_2d(&base, gap_open, true).unwrap()
}

fn nucleotide_matrix3() -> ambiseq_align::CostMatrix3 {
    let k = 5;
    let mut costs = vec![1i64; (k * k) as usize];
    for i in 0..k {
        costs[(i * k + i) as usize] = 0;
    }
    let base = BaseTable::new(k, costs);
    expand_cost_matrix_3d(&base, 0).unwrap()
}

fn seq(bits: &[u32]) -> Stream {
    bits.iter().map(|&b| Symbol::single(b)).collect()
}

#[test]
fn scenario_acgt_vs_agt_costs_one_with_canonical_tie_break() {
    let cm = nucleotide_matrix(0);
    let mut pool = MatrixPool::new();
    let s1 = seq(&[A, C, G, T]);
    let s2 = seq(&[A, G, T]);
    let want = WantOutputs { want_gapped: false, want_ungapped: false, want_union: false };
    let (cost, out1, out2, _) = align_2d_linear(&s1, &s2, &cm, &mut pool, BandConfig::UNBANDED, want).unwrap();
    assert_eq!(cost, 1);
    assert_eq!(out1.len(), out2.len());
    // Canonical tie-break picks "A C G T / A - G T" over "A C G T / A G - T".
    let gap = cm.gap();
    assert_eq!(out1.get(1), Symbol::single(C));
    assert_eq!(out2.get(1), gap);
}

#[test]
fn scenario_full_substitution_run_costs_four() {
    let cm = nucleotide_matrix(0);
    let mut pool = MatrixPool::new();
    let s1 = seq(&[A, C, G, T]);
    let s2 = seq(&[T, G, C, A]);
    let (cost, _, _, _) =
        align_2d_linear(&s1, &s2, &cm, &mut pool, BandConfig::UNBANDED, WantOutputs::default()).unwrap();
    assert_eq!(cost, 4);
}

#[test]
fn scenario_single_affine_gap_block_costs_open_plus_extends() {
    let cm = nucleotide_matrix(2);
    let mut pool = MatrixPool::new();
    let s1 = seq(&[A, A, A, A]);
    let s2 = seq(&[A, A]);
    let (cost, _, _, _, _) = align_2d_affine(&s1, &s2, &cm, &mut pool, false).unwrap();
    assert_eq!(cost, 4);
}

#[test]
fn scenario_ambiguous_r_resolves_to_the_pivot_with_zero_cost() {
    let cm = nucleotide_matrix(0);
    let mut pool = MatrixPool::new();
    let r = Symbol::single(A).union(Symbol::single(G));
    let s1 = Stream::from_symbols(&[r, Symbol::single(G), Symbol::single(T)], 0);
    let s2 = seq(&[A, G, T]);
    let want = WantOutputs { want_gapped: true, want_ungapped: false, want_union: false };
    let (cost, _, _, extra) = align_2d_linear(&s1, &s2, &cm, &mut pool, BandConfig::UNBANDED, want).unwrap();
    assert_eq!(cost, 0);
    let gapped = extra.unwrap();
    let ungapped: Vec<Symbol> = gapped.iter().filter(|&s| s != cm.gap()).collect();
    assert_eq!(ungapped, vec![Symbol::single(A), Symbol::single(G), Symbol::single(T)]);
}

#[test]
fn scenario_three_identical_streams_cost_zero_via_powell() {
    let cm3 = nucleotide_matrix3();
    let mut pool = MatrixPool::new();
    let s = seq(&[A, C, G, T]);
    let (cost, o1, o2, o3, _ungapped, _gapped) =
        align_3d_powell(&s, &s, &s, &cm3, AffineGapCost::linear(), PowellConfig::default(), &mut pool).unwrap();
    assert_eq!(cost, 0);
    let gap = cm3.gap();
    for out in [&o1, &o2, &o3] {
        let stripped: Vec<Symbol> = out.iter().filter(|&sym| sym != gap).collect();
        assert_eq!(stripped, vec![Symbol::single(A), Symbol::single(C), Symbol::single(G), Symbol::single(T)]);
    }
}

#[test]
fn scenario_divergent_third_stream_costs_two_via_powell() {
    let cm3 = nucleotide_matrix3();
    let mut pool = MatrixPool::new();
    let s1 = seq(&[A, C, G, T]);
    let s2 = seq(&[A, G, T]);
    let s3 = seq(&[A, C, T]);
    let (cost, _, _, _, _, _) =
        align_3d_powell(&s1, &s2, &s3, &cm3, AffineGapCost::linear(), PowellConfig::default(), &mut pool).unwrap();
    assert_eq!(cost, 2);
}

#[test]
fn invariant_4_median_columns_match_cost_matrix_median() {
    let cm = nucleotide_matrix(0);
    let mut pool = MatrixPool::new();
    let s1 = seq(&[A, C, G, T]);
    let s2 = seq(&[A, G, T]);
    let want = WantOutputs { want_gapped: true, want_ungapped: false, want_union: false };
    let (_, out1, out2, extra) = align_2d_linear(&s1, &s2, &cm, &mut pool, BandConfig::UNBANDED, want).unwrap();
    let gapped = extra.unwrap();
    for k in 0..out1.len() {
        assert_eq!(gapped.get(k), cm.median(out1.get(k), out2.get(k)));
    }
}

#[test]
fn invariant_7_triangle_inequality_holds_for_a_metric_base_table() {
    let cm = nucleotide_matrix(0);
    let cm3 = nucleotide_matrix3();
    let mut pool2 = MatrixPool::new();
    let mut pool3 = MatrixPool::new();

    let a = seq(&[A, C, G, T, A]);
    let b = seq(&[A, G, T, A]);
    let c = seq(&[A, G, T, C, A]);

    let (cost_ab, _, _, _) =
        align_2d_linear(&a, &b, &cm, &mut pool2, BandConfig::UNBANDED, WantOutputs::default()).unwrap();
    let (cost_bc, _, _, _) =
        align_2d_linear(&b, &c, &cm, &mut pool2, BandConfig::UNBANDED, WantOutputs::default()).unwrap();
    let (cost_abc, _, _, _, _, _) =
        align_3d_powell(&a, &b, &c, &cm3, AffineGapCost::linear(), PowellConfig::default(), &mut pool3).unwrap();

    assert!(cost_abc <= cost_ab + cost_bc);
}

#[test]
fn direct_cube_engine_agrees_with_powell_on_a_small_instance() {
    let cm3 = nucleotide_matrix3();
    let mut pool = MatrixPool::new();
    let s1 = seq(&[A, C, G, T]);
    let s2 = seq(&[A, G, T]);
    let s3 = seq(&[A, C, T]);
    let (cube_cost, _, _, _, _) = align_3d(&s1, &s2, &s3, &cm3, &mut pool).unwrap();

    let mut pool2 = MatrixPool::new();
    let (powell_cost, _, _, _, _, _) =
        align_3d_powell(&s1, &s2, &s3, &cm3, AffineGapCost::linear(), PowellConfig::default(), &mut pool2).unwrap();
    assert_eq!(cube_cost, powell_cost);
}
