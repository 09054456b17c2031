//! Cost-matrix expansion (component B).
//!
//! Lifts a `K x K` base transition-cost table over unambiguous states to a
//! `2^K x 2^K` table over every ambiguity-set pair, using a
//! consensus-over-pivot formulation: for ambiguous
//! symbols `a, b` the best cost is `min_z (dist(a, z) + dist(b, z))` over
//! unambiguous pivots `z`, and the median is the union of every pivot
//! attaining that minimum. This also yields a well-defined median, which
//! the plain `min_{x in a, y in b} t[x, y]` formulation does not.

use crate::error::{AlignError, Result};
use crate::symbol::Symbol;

/// Largest alphabet size (in unambiguous states, gap included) the expander
/// accepts. Above this the `2^K x 2^K` pair-table index overflows a native
/// `usize` index computation on 32-bit platforms well before it could ever
/// be allocated, so the expander refuses outright.
pub const MAX_K: u32 = 31;

/// A base transition-cost table over `k` unambiguous states (gap included
/// as the last state, i.e. state `k - 1`).
#[derive(Clone)]
pub struct BaseTable {
    pub k: u32,
    /// Row-major, stride `k`.
    costs: Vec<i64>,
}

impl BaseTable {
    pub fn new(k: u32, costs: Vec<i64>) -> BaseTable {
        assert_eq!(costs.len(), (k as usize) * (k as usize));
        BaseTable { k, costs }
    }

    #[inline]
    pub fn get(&self, i: u32, j: u32) -> i64 {
        self.costs[(i as usize) * (self.k as usize) + j as usize]
    }

    /// Required invariants are *assumed*, not checked, by `new` -- matching
    /// the core's trusting low-level constructor. `validate` is the opt-in
    /// checked path used by `CostMatrix::new_checked`.
    fn validate(&self) -> Result<()> {
        for i in 0..self.k {
            if self.get(i, i) != 0 {
                return Err(AlignError::PreconditionViolated(
                    "base cost table diagonal must be zero",
                ));
            }
            for j in 0..self.k {
                if self.get(i, j) < 0 {
                    return Err(AlignError::PreconditionViolated(
                        "base cost table entries must be non-negative",
                    ));
                }
            }
        }
        Ok(())
    }

    fn is_symmetric(&self) -> bool {
        (0..self.k).all(|i| (0..self.k).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// The gap-cost regime an expanded matrix was built for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CostModel {
    Linear,
    Affine { gap_open: i64 },
}

/// The expanded cost matrix: for every ordered pair of ambiguity-sets
/// `(a, b)` with `1 <= a, b < 2^k`, the best substitution cost and the
/// median (union of minimum-cost pivots).
pub struct CostMatrix {
    pub k: u32,
    /// Bit position of the distinguished gap state. Which state is "gap"
    /// varies by cost matrix (it is a property of the matrix, not of the
    /// symbol bit-set), so it is fixed once here at construction.
    pub gap_bit: u32,
    stride: usize,
    best_cost: Vec<i64>,
    median: Vec<Symbol>,
    worst_cost: Vec<i64>,
    prepend_cost: Vec<i64>,
    tail_cost: Vec<i64>,
    pub cost_model: CostModel,
    pub metric: bool,
}

impl CostMatrix {
    #[inline]
    pub fn gap(&self) -> Symbol {
        Symbol::single(self.gap_bit)
    }

    #[inline]
    fn idx(&self, a: Symbol, b: Symbol) -> usize {
        a.as_index() * self.stride + b.as_index()
    }

    #[inline]
    pub fn best_cost(&self, a: Symbol, b: Symbol) -> i64 {
        self.best_cost[self.idx(a, b)]
    }

    #[inline]
    pub fn worst_cost(&self, a: Symbol, b: Symbol) -> i64 {
        self.worst_cost[self.idx(a, b)]
    }

    #[inline]
    pub fn median(&self, a: Symbol, b: Symbol) -> Symbol {
        self.median[self.idx(a, b)]
    }

    /// Cost of aligning a gap onto `x` (used by the first row of the linear
    /// engine and by affine-engine initialization).
    #[inline]
    pub fn prepend_cost(&self, x: Symbol) -> i64 {
        self.prepend_cost[x.as_index()]
    }

    /// Cost of aligning `x` onto a gap (used by the first column).
    #[inline]
    pub fn tail_cost(&self, x: Symbol) -> i64 {
        self.tail_cost[x.as_index()]
    }

    pub fn gap_open(&self) -> i64 {
        match self.cost_model {
            CostModel::Linear => 0,
            CostModel::Affine { gap_open } => gap_open,
        }
    }

    pub fn is_affine(&self) -> bool {
        matches!(self.cost_model, CostModel::Affine { .. })
    }

    /// Build an expanded matrix, trusting that `base` already satisfies the
    /// invariants of a well-formed transition table (non-negative entries,
    /// zero diagonal).
    pub fn new(base: &BaseTable, gap_open: i64, metric: bool) -> Result<CostMatrix> {
        if base.k > MAX_K {
            return Err(AlignError::AlphabetTooLarge { k: base.k });
        }
        let k = base.k;
        let n = 1usize << k;
        let stride = n;
        let gap_bit = k - 1;

        let mut best_cost = vec![0i64; n * stride];
        let mut worst_cost = vec![0i64; n * stride];
        let mut median = vec![Symbol::EMPTY; n * stride];

        // dist(s, z) = min_{i in s} t[i, z]
        let dist = |s: usize, z: u32| -> i64 {
            let mut best = i64::MAX;
            let mut bits = s as u64;
            while bits != 0 {
                let i = bits.trailing_zeros();
                bits &= bits - 1;
                let c = base.get(i, z);
                if c < best {
                    best = c;
                }
            }
            best
        };
        let worst_dist = |s: usize, z: u32| -> i64 {
            let mut worst = 0i64;
            let mut bits = s as u64;
            while bits != 0 {
                let i = bits.trailing_zeros();
                bits &= bits - 1;
                let c = base.get(i, z);
                if c > worst {
                    worst = c;
                }
            }
            worst
        };

        for a in 1..n {
            for b in 1..n {
                let mut best = i64::MAX;
                let mut worst = 0i64;
                let mut pivots = Symbol::EMPTY;
                for z in 0..k {
                    let c = dist(a, z) + dist(b, z);
                    if c < best {
                        best = c;
                        pivots = Symbol::single(z);
                    } else if c == best {
                        pivots = pivots.union(Symbol::single(z));
                    }
                    let w = worst_dist(a, z) + worst_dist(b, z);
                    if w > worst {
                        worst = w;
                    }
                }
                best_cost[a * stride + b] = best;
                worst_cost[a * stride + b] = worst;
                median[a * stride + b] = pivots;
            }
        }

        let gap = Symbol::single(gap_bit);
        let mut prepend_cost = vec![0i64; n];
        let mut tail_cost = vec![0i64; n];
        for x in 1..n {
            prepend_cost[x] = best_cost[gap.as_index() * stride + x];
            tail_cost[x] = best_cost[x * stride + gap.as_index()];
        }

        let cost_model = if gap_open > 0 {
            CostModel::Affine { gap_open }
        } else {
            CostModel::Linear
        };

        Ok(CostMatrix {
            k,
            gap_bit,
            stride,
            best_cost,
            median,
            worst_cost,
            prepend_cost,
            tail_cost,
            cost_model,
            metric,
        })
    }

    /// Like `new`, but validates the base table first (non-negative
    /// entries, zero diagonal) and checks symmetry when `metric` is
    /// requested.
    pub fn new_checked(base: &BaseTable, gap_open: i64, metric: bool) -> Result<CostMatrix> {
        base.validate()?;
        if metric && !base.is_symmetric() {
            return Err(AlignError::PreconditionViolated(
                "metric cost matrix requires a symmetric base table",
            ));
        }
        Self::new(base, gap_open, metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// K=5 (A,C,G,T,gap), substitution 1, match 0, gap 1.
    fn nucleotide_table() -> BaseTable {
        let k = 5;
        let mut costs = vec![1i64; (k * k) as usize];
        for i in 0..k {
            costs[(i * k + i) as usize] = 0;
        }
        BaseTable::new(k, costs)
    }

    #[test]
    fn unambiguous_pair_cost_matches_base_table() {
        let base = nucleotide_table();
        let cm = CostMatrix::new(&base, 0, true).unwrap();
        let a = Symbol::single(0); // A
        let c = Symbol::single(1); // C
        assert_eq!(cm.best_cost(a, a), 0);
        assert_eq!(cm.best_cost(a, c), 1);
        assert_eq!(cm.median(a, a), a);
    }

    #[test]
    fn ambiguous_symbol_resolves_to_cheapest_pivot() {
        let base = nucleotide_table();
        let cm = CostMatrix::new(&base, 0, true).unwrap();
        let r = Symbol::single(0).union(Symbol::single(2)); // R = {A, G}
        let g = Symbol::single(2);
        assert_eq!(cm.best_cost(r, g), 0);
        assert_eq!(cm.median(r, g), g);
    }

    #[test]
    fn alphabet_too_large_is_refused() {
        let base = BaseTable::new(32, vec![0i64; 32 * 32]);
        assert!(matches!(
            CostMatrix::new(&base, 0, false),
            Err(AlignError::AlphabetTooLarge { k: 32 })
        ));
    }
}
