//! Matrix pool (component C).
//!
//! Four growable buffers shared by consecutive alignment calls on the same
//! thread: cost/cube, direction, precalc, and (3-D only) pointers. `ensure`
//! grows any buffer shorter than what the next call requires; it never
//! shrinks, and growth does not preserve content -- every engine
//! reinitializes its working range before reading it, so there is nothing
//! to preserve. A single pool instance serves every engine.

use crate::error::{AlignError, Result};

#[derive(Default)]
pub struct MatrixPool {
    cost: Vec<i64>,
    direction: Vec<u16>,
    precalc: Vec<i64>,
    pointers: Vec<i64>,
}

impl MatrixPool {
    pub fn new() -> MatrixPool {
        MatrixPool::default()
    }

    fn grow<T: Clone>(buf: &mut Vec<T>, needed: usize, fill: T) -> Result<()> {
        if buf.len() < needed {
            // `try_reserve` surfaces allocation failure as a typed error
            // instead of aborting the process.
            buf.try_reserve(needed - buf.len())
                .map_err(|_| AlignError::AllocationFailed)?;
            buf.resize(needed, fill);
        }
        Ok(())
    }

    /// Ensure all four buffers are at least large enough for a 2-D
    /// alignment of `l1` x `l2` over an alphabet of `k` bits (gap included).
    pub fn ensure_2d(&mut self, l1: usize, l2: usize, k: u32) -> Result<()> {
        let longer = l1.max(l2);
        Self::grow(&mut self.cost, 12 * longer.max(1), 0)?;
        Self::grow(&mut self.direction, (l1 + 1) * (l2 + 1), 0)?;
        let n = 1usize << k;
        Self::grow(&mut self.precalc, n * longer.max(1), 0)?;
        Ok(())
    }

    /// Ensure buffers are large enough for a 3-D alignment of `l1 x l2 x
    /// l3` over an alphabet of `k` bits. The cost buffer only needs two
    /// `(l2+1) x (l3+1)` planes (the cube fill sweeps `i` with a
    /// double-buffered plane, keeping memory at O(L2*L3) rather than
    /// O(L1*L2*L3)); the direction cube is kept in full since backtrace walks
    /// it after the fact, same as the 2-D engines.
    pub fn ensure_3d(&mut self, l1: usize, l2: usize, l3: usize, k: u32) -> Result<()> {
        let plane = (l2 + 1) * (l3 + 1);
        Self::grow(&mut self.cost, 2 * plane.max(1), 0)?;
        Self::grow(&mut self.direction, (l1 + 1) * (l2 + 1) * (l3 + 1), 0)?;
        let n2 = 1usize << (2 * k.min(31));
        Self::grow(&mut self.precalc, n2 * l3.max(1), 0)?;
        Self::grow(&mut self.pointers, l1.max(1) * l2.max(1), 0)?;
        Ok(())
    }

    pub fn cost_buf(&mut self) -> &mut [i64] {
        &mut self.cost
    }

    /// Borrow the cost and direction buffers simultaneously, for fills
    /// that write both in the same pass.
    pub fn cost_and_direction_bufs(&mut self) -> (&mut [i64], &mut [u16]) {
        (&mut self.cost, &mut self.direction)
    }

    /// Borrow the cost, direction, and precalc buffers simultaneously: the
    /// 2-D engines build a precalc row table once per call and then need
    /// the cost/direction buffers for the fill itself, all in the same
    /// pool borrow.
    pub fn cost_direction_precalc_bufs(&mut self) -> (&mut [i64], &mut [u16], &mut [i64]) {
        (&mut self.cost, &mut self.direction, &mut self.precalc)
    }

    pub fn direction_buf(&mut self) -> &mut [u16] {
        &mut self.direction
    }

    pub fn precalc_buf(&mut self) -> &mut [i64] {
        &mut self.precalc
    }

    pub fn pointers_buf(&mut self) -> &mut [i64] {
        &mut self.pointers
    }
}
