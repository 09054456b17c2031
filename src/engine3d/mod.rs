//! 3-D alignment engines: the direct cube fill (component H) and the
//! Powell/Allison/Dix checkpointed algorithm (component I).

pub mod linear;
pub mod powell;

/// Direction flags for the 3-D cube. Seven transition types, matching the
/// seven ways three aligned columns can be built from one, two, or all
/// three streams contributing a real symbol: a cell may combine flags
/// when several transitions tie, same as the 2-D engine's `LinearDir`.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Direction3(pub u8);

impl Direction3 {
    pub const NONE: Direction3 = Direction3(0);
    /// All three streams contribute a real symbol.
    pub const ALIGN_ALL: Direction3 = Direction3(1 << 0);
    /// Streams 1 and 2 contribute a symbol; stream 3 gets a gap.
    pub const ALIGN_12: Direction3 = Direction3(1 << 1);
    /// Streams 1 and 3 contribute a symbol; stream 2 gets a gap.
    pub const ALIGN_13: Direction3 = Direction3(1 << 2);
    /// Streams 2 and 3 contribute a symbol; stream 1 gets a gap.
    pub const ALIGN_23: Direction3 = Direction3(1 << 3);
    /// Streams 1 and 2 both gap; stream 3 alone advances.
    pub const GAP_12: Direction3 = Direction3(1 << 4);
    /// Streams 1 and 3 both gap; stream 2 alone advances.
    pub const GAP_13: Direction3 = Direction3(1 << 5);
    /// Streams 2 and 3 both gap; stream 1 alone advances.
    pub const GAP_23: Direction3 = Direction3(1 << 6);

    #[inline]
    pub fn contains(self, flag: Direction3) -> bool {
        self.0 & flag.0 == flag.0
    }

    #[inline]
    pub fn union(self, other: Direction3) -> Direction3 {
        Direction3(self.0 | other.0)
    }
}

impl std::ops::BitOr for Direction3 {
    type Output = Direction3;
    fn bitor(self, rhs: Direction3) -> Direction3 {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for Direction3 {
    fn bitor_assign(&mut self, rhs: Direction3) {
        *self = self.union(rhs);
    }
}

pub type Cost = i64;
pub const INF: Cost = Cost::MAX / 4;
