//! 2-D backtrace and median reconstruction (component G).
//!
//! Walks the direction matrix produced by [`crate::engine2d::linear`] or
//! [`crate::engine2d::affine`] from the bottom-right cell back to the
//! origin, emitting aligned streams (gaps inserted where appropriate), the
//! gapped median, and optionally the ungapped median.
//!
//! Every emitted stream is prefixed with one leading gap symbol; streams
//! are built by
//! [`crate::stream::Stream::prepend`], so the walk runs in the same
//! direction the output needs, emitting left to right without a final
//! reverse.

use super::{AffineDir, LinearDir};
use crate::cost_matrix::CostMatrix;
use crate::error::Result;
use crate::stream::Stream;
use crate::symbol::Symbol;

/// Canonical tie-break rule. `swapped` is the flag a caller sets when it
/// reordered streams to satisfy the "longer stream first" requirement;
/// the rule is defined explicitly here rather than left as an accidental
/// consequence of iteration order.
#[inline]
fn preferred(flags: LinearDir, swapped: bool) -> LinearDir {
    if flags.contains(LinearDir::ALIGN) {
        LinearDir::ALIGN
    } else if !swapped && flags.contains(LinearDir::DELETE) {
        LinearDir::DELETE
    } else if swapped && flags.contains(LinearDir::INSERT) {
        LinearDir::INSERT
    } else if !swapped && flags.contains(LinearDir::INSERT) {
        LinearDir::INSERT
    } else {
        LinearDir::DELETE
    }
}

/// Backtrace for the linear engine. `s1` is the longer (row) stream, `s2`
/// the shorter (column) stream, as filled. Returns `(out1, out2, gapped
/// median)`.
pub fn backtrace_linear(
    s1: &Stream,
    s2: &Stream,
    cm: &CostMatrix,
    dir: &[u16],
    m: usize,
    n: usize,
    swapped: bool,
) -> Result<(Stream, Stream, Stream)> {
    let stride = n + 1;
    let extra = m + n + 2;
    let mut out1 = Stream::allocate(extra);
    let mut out2 = Stream::allocate(extra);
    let mut median = Stream::allocate(extra);

    let gap = cm.gap();
    let mut i = m;
    let mut j = n;
    while i > 0 || j > 0 {
        let flags = LinearDir(dir[i * stride + j] as u8);
        let mv = if i == 0 {
            LinearDir::INSERT
        } else if j == 0 {
            LinearDir::DELETE
        } else {
            preferred(flags, swapped)
        };
        match mv {
            LinearDir::ALIGN => {
                let a = s1.get(i - 1);
                let b = s2.get(j - 1);
                out1.prepend(a)?;
                out2.prepend(b)?;
                median.prepend(cm.median(a, b))?;
                i -= 1;
                j -= 1;
            }
            LinearDir::DELETE => {
                let a = s1.get(i - 1);
                out1.prepend(a)?;
                out2.prepend(gap)?;
                median.prepend(cm.median(a, gap))?;
                i -= 1;
            }
            LinearDir::INSERT => {
                let b = s2.get(j - 1);
                out1.prepend(gap)?;
                out2.prepend(b)?;
                median.prepend(cm.median(gap, b))?;
                j -= 1;
            }
            _ => unreachable!("direction cell with no flags set during backtrace"),
        }
    }

    // Legacy leading-gap prefix.
    out1.prepend(gap)?;
    out2.prepend(gap)?;

    Ok((out1, out2, median))
}

/// Remove gap columns from a gapped median, producing the ungapped median.
pub fn ungap(cm: &CostMatrix, gapped: &Stream) -> Stream {
    let gap = cm.gap();
    gapped.iter().filter(|&s| s != gap).collect()
}

/// Affine backtrace mode, tracking which of the four cost planes the walk
/// is currently inside.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    Todo,
    Align,
    Horizontal,
    Vertical,
    Diagonal,
}

/// Backtrace for the affine engine. `dir` must be the direction grid
/// produced by [`crate::engine2d::affine::fill`], row-major with stride
/// `n + 1`.
pub fn backtrace_affine(
    s1: &Stream,
    s2: &Stream,
    cm: &CostMatrix,
    dir: &[u16],
    m: usize,
    n: usize,
) -> Result<(Stream, Stream, Stream)> {
    let stride = n + 1;
    let extra = m + n + 2;
    let mut out1 = Stream::allocate(extra);
    let mut out2 = Stream::allocate(extra);
    let mut median = Stream::allocate(extra);
    let gap = cm.gap();

    let mut i = m;
    let mut j = n;
    let mut mode = Mode::Todo;

    while i > 0 || j > 0 {
        let cell = AffineDir(dir[i * stride + j]);
        if cell == AffineDir::ORIGIN {
            break;
        }

        if mode == Mode::Todo {
            mode = if cell.contains(AffineDir::DO_ALIGN) {
                Mode::Align
            } else if cell.contains(AffineDir::DO_HORIZONTAL) {
                Mode::Horizontal
            } else if cell.contains(AffineDir::DO_VERTICAL) {
                Mode::Vertical
            } else {
                Mode::Diagonal
            };
            continue;
        }

        match mode {
            Mode::Align => {
                let a = s1.get(i - 1);
                let b = s2.get(j - 1);
                out1.prepend(a)?;
                out2.prepend(b)?;
                median.prepend(cm.median(a, b))?;
                i -= 1;
                j -= 1;
                mode = if cell.contains(AffineDir::ALIGN_TO_VERTICAL) {
                    Mode::Vertical
                } else if cell.contains(AffineDir::ALIGN_TO_HORIZONTAL) {
                    Mode::Horizontal
                } else if cell.contains(AffineDir::ALIGN_TO_DIAGONAL) {
                    Mode::Diagonal
                } else {
                    Mode::Todo
                };
            }
            Mode::Horizontal => {
                let b = s2.get(j - 1);
                out1.prepend(gap)?;
                out2.prepend(b)?;
                median.prepend(cm.median(gap, b))?;
                j -= 1;
                if cell.contains(AffineDir::END_HORIZONTAL) {
                    mode = Mode::Todo;
                }
            }
            Mode::Vertical => {
                let a = s1.get(i - 1);
                out1.prepend(a)?;
                out2.prepend(gap)?;
                median.prepend(cm.median(a, gap))?;
                i -= 1;
                if cell.contains(AffineDir::END_VERTICAL) {
                    mode = Mode::Todo;
                }
            }
            Mode::Diagonal => {
                // Block-diagonal: both streams are simultaneously inside a
                // gap run. A step here emits two columns -- s1's symbol
                // against a gap, then a gap against s2's symbol -- rather
                // than a single shared column, since the two gap runs are
                // independent.
                let a = s1.get(i - 1);
                let b = s2.get(j - 1);
                out1.prepend(gap)?;
                out2.prepend(b)?;
                median.prepend(cm.median(gap, b))?;
                out1.prepend(a)?;
                out2.prepend(gap)?;
                median.prepend(cm.median(a, gap))?;
                i -= 1;
                j -= 1;
                if cell.contains(AffineDir::END_BLOCK) {
                    mode = Mode::Todo;
                }
            }
            Mode::Todo => unreachable!(),
        }
    }

    out1.prepend(gap)?;
    out2.prepend(gap)?;

    Ok((out1, out2, median))
}
