//! Layout-adaptation policy for the LDLT kernel.
//!
//! The kernel has two elimination orders: a column-oriented right-looking
//! sweep that streams down contiguous columns, and a row-oriented sweep that
//! streams along contiguous rows. A strategy picks which storage the chosen
//! sweep runs on. Every strategy yields the same L and D up to rounding.

use super::view::Layout;

/// Where the factorization runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FactorizationStrategy {
    /// Factor directly in the destination's layout, no n×n temporary.
    #[default]
    Standard,
    /// Factor in a column-major working copy when the destination is row-major.
    DeferToColMajor,
    /// Factor in a row-major working copy when the destination is column-major.
    DeferToRowMajor,
}

impl FactorizationStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [FactorizationStrategy; 3] = [
        FactorizationStrategy::Standard,
        FactorizationStrategy::DeferToColMajor,
        FactorizationStrategy::DeferToRowMajor,
    ];

    /// Layout of the temporary working copy for a destination in `dst`, or
    /// `None` when the kernel should run on the destination directly.
    /// The source layout is not consulted: a destination already in the
    /// preferred layout reads a source of the other layout while copying.
    #[inline]
    pub fn working_layout(self, dst: Layout) -> Option<Layout> {
        let preferred = match self {
            FactorizationStrategy::Standard => return None,
            FactorizationStrategy::DeferToColMajor => Layout::ColMajor,
            FactorizationStrategy::DeferToRowMajor => Layout::RowMajor,
        };
        if preferred == dst {
            None
        } else {
            Some(preferred)
        }
    }
}
