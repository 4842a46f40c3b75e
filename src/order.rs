//! Default ordering for unordered siblings.
//!
//! Categories within a pool and faces within a category are displayed by
//! ascending `order`. Authors rarely want to number every entry by hand, so
//! an entry added without an explicit order is placed one block after the
//! previously added sibling:
//!
//! ```text
//! base = 1000
//!
//! add "Niko"      (no order)   → unset  (first sibling, nothing to follow)
//! add "Alula"     (no order)   → 1000
//! add "Calamus"   (order 1500) → 1500
//! add "Kip"       (no order)   → 2000   (next block after 1500)
//! ```
//!
//! Quantizing to the base leaves room for manual insertions between blocks
//! (`1500` above) without renumbering everything after them.
//!
//! An unset order sorts as `0`. Ties are broken by name, so two siblings
//! that land on the same block still have a deterministic display order.

use std::cmp::Ordering;

/// Default quantum for generated order values.
pub const DEFAULT_ORDER_BASE: i64 = 1000;

/// Quantized spacing rule for generated order values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPolicy {
    base: i64,
}

impl OrderPolicy {
    /// Create a policy with the given quantum. Non-positive values fall back
    /// to [`DEFAULT_ORDER_BASE`]; config validation rejects them earlier.
    pub fn new(base: i64) -> Self {
        if base > 0 {
            Self { base }
        } else {
            Self::default()
        }
    }

    pub fn base(self) -> i64 {
        self.base
    }

    /// Smallest multiple of the base strictly greater than `order`.
    ///
    /// - `next_order(0)` → `1000`
    /// - `next_order(1000)` → `2000`
    /// - `next_order(1500)` → `2000`
    /// - `next_order(-500)` → `0`
    pub fn next_order(self, order: i64) -> i64 {
        order
            .div_euclid(self.base)
            .saturating_add(1)
            .saturating_mul(self.base)
    }
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_ORDER_BASE,
        }
    }
}

/// The order value used for sorting: unset counts as zero.
pub fn effective_order(order: Option<i64>) -> i64 {
    order.unwrap_or(0)
}

/// Display-order comparison: ascending order, then name.
pub fn compare(a_order: Option<i64>, a_name: &str, b_order: Option<i64>, b_name: &str) -> Ordering {
    effective_order(a_order)
        .cmp(&effective_order(b_order))
        .then_with(|| a_name.cmp(b_name))
}
