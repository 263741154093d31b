//! Determinism utilities: stable ordering for ranked output.
//!
//! This module is **I/O-free**. Maps across the engine are `BTreeMap`s, so most
//! output order is already key order; ranking order is derived from values.

use core::cmp::Ordering;

use crate::money::Money;

/* -------------------------------------------------------------------------- */
/*                               Stable Ordering                              */
/* -------------------------------------------------------------------------- */

/// Ranking order: higher total first, then ascending id.
#[inline]
pub fn cmp_total_desc_then_id(a_total: Money, a_id: &str, b_total: Money, b_id: &str) -> Ordering {
    match b_total.cmp(&a_total) {
        Ordering::Equal => a_id.cmp(b_id),
        o => o,
    }
}
