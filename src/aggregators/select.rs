//! Randomized quickselect and exact median over a materialized group.
//!
//! Expected O(n) per call. The loop narrows into one partition per round
//! instead of recursing, so adversarial pivots cost time but never stack.

use std::cmp::Ordering;

use rand::Rng;

use crate::aggregators::utility::rounded_mean;

/// Returns the value at 0-based position `index` of `values` in ascending
/// order, without sorting. `None` if `index` is out of range.
pub fn select<R: Rng + ?Sized>(values: &[i64], index: usize, rng: &mut R) -> Option<i64> {
    if index >= values.len() {
        return None;
    }

    let mut index = index;
    let mut current = values.to_vec();

    loop {
        let pivot = current[rng.gen_range(0..current.len())];

        let mut smaller = Vec::new();
        let mut bigger = Vec::new();
        let mut equal = 0usize;
        for &v in &current {
            match v.cmp(&pivot) {
                Ordering::Less => smaller.push(v),
                Ordering::Greater => bigger.push(v),
                Ordering::Equal => equal += 1,
            }
        }

        if index < smaller.len() {
            current = smaller;
        } else if index < smaller.len() + equal {
            return Some(pivot);
        } else {
            index -= smaller.len() + equal;
            current = bigger;
        }
    }
}

/// Exact median of `values`; the two middle values of an even-sized
/// collection are averaged with [`rounded_mean`]. `None` if empty.
pub fn median<R: Rng + ?Sized>(values: &[i64], rng: &mut R) -> Option<i64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        return select(values, n / 2, rng);
    }
    let lower = select(values, (n - 1) / 2, rng)?;
    let upper = select(values, (n + 1) / 2, rng)?;
    Some(rounded_mean(lower, upper))
}
