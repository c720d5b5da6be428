//! Exact running median over two balanced priority orderings.
//!
//! `low` is a max-heap holding the smaller half of all values seen, `high` a
//! min-heap holding the rest. After every push:
//!
//! 1) every value in `low` is <= every value in `high`
//! 2) `0 <= high.len() - low.len() <= 1`
//!
//! so the median is the top of `high`, or the rounded mean of both tops when
//! the halves are the same size. Each push is O(log k).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::aggregators::utility::rounded_mean;

#[derive(Debug, Default, Clone)]
pub struct RunningMedian {
    low: BinaryHeap<i64>,
    high: BinaryHeap<Reverse<i64>>,
}

impl RunningMedian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value`, keeping both halves ordered and balanced.
    pub fn push(&mut self, value: i64) {
        // Push-then-pop through `high`, then through `low`: `x` ends up as
        // the largest value that belongs in the low half.
        let mut x = value;
        if let Some(mut min_high) = self.high.peek_mut() {
            if min_high.0 < x {
                std::mem::swap(&mut min_high.0, &mut x);
            }
        }
        if let Some(mut max_low) = self.low.peek_mut() {
            if *max_low > x {
                std::mem::swap(&mut *max_low, &mut x);
            }
        }

        if self.high.len() <= self.low.len() {
            self.high.push(Reverse(x));
        } else {
            self.low.push(x);
        }
    }

    /// Current median, or `None` before the first push.
    pub fn median(&self) -> Option<i64> {
        let Reverse(min_high) = *self.high.peek()?;
        if self.high.len() > self.low.len() {
            return Some(min_high);
        }
        let max_low = *self.low.peek()?;
        Some(rounded_mean(max_low, min_high))
    }

    pub fn len(&self) -> usize {
        self.low.len() + self.high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty()
    }

    /// Sizes of the `(low, high)` halves.
    pub fn partition_sizes(&self) -> (usize, usize) {
        (self.low.len(), self.high.len())
    }
}

/// Count, total and median for one (recipient, zip code) group.
///
/// `total` is widened to `i128`: a `u64` count of `i64` amounts cannot
/// overflow it.
#[derive(Debug, Default, Clone)]
pub struct RunningGroupState {
    pub count: u64,
    pub total: i128,
    pub median: i64,
    values: RunningMedian,
}

impl RunningGroupState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one amount into the group and returns the updated state.
    pub fn update(&mut self, amount: i64) -> &Self {
        self.values.push(amount);
        self.count += 1;
        self.total += i128::from(amount);
        self.median = self.values.median().unwrap_or(amount);
        self
    }

    pub fn partition_sizes(&self) -> (usize, usize) {
        self.values.partition_sizes()
    }
}
