//! Interleaved weighted round robin.
//!
//! ## Architecture
//!
//! ```text
//!   nodes:   [ A w=4 ][ B w=2 ][ C w=2 ]      step = gcd(4, 2, 2) = 2
//!
//!   round     current weight    eligible (w ≥ current)
//!   ─────     ──────────────    ──────────────────────
//!     1             4           A
//!     2             2           A B C
//!     3             4           A            (dropped to 0, reset to max)
//!
//!   sequence:  A  A B C  A  A B C ...
//! ```
//!
//! Every call advances the cursor cyclically. Each time the cursor wraps to
//! the first node, the current weight drops by the step and resets to the
//! maximum weight once it reaches zero. The first node whose weight is at
//! least the current weight is returned. Heavy nodes are spread across the
//! cycle instead of being served in one burst.
//!
//! ## Example Usage
//!
//! ```
//! use boundcache::scheduling::{RoundRobin, Weight};
//!
//! struct Server {
//!     id: u32,
//!     weight: u32,
//! }
//!
//! impl Weight for Server {
//!     fn weight(&self) -> u32 {
//!         self.weight
//!     }
//! }
//!
//! let mut rr = RoundRobin::new(vec![
//!     Server { id: 1, weight: 1 },
//!     Server { id: 2, weight: 1 },
//! ]);
//!
//! let picks: Vec<u32> = (0..4).filter_map(|_| rr.next().map(|s| s.id)).collect();
//! assert_eq!(picks, vec![1, 2, 1, 2]);
//! ```

use crate::util::gcd_pair;

/// Node capability: a relative share of the picks.
pub trait Weight {
    fn weight(&self) -> u32;
}

impl<T: Weight + ?Sized> Weight for &T {
    fn weight(&self) -> u32 {
        (**self).weight()
    }
}

/// Weighted round-robin selector over a fixed set of nodes.
#[derive(Debug, Clone)]
pub struct RoundRobin<N> {
    nodes: Vec<N>,
    cursor: Option<usize>,
    current: u64,
}

impl<N: Weight> RoundRobin<N> {
    pub fn new(nodes: Vec<N>) -> Self {
        Self {
            nodes,
            cursor: None,
            current: 0,
        }
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Restarts the schedule from the first node.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.current = 0;
    }

    /// Returns the next node, or `None` if there are no nodes or every
    /// weight is zero.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&N> {
        let max = self.max_weight();
        if max == 0 {
            return None;
        }
        let step = self.step();
        let count = self.nodes.len();

        loop {
            let index = self.cursor.map_or(0, |cursor| (cursor + 1) % count);
            self.cursor = Some(index);

            if index == 0 {
                self.current = self.current.saturating_sub(step);
                if self.current == 0 {
                    self.current = max;
                }
            }

            if u64::from(self.nodes[index].weight()) >= self.current {
                return Some(&self.nodes[index]);
            }
        }
    }

    fn max_weight(&self) -> u64 {
        self.nodes
            .iter()
            .map(|node| u64::from(node.weight()))
            .max()
            .unwrap_or(0)
    }

    /// GCD of the non-zero weights; a single non-zero weight is its own step.
    fn step(&self) -> u64 {
        self.nodes
            .iter()
            .map(|node| u64::from(node.weight()))
            .filter(|&weight| weight > 0)
            .fold(0, |acc, weight| {
                if acc == 0 {
                    weight
                } else {
                    gcd_pair(acc, weight)
                }
            })
    }
}
