//! 0/1 knapsack over integer efforts.
//!
//! Value equals weight, so the problem reduces to subset-sum: find the
//! largest achievable total not exceeding the capacity.
//!
//! # Algorithm
//! 1. Drop items that can never be chosen; take everything if it all fits.
//! 2. Divide weights and capacity by the GCD of the weights.
//! 3. If the reduced capacity is at most [`DENSE_LIMIT`], run a
//!    reachability DP over sums `0..=capacity`. Each sum remembers the item
//!    that first reached it; sums are scanned downward per item, so every
//!    chain of predecessors uses strictly decreasing item indices and the
//!    reconstruction never reuses an item.
//! 4. Otherwise track only the reachable sums. If their number exceeds
//!    [`SPARSE_LIMIT`], fall back to a largest-first greedy fill.
//!
//! Steps 3 and 4 are exact. The greedy fallback is a heuristic: it never
//! exceeds the capacity but may leave some of it unused.
//!
//! # Complexity
//! Dense: O(n · C') time and O(C') space with C' ≤ `DENSE_LIMIT`.
//! Sparse: O(n · S log S) with S ≤ `SPARSE_LIMIT`. Greedy: O(n log n).
//! Memory never depends on the magnitude of the weights.
//!
//! # Reference
//! Kellerer, Pferschy & Pisinger (2004), "Knapsack Problems", Ch. 4

use std::collections::BTreeMap;

use tracing::trace;

/// Largest reduced capacity solved with the dense table.
pub const DENSE_LIMIT: i64 = 1 << 20;

/// Most reachable sums tracked before switching to the greedy fill.
pub const SPARSE_LIMIT: usize = 1 << 16;

/// A knapsack solution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnapsackSelection {
    /// Indices of chosen items, ascending.
    pub indices: Vec<usize>,
    /// Sum of chosen weights.
    pub total: i64,
}

/// Chooses items maximizing total weight without exceeding `capacity`.
///
/// Items with non-positive weight or weight above capacity are never
/// chosen. Deterministic: among optimal subsets, the one found by the
/// first-reach rule over the given item order is returned.
pub fn select_max_weight(weights: &[i64], capacity: i64) -> KnapsackSelection {
    if capacity <= 0 {
        return KnapsackSelection::default();
    }

    let usable: Vec<usize> = (0..weights.len())
        .filter(|&i| weights[i] > 0 && weights[i] <= capacity)
        .collect();
    let sum = usable
        .iter()
        .fold(0i64, |acc, &i| acc.saturating_add(weights[i]));

    // Everything fits: no search needed.
    if sum <= capacity {
        return KnapsackSelection {
            indices: usable,
            total: sum,
        };
    }

    let divisor = usable.iter().fold(0, |g, &i| gcd(g, weights[i])).max(1);
    let reduced: Vec<i64> = usable.iter().map(|&i| weights[i] / divisor).collect();
    let reduced_cap = capacity / divisor;

    let picked = if reduced_cap <= DENSE_LIMIT {
        dense(&reduced, reduced_cap)
    } else {
        match sparse(&reduced, reduced_cap) {
            Some(picked) => picked,
            None => {
                trace!(items = reduced.len(), "knapsack state limit hit, greedy fill");
                greedy(&reduced, reduced_cap)
            }
        }
    };

    let mut indices: Vec<usize> = picked.into_iter().map(|k| usable[k]).collect();
    indices.sort_unstable();
    let total = indices.iter().map(|&i| weights[i]).sum();
    KnapsackSelection { indices, total }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Table DP; returns positions into `weights`.
fn dense(weights: &[i64], capacity: i64) -> Vec<usize> {
    let cap = capacity as usize;
    let mut reached = vec![false; cap + 1];
    let mut via: Vec<usize> = vec![usize::MAX; cap + 1];
    reached[0] = true;

    for (item, &weight) in weights.iter().enumerate() {
        let w = weight as usize;
        for s in (w..=cap).rev() {
            if !reached[s] && reached[s - w] {
                reached[s] = true;
                via[s] = item;
            }
        }
        if reached[cap] {
            break;
        }
    }

    let best = (0..=cap).rev().find(|&s| reached[s]).unwrap_or(0);

    let mut picked = Vec::new();
    let mut s = best;
    while s > 0 {
        let item = via[s];
        picked.push(item);
        s -= weights[item] as usize;
    }
    picked
}

/// Reachable-sum DP keyed by sum. `None` once more than
/// [`SPARSE_LIMIT`] sums are reachable.
fn sparse(weights: &[i64], capacity: i64) -> Option<Vec<usize>> {
    // sum -> item that first reached it
    let mut via: BTreeMap<i64, Option<usize>> = BTreeMap::new();
    via.insert(0, None);

    for (item, &w) in weights.iter().enumerate() {
        let fresh: Vec<i64> = via
            .keys()
            .filter_map(|&s| s.checked_add(w))
            .filter(|&s| s <= capacity && !via.contains_key(&s))
            .collect();
        for s in fresh {
            via.insert(s, Some(item));
        }
        if via.len() > SPARSE_LIMIT {
            return None;
        }
        if via.contains_key(&capacity) {
            break;
        }
    }

    let mut picked = Vec::new();
    let mut s = via.keys().next_back().copied().unwrap_or(0);
    while let Some(&Some(item)) = via.get(&s) {
        picked.push(item);
        s -= weights[item];
    }
    Some(picked)
}

/// Largest first, skipping items that no longer fit.
fn greedy(weights: &[i64], capacity: i64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| weights[b].cmp(&weights[a]).then(a.cmp(&b)));

    let mut room = capacity;
    let mut picked = Vec::new();
    for item in order {
        if weights[item] <= room {
            room -= weights[item];
            picked.push(item);
        }
    }
    picked
}
