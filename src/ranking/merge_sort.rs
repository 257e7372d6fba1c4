//! Stable top-down merge sort.
//!
//! # Reference
//! Knuth (1998), "The Art of Computer Programming, Vol. 3", §5.2.4

use std::cmp::Ordering;

/// Returns a sorted copy of `items`.
///
/// Stable: elements comparing `Equal` keep their input order.
/// O(n log n) comparisons, O(n) scratch space.
pub fn merge_sort_by<T, F>(items: &[T], mut compare: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut data = items.to_vec();
    if data.len() > 1 {
        let mut scratch = data.clone();
        sort_run(&mut data, &mut scratch, &mut compare);
    }
    data
}

fn sort_run<T, F>(data: &mut [T], scratch: &mut [T], compare: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = data.len();
    if len <= 1 {
        return;
    }

    let mid = len / 2;
    {
        let (left, right) = data.split_at_mut(mid);
        let (scratch_left, scratch_right) = scratch.split_at_mut(mid);
        sort_run(left, scratch_left, compare);
        sort_run(right, scratch_right, compare);
    }

    // Already ordered across the seam.
    if compare(&data[mid], &data[mid - 1]) != Ordering::Less {
        return;
    }

    let (mut i, mut j, mut k) = (0, mid, 0);
    while i < mid && j < len {
        // Take from the right only when strictly smaller (stability).
        if compare(&data[j], &data[i]) == Ordering::Less {
            scratch[k] = data[j].clone();
            j += 1;
        } else {
            scratch[k] = data[i].clone();
            i += 1;
        }
        k += 1;
    }
    while i < mid {
        scratch[k] = data[i].clone();
        i += 1;
        k += 1;
    }
    while j < len {
        scratch[k] = data[j].clone();
        j += 1;
        k += 1;
    }

    data.clone_from_slice(&scratch[..len]);
}
