//! # In-Place Merge Sort
//!
//! The input is halved, both halves are sorted recursively, and the halves
//! are merged without extra storage. Two properties matter for the memory
//! map code that relies on this:
//!
//! * **Stable**: items that compare equal keep their relative order.
//! * **Cheap on ordered input**: if the last item of the left half does not
//!   compare greater than the first item of the right half, the merge is
//!   skipped entirely. Firmware usually reports its map nearly sorted.
//!
//! Merging moves a smaller right-hand item in front of the remaining left
//! run with a single-step rotation. That is `O(n²)` moves in the worst case,
//! which is fine for arrays in the low hundreds; comparisons stay at
//! `O(n log n)`.

use core::cmp::Ordering;

/// Three-way ordering of two items of type `T`.
pub trait Comparer<T: ?Sized> {
    /// `Less` if `lhs` must sort before `rhs`, `Greater` if after,
    /// `Equal` if their order must be preserved.
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering;
}

impl<T, F> Comparer<T> for F
where
    T: ?Sized,
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        self(lhs, rhs)
    }
}

/// Orders items by their [`Ord`] implementation.
#[derive(Copy, Clone, Debug, Default)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparer<T> for NaturalOrder {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Sort `items` in place, ordered by `comparer`.
///
/// Slices of fewer than two items are left untouched.
pub fn sort<T, C>(items: &mut [T], comparer: &C)
where
    C: Comparer<T> + ?Sized,
{
    sort_by(items, |lhs, rhs| comparer.compare(lhs, rhs));
}

/// Sort `items` in place, ordered by the `compare` closure.
pub fn sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort(items, &mut compare);
}

/// Whether no item in `items` compares greater than its successor.
#[must_use]
pub fn is_sorted_by<T, C>(items: &[T], comparer: &C) -> bool
where
    C: Comparer<T> + ?Sized,
{
    items
        .windows(2)
        .all(|pair| comparer.compare(&pair[0], &pair[1]) != Ordering::Greater)
}

fn merge_sort<T, F>(items: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let count = items.len();
    if count < 2 {
        return;
    }

    let lower_count = count / 2;
    merge_sort(&mut items[..lower_count], compare);
    merge_sort(&mut items[lower_count..], compare);
    merge(items, lower_count, compare);
}

/// Merge the sorted runs `items[..mid]` and `items[mid..]`.
fn merge<T, F>(items: &mut [T], mid: usize, compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    // All the left items already appear before all the right items.
    if compare(&items[mid - 1], &items[mid]) != Ordering::Greater {
        return;
    }

    // items[..left] is final, items[left..right] is what remains of the left
    // run and items[right..] what remains of the right run.
    let mut left = 0;
    let mut right = mid;

    while left < right && right < items.len() {
        if compare(&items[right], &items[left]) == Ordering::Less {
            // The right item goes first; the left run moves up by one slot.
            items[left..=right].rotate_right(1);
            right += 1;
        }
        left += 1;
    }
}
