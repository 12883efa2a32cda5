//! Pagination over the flat image list
//!
//! A page is `steps` consecutive images starting at `index`. Besides the
//! visible page, the pages directly before and after it are derived so the
//! UI can decode them ahead of time. `index` is signed: "go to last page"
//! can put it below zero when a page is larger than the list, and every
//! slice clamps instead of failing.

/// Largest page size; config values and key presses are capped here
pub const MAX_STEPS: usize = i32::MAX as usize;

/// `list[start..end]` with both bounds clamped into the list.
///
/// Negative starts clamp to 0, ends past the list clamp to its length, and
/// an empty or inverted range gives an empty slice.
pub fn safe_slice<T>(list: &[T], start: i64, end: i64) -> &[T] {
    let len = list.len() as i64;
    let start = start.clamp(0, len) as usize;
    let end = end.clamp(0, len) as usize;
    if start >= end {
        &[]
    } else {
        &list[start..end]
    }
}

/// The three pages around the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindows<'a, T> {
    /// Page before the current one, preloaded but hidden
    pub prev: &'a [T],
    /// Visible page
    pub current: &'a [T],
    /// Page after the current one, preloaded but hidden
    pub next: &'a [T],
}

impl<'a, T> PageWindows<'a, T> {
    /// An empty current page means there is nothing to show
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// All three pages in display order
    pub fn iter(&self) -> impl Iterator<Item = &'a T> {
        self.prev.iter().chain(self.current).chain(self.next)
    }
}

/// Derive the previous, current and next pages
///
/// A negative `index` has no current page: it only arises from jumping to
/// the last page with a page size larger than the list, and the viewer
/// shows its fallback screen for it.
pub fn page_windows<T>(list: &[T], index: i64, steps: usize) -> PageWindows<'_, T> {
    let steps = signed(steps);
    let current = if index < 0 {
        &list[..0]
    } else {
        safe_slice(list, index, index.saturating_add(steps))
    };
    PageWindows {
        prev: safe_slice(list, index.saturating_sub(steps), index),
        current,
        next: safe_slice(
            list,
            index.saturating_add(steps),
            index.saturating_add(steps.saturating_mul(2)),
        ),
    }
}

/// Everything covered by [`page_windows`] as one contiguous slice
pub fn needed_window<T>(list: &[T], index: i64, steps: usize) -> &[T] {
    let steps = signed(steps);
    safe_slice(
        list,
        index.saturating_sub(steps),
        index.saturating_add(steps.saturating_mul(2)),
    )
}

/// Index after moving one page forward; never moves past the last item
pub fn advance(index: i64, steps: usize, len: usize) -> i64 {
    let next = index.saturating_add(signed(steps));
    if next < len as i64 {
        next
    } else {
        index
    }
}

/// Index after moving one page back, floored at 0
pub fn retreat(index: i64, steps: usize) -> i64 {
    let prev = index.saturating_sub(signed(steps));
    if prev > 0 {
        prev
    } else {
        0
    }
}

/// Start of the last full page; negative when `steps` exceeds `len`
pub fn last_page(steps: usize, len: usize) -> i64 {
    (len as i64).saturating_sub(signed(steps))
}

fn signed(steps: usize) -> i64 {
    i64::try_from(steps).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_safe_slice_never_out_of_bounds() {
        let list = items(5);
        for start in -8..12 {
            for end in -8..12 {
                let got = safe_slice(&list, start, end);
                let bound = (end.min(5) - start.max(0)).max(0) as usize;
                assert!(got.len() <= bound, "start={start} end={end}");
            }
        }
    }

    #[test]
    fn test_safe_slice_clamps() {
        let list = items(5);
        assert_eq!(safe_slice(&list, -3, 2), &[0, 1]);
        assert_eq!(safe_slice(&list, 3, 99), &[3, 4]);
        assert!(safe_slice(&list, 4, 2).is_empty());
        assert!(safe_slice(&list, 7, 9).is_empty());
        assert!(safe_slice(&list, -9, -2).is_empty());
        assert!(safe_slice::<usize>(&[], 0, 3).is_empty());
    }

    #[test]
    fn test_first_page() {
        let list = items(10);
        let w = page_windows(&list, 0, 3);
        assert!(w.prev.is_empty());
        assert_eq!(w.current, &list[0..3]);
        assert_eq!(w.next, &list[3..6]);
    }

    #[test]
    fn test_second_page() {
        let list = items(10);
        let w = page_windows(&list, 3, 3);
        assert_eq!(w.prev, &list[0..3]);
        assert_eq!(w.current, &list[3..6]);
        assert_eq!(w.next, &list[6..9]);
        assert_eq!(w.iter().count(), 9);
    }

    #[test]
    fn test_advance_does_not_overshoot() {
        assert_eq!(advance(0, 3, 10), 3);
        assert_eq!(advance(6, 3, 10), 9);
        assert_eq!(advance(8, 3, 10), 8);
        assert_eq!(advance(9, 1, 10), 9);
    }

    #[test]
    fn test_retreat_floors_at_zero() {
        assert_eq!(retreat(6, 3), 3);
        assert_eq!(retreat(3, 3), 0);
        assert_eq!(retreat(2, 3), 0);
        assert_eq!(retreat(-5, 2), 0);
    }

    #[test]
    fn test_last_page() {
        let list = items(5);
        let index = last_page(2, list.len());
        assert_eq!(index, 3);
        assert_eq!(page_windows(&list, index, 2).current, &[3, 4]);
    }

    #[test]
    fn test_last_page_larger_than_list() {
        let list = items(5);
        let index = last_page(10, list.len());
        assert_eq!(index, -5);
        let w = page_windows(&list, index, 10);
        assert!(w.is_empty());
        assert!(w.prev.is_empty());
        assert!(w.next.is_empty());
    }

    #[test]
    fn test_needed_window_covers_all_pages() {
        let list = items(10);
        assert_eq!(needed_window(&list, 3, 2), &list[1..7]);
        assert_eq!(needed_window(&list, 0, 4), &list[0..8]);
    }

    #[test]
    fn test_huge_steps_saturate() {
        let list = items(10);
        let steps = usize::MAX;

        let w = page_windows(&list, 0, steps);
        assert_eq!(w.current, &list[..]);
        assert!(w.prev.is_empty());
        assert!(w.next.is_empty());

        let w = page_windows(&list, i64::MAX - 1, steps);
        assert!(w.is_empty());

        assert_eq!(needed_window(&list, 4, steps), &list[..]);
        assert_eq!(advance(4, steps, list.len()), 4);
        assert_eq!(retreat(4, steps), 0);
        assert_eq!(last_page(steps, list.len()), 10 - i64::MAX);
    }
}
