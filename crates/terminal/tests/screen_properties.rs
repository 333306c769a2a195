//! Property-based tests fuzzing `Screen::feed` with arbitrary byte streams.
//!
//! Grounded in the teacher's `crates/test-harness/tests/state_properties.rs`
//! (proptest over a mutable state machine, asserting invariants after every
//! step rather than checking one fixed example).

use proptest::prelude::*;
use terminal::Screen;

proptest! {
    /// Feeding any byte sequence never panics and never moves the cursor
    /// outside the grid.
    #[test]
    fn feed_never_panics_and_cursor_stays_in_bounds(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut screen = Screen::new(24, 80);
        screen.feed(&bytes);

        let (rows, cols) = screen.dimensions();
        let cursor = screen.cursor();
        prop_assert!(cursor.row < rows, "cursor row {} out of {} rows", cursor.row, rows);
        prop_assert!(cursor.col <= cols, "cursor col {} out of {} cols", cursor.col, cols);
    }

    /// Row count and row width never change from arbitrary input; only an
    /// explicit resize (not exercised by `feed`) may do that.
    #[test]
    fn feed_never_resizes_the_grid(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut screen = Screen::new(24, 80);
        screen.feed(&bytes);

        let (rows, cols) = screen.dimensions();
        prop_assert_eq!(rows, 24);
        prop_assert_eq!(cols, 80);
        for row in screen.rows_iter() {
            prop_assert_eq!(row.len(), 80);
        }
    }

    /// Feeding a byte stream in one call or split across many `feed` calls
    /// at arbitrary boundaries produces the same grid (mid-UTF-8 and
    /// mid-CSI splits must be buffered correctly across calls).
    #[test]
    fn feed_is_chunk_boundary_independent(
        bytes in prop::collection::vec(any::<u8>(), 0..256),
        splits in prop::collection::vec(0usize..256, 0..8),
    ) {
        let mut whole = Screen::new(24, 80);
        whole.feed(&bytes);

        let mut points: Vec<usize> = splits.into_iter().filter(|p| *p <= bytes.len()).collect();
        points.sort_unstable();
        points.dedup();

        let mut chunked = Screen::new(24, 80);
        let mut last = 0;
        for point in points {
            chunked.feed(&bytes[last..point]);
            last = point;
        }
        chunked.feed(&bytes[last..]);

        for (a, b) in whole.rows_iter().zip(chunked.rows_iter()) {
            prop_assert_eq!(
                a.iter().map(|c| c.ch).collect::<String>(),
                b.iter().map(|c| c.ch).collect::<String>()
            );
        }
        prop_assert_eq!(whole.cursor(), chunked.cursor());
    }
}
