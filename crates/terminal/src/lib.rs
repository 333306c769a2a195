//! In-process ANSI/VT terminal emulator.
//!
//! Pure cell-grid state: no PTY, no sockets, no process handling. Feed it
//! raw child output bytes via [`Screen::feed`] and read back the grid,
//! cursor, debug ring and pending replies. `crates/host` owns everything
//! that touches a file descriptor.

pub mod attrs;
pub mod debug_ring;
pub mod render;
pub mod screen;

pub use attrs::{Attrs, Color, Pen};
pub use debug_ring::{DebugEntry, DebugRing};
pub use render::{render_ansi, render_ascii};
pub use screen::{Cell, Cursor, Screen};

/// Default screen size absent an explicit `--size` (spec.md §6).
pub const DEFAULT_ROWS: usize = 24;
pub const DEFAULT_COLS: usize = 80;

/// Column spacing of a tab stop (spec.md §4.1's `\t` handling).
pub const TAB_WIDTH: usize = 8;

/// Default debug ring capacity (spec.md §3's "Terminal defaults").
pub const DEBUG_RING_CAPACITY: usize = debug_ring::DEFAULT_CAPACITY;
