#![cfg_attr(not(test), forbid(unsafe_code))]

//! Core: the toroidal coordinate grid engine.
//!
//! # Role in cyclegrid
//! `cyclegrid-core` owns every piece of the visualizer that carries an
//! invariant. It has no I/O: datasets arrive from `cyclegrid-client`, frames
//! are painted by the binary, and the runtime only moves events around.
//!
//! # Primary responsibilities
//! - **Coordinates**: addressing modes, coordinate keys, and axis enumeration.
//! - **Pairs**: circular adjacency pairs for one sequence.
//! - **CellIndex**: coordinate key → ordered stack of series contributions.
//! - **Palette**: deterministic series → color assignment.
//! - **Layout**: square cell geometry for a viewport.
//! - **Pointer**: viewport pixel → logical coordinate hit-testing.
//! - **Selection**: active set and presentation order.
//! - **Controller**: owns the dataset/selection/geometry triple and swaps
//!   derived state atomically.
//!
//! # How it fits in the system
//! The binary's model holds a [`Controller`]. Every user action or fetch
//! completion becomes one controller call; the view then reads the current
//! [`CellIndex`] and [`CellGeometry`] snapshots.

pub mod cell_index;
pub mod controller;
pub mod coords;
pub mod dataset;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod pairs;
pub mod palette;
pub mod pointer;
pub mod request;
pub mod selection;

pub use cell_index::{CellEntry, CellIndex};
pub use controller::{ApplyOutcome, Controller};
pub use coords::{AddressingMode, AxisRange, CoordKey};
pub use dataset::{CycleDataset, SeriesId};
pub use geometry::Rect;
pub use layout::{CellGeometry, MIN_CELL_SIDE, Viewport};
pub use pairs::{CircularPairs, circular_pairs};
pub use palette::{Palette, PalettePolicy, Rgb};
pub use pointer::{GridHit, PointerMapper};
pub use request::{RequestKey, RequestTicket, RequestTracker};
pub use selection::{OrderMode, Selection};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, warn};
