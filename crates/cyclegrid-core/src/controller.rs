#![forbid(unsafe_code)]

//! The dataset / selection / geometry owner.
//!
//! [`Controller`] is the single writer of visualizer state. Each public
//! method is one event from the outside world:
//!
//! | Event                 | Recomputes                        |
//! |-----------------------|-----------------------------------|
//! | dataset arrives       | selection, palette, index, layout |
//! | selection change      | index                             |
//! | palette policy change | palette, index                    |
//! | viewport resize       | layout                            |
//! | order change          | nothing derived                   |
//!
//! Derived values are rebuilt into fresh values and then swapped in, so a
//! reader holding an `Arc` snapshot never observes a half-built index.

use std::fmt::Display;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use crate::logging::{debug, info, warn};
#[cfg(not(feature = "tracing"))]
use crate::{debug, info, warn};

use crate::cell_index::CellIndex;
use crate::coords::AddressingMode;
use crate::dataset::{CycleDataset, SeriesId};
use crate::layout::{CellGeometry, Viewport};
use crate::palette::{Palette, PalettePolicy};
use crate::pointer::{GridHit, PointerMapper};
use crate::request::{RequestKey, RequestTicket, RequestTracker};
use crate::selection::{OrderMode, Selection};

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The dataset replaced the previous one.
    Applied,
    /// The request failed; the previous dataset stays.
    Failed,
    /// A newer request superseded this one; nothing changed.
    Stale,
}

/// Owner of the visualizer's state.
#[derive(Debug, Clone)]
pub struct Controller {
    dataset: Arc<CycleDataset>,
    /// Addressing mode the current dataset was computed under.
    dataset_mode: AddressingMode,
    selection: Selection,
    palette: Arc<Palette>,
    index: Arc<CellIndex>,
    order: OrderMode,
    viewport: Viewport,
    geometry: CellGeometry,
    requested: RequestKey,
    tracker: RequestTracker,
    last_error: Option<String>,
}

impl Controller {
    /// A controller with no dataset that will ask for `initial` first.
    pub fn new(initial: RequestKey, policy: PalettePolicy, order: OrderMode) -> Self {
        Self {
            dataset: Arc::new(CycleDataset::empty()),
            dataset_mode: initial.mode,
            selection: Selection::default(),
            palette: Arc::new(Palette::assign(policy, None)),
            index: Arc::new(CellIndex::default()),
            order,
            viewport: Viewport::default(),
            geometry: CellGeometry::default(),
            requested: initial,
            tracker: RequestTracker::new(),
            last_error: None,
        }
    }

    // ── Requests ────────────────────────────────────────────────────────

    /// Issue a ticket for the currently requested key.
    pub fn request(&mut self) -> RequestTicket {
        let ticket = self.tracker.issue(self.requested);
        info!(
            epoch = ticket.epoch,
            modulus = ticket.key.modulus,
            mode = %ticket.key.mode,
            "dataset requested"
        );
        ticket
    }

    /// Change the requested key and issue a ticket for it.
    pub fn request_key(&mut self, key: RequestKey) -> RequestTicket {
        self.requested = key;
        self.request()
    }

    /// Apply a completed request.
    ///
    /// Only the outstanding ticket is honored. A successful response replaces
    /// the dataset, resets the selection to all-active, and rebuilds every
    /// derived value. A failure, or a dataset whose modulus is not the one
    /// the ticket asked for, keeps the previous dataset and records the
    /// message.
    pub fn apply_response<E: Display>(
        &mut self,
        ticket: RequestTicket,
        result: Result<CycleDataset, E>,
    ) -> ApplyOutcome {
        if !self.tracker.settle(&ticket) {
            debug!(
                epoch = ticket.epoch,
                current = self.tracker.epoch(),
                "stale response discarded"
            );
            return ApplyOutcome::Stale;
        }
        let message = match result {
            Ok(dataset) if dataset.modulus() == ticket.key.modulus => {
                self.install(dataset, ticket.key.mode);
                self.last_error = None;
                return ApplyOutcome::Applied;
            }
            Ok(dataset) => format!(
                "response has base {} but {} was requested",
                dataset.modulus(),
                ticket.key
            ),
            Err(error) => error.to_string(),
        };
        warn!(epoch = ticket.epoch, error = %message, "dataset request failed");
        self.last_error = Some(message);
        ApplyOutcome::Failed
    }

    fn install(&mut self, dataset: CycleDataset, mode: AddressingMode) {
        let selection = Selection::all_active(dataset.len());
        let palette = Palette::assign(self.palette.policy(), Some(dataset.len()));
        let index = CellIndex::build(&dataset, &selection, &palette);
        let geometry = CellGeometry::compute(dataset.modulus(), self.viewport);
        info!(
            modulus = dataset.modulus(),
            series = dataset.len(),
            keys = index.len(),
            "dataset applied"
        );

        self.dataset = Arc::new(dataset);
        self.dataset_mode = mode;
        self.selection = selection;
        self.palette = Arc::new(palette);
        self.index = Arc::new(index);
        self.geometry = geometry;
    }

    // ── Selection & presentation ───────────────────────────────────────

    /// Flip one series. Returns its new state, `None` for unknown ids.
    pub fn toggle(&mut self, id: SeriesId) -> Option<bool> {
        let state = self.selection.toggle(id)?;
        self.rebuild_index();
        Some(state)
    }

    pub fn select_all(&mut self) {
        self.selection.select_all();
        self.rebuild_index();
    }

    pub fn select_none(&mut self) {
        self.selection.select_none();
        self.rebuild_index();
    }

    /// Change the presentation order. The index is untouched.
    pub fn set_order(&mut self, order: OrderMode) {
        self.order = order;
    }

    /// Switch palette policy and recolor every series.
    pub fn set_palette_policy(&mut self, policy: PalettePolicy) {
        if policy == self.palette.policy() {
            return;
        }
        let count = (!self.dataset.is_empty()).then(|| self.dataset.len());
        self.palette = Arc::new(Palette::assign(policy, count));
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        let index = CellIndex::build(&self.dataset, &self.selection, &self.palette);
        self.index = Arc::new(index);
    }

    // ── Layout & pointer ───────────────────────────────────────────────

    /// Record a viewport size change. Returns whether the geometry changed.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        let geometry = CellGeometry::compute(self.dataset.modulus(), viewport);
        if geometry == self.geometry {
            return false;
        }
        debug!(
            width = viewport.width,
            height = viewport.height,
            cell_side = geometry.cell_side,
            grid_side = geometry.grid_side,
            "geometry recomputed"
        );
        self.geometry = geometry;
        true
    }

    /// Mapper for the grid as currently laid out, top-left at the origin.
    pub fn pointer_mapper(&self) -> PointerMapper {
        PointerMapper::new(self.dataset_mode, self.geometry)
    }

    /// Hit-test a viewport pixel for a grid whose corner is at `origin`.
    pub fn hit_test(&self, origin: (i64, i64), px: i64, py: i64) -> Option<GridHit> {
        self.pointer_mapper()
            .with_origin(origin.0, origin.1)
            .locate(px, py)
    }

    // ── Snapshots ──────────────────────────────────────────────────────

    #[inline]
    pub fn dataset(&self) -> &Arc<CycleDataset> {
        &self.dataset
    }

    /// Addressing mode of the dataset on screen (not necessarily requested).
    #[inline]
    pub fn dataset_mode(&self) -> AddressingMode {
        self.dataset_mode
    }

    #[inline]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[inline]
    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    #[inline]
    pub fn cell_index(&self) -> &Arc<CellIndex> {
        &self.index
    }

    #[inline]
    pub fn order(&self) -> OrderMode {
        self.order
    }

    /// Series ids in the current presentation order.
    pub fn ordered_series(&self) -> Vec<SeriesId> {
        self.order.arrange(&self.dataset)
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn geometry(&self) -> CellGeometry {
        self.geometry
    }

    #[inline]
    pub fn requested(&self) -> RequestKey {
        self.requested
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.tracker.is_loading()
    }

    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
