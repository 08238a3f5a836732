#![forbid(unsafe_code)]

//! The interactive visualizer as a runtime [`Model`].
//!
//! Every key, mouse event, resize, and fetch completion becomes one
//! [`Msg`]. Fetches run as [`Cmd::Task`]s carrying the request ticket they
//! were issued with; the controller drops any completion whose ticket has
//! been superseded.

use std::sync::Arc;

use cyclegrid_client::{CycleSource, clamp_base};
use cyclegrid_core::{Controller, CycleDataset, RequestKey, RequestTicket};
use cyclegrid_runtime::{
    Cmd, CrosstermBackend, Event, Frame, KeyCode, KeyEvent, Model, MouseButton, MouseEvent,
    MouseEventKind, Program, ProgramConfig, SessionOptions,
};
use tracing::{debug, info};

use crate::cli::Settings;
use crate::error::{AppError, Result};
use crate::view::{self, GridPlacement, Panels, UiState};

#[derive(Debug)]
pub enum Msg {
    Resized { width: u16, height: u16 },
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// A fetch finished. The error is already rendered to text.
    Loaded(RequestTicket, std::result::Result<CycleDataset, String>),
    Ignore,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Resize { width, height } => Msg::Resized { width, height },
            Event::Key(key) if key.is_press() => Msg::Key(key),
            Event::Mouse(mouse) => Msg::Mouse(mouse),
            _ => Msg::Ignore,
        }
    }
}

pub struct VisualizerModel {
    controller: Controller,
    source: Arc<dyn CycleSource>,
    ui: UiState,
    size: (u16, u16),
}

impl VisualizerModel {
    pub fn new(source: Arc<dyn CycleSource>, settings: Settings) -> Self {
        Self {
            controller: Controller::new(settings.key, settings.palette, settings.order),
            source,
            ui: UiState {
                labels: settings.labels,
                ..UiState::default()
            },
            size: (0, 0),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    fn panels(&self) -> Panels {
        Panels::compute(self.size.0, self.size.1)
    }

    fn placement(&self) -> GridPlacement {
        GridPlacement::new(self.panels().grid, self.controller.geometry(), self.ui.scroll)
    }

    // ── Fetching ───────────────────────────────────────────────────────

    fn fetch(&self, ticket: RequestTicket) -> Cmd<Msg> {
        let source = Arc::clone(&self.source);
        Cmd::task(format!("fetch {}", ticket.key), move || {
            let result = source.fetch(ticket.key).map_err(|err| err.to_string());
            Msg::Loaded(ticket, result)
        })
    }

    fn request(&mut self, key: RequestKey) -> Cmd<Msg> {
        let ticket = self.controller.request_key(key);
        self.fetch(ticket)
    }

    fn step_base(&mut self, delta: i64) -> Cmd<Msg> {
        let current = self.controller.requested();
        let modulus = clamp_base(current.modulus.saturating_add(delta));
        if modulus == current.modulus {
            return Cmd::none();
        }
        self.request(RequestKey::new(modulus, current.mode))
    }

    fn toggle_mode(&mut self) -> Cmd<Msg> {
        let current = self.controller.requested();
        self.request(RequestKey::new(current.modulus, current.mode.toggled()))
    }

    fn loaded(&mut self, ticket: RequestTicket, result: std::result::Result<CycleDataset, String>) {
        let outcome = self.controller.apply_response(ticket, result);
        debug!(?outcome, epoch = ticket.epoch, "fetch completed");
        if outcome == cyclegrid_core::ApplyOutcome::Applied {
            self.ui.cursor = 0;
            self.ui.list_offset = 0;
            self.ui.scroll = (0, 0);
        }
    }

    // ── List ───────────────────────────────────────────────────────────

    fn move_cursor(&mut self, delta: isize) {
        let len = self.controller.dataset().len();
        if len == 0 {
            return;
        }
        self.ui.cursor = self.ui.cursor.saturating_add_signed(delta).min(len - 1);
        self.keep_cursor_visible();
    }

    fn keep_cursor_visible(&mut self) {
        let rows = self.panels().list_rows().max(1);
        if self.ui.cursor < self.ui.list_offset {
            self.ui.list_offset = self.ui.cursor;
        } else if self.ui.cursor >= self.ui.list_offset + rows {
            self.ui.list_offset = self.ui.cursor + 1 - rows;
        }
    }

    fn toggle_at_cursor(&mut self) {
        let order = self.controller.ordered_series();
        if let Some(&id) = order.get(self.ui.cursor) {
            self.controller.toggle(id);
        }
    }

    // ── Grid scrolling ─────────────────────────────────────────────────

    fn scroll_grid(&mut self, dx: i64, dy: i64) {
        let geometry = self.controller.geometry();
        let step = i64::from(geometry.cell_side.max(1));
        let (max_x, max_y) = GridPlacement::max_scroll(self.panels().grid, geometry);
        let shift = |value: u64, delta: i64, max: u64| -> u64 {
            value.saturating_add_signed(delta * step).min(max)
        };
        self.ui.scroll = (
            shift(self.ui.scroll.0, dx, max_x),
            shift(self.ui.scroll.1, dy, max_y),
        );
    }

    fn clamp_scroll(&mut self) {
        let (max_x, max_y) =
            GridPlacement::max_scroll(self.panels().grid, self.controller.geometry());
        self.ui.scroll = (self.ui.scroll.0.min(max_x), self.ui.scroll.1.min(max_y));
    }

    // ── Input ──────────────────────────────────────────────────────────

    fn on_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        if key.ctrl() && key.is_char('c') {
            return Cmd::quit();
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Escape => return Cmd::quit(),
            KeyCode::Char('+') | KeyCode::Char('=') => return self.step_base(1),
            KeyCode::Char('-') | KeyCode::Char('_') => return self.step_base(-1),
            KeyCode::Char('c') => return self.toggle_mode(),
            KeyCode::Char('r') => {
                let ticket = self.controller.request();
                return self.fetch(ticket);
            }
            KeyCode::Char('o') => {
                let next = self.controller.order().next();
                self.controller.set_order(next);
            }
            KeyCode::Char('p') => {
                let next = self.controller.palette().policy().toggled();
                self.controller.set_palette_policy(next);
            }
            KeyCode::Char('t') => self.ui.labels = !self.ui.labels,
            KeyCode::Char('a') => self.controller.select_all(),
            KeyCode::Char('n') => self.controller.select_none(),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-(self.panels().list_rows().max(1) as isize)),
            KeyCode::PageDown => self.move_cursor(self.panels().list_rows().max(1) as isize),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_at_cursor(),
            KeyCode::Char('h') | KeyCode::Left => self.scroll_grid(-1, 0),
            KeyCode::Char('l') | KeyCode::Right => self.scroll_grid(1, 0),
            KeyCode::Char('k') => self.scroll_grid(0, -1),
            KeyCode::Char('j') => self.scroll_grid(0, 1),
            _ => {}
        }
        Cmd::none()
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let panels = self.panels();
        let (x, y) = mouse.position();
        let in_grid = panels.grid.contains(x, y);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.ui.hover = in_grid.then_some((x, y));
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(row) = panels.list_row_at(x, y) {
                    let pos = self.ui.list_offset + row;
                    if pos < self.controller.dataset().len() {
                        self.ui.cursor = pos;
                        self.toggle_at_cursor();
                    }
                }
            }
            MouseEventKind::ScrollUp if panels.list.contains(x, y) => self.move_cursor(-1),
            MouseEventKind::ScrollDown if panels.list.contains(x, y) => self.move_cursor(1),
            MouseEventKind::ScrollUp => self.scroll_grid(0, -1),
            MouseEventKind::ScrollDown => self.scroll_grid(0, 1),
            MouseEventKind::ScrollLeft => self.scroll_grid(-1, 0),
            MouseEventKind::ScrollRight => self.scroll_grid(1, 0),
            _ => {}
        }
    }
}

impl Model for VisualizerModel {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        let ticket = self.controller.request();
        self.fetch(ticket)
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Resized { width, height } => {
                self.size = (width, height);
                self.controller.resize(self.panels().grid_viewport());
                self.clamp_scroll();
                self.keep_cursor_visible();
                Cmd::none()
            }
            Msg::Key(key) => self.on_key(key),
            Msg::Mouse(mouse) => {
                self.on_mouse(mouse);
                Cmd::none()
            }
            Msg::Loaded(ticket, result) => {
                self.loaded(ticket, result);
                Cmd::none()
            }
            Msg::Ignore => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        view::draw(frame, &self.controller, &self.ui);
    }
}

/// Run the full-screen visualizer until the user quits.
pub fn run_interactive(source: Arc<dyn CycleSource>, settings: Settings) -> Result<()> {
    info!(request = %settings.key, source = %source.describe(), "starting visualizer");
    let model = VisualizerModel::new(source, settings);
    let backend = CrosstermBackend::new(SessionOptions::fullscreen()).map_err(AppError::Terminal)?;
    let mut program = Program::new(model, backend, ProgramConfig::default());
    program.run().map_err(AppError::Terminal)?;
    info!(frames = program.frames_presented(), "visualizer closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cyclegrid_client::{FetchError, Result as FetchResult};
    use cyclegrid_core::{AddressingMode, OrderMode, PalettePolicy, SeriesId};
    use cyclegrid_runtime::Modifiers;

    use super::*;

    /// Serves `{ base: m, sequences: [[0..m)] }` and records what was asked.
    #[derive(Default)]
    struct Recording {
        asked: Mutex<Vec<RequestKey>>,
        fail: bool,
    }

    impl CycleSource for Recording {
        fn fetch(&self, key: RequestKey) -> FetchResult<CycleDataset> {
            self.asked.lock().unwrap().push(key);
            if self.fail {
                return Err(FetchError::Status {
                    status: 500,
                    url: "http://test/cycles".to_string(),
                });
            }
            let seq: Vec<i64> = (0..key.modulus).collect();
            Ok(CycleDataset::new(key.modulus, vec![seq, vec![0]]))
        }

        fn describe(&self) -> String {
            "recording".to_string()
        }
    }

    fn settings() -> Settings {
        Settings {
            key: RequestKey::new(4, AddressingMode::ZeroBased),
            palette: PalettePolicy::Cyclic,
            order: OrderMode::Original,
            labels: false,
        }
    }

    fn run_task(cmd: Cmd<Msg>) -> Msg {
        match cmd {
            Cmd::Task(_, f) => f(),
            other => panic!("expected a task, got {other:?}"),
        }
    }

    fn key(c: char) -> Msg {
        Msg::Key(KeyEvent::new(KeyCode::Char(c)))
    }

    fn started(source: Arc<Recording>) -> VisualizerModel {
        let mut model = VisualizerModel::new(source, settings());
        let cmd = model.init();
        model.update(Msg::Resized {
            width: 90,
            height: 30,
        });
        let msg = run_task(cmd);
        model.update(msg);
        model
    }

    #[test]
    fn init_fetches_the_requested_key() {
        let source = Arc::new(Recording::default());
        let model = started(Arc::clone(&source));
        assert_eq!(
            *source.asked.lock().unwrap(),
            vec![RequestKey::new(4, AddressingMode::ZeroBased)]
        );
        assert_eq!(model.controller().dataset().len(), 2);
        assert!(!model.controller().is_loading());
        assert_eq!(model.controller().geometry().cell_side, 14);
    }

    #[test]
    fn plus_and_minus_step_the_base_within_bounds() {
        let source = Arc::new(Recording::default());
        let mut model = started(Arc::clone(&source));
        let msg = run_task(model.update(key('+')));
        model.update(msg);
        assert_eq!(model.controller().dataset().modulus(), 5);

        for _ in 0..10 {
            let cmd = model.update(key('-'));
            if let Cmd::Task(_, f) = cmd {
                model.update(f());
            }
        }
        assert_eq!(model.controller().dataset().modulus(), 1);
        assert!(model.update(key('-')).is_none());
    }

    #[test]
    fn mode_switch_ignores_the_late_zero_based_response() {
        let source = Arc::new(Recording::default());
        let mut model = started(source);
        let plus = model.update(key('+'));
        let centered = model.update(key('c'));
        assert_eq!(
            model.controller().requested(),
            RequestKey::new(5, AddressingMode::Centered)
        );
        let centered_msg = run_task(centered);
        model.update(centered_msg);
        let stale = run_task(plus);
        model.update(stale);
        assert_eq!(
            model.controller().dataset_mode(),
            AddressingMode::Centered
        );
    }

    #[test]
    fn failed_fetch_keeps_previous_dataset() {
        let ok = Arc::new(Recording::default());
        let mut model = started(ok);
        model.source = Arc::new(Recording {
            fail: true,
            ..Recording::default()
        });
        let msg = run_task(model.update(key('r')));
        model.update(msg);
        assert_eq!(model.controller().dataset().modulus(), 4);
        assert!(model.controller().last_error().unwrap().contains("500"));
    }

    #[test]
    fn cursor_toggle_and_select_all() {
        let mut model = started(Arc::new(Recording::default()));
        model.update(Msg::Key(KeyEvent::new(KeyCode::Down)));
        model.update(Msg::Key(KeyEvent::new(KeyCode::Enter)));
        assert!(!model.controller().selection().is_active(SeriesId(1)));
        assert_eq!(model.controller().cell_index().entry_count(), 4);
        model.update(key('n'));
        assert!(model.controller().cell_index().is_empty());
        model.update(key('a'));
        assert_eq!(model.controller().selection().active_count(), 2);
    }

    #[test]
    fn order_cycle_moves_the_cursor_target() {
        let mut model = started(Arc::new(Recording::default()));
        model.update(key('o'));
        assert_eq!(model.controller().order(), OrderMode::LengthAsc);
        // The short series is now first in the list.
        model.update(Msg::Key(KeyEvent::new(KeyCode::Char(' '))));
        assert!(!model.controller().selection().is_active(SeriesId(1)));
        assert!(model.controller().selection().is_active(SeriesId(0)));
    }

    #[test]
    fn clicking_a_list_row_toggles_that_series() {
        let mut model = started(Arc::new(Recording::default()));
        let click = MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 5, 2);
        model.update(Msg::Mouse(click));
        assert_eq!(model.ui().cursor, 1);
        assert!(!model.controller().selection().is_active(SeriesId(1)));
    }

    #[test]
    fn hover_is_tracked_only_over_the_grid() {
        let mut model = started(Arc::new(Recording::default()));
        model.update(Msg::Mouse(MouseEvent::new(MouseEventKind::Moved, 50, 10)));
        assert_eq!(model.ui().hover, Some((50, 10)));
        model.update(Msg::Mouse(MouseEvent::new(MouseEventKind::Moved, 3, 10)));
        assert_eq!(model.ui().hover, None);
    }

    #[test]
    fn scrolling_is_clamped_to_the_grid() {
        let mut model = started(Arc::new(Recording::default()));
        model.update(key('l'));
        assert_eq!(model.ui().scroll, (0, 0));

        for _ in 0..16 {
            if let Cmd::Task(_, f) = model.update(key('+')) {
                model.update(f());
            }
        }
        assert_eq!(model.controller().dataset().modulus(), 20);
        // 20 cells of 6 px in a 60x56 px area.
        model.update(key('l'));
        model.update(key('j'));
        assert_eq!(model.ui().scroll, (6, 6));
        for _ in 0..50 {
            model.update(key('l'));
        }
        assert_eq!(model.ui().scroll.0, 60);
    }

    #[test]
    fn labels_toggle_and_quit_keys() {
        let mut model = started(Arc::new(Recording::default()));
        model.update(key('t'));
        assert!(model.ui().labels);
        assert!(matches!(model.update(key('q')), Cmd::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert!(matches!(model.update(Msg::Key(ctrl_c)), Cmd::Quit));
    }

    #[test]
    fn key_releases_are_ignored() {
        let release = KeyEvent::new(KeyCode::Char('q'))
            .with_kind(cyclegrid_runtime::KeyEventKind::Release);
        assert!(matches!(Msg::from(Event::Key(release)), Msg::Ignore));
    }
}
