#![forbid(unsafe_code)]

//! Drawing the visualizer into a [`Frame`].
//!
//! The screen is split into a series list on the left, a one-line header
//! and the grid on the right, and a status line at the bottom.
//!
//! The grid is drawn with half blocks: each terminal cell covers two square
//! pixels stacked vertically (`▀` with the top pixel as foreground and the
//! bottom pixel as background). The controller lays the grid out in those
//! pixels, so the viewport handed to it is `(columns, rows * 2)`.

use cyclegrid_core::{
    CellGeometry, Controller, CoordKey, GridHit, PointerMapper, Rect, Rgb, SeriesId, Viewport,
};
use cyclegrid_runtime::{Cell, Frame, Style, frame::text_width};

const LIST_MIN_WIDTH: u16 = 24;
const LIST_MAX_WIDTH: u16 = 44;

/// Unlit cell interior.
pub const EMPTY_CELL: Rgb = Rgb::new(28, 28, 34);
/// Last pixel row and column of every cell.
pub const GRID_LINE: Rgb = Rgb::new(58, 58, 68);
const MUTED: Rgb = Rgb::new(120, 120, 130);
const ERROR: Rgb = Rgb::new(235, 87, 87);
const ACCENT: Rgb = Rgb::new(97, 175, 239);

/// Screen regions, recomputed from the terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Panels {
    pub list: Rect,
    pub separator: Rect,
    pub header: Rect,
    pub grid: Rect,
    pub status: Rect,
}

impl Panels {
    pub fn compute(width: u16, height: u16) -> Self {
        let (body, status) = Rect::from_size(width, height).split_bottom(1);
        let list_width = (width / 3).clamp(LIST_MIN_WIDTH, LIST_MAX_WIDTH);
        let (left, right) = body.split_left(list_width);
        let (list, separator) = left.split_left(left.width.saturating_sub(1));
        let (header, grid) = right.split_top(1);
        Self {
            list,
            separator,
            header,
            grid,
            status,
        }
    }

    /// Rows available for series entries below the list title.
    #[inline]
    pub fn list_rows(&self) -> usize {
        usize::from(self.list.height.saturating_sub(1))
    }

    /// List entry under terminal row `y`, as an offset from the first
    /// visible entry.
    pub fn list_row_at(&self, x: u16, y: u16) -> Option<usize> {
        if !self.list.contains(x, y) || y == self.list.y {
            return None;
        }
        Some(usize::from(y - self.list.y - 1))
    }

    /// Grid area in half-block pixels.
    pub fn grid_viewport(&self) -> Viewport {
        Viewport::new(
            u32::from(self.grid.width),
            u32::from(self.grid.height) * 2,
        )
    }
}

/// Where the grid's top-left pixel sits inside the grid area.
///
/// A grid narrower than the area is centered horizontally; a grid larger
/// than the area is shifted by the scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPlacement {
    pub area: Rect,
    pub origin: (i64, i64),
}

impl GridPlacement {
    pub fn new(area: Rect, geometry: CellGeometry, scroll: (u64, u64)) -> Self {
        let side = i64::try_from(geometry.grid_side).unwrap_or(i64::MAX);
        let width = i64::from(area.width);
        let height = i64::from(area.height) * 2;
        let (max_x, max_y) = Self::max_scroll(area, geometry);
        let origin_x = if side <= width {
            (width - side) / 2
        } else {
            -(scroll.0.min(max_x) as i64)
        };
        let origin_y = if side <= height {
            0
        } else {
            -(scroll.1.min(max_y) as i64)
        };
        Self {
            area,
            origin: (origin_x, origin_y),
        }
    }

    /// Largest useful scroll offset on each axis, in pixels.
    pub fn max_scroll(area: Rect, geometry: CellGeometry) -> (u64, u64) {
        (
            geometry.grid_side.saturating_sub(u64::from(area.width)),
            geometry
                .grid_side
                .saturating_sub(u64::from(area.height) * 2),
        )
    }

    /// Top-half pixel of terminal cell `(x, y)`, or `None` outside the area.
    pub fn pixel_at(&self, x: u16, y: u16) -> Option<(i64, i64)> {
        if !self.area.contains(x, y) {
            return None;
        }
        Some((
            i64::from(x - self.area.x),
            i64::from(y - self.area.y) * 2,
        ))
    }

    /// Hit-test terminal cell `(x, y)`.
    pub fn hit(&self, controller: &Controller, x: u16, y: u16) -> Option<GridHit> {
        let (px, py) = self.pixel_at(x, y)?;
        controller.hit_test(self.origin, px, py)
    }

    fn mapper(&self, controller: &Controller) -> PointerMapper {
        controller
            .pointer_mapper()
            .with_origin(self.origin.0, self.origin.1)
    }
}

/// Presentation state that lives outside the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiState {
    /// Position in the ordered series list.
    pub cursor: usize,
    /// First visible list entry.
    pub list_offset: usize,
    /// Grid scroll in pixels.
    pub scroll: (u64, u64),
    /// Terminal cell under the pointer.
    pub hover: Option<(u16, u16)>,
    pub labels: bool,
}

pub fn draw(frame: &mut Frame, controller: &Controller, ui: &UiState) {
    let panels = Panels::compute(frame.width(), frame.height());
    let placement = GridPlacement::new(panels.grid, controller.geometry(), ui.scroll);
    draw_list(frame, panels, controller, ui);
    for y in panels.separator.y..panels.separator.bottom() {
        frame.set(
            panels.separator.x,
            y,
            Cell::new('│', Style::PLAIN.fg(MUTED)),
        );
    }
    draw_header(frame, panels.header, controller, ui);
    draw_grid(frame, placement, controller);
    if ui.labels {
        draw_labels(frame, placement, controller);
    }
    draw_status(frame, panels.status, placement, controller, ui);
}

fn draw_list(frame: &mut Frame, panels: Panels, controller: &Controller, ui: &UiState) {
    let area = panels.list;
    if area.is_empty() {
        return;
    }
    let dataset = controller.dataset();
    let selection = controller.selection();
    let title = format!(
        "Series {}/{} · {}",
        selection.active_count(),
        dataset.len(),
        controller.order().label()
    );
    frame.print(area.x, area.y, &title, Style::PLAIN.bold(), area.right());

    let order = controller.ordered_series();
    for (row, (pos, id)) in order
        .iter()
        .enumerate()
        .skip(ui.list_offset)
        .take(panels.list_rows())
        .enumerate()
    {
        let y = area.y + 1 + row as u16;
        draw_list_entry(frame, area, y, controller, *id, pos == ui.cursor);
    }
}

fn draw_list_entry(
    frame: &mut Frame,
    area: Rect,
    y: u16,
    controller: &Controller,
    id: SeriesId,
    focused: bool,
) {
    let Some(seq) = controller.dataset().series(id) else {
        return;
    };
    let active = controller.selection().is_active(id);
    let base = if focused {
        Style::PLAIN.reverse()
    } else {
        Style::PLAIN
    };
    let text = if active { base } else { base.fg(MUTED) };
    let right = area.right();

    let mut x = frame.print(area.x, y, if active { "[x] " } else { "[ ] " }, text, right);
    let swatch = if active {
        Style::PLAIN.fg(controller.palette().color(id))
    } else {
        Style::PLAIN.fg(MUTED)
    };
    x = frame.print(x, y, "██ ", swatch, right);

    let badge = format!(" {}", seq.len());
    let badge_width = text_width(&badge) as u16;
    let body_right = right.saturating_sub(badge_width).max(x);
    let body = format_sequence(seq);
    let end = frame.print(x, y, &body, text, body_right);
    if end < body_right {
        frame.fill(Rect::new(end, y, body_right - end, 1), Cell::new(' ', text));
    }
    frame.print(body_right, y, &badge, text.fg(ACCENT), right);
}

fn format_sequence(seq: &[i64]) -> String {
    let items: Vec<String> = seq.iter().map(i64::to_string).collect();
    format!("[{}]", items.join(","))
}

fn draw_header(frame: &mut Frame, area: Rect, controller: &Controller, ui: &UiState) {
    if area.is_empty() {
        return;
    }
    let dataset = controller.dataset();
    let labels = if ui.labels { "on" } else { "off" };
    let text = format!(
        " base={} {} │ palette {} │ labels {}",
        dataset.modulus(),
        controller.dataset_mode(),
        controller.palette().policy().label(),
        labels,
    );
    frame.print(area.x, area.y, &text, Style::PLAIN.bold(), area.right());
}

fn draw_grid(frame: &mut Frame, placement: GridPlacement, controller: &Controller) {
    let area = placement.area;
    let geometry = controller.geometry();
    if area.is_empty() {
        return;
    }
    if controller.dataset().is_empty() {
        let message = if controller.is_loading() {
            "loading…"
        } else {
            "no data"
        };
        let x = area.x + area.width.saturating_sub(text_width(message) as u16) / 2;
        let y = area.y + area.height / 2;
        frame.print(x, y, message, Style::PLAIN.fg(MUTED), area.right());
        return;
    }
    if !geometry.is_renderable() {
        return;
    }

    let mapper = placement.mapper(controller);
    let index = controller.cell_index();
    let side = i64::from(geometry.cell_side);
    let pixel = |px: i64, py: i64| -> Option<Rgb> {
        let hit = mapper.locate(px, py)?;
        let local_x = (px - placement.origin.0).rem_euclid(side);
        let local_y = (py - placement.origin.1).rem_euclid(side);
        if local_x == side - 1 || local_y == side - 1 {
            return Some(GRID_LINE);
        }
        Some(index.top(hit.key).map_or(EMPTY_CELL, |entry| entry.color))
    };

    for row in 0..area.height {
        let py = i64::from(row) * 2;
        for col in 0..area.width {
            let px = i64::from(col);
            let cell = match (pixel(px, py), pixel(px, py + 1)) {
                (None, None) => continue,
                (Some(top), Some(bottom)) => Cell::new('▀', Style::PLAIN.fg(top).bg(bottom)),
                (Some(top), None) => Cell::new('▀', Style::PLAIN.fg(top)),
                (None, Some(bottom)) => Cell::new('▄', Style::PLAIN.fg(bottom)),
            };
            frame.set(area.x + col, area.y + row, cell);
        }
    }
}

/// `(x,y)` text for lit cells wide enough to hold it.
fn draw_labels(frame: &mut Frame, placement: GridPlacement, controller: &Controller) {
    let area = placement.area;
    let geometry = controller.geometry();
    if area.is_empty() || !geometry.is_renderable() {
        return;
    }
    let mapper = placement.mapper(controller);
    let axis = mapper.axis();
    let side = i64::from(geometry.cell_side);
    for (key, stack) in controller.cell_index().iter() {
        let Some(top) = stack.last() else {
            continue;
        };
        let (Some(col), Some(row)) = (axis.col_of(key.x), axis.row_of(key.y)) else {
            continue;
        };
        let label = label_text(key);
        let width = text_width(&label) as i64;
        if width + 2 > side {
            continue;
        }
        let (px, py) = mapper.cell_origin(col, row);
        let x = px + (side - 1 - width) / 2;
        let y = (py + (side - 1) / 2).div_euclid(2);
        if x < 0 || y < 0 || x + width > i64::from(area.width) || y >= i64::from(area.height) {
            continue;
        }
        let style = Style::PLAIN.fg(top.color.best_text()).bg(top.color);
        frame.print(
            area.x + x as u16,
            area.y + y as u16,
            &label,
            style,
            area.right(),
        );
    }
}

fn label_text(key: CoordKey) -> String {
    format!("({},{})", key.x, key.y)
}

fn draw_status(
    frame: &mut Frame,
    area: Rect,
    placement: GridPlacement,
    controller: &Controller,
    ui: &UiState,
) {
    if area.is_empty() {
        return;
    }
    let mut x = area.x;
    if controller.is_loading() {
        let text = format!("loading {}… ", controller.requested());
        x = frame.print(x, area.y, &text, Style::PLAIN.fg(ACCENT), area.right());
    }
    if let Some(error) = controller.last_error() {
        let text = format!("error: {error} ");
        x = frame.print(x, area.y, &text, Style::PLAIN.fg(ERROR), area.right());
    }

    let readout = ui
        .hover
        .and_then(|(hx, hy)| placement.hit(controller, hx, hy))
        .map(|hit| {
            let depth = controller.cell_index().stack(hit.key).len();
            format!("({}, {}) depth {}", hit.key.x, hit.key.y, depth)
        })
        .unwrap_or_else(|| "q quit  +/- base  c mode  o order  p palette  t labels".to_string());
    let width = text_width(&readout) as u16;
    let start = area.right().saturating_sub(width).max(x);
    frame.print(start, area.y, &readout, Style::PLAIN.fg(MUTED), area.right());
}

#[cfg(test)]
mod tests {
    use cyclegrid_core::{
        AddressingMode, CycleDataset, OrderMode, PalettePolicy, RequestKey,
    };

    use super::*;

    fn controller_for(dataset: CycleDataset, mode: AddressingMode, size: (u16, u16)) -> Controller {
        let mut controller = Controller::new(
            RequestKey::new(dataset.modulus(), mode),
            PalettePolicy::Cyclic,
            OrderMode::Original,
        );
        controller.resize(Panels::compute(size.0, size.1).grid_viewport());
        let ticket = controller.request();
        controller.apply_response(ticket, Ok::<_, String>(dataset));
        controller
    }

    #[test]
    fn panels_tile_the_screen() {
        let panels = Panels::compute(90, 30);
        assert_eq!(panels.status, Rect::new(0, 29, 90, 1));
        assert_eq!(panels.list, Rect::new(0, 0, 29, 29));
        assert_eq!(panels.separator, Rect::new(29, 0, 1, 29));
        assert_eq!(panels.header, Rect::new(30, 0, 60, 1));
        assert_eq!(panels.grid, Rect::new(30, 1, 60, 28));
        assert_eq!(panels.grid_viewport(), Viewport::new(60, 56));
        assert_eq!(panels.list_rows(), 28);
        assert_eq!(panels.list_row_at(3, 0), None);
        assert_eq!(panels.list_row_at(3, 4), Some(3));
        assert_eq!(panels.list_row_at(40, 4), None);
    }

    #[test]
    fn small_grid_is_centered_and_large_grid_scrolls() {
        let area = Rect::new(30, 1, 60, 28);
        let small = CellGeometry::compute(4, Viewport::new(60, 56));
        assert_eq!(small.grid_side, 56);
        assert_eq!(GridPlacement::new(area, small, (9, 9)).origin, (2, 0));

        let large = CellGeometry::compute(20, Viewport::new(60, 56));
        assert_eq!(large.grid_side, 120);
        assert_eq!(GridPlacement::max_scroll(area, large), (60, 64));
        let placed = GridPlacement::new(area, large, (12, 500));
        assert_eq!(placed.origin, (-12, -64));
        assert_eq!(placed.pixel_at(30, 1), Some((0, 0)));
        assert_eq!(placed.pixel_at(29, 1), None);
    }

    #[test]
    fn lit_cells_take_their_series_color() {
        let controller = controller_for(
            CycleDataset::new(4, vec![vec![0, 1, 2, 3]]),
            AddressingMode::ZeroBased,
            (90, 30),
        );
        let mut frame = Frame::new(90, 30);
        draw(&mut frame, &controller, &UiState::default());

        let color = controller.palette().color(SeriesId(0));
        let panels = Panels::compute(90, 30);
        let placement = GridPlacement::new(panels.grid, controller.geometry(), (0, 0));
        // (3, 0) is column 3, bottom row; probe a pixel inside it.
        let side = controller.geometry().cell_side as i64;
        let (px, py) = (placement.origin.0 + 3 * side + 1, 3 * side + 2);
        let x = panels.grid.x + px as u16;
        let y = panels.grid.y + (py / 2) as u16;
        let cell = frame.get(x, y).unwrap();
        assert_eq!(cell.ch, '▀');
        assert_eq!(cell.style.fg, Some(color));
        assert_eq!(cell.style.bg, Some(color));

        // (0, 0) is unlit.
        let x0 = panels.grid.x + (placement.origin.0 + 1) as u16;
        let unlit = frame.get(x0, y).unwrap();
        assert_eq!(unlit.style.fg, Some(EMPTY_CELL));
    }

    #[test]
    fn list_shows_selection_and_length_badge() {
        let controller = controller_for(
            CycleDataset::new(4, vec![vec![1, 1, 2, 3, 1, 0], vec![0]]),
            AddressingMode::ZeroBased,
            (90, 30),
        );
        let mut frame = Frame::new(90, 30);
        draw(&mut frame, &controller, &UiState::default());
        assert!(frame.row_text(0).starts_with("Series 2/2 · original"));
        let first = frame.row_text(1);
        assert!(first.starts_with("[x] ██ [1,1,2,3,1,0]"));
        assert!(first[..first.find('│').unwrap()].trim_end().ends_with(" 6"));
        assert!(frame.get(0, 1).unwrap().style.reverse);
        assert!(!frame.get(0, 2).unwrap().style.reverse);
    }

    #[test]
    fn hover_readout_reports_key_and_depth() {
        let controller = controller_for(
            CycleDataset::new(4, vec![vec![0, 1, 2, 3], vec![2, 3]]),
            AddressingMode::ZeroBased,
            (90, 30),
        );
        let panels = Panels::compute(90, 30);
        let placement = GridPlacement::new(panels.grid, controller.geometry(), (0, 0));
        let side = controller.geometry().cell_side as i64;
        // Column 2, top row: (2, 3), drawn by both series.
        let x = panels.grid.x + (placement.origin.0 + 2 * side + 1) as u16;
        let y = panels.grid.y + 1;
        let ui = UiState {
            hover: Some((x, y)),
            ..UiState::default()
        };
        let mut frame = Frame::new(90, 30);
        draw(&mut frame, &controller, &ui);
        assert!(frame.row_text(29).trim_end().ends_with("(2, 3) depth 2"));
    }

    #[test]
    fn labels_only_on_lit_cells() {
        let controller = controller_for(
            CycleDataset::new(3, vec![vec![0, 1]]),
            AddressingMode::Centered,
            (90, 30),
        );
        let ui = UiState {
            labels: true,
            ..UiState::default()
        };
        let mut frame = Frame::new(90, 30);
        draw(&mut frame, &controller, &ui);
        let grid: String = (1..29).map(|y| frame.row_text(y)).collect();
        assert!(grid.contains("(0,1)"));
        assert!(grid.contains("(1,0)"));
        assert!(!grid.contains("(-1,0)"));
    }

    #[test]
    fn failed_first_load_shows_error_and_no_data() {
        let mut controller = Controller::new(
            RequestKey::new(4, AddressingMode::ZeroBased),
            PalettePolicy::Cyclic,
            OrderMode::Original,
        );
        controller.resize(Panels::compute(90, 30).grid_viewport());
        let ticket = controller.request();
        controller.apply_response(ticket, Err::<CycleDataset, _>("HTTP 503"));
        let mut frame = Frame::new(90, 30);
        draw(&mut frame, &controller, &UiState::default());
        assert!(frame.row_text(29).starts_with("error: HTTP 503"));
        let grid: String = (1..29).map(|y| frame.row_text(y)).collect();
        assert!(grid.contains("no data"));
    }
}
