#![forbid(unsafe_code)]

//! One-shot, non-interactive output.
//!
//! `text` draws the grid one glyph per cell with the largest `y` on top,
//! followed by a legend in the requested order. `json` writes the cell index.
//! `fixture` writes the dataset in the service's response shape, ready to be
//! dropped into a `--fixtures` directory.

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use cyclegrid_client::{CycleSource, CyclesResponse, FetchError};
use cyclegrid_core::{ApplyOutcome, Controller, CoordKey, CycleDataset, SeriesId};
use serde::Serialize;

use crate::cli::Settings;
use crate::error::{AppError, Result};

/// Glyphs for series ids in text dumps; ids past the table wrap.
const SERIES_GLYPHS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const EMPTY_GLYPH: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    Text,
    Json,
    Fixture,
}

#[derive(Debug, Clone, Args)]
pub struct DumpArgs {
    #[arg(long, value_enum, default_value_t = DumpFormat::Text)]
    pub format: DumpFormat,

    /// Write here instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run_dump(source: &dyn CycleSource, settings: Settings, args: &DumpArgs) -> Result<()> {
    let controller = load(source, settings)?;
    let rendered = render(&controller, args.format)?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Fetch synchronously and install the dataset.
pub fn load(source: &dyn CycleSource, settings: Settings) -> Result<Controller> {
    let mut controller = Controller::new(settings.key, settings.palette, settings.order);
    let ticket = controller.request();
    match source.fetch(settings.key) {
        Ok(dataset) => match controller.apply_response(ticket, Ok::<_, FetchError>(dataset)) {
            ApplyOutcome::Applied => Ok(controller),
            _ => Err(AppError::Rejected {
                message: controller.last_error().unwrap_or_default().to_string(),
            }),
        },
        Err(error) => {
            controller.apply_response(ticket, Err::<CycleDataset, _>(&error));
            Err(AppError::Fetch(error))
        }
    }
}

pub fn render(controller: &Controller, format: DumpFormat) -> Result<String> {
    match format {
        DumpFormat::Text => Ok(render_text(controller)),
        DumpFormat::Json => {
            let mut out = serde_json::to_string_pretty(&IndexDump::from_controller(controller))?;
            out.push('\n');
            Ok(out)
        }
        DumpFormat::Fixture => {
            let response = CyclesResponse::from_dataset(controller.dataset());
            let mut out = serde_json::to_string_pretty(&response)?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn series_glyph(id: SeriesId) -> char {
    char::from(SERIES_GLYPHS[id.index() % SERIES_GLYPHS.len()])
}

pub fn render_text(controller: &Controller) -> String {
    let dataset = controller.dataset();
    let index = controller.cell_index();
    let axis = controller.dataset_mode().axis(dataset.modulus());
    let mut out = String::new();

    let _ = writeln!(
        out,
        "base={} ({}) series={} cells={}",
        dataset.modulus(),
        controller.dataset_mode(),
        dataset.len(),
        index.visible_len(axis),
    );

    let label_width = [axis.min(), axis.max()]
        .into_iter()
        .flatten()
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(1);
    for y in axis.y_values() {
        let _ = write!(out, "{y:>label_width$} ");
        for x in axis.x_values() {
            let glyph = index
                .top(CoordKey::new(x, y))
                .map_or(EMPTY_GLYPH, |entry| series_glyph(entry.series));
            out.push(glyph);
        }
        out.push('\n');
    }

    out.push('\n');
    for id in controller.ordered_series() {
        let Some(seq) = dataset.series(id) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{} {} len={} {:?}",
            series_glyph(id),
            palette_hex(controller, id),
            seq.len(),
            seq
        );
    }
    out
}

fn palette_hex(controller: &Controller, id: SeriesId) -> String {
    controller.palette().color(id).to_string()
}

#[derive(Debug, Serialize)]
struct IndexDump {
    base: i64,
    mode: cyclegrid_core::AddressingMode,
    series: usize,
    cells: Vec<CellDump>,
}

#[derive(Debug, Serialize)]
struct CellDump {
    x: i64,
    y: i64,
    visible: bool,
    stack: Vec<EntryDump>,
}

#[derive(Debug, Serialize)]
struct EntryDump {
    series: SeriesId,
    color: String,
}

impl IndexDump {
    fn from_controller(controller: &Controller) -> Self {
        let dataset = controller.dataset();
        let index = controller.cell_index();
        let axis = controller.dataset_mode().axis(dataset.modulus());
        let cells = index
            .sorted_keys()
            .into_iter()
            .map(|key| CellDump {
                x: key.x,
                y: key.y,
                visible: axis.contains(key.x) && axis.contains(key.y),
                stack: index
                    .stack(key)
                    .iter()
                    .map(|entry| EntryDump {
                        series: entry.series,
                        color: entry.color.to_string(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            base: dataset.modulus(),
            mode: controller.dataset_mode(),
            series: dataset.len(),
            cells,
        }
    }
}
