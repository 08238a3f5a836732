#![forbid(unsafe_code)]

//! ANSI presenter: writes frames as crossterm commands.
//!
//! With a previous frame of the same size only changed cells are sent;
//! otherwise the screen is cleared and repainted. Each present is wrapped
//! in a synchronized-update block so terminals that support it never show
//! a half-drawn frame.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};
use cyclegrid_core::Rgb;
use unicode_width::UnicodeWidthChar;

use crate::backend::BackendPresenter;
use crate::frame::{Frame, Style};

#[derive(Debug)]
pub struct AnsiPresenter<W: Write> {
    out: W,
    cells_written: u64,
}

impl<W: Write> AnsiPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cells_written: 0,
        }
    }

    /// Total cells emitted since creation.
    #[inline]
    pub fn cells_written(&self) -> u64 {
        self.cells_written
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn apply_style(&mut self, style: Style) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(to_color(style.fg)),
            SetBackgroundColor(to_color(style.bg)),
        )?;
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.reverse {
            queue!(self.out, SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }
}

fn to_color(color: Option<Rgb>) -> Color {
    match color {
        Some(Rgb { r, g, b }) => Color::Rgb { r, g, b },
        None => Color::Reset,
    }
}

impl<W: Write> BackendPresenter for AnsiPresenter<W> {
    type Error = io::Error;

    fn present(&mut self, frame: &Frame, previous: Option<&Frame>) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        if previous.is_none() {
            queue!(self.out, ResetColor, Clear(ClearType::All))?;
        }

        let mut active: Option<Style> = None;
        for y in 0..frame.height() {
            let row = frame.row(y);
            let prev_row = previous.map(|p| p.row(y));
            // Column the terminal cursor sits at, when known.
            let mut cursor: Option<u16> = None;
            for (x, cell) in (0u16..).zip(row) {
                if cell.is_continuation() {
                    continue;
                }
                if prev_row.is_some_and(|p| p.get(usize::from(x)) == Some(cell)) {
                    continue;
                }
                if cursor != Some(x) {
                    queue!(self.out, MoveTo(x, y))?;
                }
                if active != Some(cell.style) {
                    self.apply_style(cell.style)?;
                    active = Some(cell.style);
                }
                queue!(self.out, Print(cell.ch))?;
                self.cells_written += 1;
                let advance = cell.ch.width().unwrap_or(1).max(1) as u16;
                cursor = Some(x + advance);
            }
        }

        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            ResetColor,
            EndSynchronizedUpdate
        )?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Cell;

    fn frame_with(text: &str) -> Frame {
        let mut frame = Frame::new(8, 2);
        frame.print(0, 0, text, Style::PLAIN, 8);
        frame
    }

    #[test]
    fn first_present_clears_and_paints_everything() {
        let mut presenter = AnsiPresenter::new(Vec::new());
        presenter.present(&frame_with("hi"), None).unwrap();
        assert_eq!(presenter.cells_written(), 16);
        let out = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(out.contains("\x1b[2J"));
        assert!(out.contains("hi"));
    }

    #[test]
    fn diff_present_sends_only_changed_cells() {
        let before = frame_with("hello");
        let after = frame_with("help!");
        let mut presenter = AnsiPresenter::new(Vec::new());
        presenter.present(&after, Some(&before)).unwrap();
        // 'p' and '!' replace 'l' and 'o'.
        assert_eq!(presenter.cells_written(), 2);
        let out = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(!out.contains("\x1b[2J"));
        assert!(out.contains('p'));
        assert!(out.contains('!'));
    }

    #[test]
    fn identical_frames_write_no_cells() {
        let frame = frame_with("same");
        let mut presenter = AnsiPresenter::new(Vec::new());
        presenter.present(&frame, Some(&frame)).unwrap();
        assert_eq!(presenter.cells_written(), 0);
    }

    #[test]
    fn colors_become_truecolor_sequences() {
        let mut frame = Frame::new(1, 1);
        frame.set(0, 0, Cell::new('▀', Style::PLAIN.fg(Rgb::new(1, 2, 3))));
        let mut presenter = AnsiPresenter::new(Vec::new());
        presenter.present(&frame, None).unwrap();
        let out = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(out.contains("38;2;1;2;3"), "{out:?}");
        assert!(out.contains('▀'));
    }
}
