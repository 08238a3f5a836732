#![forbid(unsafe_code)]

//! Terminal runtime for cyclegrid.
//!
//! - [`event`]: canonical input events, mapped from crossterm.
//! - [`frame`]: a grid of styled cells the view draws into.
//! - [`backend`]: the input/output boundary the program loop is generic over.
//! - [`presenter`]: ANSI output with cell-level diffing.
//! - [`program`]: the Model / update / view loop with background tasks.
//! - [`terminal`]: RAII terminal session and the crossterm backend.

pub mod backend;
pub mod event;
pub mod frame;
pub mod presenter;
pub mod program;
pub mod terminal;

pub use backend::{Backend, BackendEventSource, BackendPresenter};
pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use frame::{Cell, Frame, Style};
pub use presenter::AnsiPresenter;
pub use program::{Cmd, Model, Program, ProgramConfig};
pub use terminal::{CrosstermBackend, SessionOptions, TerminalSession};
