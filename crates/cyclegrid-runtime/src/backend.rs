#![forbid(unsafe_code)]

//! The boundary between the program loop and a terminal.
//!
//! The loop polls [`BackendEventSource`] for canonical [`Event`]s and hands
//! finished [`Frame`]s to [`BackendPresenter`]. The crossterm implementation
//! lives in [`crate::terminal`]; tests drive the loop with scripted backends.

use std::time::Duration;

use crate::event::Event;
use crate::frame::Frame;

/// Input half: size queries and event I/O.
pub trait BackendEventSource {
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Current terminal size `(columns, rows)`.
    fn size(&self) -> Result<(u16, u16), Self::Error>;

    /// Whether an event is ready. Must not block longer than `timeout`.
    fn poll_event(&mut self, timeout: Duration) -> Result<bool, Self::Error>;

    /// Next ready event, or `None` if nothing (mappable) is ready.
    fn read_event(&mut self) -> Result<Option<Event>, Self::Error>;
}

/// Output half: frame presentation.
pub trait BackendPresenter {
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Present `frame`. `previous` is the last presented frame of the same
    /// size, if any; presenters may use it to send only changed cells.
    fn present(&mut self, frame: &Frame, previous: Option<&Frame>) -> Result<(), Self::Error>;
}

/// Event source and presenter sharing one error type.
pub trait Backend {
    type Error: core::fmt::Debug + core::fmt::Display;
    type Events: BackendEventSource<Error = Self::Error>;
    type Presenter: BackendPresenter<Error = Self::Error>;

    fn events(&mut self) -> &mut Self::Events;

    fn presenter(&mut self) -> &mut Self::Presenter;
}
