#![forbid(unsafe_code)]

//! Terminal session lifecycle guard and the crossterm backend.
//!
//! [`TerminalSession`] owns raw mode and every terminal mode it turns on.
//! Dropping it disables them in reverse order:
//!
//! 1. Disable mouse capture (if enabled)
//! 2. Show cursor (always)
//! 3. Leave alternate screen (if enabled)
//! 4. Exit raw mode (always)
//! 5. Flush stdout
//!
//! A panic hook performs the same cleanup before the default hook prints,
//! so panic messages land on a usable terminal. Only one session may be
//! live per process.

use std::io::{self, BufWriter, Stdout, Write};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::info;

use crate::backend::{Backend, BackendEventSource};
use crate::event::Event;
use crate::presenter::AnsiPresenter;

static TERMINAL_SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
struct SessionLock;

impl SessionLock {
    fn acquire() -> io::Result<Self> {
        if TERMINAL_SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(io::Error::other("TerminalSession already active"));
        }
        Ok(Self)
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        TERMINAL_SESSION_ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// Which terminal modes a session turns on. Raw mode is always on.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Switch to the alternate screen buffer, restoring scrollback on exit.
    pub alternate_screen: bool,
    /// Report clicks, drags, wheel, and plain motion (for hover).
    pub mouse_capture: bool,
}

impl SessionOptions {
    /// Alternate screen with mouse capture: what a full-screen viewer wants.
    pub fn fullscreen() -> Self {
        Self {
            alternate_screen: true,
            mouse_capture: true,
        }
    }
}

#[derive(Debug)]
pub struct TerminalSession {
    session_lock: Option<SessionLock>,
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    ///
    /// # Errors
    ///
    /// Fails if another session is live or raw mode cannot be enabled.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();
        let session_lock = SessionLock::acquire()?;

        crossterm::terminal::enable_raw_mode()?;
        info!("terminal raw mode enabled");

        // From here on Drop undoes whatever succeeded.
        let mut session = Self {
            session_lock: Some(session_lock),
            alternate_screen_enabled: false,
            mouse_enabled: false,
        };

        let mut stdout = io::stdout();
        if options.alternate_screen {
            crossterm::execute!(
                stdout,
                crossterm::terminal::EnterAlternateScreen,
                crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
                crossterm::cursor::MoveTo(0, 0)
            )?;
            session.alternate_screen_enabled = true;
            info!("alternate screen enabled");
        }

        crossterm::execute!(stdout, crossterm::cursor::Hide)?;

        if options.mouse_capture {
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture)?;
            session.mouse_enabled = true;
            info!("mouse capture enabled");
        }

        Ok(session)
    }

    /// Current terminal size `(columns, rows)`, never smaller than 2×2.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        let (w, h) = crossterm::terminal::size()?;
        Ok((w.max(2), h.max(2)))
    }

    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read one event. `None` when crossterm produced something unmapped.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        let event = crossterm::event::read()?;
        Ok(Event::from_crossterm(event))
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();

        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
            self.mouse_enabled = false;
            info!("mouse capture disabled");
        }

        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            info!("alternate screen disabled");
        }

        let _ = crossterm::terminal::disable_raw_mode();
        info!("terminal raw mode disabled");

        let _ = stdout.flush();

        // Release exclusivity only after terminal state is restored.
        let _ = self.session_lock.take();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl BackendEventSource for TerminalSession {
    type Error = io::Error;

    fn size(&self) -> io::Result<(u16, u16)> {
        TerminalSession::size(self)
    }

    fn poll_event(&mut self, timeout: Duration) -> io::Result<bool> {
        TerminalSession::poll_event(self, timeout)
    }

    fn read_event(&mut self) -> io::Result<Option<Event>> {
        TerminalSession::read_event(self)
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Live terminal: crossterm input plus buffered ANSI output.
#[derive(Debug)]
pub struct CrosstermBackend {
    // Declared first so buffered output is flushed before the session
    // restores the terminal.
    presenter: AnsiPresenter<BufWriter<Stdout>>,
    session: TerminalSession,
}

impl CrosstermBackend {
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        let session = TerminalSession::new(options)?;
        Ok(Self {
            presenter: AnsiPresenter::new(BufWriter::with_capacity(64 * 1024, io::stdout())),
            session,
        })
    }
}

impl Backend for CrosstermBackend {
    type Error = io::Error;
    type Events = TerminalSession;
    type Presenter = AnsiPresenter<BufWriter<Stdout>>;

    fn events(&mut self) -> &mut Self::Events {
        &mut self.session
    }

    fn presenter(&mut self) -> &mut Self::Presenter {
        &mut self.presenter
    }
}
