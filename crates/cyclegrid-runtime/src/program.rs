#![forbid(unsafe_code)]

//! Elm-style runtime for terminal applications.
//!
//! A [`Model`] owns application state. Terminal events are converted into
//! its `Message` type and fed to [`Model::update`], which returns a [`Cmd`]
//! describing side effects. After updates the runtime asks the model to draw
//! a fresh [`Frame`] and hands it to the backend.
//!
//! Blocking work (network fetches) goes through [`Cmd::Task`]: the closure
//! runs on its own thread and its return value comes back as a message on
//! the event loop, so `update` is only ever called from one thread.
//!
//! # Example
//!
//! ```ignore
//! use cyclegrid_runtime::{Cmd, Event, Frame, Model};
//!
//! struct Counter { count: i32 }
//!
//! enum Msg { Increment, Quit, Ignore }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Key(k) if k.is_char('q') => Msg::Quit,
//!             Event::Key(k) if k.is_char('+') => Msg::Increment,
//!             _ => Msg::Ignore,
//!         }
//!     }
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Increment => { self.count += 1; Cmd::none() }
//!             Msg::Quit => Cmd::quit(),
//!             Msg::Ignore => Cmd::none(),
//!         }
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {
//!         // draw self.count
//!     }
//! }
//! ```

use std::fmt;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::backend::{Backend, BackendEventSource, BackendPresenter};
use crate::event::Event;
use crate::frame::Frame;

/// Application state and behavior.
pub trait Model: Sized {
    /// Messages that drive [`Model::update`]. Terminal events convert into it.
    type Message: From<Event> + Send + 'static;

    /// Startup commands (initial data loads). Called once before the first
    /// render.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// State transition.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Draw the current state.
    fn view(&self, frame: &mut Frame);
}

/// Side effects requested by the model.
pub enum Cmd<M> {
    None,
    Quit,
    /// Execute several commands; order is not significant.
    Batch(Vec<Cmd<M>>),
    /// Execute several commands in order.
    Sequence(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Run a blocking closure on a background thread; its result is
    /// delivered as a message.
    Task(String, Box<dyn FnOnce() -> M + Send>),
}

impl<M: fmt::Debug> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Quit => f.write_str("Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Task(name, _) => f.debug_tuple("Task").field(name).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Run `f` on a background thread named after `name`.
    pub fn task<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(name.into(), Box::new(f))
    }

    pub fn batch(mut cmds: Vec<Self>) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    pub fn sequence(mut cmds: Vec<Self>) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Sequence(cmds),
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

/// Configuration for the program runtime.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// How long one input poll may block. Also bounds how late a finished
    /// task's message is noticed.
    pub poll_timeout: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(50),
        }
    }
}

impl ProgramConfig {
    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }
}

/// The update/view loop over a [`Backend`].
pub struct Program<M: Model, B: Backend> {
    model: M,
    backend: B,
    config: ProgramConfig,
    running: bool,
    /// Whether the UI needs to be redrawn.
    dirty: bool,
    size: (u16, u16),
    /// Last presented frame, for diffing. Cleared on resize.
    prev_frame: Option<Frame>,
    task_sender: mpsc::Sender<M::Message>,
    task_receiver: mpsc::Receiver<M::Message>,
    task_handles: Vec<JoinHandle<()>>,
    frames_presented: u64,
}

impl<M: Model, B: Backend> Program<M, B> {
    pub fn new(model: M, backend: B, config: ProgramConfig) -> Self {
        let (task_sender, task_receiver) = mpsc::channel();
        Self {
            model,
            backend,
            config,
            running: true,
            dirty: true,
            size: (0, 0),
            prev_frame: None,
            task_sender,
            task_receiver,
            task_handles: Vec::new(),
            frames_presented: 0,
        }
    }

    /// Run until the model returns [`Cmd::Quit`].
    ///
    /// 1. `init`, then the initial terminal size as a `Resize` event
    /// 2. first render
    /// 3. loop: drain ready input, deliver finished tasks, render if dirty
    pub fn run(&mut self) -> Result<(), B::Error> {
        let (width, height) = self.backend.events().size()?;
        info!(width, height, "program started");

        let cmd = self.model.init();
        self.execute_cmd(cmd);
        self.handle_event(Event::Resize { width, height });
        if self.running {
            self.render_frame()?;
        }

        while self.running {
            let mut timeout = self.config.poll_timeout;
            while self.running && self.backend.events().poll_event(timeout)? {
                if let Some(event) = self.backend.events().read_event()? {
                    self.handle_event(event);
                }
                timeout = Duration::ZERO;
            }

            self.process_task_results();
            self.reap_finished_tasks();

            if self.running && self.dirty {
                self.render_frame()?;
            }
        }

        info!(
            frames = self.frames_presented,
            pending_tasks = self.task_handles.len(),
            "program stopped"
        );
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Resize { width, height } = event {
            self.size = (width, height);
            self.prev_frame = None;
        }
        self.update(M::Message::from(event));
    }

    fn update(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.dirty = true;
        self.execute_cmd(cmd);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => self.update(m),
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Task(name, f) => {
                debug!(task = %name, "task spawned");
                let sender = self.task_sender.clone();
                let handle = std::thread::spawn(move || {
                    let msg = f();
                    let _ = sender.send(msg);
                });
                self.task_handles.push(handle);
            }
        }
    }

    fn process_task_results(&mut self) {
        while self.running {
            match self.task_receiver.try_recv() {
                Ok(msg) => self.update(msg),
                Err(_) => break,
            }
        }
    }

    fn reap_finished_tasks(&mut self) {
        if self.task_handles.is_empty() {
            return;
        }
        let mut remaining = Vec::with_capacity(self.task_handles.len());
        for handle in self.task_handles.drain(..) {
            if handle.is_finished() {
                if let Err(payload) = handle.join() {
                    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                        (*s).to_owned()
                    } else if let Some(s) = payload.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "unknown panic payload".to_owned()
                    };
                    error!("spawned task panicked: {msg}");
                }
            } else {
                remaining.push(handle);
            }
        }
        self.task_handles = remaining;
    }

    fn render_frame(&mut self) -> Result<(), B::Error> {
        let (width, height) = self.size;
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);

        let previous = self
            .prev_frame
            .as_ref()
            .filter(|p| p.width() == width && p.height() == height);
        self.backend.presenter().present(&frame, previous)?;

        self.prev_frame = Some(frame);
        self.dirty = false;
        self.frames_presented += 1;
        Ok(())
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Tear down, returning the model and backend.
    pub fn into_parts(self) -> (M, B) {
        (self.model, self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestMsg {
        Increment,
        Quit,
    }

    impl From<Event> for TestMsg {
        fn from(_event: Event) -> Self {
            TestMsg::Increment
        }
    }

    #[test]
    fn batch_and_sequence_collapse() {
        let empty: Cmd<TestMsg> = Cmd::batch(vec![]);
        assert!(empty.is_none());
        let single: Cmd<TestMsg> = Cmd::batch(vec![Cmd::quit()]);
        assert!(matches!(single, Cmd::Quit));
        let many: Cmd<TestMsg> = Cmd::sequence(vec![Cmd::none(), Cmd::msg(TestMsg::Quit)]);
        assert!(matches!(many, Cmd::Sequence(ref v) if v.len() == 2));
    }

    #[test]
    fn task_debug_shows_name_only() {
        let cmd: Cmd<TestMsg> = Cmd::task("fetch", || TestMsg::Increment);
        assert_eq!(format!("{cmd:?}"), "Task(\"fetch\")");
        let msg: Cmd<TestMsg> = Cmd::msg(TestMsg::Increment);
        assert_eq!(format!("{msg:?}"), "Msg(Increment)");
    }

    #[test]
    fn config_default_poll_timeout() {
        let config = ProgramConfig::default().with_poll_timeout(Duration::from_millis(5));
        assert_eq!(config.poll_timeout, Duration::from_millis(5));
    }
}
