//! Drives `Program` with a scripted, headless backend.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::time::Duration;

use cyclegrid_runtime::{
    Backend, BackendEventSource, BackendPresenter, Cmd, Event, Frame, KeyCode, KeyEvent, Model,
    Program, ProgramConfig, Style,
};

/// Scripted input. `None` entries are idle polls: the loop sees nothing
/// ready once, which gives it a chance to render.
#[derive(Default)]
struct Script {
    size: (u16, u16),
    events: VecDeque<Option<Event>>,
}

impl BackendEventSource for Script {
    type Error = Infallible;

    fn size(&self) -> Result<(u16, u16), Infallible> {
        Ok(self.size)
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<bool, Infallible> {
        match self.events.front() {
            Some(Some(_)) => Ok(true),
            Some(None) => {
                self.events.pop_front();
                Ok(false)
            }
            None => {
                std::thread::sleep(timeout);
                Ok(false)
            }
        }
    }

    fn read_event(&mut self) -> Result<Option<Event>, Infallible> {
        Ok(self.events.pop_front().flatten())
    }
}

#[derive(Default)]
struct Recorder {
    frames: Vec<Frame>,
    diffed: usize,
}

impl BackendPresenter for Recorder {
    type Error = Infallible;

    fn present(&mut self, frame: &Frame, previous: Option<&Frame>) -> Result<(), Infallible> {
        if previous.is_some() {
            self.diffed += 1;
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Headless {
    script: Script,
    recorder: Recorder,
}

impl Backend for Headless {
    type Error = Infallible;
    type Events = Script;
    type Presenter = Recorder;

    fn events(&mut self) -> &mut Script {
        &mut self.script
    }

    fn presenter(&mut self) -> &mut Recorder {
        &mut self.recorder
    }
}

fn headless(size: (u16, u16), events: Vec<Option<Event>>) -> Headless {
    Headless {
        script: Script {
            size,
            events: events.into(),
        },
        recorder: Recorder::default(),
    }
}

fn key(c: char) -> Option<Event> {
    Some(Event::Key(KeyEvent::new(KeyCode::Char(c))))
}

const IDLE: Option<Event> = None;

// ── Model ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct Loader {
    size: (u16, u16),
    presses: u32,
    loaded: Option<u64>,
    log: Vec<&'static str>,
}

#[derive(Debug)]
enum Msg {
    Resized(u16, u16),
    Press,
    Load,
    Loaded(u64),
    Quit,
    Ignore,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Resize { width, height } => Msg::Resized(width, height),
            Event::Key(k) if k.is_char('q') => Msg::Quit,
            Event::Key(k) if k.is_char('f') => Msg::Load,
            Event::Key(_) => Msg::Press,
            _ => Msg::Ignore,
        }
    }
}

impl Model for Loader {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        self.log.push("init");
        Cmd::none()
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Resized(w, h) => {
                self.log.push("resize");
                self.size = (w, h);
                Cmd::none()
            }
            Msg::Press => {
                self.presses += 1;
                Cmd::none()
            }
            Msg::Load => Cmd::task("load", || {
                std::thread::sleep(Duration::from_millis(5));
                Msg::Loaded(42)
            }),
            Msg::Loaded(v) => {
                self.loaded = Some(v);
                Cmd::quit()
            }
            Msg::Quit => Cmd::quit(),
            Msg::Ignore => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let text = format!("{}:{}", self.presses, self.loaded.unwrap_or(0));
        frame.print(0, 0, &text, Style::PLAIN, frame.width());
    }
}

fn config() -> ProgramConfig {
    ProgramConfig::default().with_poll_timeout(Duration::from_millis(2))
}

#[test]
fn init_then_initial_resize_then_render() {
    let mut program = Program::new(
        Loader::default(),
        headless((20, 3), vec![key('q')]),
        config(),
    );
    program.run().unwrap();
    let (model, backend) = program.into_parts();
    assert_eq!(model.log, vec!["init", "resize"]);
    assert_eq!(model.size, (20, 3));
    let first = &backend.recorder.frames[0];
    assert_eq!((first.width(), first.height()), (20, 3));
    assert!(first.row_text(0).starts_with("0:0"));
}

#[test]
fn keys_update_and_quit_stops_the_loop() {
    let mut program = Program::new(
        Loader::default(),
        headless((10, 2), vec![key('x'), key('y'), key('q'), key('z')]),
        config(),
    );
    program.run().unwrap();
    assert!(!program.is_running());
    assert_eq!(program.model().presses, 2);
    // The key after quit is never read.
    assert_eq!(program.backend().script.events.len(), 1);
}

#[test]
fn task_result_arrives_as_a_message() {
    let mut program = Program::new(
        Loader::default(),
        headless((10, 2), vec![key('x'), key('f')]),
        config(),
    );
    program.run().unwrap();
    assert_eq!(program.model().loaded, Some(42));
    assert_eq!(program.model().presses, 1);
}

#[test]
fn resize_forces_a_full_repaint() {
    let resize = Some(Event::Resize {
        width: 12,
        height: 4,
    });
    let mut program = Program::new(
        Loader::default(),
        headless((10, 2), vec![key('x'), resize, key('x'), IDLE, key('q')]),
        config(),
    );
    program.run().unwrap();
    let (model, backend) = program.into_parts();
    assert_eq!(model.size, (12, 4));
    let last = backend.recorder.frames.last().unwrap();
    assert_eq!((last.width(), last.height()), (12, 4));
    assert_eq!(backend.recorder.diffed, 0);
}

#[test]
fn steady_frames_are_diffed_against_the_previous_one() {
    let mut program = Program::new(
        Loader::default(),
        headless((10, 2), vec![key('x'), IDLE, key('q')]),
        config(),
    );
    program.run().unwrap();
    assert_eq!(program.frames_presented(), 2);
    let (_, backend) = program.into_parts();
    assert_eq!(backend.recorder.diffed, 1);
    assert!(backend.recorder.frames[1].row_text(0).starts_with("1:0"));
}

#[test]
fn quit_in_the_same_batch_skips_the_final_render() {
    let mut program = Program::new(
        Loader::default(),
        headless((10, 2), vec![key('x'), key('q')]),
        config(),
    );
    program.run().unwrap();
    assert_eq!(program.frames_presented(), 1);
}
