//! App: configuration and the event loop around a [`Screen`].
//!
//! [`App::run`] takes over the terminal and drives a single-threaded tokio
//! loop that selects between crossterm input and a frame ticker. Input only
//! marks things dirty; frames are produced on ticks, and only when something
//! asked for one. [`App::new_headless`] and [`App::run_with`] let tests feed
//! events and capture output without a terminal.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

use crate::layout::cache::DEFAULT_CAPACITY;
use crate::layout::engine::DEFAULT_AUTO_SIZE_PASSES;
use crate::render::driver::Driver;
use crate::render::renderer::{FrameStats, RenderError, RenderSink};
use crate::screen::{Screen, ScreenError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Screen(#[from] ScreenError),
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Terminal window title, set when [`App::run`] starts.
    pub title: Option<String>,
    /// User stylesheet added to every screen.
    pub css: Option<String>,
    /// Frame ticks per second.
    pub fps: u32,
    /// Arrangements kept by the layout cache.
    pub cache_capacity: usize,
    /// Measurement passes per auto-sized axis.
    pub auto_size_passes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            css: None,
            fps: 60,
            cache_capacity: DEFAULT_CAPACITY,
            auto_size_passes: DEFAULT_AUTO_SIZE_PASSES,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    /// Frame rate, at least 1.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self
    }

    pub fn with_auto_size_passes(mut self, passes: usize) -> Self {
        self.auto_size_passes = passes.max(1);
        self
    }

    /// Time between frame ticks.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    screen: Screen,
    /// `None` when headless.
    driver: Option<Driver>,
    config: AppConfig,
    running: bool,
}

impl App {
    /// An app sized to the current terminal, writing to stdout.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let (width, height) = Driver::terminal_size()?;
        let screen = Screen::with_config(width, height, &config)?;
        Ok(Self { screen, driver: Some(Driver::stdout()), config, running: true })
    }

    /// An app with no terminal. Frames go wherever [`tick`](Self::tick) or
    /// [`run_with`](Self::run_with) sends them.
    pub fn new_headless(width: u16, height: u16, config: AppConfig) -> Result<Self, AppError> {
        let screen = Screen::with_config(width, height, &config)?;
        Ok(Self { screen, driver: None, config, running: true })
    }

    /// A headless app around an existing screen. `config.css` is not
    /// applied; the screen already has its stylesheets.
    pub fn from_screen(screen: Screen, config: AppConfig) -> Self {
        Self { screen, driver: None, config, running: true }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    pub fn should_quit(&self) -> bool {
        !self.running
    }

    pub fn request_quit(&mut self) {
        self.running = false;
    }

    /// React to one terminal event. Resizes reach the screen and Ctrl+C
    /// quits; everything else is left to the application.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Resize(width, height) => self.screen.resize(width, height),
            Event::Key(KeyEvent { code: KeyCode::Char('c'), modifiers, kind: KeyEventKind::Press, .. })
                if modifiers.contains(KeyModifiers::CONTROL) =>
            {
                debug!("quit requested");
                self.request_quit();
            }
            Event::FocusGained => self.screen.refresh(),
            _ => trace!(?event, "unhandled event"),
        }
    }

    /// Render a frame if one is needed.
    pub fn tick(&mut self, sink: &mut dyn RenderSink) -> Result<Option<FrameStats>, AppError> {
        if !self.screen.needs_frame() {
            return Ok(None);
        }
        Ok(Some(self.screen.render_frame(sink)?))
    }

    /// Run until quit or until `events` ends, rendering to `sink` on every
    /// frame tick. An input or sink error ends the loop.
    pub async fn run_with<S>(&mut self, mut events: S, sink: &mut dyn RenderSink) -> Result<(), AppError>
    where
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        let mut ticker = interval(self.config.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.running {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(sink)?;
                }
                event = events.next() => match event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(error)) => return Err(error.into()),
                    None => break,
                },
            }
        }
        Ok(())
    }

    /// Take over the terminal and run the event loop on a current-thread
    /// runtime. The terminal is restored even when the loop fails.
    pub fn run(&mut self) -> Result<(), AppError> {
        let mut driver = match self.driver.take() {
            Some(driver) => driver,
            None => Driver::stdout(),
        };
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;

        self.apply_title(&mut driver)?;
        driver.enter_alt_screen()?;
        self.screen.refresh();
        let result = runtime.block_on(self.run_with(EventStream::new(), &mut driver));
        let restored = driver.leave_alt_screen();
        self.driver = Some(driver);
        result?;
        restored?;
        Ok(())
    }

    fn apply_title<W: Write>(&self, driver: &mut Driver<W>) -> io::Result<()> {
        match &self.config.title {
            Some(title) => driver.set_title(title),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeData;
    use crate::geometry::Size;
    use crate::testing::MemorySink;
    use crate::widgets::Static;
    use futures::stream;

    fn ctrl_c() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
    }

    #[test]
    fn config_builders() {
        let config = AppConfig::new()
            .with_title("demo")
            .with_css("Static { height: 1; }")
            .with_fps(0)
            .with_cache_capacity(0)
            .with_auto_size_passes(3);
        assert_eq!(config.title.as_deref(), Some("demo"));
        assert_eq!(config.fps, 1);
        assert_eq!(config.cache_capacity, 1);
        assert_eq!(config.auto_size_passes, 3);
        assert_eq!(AppConfig::new().with_fps(50).frame_interval(), Duration::from_millis(20));
    }

    #[test]
    fn configured_title_reaches_the_terminal() {
        let app = App::new_headless(10, 2, AppConfig::new().with_title("demo")).expect("app");
        let mut driver = Driver::new(Vec::new());
        app.apply_title(&mut driver).expect("title");
        let output = String::from_utf8(driver.into_inner()).expect("utf8");
        assert!(output.contains("demo"));

        let untitled = App::new_headless(10, 2, AppConfig::default()).expect("app");
        let mut driver = Driver::new(Vec::new());
        untitled.apply_title(&mut driver).expect("title");
        assert_eq!(driver.bytes_written(), 0);
    }

    #[test]
    fn headless_app_has_no_driver() {
        let app = App::new_headless(80, 24, AppConfig::default()).expect("app");
        assert!(!app.has_driver());
        assert!(!app.should_quit());
        assert_eq!(app.screen().size(), Size::new(80, 24));
    }

    #[test]
    fn events_resize_and_quit() {
        let mut app = App::new_headless(80, 24, AppConfig::default()).expect("app");
        app.handle_event(Event::Resize(40, 10));
        assert_eq!(app.screen().size(), Size::new(40, 10));
        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!app.should_quit());
        app.handle_event(ctrl_c());
        assert!(app.should_quit());
    }

    #[test]
    fn tick_renders_only_when_needed() {
        let mut app = App::new_headless(10, 2, AppConfig::default()).expect("app");
        app.screen_mut().mount(None, NodeData::new("Static"), Static::new("hi")).expect("mount");
        let mut sink = MemorySink::new(10, 2);
        assert!(app.tick(&mut sink).expect("tick").is_some());
        assert!(app.tick(&mut sink).expect("tick").is_none());
        app.screen_mut().request_frame();
        assert_eq!(app.tick(&mut sink).expect("tick").map(|stats| stats.writes), Some(0));
    }

    #[test]
    fn loop_stops_on_ctrl_c() {
        let mut app = App::new_headless(20, 4, AppConfig::default().with_fps(1000)).expect("app");
        app.screen_mut().mount(None, NodeData::new("Static"), Static::new("hi")).expect("mount");
        let mut sink = MemorySink::new(20, 4);
        let events = stream::iter(vec![Ok(Event::Resize(12, 3)), Ok(ctrl_c())]);

        tokio_test::block_on(app.run_with(events, &mut sink)).expect("loop");
        assert!(app.should_quit());
        assert_eq!(app.screen().size(), Size::new(12, 3));
    }

    #[test]
    fn input_errors_end_the_loop() {
        let mut app = App::new_headless(20, 4, AppConfig::default()).expect("app");
        let mut sink = MemorySink::new(20, 4);
        let events = stream::iter(vec![Err(io::Error::new(io::ErrorKind::Other, "tty gone"))]);
        let result = tokio_test::block_on(app.run_with(events, &mut sink));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
