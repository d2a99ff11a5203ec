//! Pilot: drive a headless [`App`] and look at what it drew.
//!
//! The pilot owns the app and a [`MemorySink`] sized to its screen. Events
//! go through [`App::handle_event`] exactly as the terminal loop would send
//! them, and [`Pilot::tick`] renders the way a frame tick does.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppConfig, AppError};
use crate::dom::{NodeData, NodeId};
use crate::render::renderer::FrameStats;
use crate::screen::Screen;
use crate::widget::Widget;

use super::snapshot::MemorySink;

pub struct Pilot {
    app: App,
    sink: MemorySink,
}

impl Pilot {
    /// A pilot for an empty screen with no stylesheet of its own.
    pub fn new(width: u16, height: u16) -> Self {
        let app = App::from_screen(Screen::new(width, height), AppConfig::default());
        Self { app, sink: MemorySink::new(width, height) }
    }

    /// A pilot whose screen is built from `config`, so its CSS applies.
    pub fn with_config(width: u16, height: u16, config: AppConfig) -> Result<Self, AppError> {
        let app = App::new_headless(width, height, config)?;
        Ok(Self { app, sink: MemorySink::new(width, height) })
    }

    // ── Building ─────────────────────────────────────────────────────

    pub fn mount(
        &mut self,
        parent: Option<NodeId>,
        data: NodeData,
        widget: impl Widget + 'static,
    ) -> Result<NodeId, AppError> {
        Ok(self.app.screen_mut().mount(parent, data, widget)?)
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn send(&mut self, event: Event) {
        self.app.handle_event(event);
    }

    pub fn press(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.send(Event::Key(KeyEvent::new(code, modifiers)));
    }

    /// Resize the screen and start the fake terminal over, the way a real
    /// terminal loses its contents.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.send(Event::Resize(width, height));
        self.sink.resize(width, height);
    }

    // ── Frames ───────────────────────────────────────────────────────

    /// Render if a frame is pending, like a frame tick.
    pub fn tick(&mut self) -> Result<Option<FrameStats>, AppError> {
        self.app.tick(&mut self.sink)
    }

    /// Request a frame and render it.
    pub fn render(&mut self) -> Result<FrameStats, AppError> {
        self.app.screen_mut().request_frame();
        Ok(self.app.screen_mut().render_frame(&mut self.sink)?)
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn lines(&self) -> Vec<String> {
        self.sink.lines()
    }

    pub fn text(&self) -> String {
        self.sink.text()
    }

    pub fn sink(&self) -> &MemorySink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut MemorySink {
        &mut self.sink
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn screen(&self) -> &Screen {
        self.app.screen()
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        self.app.screen_mut()
    }

    pub fn is_running(&self) -> bool {
        !self.app.should_quit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Region, Size};
    use crate::widgets::{Container, Static};
    use pretty_assertions::assert_eq;

    #[test]
    fn new_pilot_is_headless_and_running() {
        let pilot = Pilot::new(30, 5);
        assert!(!pilot.app().has_driver());
        assert!(pilot.is_running());
        assert_eq!(pilot.screen().size(), Size::new(30, 5));
        assert_eq!(pilot.sink().size(), Size::new(30, 5));
    }

    #[test]
    fn tick_renders_pending_frames_only() {
        let mut pilot = Pilot::new(8, 2);
        let root = pilot.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        pilot.mount(Some(root), NodeData::new("Static"), Static::new("hey")).expect("mount");

        assert!(pilot.tick().expect("tick").is_some());
        assert_eq!(pilot.text(), "hey");
        assert!(pilot.tick().expect("tick").is_none());
        assert_eq!(pilot.render().expect("render").writes, 0);
    }

    #[test]
    fn config_css_reaches_the_screen() {
        let config = AppConfig::new().with_css("#box { width: 4; height: 2; border: ascii; }");
        let mut pilot = Pilot::with_config(10, 3, config).expect("pilot");
        let root = pilot.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        let boxed = pilot.mount(Some(root), NodeData::new("Container").with_id("box"), Container::new()).expect("mount");
        pilot.render().expect("render");
        assert_eq!(pilot.screen().get_region(boxed), Some(Region::new(0, 0, 4, 2)));
        assert_eq!(pilot.lines(), vec!["+--+      ", "+--+      ", "          "]);
    }

    #[test]
    fn resize_and_quit_go_through_the_app() {
        let mut pilot = Pilot::new(20, 4);
        pilot.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        pilot.render().expect("render");

        pilot.resize(6, 2);
        assert_eq!(pilot.screen().size(), Size::new(6, 2));
        let stats = pilot.tick().expect("tick").expect("resize requests a frame");
        assert_eq!(stats.writes, 2);

        pilot.press(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!pilot.is_running());
    }
}
