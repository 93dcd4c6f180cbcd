use pencilfloor::interaction::InputEvent;
use pencilfloor::scheduler::SchedulerState;
use pencilfloor::visibility::NodeId;
use pencilfloor::{Pencilfloor, Result, Stage, WidgetConfig, WidgetId};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, warn};

/// Step used by the +/- and [/] keys
const RATE_STEP: f64 = 0.05;
const QUICKNESS_STEP: f64 = 0.005;

/// Terminal demo state: one widget mounted on a stage, driven by the wall clock
pub struct App {
    pub stage: Stage,
    pub widget: WidgetId,
    /// Element wrapping the widget; hiding it exercises the visibility gate
    container: NodeId,
    pub hidden: bool,
    pub show_help: bool,
    pub config: WidgetConfig,
    pub config_path: Option<PathBuf>,
    /// Last status or error message shown in the sidebar
    pub message: Option<String>,
    pub last_steps: u64,
    started: Instant,
}

impl App {
    pub fn new(config: WidgetConfig, config_path: Option<PathBuf>) -> Result<Self> {
        let mut stage = Stage::new();
        let container = stage.create_element();
        let root = stage.root();
        stage.append_child(root, container);
        let widget = stage.create(config.init_params()?, container)?;

        let mut app = Self {
            stage,
            widget,
            container,
            hidden: false,
            show_help: false,
            config,
            config_path,
            message: None,
            last_steps: 0,
            started: Instant::now(),
        };
        app.apply_config()?;
        app.stage.play(app.widget);
        Ok(app)
    }

    fn apply_config(&mut self) -> Result<()> {
        let config = self.config.clone();
        self.stage
            .with_widget(self.widget, |widget, host| config.apply(widget, host))?;
        // The demo always reacts to the space key
        self.stage.set_interactive(self.widget, true);
        self.stage.focus(self.widget);
        Ok(())
    }

    pub fn floor(&self) -> &Pencilfloor {
        self.stage.widget(self.widget)
    }

    /// Milliseconds since the demo started
    pub fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Run one host turn at the current wall-clock time
    pub fn tick(&mut self) {
        let now = self.now();
        self.stage.set_now(now);
        self.last_steps = self.stage.run_frame();
    }

    pub fn status(&self) -> &'static str {
        match self.floor().scheduler_state() {
            _ if self.floor().paused() => "PAUSED",
            SchedulerState::WaitingForVisibility => "WAITING",
            SchedulerState::Running(_) => "RUNNING",
            SchedulerState::Stopped => "STOPPED",
        }
    }

    /// Toggle through the widget's own input handling so the overlay icon shows
    pub fn toggle_play(&mut self) {
        let now = self.now();
        self.stage.set_now(now);
        self.stage.dispatch_input(self.widget, InputEvent::KeyDown(' '));
        if self.floor().pencil_count() < 2 {
            self.message = Some("Need at least 2 pencils".to_string());
        }
    }

    pub fn adjust_instant_rate(&mut self, delta: f64) {
        let value = step_value(self.floor().instant_rate(), delta);
        if let Err(err) = self.stage.widget_mut(self.widget).set_instant_rate(value) {
            self.message = Some(err.to_string());
        }
    }

    pub fn increase_rate(&mut self) {
        self.adjust_instant_rate(RATE_STEP);
    }

    pub fn decrease_rate(&mut self) {
        self.adjust_instant_rate(-RATE_STEP);
    }

    pub fn adjust_quickness(&mut self, delta: f64) {
        let value = step_value(self.floor().quickness(), delta);
        if let Err(err) = self.stage.widget_mut(self.widget).set_quickness(value) {
            self.message = Some(err.to_string());
        }
    }

    pub fn increase_quickness(&mut self) {
        self.adjust_quickness(QUICKNESS_STEP);
    }

    pub fn decrease_quickness(&mut self) {
        self.adjust_quickness(-QUICKNESS_STEP);
    }

    pub fn toggle_hidden(&mut self) {
        self.hidden = !self.hidden;
        self.stage.set_hidden(self.container, self.hidden);
        debug!(hidden = self.hidden, "container visibility changed");
    }

    /// Re-initialize from the configuration and start playing again
    pub fn reset(&mut self) {
        let result = self
            .config
            .init_params()
            .and_then(|params| self.stage.init(self.widget, params))
            .and_then(|_| self.apply_config());
        match result {
            Ok(()) => {
                self.stage.play(self.widget);
                self.message = None;
            }
            Err(err) => {
                warn!("re-initialization failed: {}", err);
                self.message = Some(err.to_string());
            }
        }
    }

    /// Write the current widget state to the config file
    pub fn save_config(&mut self) {
        let Some(path) = self.config_path.clone().or_else(WidgetConfig::default_path) else {
            self.message = Some("No config directory".to_string());
            return;
        };
        let snapshot = WidgetConfig::from_widget(self.floor());
        self.message = Some(match snapshot.save_to_file(&path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(err) => err.to_string(),
        });
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

/// Add `delta`, clamp to [0, 1] and round away float noise
fn step_value(value: f64, delta: f64) -> f64 {
    ((value + delta).clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let config = WidgetConfig {
            width: Some(120.0),
            height: Some(80.0),
            ..Default::default()
        };
        App::new(config, None).unwrap()
    }

    #[test]
    fn test_starts_playing() {
        let app = app();
        assert!(!app.floor().paused());
        assert!(app.floor().interactive());
        assert_eq!(app.status(), "RUNNING");
    }

    #[test]
    fn test_toggle_play_shows_overlay() {
        let mut app = app();
        app.toggle_play();
        assert!(app.floor().paused());
        assert!(app.floor().overlay_icon().is_some());
        assert_eq!(app.status(), "PAUSED");
    }

    #[test]
    fn test_adjustments_clamp() {
        let mut app = app();
        for _ in 0..30 {
            app.increase_rate();
        }
        assert_eq!(app.floor().instant_rate(), 1.0);
        for _ in 0..10 {
            app.decrease_quickness();
        }
        assert_eq!(app.floor().quickness(), 0.0);
        app.increase_quickness();
        assert_eq!(app.floor().quickness(), 0.005);
    }

    #[test]
    fn test_hide_waits() {
        let mut app = app();
        app.toggle_hidden();
        app.stage.advance(50.0);
        app.stage.run_frame();
        assert_eq!(app.status(), "WAITING");
        app.toggle_hidden();
        app.stage.run_frame();
        assert_eq!(app.status(), "RUNNING");
    }

    #[test]
    fn test_reset_restores_config() {
        let mut app = app();
        app.adjust_quickness(0.5);
        app.reset();
        assert_eq!(app.floor().instant(), 0);
        assert_eq!(app.floor().quickness(), pencilfloor::DEFAULT_QUICKNESS);
        assert!(!app.floor().paused());
        assert!(app.message.is_none());
    }

    #[test]
    fn test_step_value() {
        assert_eq!(step_value(0.5, 0.05), 0.55);
        assert_eq!(step_value(0.98, 0.05), 1.0);
        assert_eq!(step_value(0.02, -0.05), 0.0);
    }
}
