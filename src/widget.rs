//! The pencilfloor widget: owned state plus the public operations.

use crate::canvas::TrailCanvas;
use crate::error::{PencilfloorError, Result};
use crate::events::{Listener, ListenerId, Notification, Subscribers};
use crate::geometry::Geometry;
use crate::integrator;
use crate::interaction::{Glyph, InputEvent, Interaction, OverlayIcon};
use crate::pencils::{build_pencils, Pencil, PencilSnapshot, PencilSource};
use crate::scheduler::{FrameHandle, FrameScheduler, Host, SchedulerState};
use std::cell::Cell;
use std::fmt;
use std::mem;
use tracing::{debug, trace};

pub const DEFAULT_INSTANT_RATE: f64 = 0.5;
pub const DEFAULT_QUICKNESS: f64 = 0.025;

/// Parameters accepted by [`Pencilfloor::new`] and [`Pencilfloor::init`]
#[derive(Debug, Default)]
pub struct InitParams {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub pencil_size: Option<f64>,
    pub pencils: PencilSource,
}

/// Everything replaced by a (re)initialization
struct Floor {
    geometry: Geometry,
    pencils: Vec<Pencil>,
    canvas: TrailCanvas,
}

impl Floor {
    fn build(params: &InitParams) -> Result<Self> {
        let geometry = Geometry::resolve(params.width, params.height, params.pencil_size);
        let pencils = build_pencils(&params.pencils, &geometry.bounds)?;
        let mut canvas = TrailCanvas::new(&geometry);
        canvas.draw_pencils(&pencils);
        debug!(
            width = geometry.width,
            height = geometry.height,
            pencil_size = geometry.pencil_size,
            pencils = pencils.len(),
            "pencilfloor initialized"
        );
        Ok(Self {
            geometry,
            pencils,
            canvas,
        })
    }
}

pub struct Pencilfloor {
    floor: Floor,
    scheduler: FrameScheduler,
    quickness: f64,
    instant_rate: f64,
    instant: u64,
    paused: bool,
    interaction: Interaction,
    subscribers: Subscribers<Pencilfloor>,
    pause_requested: Cell<bool>,
}

impl Pencilfloor {
    /// Create a paused, non-interactive widget
    pub fn new(params: InitParams) -> Result<Self> {
        Ok(Self {
            floor: Floor::build(&params)?,
            scheduler: FrameScheduler::new(),
            quickness: DEFAULT_QUICKNESS,
            instant_rate: DEFAULT_INSTANT_RATE,
            instant: 0,
            paused: true,
            interaction: Interaction::default(),
            subscribers: Subscribers::default(),
            pause_requested: Cell::new(false),
        })
    }

    /// Rebuild geometry and pencils, returning to the paused state.
    ///
    /// On failure the widget is left exactly as it was.
    pub fn init(&mut self, host: &mut dyn Host, params: InitParams) -> Result<&mut Self> {
        let floor = Floor::build(&params)?;
        self.scheduler.stop(host);
        self.floor = floor;
        self.quickness = DEFAULT_QUICKNESS;
        self.instant_rate = DEFAULT_INSTANT_RATE;
        self.instant = 0;
        self.paused = true;
        self.pause_requested.set(false);
        self.interaction.remove_overlay();
        Ok(self)
    }

    pub fn width(&self) -> u32 {
        self.floor.geometry.width
    }

    pub fn height(&self) -> u32 {
        self.floor.geometry.height
    }

    pub fn pencil_size(&self) -> f64 {
        self.floor.geometry.pencil_size
    }

    pub fn geometry(&self) -> &Geometry {
        &self.floor.geometry
    }

    pub fn instant(&self) -> u64 {
        self.instant
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Fresh copies of the current pencils
    pub fn pencils(&self) -> Vec<PencilSnapshot> {
        self.floor.pencils.iter().map(PencilSnapshot::from).collect()
    }

    pub fn pencil_count(&self) -> usize {
        self.floor.pencils.len()
    }

    pub fn canvas(&self) -> &TrailCanvas {
        &self.floor.canvas
    }

    pub fn quickness(&self) -> f64 {
        self.quickness
    }

    pub fn set_quickness(&mut self, value: f64) -> Result<()> {
        self.quickness = unit_interval("Quickness", value)?;
        Ok(())
    }

    pub fn instant_rate(&self) -> f64 {
        self.instant_rate
    }

    /// Change the step rate; the owed-step count restarts from the current instant
    pub fn set_instant_rate(&mut self, value: f64) -> Result<()> {
        let value = unit_interval("Instant rate", value)?;
        if value != self.instant_rate {
            self.instant_rate = value;
            self.scheduler.reset_epoch(self.instant);
            debug!(instant_rate = value, instant = self.instant, "instant rate changed");
        }
        Ok(())
    }

    pub fn interactive(&self) -> bool {
        self.interaction.interactive()
    }

    pub fn set_interactive(&mut self, host: &mut dyn Host, interactive: bool) {
        self.interaction.set_interactive(host, interactive);
    }

    pub fn overlay_icon(&self) -> Option<&OverlayIcon> {
        self.interaction.overlay()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn play(&mut self, host: &mut dyn Host) {
        if self.paused {
            self.toggle_play(host, false);
        }
    }

    pub fn pause(&mut self, host: &mut dyn Host) {
        if !self.paused {
            self.toggle_play(host, false);
        }
    }

    /// Pause once the notification being delivered returns.
    ///
    /// Listeners only see `&Pencilfloor`; this is how one stops the widget,
    /// for example at a target instant.
    pub fn request_pause(&self) {
        self.pause_requested.set(true);
    }

    fn toggle_play(&mut self, host: &mut dyn Host, show_overlay: bool) -> bool {
        if self.floor.pencils.len() < 2 {
            return false;
        }
        let (glyph, notification) = if self.paused {
            self.scheduler.start(host, self.instant);
            self.paused = false;
            (Glyph::Play, Notification::Play)
        } else {
            self.scheduler.stop(host);
            self.paused = true;
            (Glyph::Pause, Notification::Pause)
        };
        self.interaction.remove_overlay();
        if show_overlay {
            let icon = OverlayIcon::new(glyph, self.width(), self.height(), host.now());
            self.interaction.show(icon);
        }
        debug!(instant = self.instant, "{notification}");
        self.emit(host, notification);
        true
    }

    /// Toggle play/pause on a primary click or space key; returns whether the event was consumed
    pub fn handle_input(&mut self, host: &mut dyn Host, event: &InputEvent) -> bool {
        if !self.interaction.accepts(event) {
            return false;
        }
        self.toggle_play(host, true);
        true
    }

    /// Frame callback: run every step owed since the previous frame.
    ///
    /// Returns the number of steps run.
    pub fn on_animation_frame(
        &mut self,
        host: &mut dyn Host,
        handle: FrameHandle,
        timestamp: f64,
    ) -> u64 {
        let Some(limit) = self
            .scheduler
            .begin_frame(host, handle, timestamp, self.instant_rate)
        else {
            return 0;
        };
        let mut steps = 0;
        while self.scheduler.is_running() {
            if !host.is_currently_renderable() {
                self.scheduler.suspend(host);
                break;
            }
            if self.instant as f64 > limit {
                break;
            }
            self.instant += 1;
            let Floor {
                geometry,
                pencils,
                canvas,
            } = &mut self.floor;
            integrator::step(pencils, &geometry.bounds, self.quickness, |pencil, previous| {
                canvas.draw_move(pencil, previous)
            });
            steps += 1;
            self.emit(host, Notification::Instant);
        }
        trace!(steps, instant = self.instant, "frame");
        steps
    }

    /// The host signalled that the widget may have become renderable
    pub fn on_renderable(&mut self, host: &mut dyn Host) -> bool {
        !self.paused && self.scheduler.on_renderable(host)
    }

    /// The widget was removed from its document
    pub fn detached(&mut self, host: &mut dyn Host) {
        self.scheduler.suspend(host);
    }

    /// Listen for one notification kind, or all kinds when `kind` is `None`
    pub fn subscribe(
        &mut self,
        kind: Option<Notification>,
        listener: Listener<Pencilfloor>,
    ) -> ListenerId {
        self.subscribers.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn emit(&mut self, host: &mut dyn Host, notification: Notification) {
        let mut subscribers = mem::take(&mut self.subscribers);
        subscribers.notify(notification, self);
        self.subscribers = subscribers;
        if self.pause_requested.take() {
            self.pause(host);
        }
    }
}

impl fmt::Debug for Pencilfloor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pencilfloor")
            .field("geometry", &self.floor.geometry)
            .field("pencils", &self.floor.pencils)
            .field("quickness", &self.quickness)
            .field("instant_rate", &self.instant_rate)
            .field("instant", &self.instant)
            .field("paused", &self.paused)
            .field("scheduler", &self.scheduler.state())
            .finish()
    }
}

/// Validate a value in [0, 1]; -0 is stored as 0
fn unit_interval(property: &'static str, value: f64) -> Result<f64> {
    let value = value + 0.0;
    if !(0.0..=1.0).contains(&value) {
        return Err(PencilfloorError::OutOfUnitRange { property, value });
    }
    Ok(value)
}
