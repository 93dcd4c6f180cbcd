//! User input that toggles play/pause, and the transient overlay icon.

use crate::scheduler::Host;

/// How long the overlay icon stays on screen, in milliseconds
pub const OVERLAY_DURATION: f64 = 2000.0;

/// Opacity of the overlay icon before it starts fading
pub const OVERLAY_OPACITY: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
}

/// Input delivered to a widget by its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown(PointerButton),
    KeyDown(char),
}

impl InputEvent {
    pub fn toggles_play(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerDown(PointerButton::Primary) | InputEvent::KeyDown(' ')
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Play,
    Pause,
}

/// Side of the overlay icon for a widget of the given size, in pixels
pub fn icon_size(width: u32, height: u32) -> u32 {
    (width.max(height) / 6).min(width).min(height)
}

/// Play or pause glyph shown after the user toggles the widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayIcon {
    pub glyph: Glyph,
    pub size: u32,
    pub shown_at: f64,
}

impl OverlayIcon {
    pub fn new(glyph: Glyph, width: u32, height: u32, now: f64) -> Self {
        Self {
            glyph,
            size: icon_size(width, height),
            shown_at: now,
        }
    }

    /// Opacity at time `now`: steady for the first half, then fading linearly to 0
    pub fn opacity(&self, now: f64) -> f64 {
        let elapsed = now - self.shown_at;
        let half = OVERLAY_DURATION / 2.0;
        if elapsed <= half {
            OVERLAY_OPACITY
        } else if elapsed < OVERLAY_DURATION {
            OVERLAY_OPACITY * (OVERLAY_DURATION - elapsed) / half
        } else {
            0.0
        }
    }

    pub fn is_visible(&self, now: f64) -> bool {
        self.opacity(now) > 0.0
    }
}

/// Interaction state of one widget
#[derive(Debug, Default)]
pub struct Interaction {
    interactive: bool,
    overlay: Option<OverlayIcon>,
}

impl Interaction {
    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_interactive(&mut self, host: &mut dyn Host, interactive: bool) {
        self.interactive = interactive;
        if interactive {
            host.set_focusable(true);
        } else {
            host.blur();
            host.set_focusable(false);
        }
    }

    /// Whether `event` should toggle play/pause
    pub fn accepts(&self, event: &InputEvent) -> bool {
        self.interactive && event.toggles_play()
    }

    pub fn overlay(&self) -> Option<&OverlayIcon> {
        self.overlay.as_ref()
    }

    pub fn show(&mut self, icon: OverlayIcon) {
        self.overlay = Some(icon);
    }

    pub fn remove_overlay(&mut self) {
        self.overlay = None;
    }
}
