//! Pencils drifting and attracting each other inside a rectangle, leaving
//! trails on a raster surface.
//!
//! [`Pencilfloor`] owns the simulation state. It is driven through a
//! [`Host`], which supplies time, frame callbacks and renderability; [`Stage`]
//! is a host that models a display tree and is driven by hand.

pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod integrator;
pub mod interaction;
pub mod pencils;
pub mod scheduler;
pub mod stage;
pub mod visibility;
pub mod widget;

pub use config::WidgetConfig;
pub use error::{PencilfloorError, Result};
pub use events::Notification;
pub use geometry::{DEFAULT_HEIGHT, DEFAULT_PENCIL_SIZE, DEFAULT_WIDTH};
pub use pencils::{default_arrange_pencils, PencilParam, PencilSource};
pub use scheduler::Host;
pub use stage::{Stage, WidgetId};
pub use widget::{InitParams, Pencilfloor, DEFAULT_INSTANT_RATE, DEFAULT_QUICKNESS};
