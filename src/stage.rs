//! Host adapter: mounts widgets into a display tree and drives them with a
//! manual clock, a frame queue and the visibility gate.
//!
//! A host turn is [`Stage::run_frame`]: the gate is flushed, waiting widgets
//! that became renderable resume, then every pending frame callback runs.

use crate::error::{PencilfloorError, Result};
use crate::interaction::InputEvent;
use crate::scheduler::{FrameHandle, Host};
use crate::visibility::{DisplayTree, NodeId, VisibilityGate};
use crate::widget::{InitParams, Pencilfloor};
use tracing::trace;

/// Index of a widget mounted on a [`Stage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

/// Host-side state of one mounted widget
#[derive(Debug, Default)]
struct Link {
    watching: bool,
    focusable: bool,
    focused: bool,
}

struct Mount {
    widget: Pencilfloor,
    node: NodeId,
    link: Link,
}

/// The [`Host`] seen by one widget during a call
struct StageHost<'a> {
    id: WidgetId,
    node: NodeId,
    now: f64,
    tree: &'a DisplayTree,
    next_handle: &'a mut u64,
    frames: &'a mut Vec<(FrameHandle, WidgetId)>,
    link: &'a mut Link,
}

impl Host for StageHost<'_> {
    fn now(&self) -> f64 {
        self.now
    }

    fn request_animation_frame(&mut self) -> FrameHandle {
        *self.next_handle += 1;
        let handle = FrameHandle(*self.next_handle);
        self.frames.push((handle, self.id));
        handle
    }

    fn cancel_animation_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|(pending, _)| *pending != handle);
    }

    fn is_currently_renderable(&self) -> bool {
        self.tree.is_renderable(self.node)
    }

    fn watch_renderable(&mut self, watching: bool) {
        self.link.watching = watching;
    }

    fn set_focusable(&mut self, focusable: bool) {
        self.link.focusable = focusable;
    }

    fn blur(&mut self) {
        self.link.focused = false;
    }
}

#[derive(Default)]
pub struct Stage {
    tree: DisplayTree,
    gate: VisibilityGate,
    now: f64,
    next_handle: u64,
    frames: Vec<(FrameHandle, WidgetId)>,
    mounts: Vec<Mount>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &DisplayTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the clock forward by `ms` milliseconds
    pub fn advance(&mut self, ms: f64) {
        self.now += ms;
    }

    /// Set the clock to an absolute time
    pub fn set_now(&mut self, now: f64) {
        self.now = now;
    }

    pub fn create_element(&mut self) -> NodeId {
        self.tree.create_element()
    }

    /// Frame element and the document it embeds
    pub fn create_frame(&mut self) -> (NodeId, NodeId) {
        self.tree.create_frame()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.tree.append_child(parent, child);
        self.gate.candidate_element(child);
    }

    pub fn remove(&mut self, node: NodeId) {
        self.tree.remove(node);
        for index in 0..self.mounts.len() {
            let id = WidgetId(index);
            if !self.tree.is_connected(self.mounts[index].node) {
                self.with_widget(id, |widget, host| widget.detached(host));
            }
        }
    }

    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        self.tree.set_hidden(node, hidden);
        if !hidden {
            self.gate.candidate_all();
        }
    }

    /// Build a widget and append it under `parent`
    pub fn create(&mut self, params: InitParams, parent: NodeId) -> Result<WidgetId> {
        let widget = Pencilfloor::new(params)?;
        Ok(self.mount(widget, parent))
    }

    pub fn mount(&mut self, widget: Pencilfloor, parent: NodeId) -> WidgetId {
        let node = self.tree.create_element();
        let id = WidgetId(self.mounts.len());
        self.mounts.push(Mount {
            widget,
            node,
            link: Link::default(),
        });
        self.append_child(parent, node);
        id
    }

    pub fn widget(&self, id: WidgetId) -> &Pencilfloor {
        &self.mounts[id.0].widget
    }

    /// Mutable access for operations that need no host services
    pub fn widget_mut(&mut self, id: WidgetId) -> &mut Pencilfloor {
        &mut self.mounts[id.0].widget
    }

    pub fn node(&self, id: WidgetId) -> NodeId {
        self.mounts[id.0].node
    }

    pub fn is_focusable(&self, id: WidgetId) -> bool {
        self.mounts[id.0].link.focusable
    }

    pub fn is_focused(&self, id: WidgetId) -> bool {
        self.mounts[id.0].link.focused
    }

    /// Give keyboard focus to a focusable widget
    pub fn focus(&mut self, id: WidgetId) -> bool {
        let link = &mut self.mounts[id.0].link;
        link.focused = link.focusable;
        link.focused
    }

    pub fn is_renderable(&self, id: WidgetId) -> bool {
        self.tree.is_renderable(self.node(id))
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Run `f` with the widget and a host bound to it
    pub fn with_widget<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut Pencilfloor, &mut dyn Host) -> R,
    ) -> R {
        let Stage {
            tree,
            now,
            next_handle,
            frames,
            mounts,
            ..
        } = self;
        let mount = &mut mounts[id.0];
        let mut host = StageHost {
            id,
            node: mount.node,
            now: *now,
            tree,
            next_handle,
            frames,
            link: &mut mount.link,
        };
        f(&mut mount.widget, &mut host)
    }

    pub fn play(&mut self, id: WidgetId) {
        self.with_widget(id, |widget, host| widget.play(host));
    }

    pub fn pause(&mut self, id: WidgetId) {
        self.with_widget(id, |widget, host| widget.pause(host));
    }

    pub fn init(&mut self, id: WidgetId, params: InitParams) -> Result<()> {
        self.with_widget(id, |widget, host| widget.init(host, params).map(|_| ()))
    }

    pub fn set_interactive(&mut self, id: WidgetId, interactive: bool) {
        self.with_widget(id, |widget, host| widget.set_interactive(host, interactive));
    }

    /// Deliver input to a widget; keyboard input only reaches a focused widget
    pub fn dispatch_input(&mut self, id: WidgetId, event: InputEvent) -> bool {
        if matches!(event, InputEvent::KeyDown(_)) && !self.is_focused(id) {
            return false;
        }
        self.with_widget(id, |widget, host| widget.handle_input(host, &event))
    }

    /// Apply a string attribute the way markup would set it
    pub fn attribute_changed(
        &mut self,
        id: WidgetId,
        name: &str,
        value: Option<&str>,
    ) -> Result<()> {
        match name {
            "quickness" => self
                .widget_mut(id)
                .set_quickness(js_number(value.unwrap_or(""))),
            "instant-rate" => self
                .widget_mut(id)
                .set_instant_rate(js_number(value.unwrap_or(""))),
            "interactive" => {
                self.set_interactive(id, value.is_some());
                Ok(())
            }
            "width" | "height" | "pencil-size" | "instant" | "paused" | "pencils" => {
                Err(PencilfloorError::ReadOnly {
                    property: name.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// One host turn: flush the visibility gate, then run pending frame callbacks.
    ///
    /// Returns the total number of simulation steps run.
    pub fn run_frame(&mut self) -> u64 {
        if self.gate.is_pending() {
            let visited = self.gate.flush(&self.tree);
            for index in 0..self.mounts.len() {
                let mount = &self.mounts[index];
                if mount.link.watching && visited.contains(&mount.node) {
                    self.with_widget(WidgetId(index), |widget, host| widget.on_renderable(host));
                }
            }
        }

        let frames = std::mem::take(&mut self.frames);
        let now = self.now;
        let mut steps = 0;
        for (handle, id) in frames {
            steps += self.with_widget(id, |widget, host| {
                widget.on_animation_frame(host, handle, now)
            });
        }
        trace!(steps, now, "host turn");
        steps
    }
}

/// Numeric conversion of a string attribute value, JavaScript `Number()` style
pub fn js_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match text.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &text[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0.0, |acc, digit| acc * radix as f64 + digit as f64);
    }
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}
