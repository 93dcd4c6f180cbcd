//! Typed notifications emitted by a widget and their subscribers.

use std::fmt;

/// Kinds of notification a widget emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// One simulation step completed
    Instant,
    Play,
    Pause,
}

impl Notification {
    pub fn name(&self) -> &'static str {
        match self {
            Notification::Instant => "instant",
            Notification::Play => "play",
            Notification::Pause => "pause",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle returned by [`Subscribers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback receiving the notification and the emitting instance
pub type Listener<T> = Box<dyn FnMut(Notification, &T)>;

struct Entry<T> {
    id: ListenerId,
    kind: Option<Notification>,
    listener: Listener<T>,
}

/// Listener registry for one emitter of type `T`
pub struct Subscribers<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Subscribers<T> {
    /// Register a listener for one kind, or for every kind when `kind` is `None`
    pub fn subscribe(&mut self, kind: Option<Notification>, listener: Listener<T>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, kind, listener });
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `notification` to every matching listener, in subscription order
    pub fn notify(&mut self, notification: Notification, emitter: &T) {
        for entry in &mut self.entries {
            if entry.kind.map_or(true, |kind| kind == notification) {
                (entry.listener)(notification, emitter);
            }
        }
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.entries.len())
            .finish()
    }
}
