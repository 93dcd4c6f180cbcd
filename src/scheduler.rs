//! Frame pacing: turns elapsed wall-clock time into a number of owed steps.

use tracing::debug;

/// Longest gap between two frames that counts towards owed steps, in milliseconds
pub const MAX_FRAME_GAP: f64 = 1000.0;

/// Pending frame request issued by a [`Host`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Services the embedding environment provides to one widget
pub trait Host {
    /// Current time in milliseconds
    fn now(&self) -> f64;

    /// Ask for one frame callback before the next repaint
    fn request_animation_frame(&mut self) -> FrameHandle;

    fn cancel_animation_frame(&mut self, handle: FrameHandle);

    /// Whether the widget currently occupies screen area
    fn is_currently_renderable(&self) -> bool;

    /// Start or stop delivery of "became potentially renderable" signals
    fn watch_renderable(&mut self, watching: bool);

    fn set_focusable(&mut self, focusable: bool);

    fn blur(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Stopped,
    WaitingForVisibility,
    Running(FrameHandle),
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    state: SchedulerState,
    start_instant: u64,
    time: f64,
    before: f64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running(_))
    }

    /// Begin animating from `instant`, or wait until the widget becomes renderable
    pub fn start(&mut self, host: &mut dyn Host, instant: u64) {
        self.reset_epoch(instant);
        if host.is_currently_renderable() {
            let now = host.now().round();
            self.trigger(host, now);
        } else {
            self.wait(host);
        }
    }

    /// Cancel whatever is pending and return to `Stopped`
    pub fn stop(&mut self, host: &mut dyn Host) {
        match self.state {
            SchedulerState::Running(handle) => host.cancel_animation_frame(handle),
            SchedulerState::WaitingForVisibility => host.watch_renderable(false),
            SchedulerState::Stopped => {}
        }
        self.state = SchedulerState::Stopped;
    }

    /// Drop the pending frame and wait for the widget to become renderable again
    pub fn suspend(&mut self, host: &mut dyn Host) {
        if let SchedulerState::Running(handle) = self.state {
            self.wait(host);
            host.cancel_animation_frame(handle);
        }
    }

    /// Restart the step count from `instant`
    pub fn reset_epoch(&mut self, instant: u64) {
        self.start_instant = instant;
        self.time = 0.0;
    }

    /// Account for one frame callback.
    ///
    /// Requests the next frame and returns the highest instant still owed, or
    /// `None` when `handle` is not the pending request.
    pub fn begin_frame(
        &mut self,
        host: &mut dyn Host,
        handle: FrameHandle,
        timestamp: f64,
        instant_rate: f64,
    ) -> Option<f64> {
        if self.state != SchedulerState::Running(handle) {
            return None;
        }
        let now = timestamp.round();
        self.time += (now - self.before).min(MAX_FRAME_GAP);
        self.trigger(host, now);
        Some(self.start_instant as f64 + self.time * instant_rate - 1.0)
    }

    /// Resume after a renderability signal; returns whether animation restarted
    pub fn on_renderable(&mut self, host: &mut dyn Host) -> bool {
        if self.state != SchedulerState::WaitingForVisibility || !host.is_currently_renderable() {
            return false;
        }
        host.watch_renderable(false);
        let now = host.now().round();
        self.trigger(host, now);
        debug!("renderable again, resuming animation");
        true
    }

    fn trigger(&mut self, host: &mut dyn Host, now: f64) {
        self.before = now;
        self.state = SchedulerState::Running(host.request_animation_frame());
    }

    fn wait(&mut self, host: &mut dyn Host) {
        host.watch_renderable(true);
        self.state = SchedulerState::WaitingForVisibility;
        debug!("not renderable, waiting for visibility");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Host double recording every call
    #[derive(Debug, Default)]
    pub(crate) struct FakeHost {
        pub now: f64,
        pub renderable: bool,
        pub next_handle: u64,
        pub pending: Option<FrameHandle>,
        pub cancelled: Vec<FrameHandle>,
        pub watching: bool,
        pub focusable: bool,
        pub blurred: usize,
    }

    impl Host for FakeHost {
        fn now(&self) -> f64 {
            self.now
        }

        fn request_animation_frame(&mut self) -> FrameHandle {
            self.next_handle += 1;
            let handle = FrameHandle(self.next_handle);
            self.pending = Some(handle);
            handle
        }

        fn cancel_animation_frame(&mut self, handle: FrameHandle) {
            if self.pending == Some(handle) {
                self.pending = None;
            }
            self.cancelled.push(handle);
        }

        fn is_currently_renderable(&self) -> bool {
            self.renderable
        }

        fn watch_renderable(&mut self, watching: bool) {
            self.watching = watching;
        }

        fn set_focusable(&mut self, focusable: bool) {
            self.focusable = focusable;
        }

        fn blur(&mut self) {
            self.blurred += 1;
        }
    }

    #[test]
    fn test_start_when_renderable() {
        let mut host = FakeHost {
            renderable: true,
            now: 100.4,
            ..Default::default()
        };
        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut host, 0);
        assert_eq!(scheduler.state(), SchedulerState::Running(FrameHandle(1)));
        assert!(!host.watching);

        // 50 ms at rate 0.5 owes 25 steps: instants 1 through 25
        let limit = scheduler.begin_frame(&mut host, FrameHandle(1), 150.0, 0.5);
        assert_eq!(limit, Some(24.0));
        assert_eq!(scheduler.state(), SchedulerState::Running(FrameHandle(2)));
    }

    #[test]
    fn test_start_when_hidden() {
        let mut host = FakeHost::default();
        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut host, 3);
        assert_eq!(scheduler.state(), SchedulerState::WaitingForVisibility);
        assert!(host.watching);
        assert_eq!(host.pending, None);

        assert!(!scheduler.on_renderable(&mut host));
        host.renderable = true;
        assert!(scheduler.on_renderable(&mut host));
        assert!(!host.watching);
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_stale_frame_is_ignored() {
        let mut host = FakeHost {
            renderable: true,
            ..Default::default()
        };
        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut host, 0);
        assert_eq!(scheduler.begin_frame(&mut host, FrameHandle(99), 10.0, 0.5), None);
        scheduler.stop(&mut host);
        assert_eq!(host.cancelled, vec![FrameHandle(1)]);
        assert_eq!(scheduler.begin_frame(&mut host, FrameHandle(1), 10.0, 0.5), None);
    }

    #[test]
    fn test_frame_gap_is_capped() {
        let mut host = FakeHost {
            renderable: true,
            ..Default::default()
        };
        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut host, 10);
        let limit = scheduler.begin_frame(&mut host, FrameHandle(1), 60_000.0, 1.0);
        assert_eq!(limit, Some(10.0 + MAX_FRAME_GAP - 1.0));
    }

    #[test]
    fn test_suspend_and_stop() {
        let mut host = FakeHost {
            renderable: true,
            ..Default::default()
        };
        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut host, 0);
        scheduler.suspend(&mut host);
        assert_eq!(scheduler.state(), SchedulerState::WaitingForVisibility);
        assert_eq!(host.pending, None);
        assert!(host.watching);

        scheduler.stop(&mut host);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(!host.watching);
    }
}
