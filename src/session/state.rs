use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::console::error::ConsoleError;
use crate::session::frame::{Frame, Snapshot};

// ============================================================================
// Refresh phase state machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// No refresh loop wanted, no gesture pending.
    Idle,
    /// Continuous refresh is enabled.
    Refreshing,
    /// A gesture is awaiting acknowledgement. `resume` records whether
    /// continuous refresh should pick up again once it settles.
    GestureInFlight { resume: bool },
    /// Refresh was explicitly stopped.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshEvent {
    Tick,
    StartGesture,
    GestureSettled,
    StopRequested,
}

impl RefreshPhase {
    pub fn on(self, event: RefreshEvent) -> RefreshPhase {
        use RefreshEvent::*;
        use RefreshPhase::*;

        match (self, event) {
            (GestureInFlight { .. }, Tick) | (GestureInFlight { .. }, StartGesture) => self,
            (_, Tick) => Refreshing,

            (Refreshing, StartGesture) => GestureInFlight { resume: true },
            (_, StartGesture) => GestureInFlight { resume: false },

            (GestureInFlight { resume: true }, GestureSettled) => Refreshing,
            (GestureInFlight { resume: false }, GestureSettled) => Idle,
            (_, GestureSettled) => self,

            (GestureInFlight { .. }, StopRequested) => GestureInFlight { resume: false },
            (_, StopRequested) => Stopped,
        }
    }

    pub fn gesture_in_flight(&self) -> bool {
        matches!(self, RefreshPhase::GestureInFlight { .. })
    }

    /// Whether a running refresh loop should keep iterating.
    pub fn wants_refresh(&self) -> bool {
        matches!(
            self,
            RefreshPhase::Refreshing | RefreshPhase::GestureInFlight { resume: true }
        )
    }
}

// ============================================================================
// Session state
// ============================================================================

/// Snapshot of the cooperative flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionFlags {
    pub active: bool,
    pub gesture_in_flight: bool,
    pub refreshing: bool,
}

#[derive(Debug)]
struct Inner {
    active: bool,
    phase: RefreshPhase,
    loop_running: bool,
    next_ticket: u64,
    // Tickets below this belong to an earlier session.
    ticket_floor: u64,
    epoch: u64,
}

/// The only shared mutable state of the console: session flags, refresh
/// phase and the current frame.
///
/// The lock is never held across an `.await`; every method is one short,
/// synchronous transition.
#[derive(Debug)]
pub struct SessionState {
    inner: Mutex<Inner>,
    frames: watch::Sender<Option<Arc<Frame>>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        let (frames, _) = watch::channel(None);
        Self {
            inner: Mutex::new(Inner {
                active: false,
                phase: RefreshPhase::Idle,
                loop_running: false,
                next_ticket: 1,
                ticket_floor: 1,
                epoch: 0,
            }),
            frames,
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn flags(&self) -> SessionFlags {
        let inner = self.inner();
        SessionFlags {
            active: inner.active,
            gesture_in_flight: inner.phase.gesture_in_flight(),
            refreshing: inner.loop_running,
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        self.inner().phase
    }

    pub fn is_active(&self) -> bool {
        self.inner().active
    }

    pub fn gesture_in_flight(&self) -> bool {
        self.inner().phase.gesture_in_flight()
    }

    /// Bumped whenever a session begins or ends. Front ends compare it to
    /// drop pointer and hover state that belongs to another session.
    pub fn epoch(&self) -> u64 {
        self.inner().epoch
    }

    pub fn apply(&self, event: RefreshEvent) -> RefreshPhase {
        let mut inner = self.inner();
        let next = inner.phase.on(event);
        if next != inner.phase {
            debug!(from = ?inner.phase, to = ?next, ?event, "refresh phase");
        }
        inner.phase = next;
        next
    }

    // ---- Session lifecycle ----

    pub fn activate(&self) {
        let mut inner = self.inner();
        inner.active = true;
        self.start_epoch(&mut inner);
        info!(epoch = inner.epoch, "collection session active");
    }

    /// End the session: clears `active`, requests the loop to stop and
    /// drops the current frame.
    pub fn deactivate(&self) {
        let mut inner = self.inner();
        inner.active = false;
        inner.phase = inner.phase.on(RefreshEvent::StopRequested);
        self.start_epoch(&mut inner);
        info!(epoch = inner.epoch, "collection session inactive");
    }

    // Fetches issued before this point can no longer install.
    fn start_epoch(&self, inner: &mut Inner) {
        inner.epoch += 1;
        inner.ticket_floor = inner.next_ticket;
        self.frames.send_if_modified(|current| current.take().is_some());
    }

    // ---- Gestures ----

    /// Claim the single gesture slot, or fail with `Busy`.
    pub fn begin_gesture(&self) -> Result<(), ConsoleError> {
        let mut inner = self.inner();
        if inner.phase.gesture_in_flight() {
            return Err(ConsoleError::Busy);
        }
        inner.phase = inner.phase.on(RefreshEvent::StartGesture);
        debug!(phase = ?inner.phase, "gesture started");
        Ok(())
    }

    pub fn settle_gesture(&self) {
        self.apply(RefreshEvent::GestureSettled);
    }

    // ---- Refresh loop ----

    /// Whether the loop should run another cycle.
    pub fn should_continue(&self) -> bool {
        let inner = self.inner();
        inner.active && inner.phase.wants_refresh()
    }

    /// Mark the loop as running. Returns false if one already runs.
    pub fn try_start_loop(&self) -> bool {
        let mut inner = self.inner();
        if inner.loop_running {
            return false;
        }
        inner.loop_running = true;
        true
    }

    /// Loop-side check at the top of each cycle. When the loop should stop,
    /// the loop flag is released under the same lock so a concurrent
    /// `try_start_loop` either sees the old loop continue or may start a new one.
    pub fn continue_or_finish(&self) -> bool {
        let mut inner = self.inner();
        let keep_going = inner.active && inner.phase.wants_refresh();
        if !keep_going {
            inner.loop_running = false;
        }
        keep_going
    }

    // ---- Frames ----

    /// Ticket taken when a fetch is issued; orders concurrent fetches.
    pub fn issue_ticket(&self) -> u64 {
        Self::next_ticket(&mut self.inner())
    }

    /// Ticket for a refresh-loop fetch, or `None` while a gesture is in
    /// flight. The check and the ticket happen under one lock, so no
    /// gesture can start between them.
    pub fn loop_ticket(&self) -> Option<u64> {
        let mut inner = self.inner();
        if inner.phase.gesture_in_flight() {
            return None;
        }
        Some(Self::next_ticket(&mut inner))
    }

    fn next_ticket(inner: &mut Inner) -> u64 {
        let ticket = inner.next_ticket;
        inner.next_ticket += 1;
        ticket
    }

    /// Swap in the frame for `snapshot` unless a newer fetch already landed
    /// or the fetch was issued before the session changed.
    pub fn install(&self, ticket: u64, snapshot: Snapshot) -> Option<Arc<Frame>> {
        let frame = Arc::new(Frame::build(ticket, snapshot));

        // Held across the swap so a concurrent `deactivate` cannot slip in.
        let inner = self.inner();
        let installed = ticket >= inner.ticket_floor
            && self.frames.send_if_modified(|current| {
                let newer = current.as_ref().is_none_or(|f| f.seq < ticket);
                if newer {
                    *current = Some(Arc::clone(&frame));
                }
                newer
            });
        drop(inner);

        if installed {
            info!(
                seq = ticket,
                elements = frame.index.len(),
                clickable = frame.index.clickable_count(),
                skipped = frame.index.skipped(),
                fingerprint = frame.snapshot.fingerprint.as_deref().unwrap_or("-"),
                "snapshot installed"
            );
            Some(frame)
        } else {
            debug!(seq = ticket, "stale snapshot discarded");
            None
        }
    }

    pub fn current_frame(&self) -> Option<Arc<Frame>> {
        self.frames.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Frame>>> {
        self.frames.subscribe()
    }
}
