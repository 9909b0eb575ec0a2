use transitioner::{
    Alignment, CompletionCallback, FrameOutcome, Point, TransitionKey, TransitionOptions,
    TransitionSession,
};

use crate::ManualClock;

/// Drives layout transitions for one host view.
///
/// At most one session is active at a time; requesting a transition while one
/// is in flight cancels the old session (its completion callback never fires)
/// strictly before the replacement starts. The host pumps [`frame`] from its
/// render loop while [`ManualClock::live_subscriptions`] is non-zero and
/// applies the returned scroll offset.
///
/// [`frame`]: TransitionCoordinator::frame
pub struct TransitionCoordinator<K: TransitionKey> {
    clock: ManualClock,
    session: Option<TransitionSession<K, ManualClock>>,
    interactive: bool,
}

impl<K: TransitionKey> TransitionCoordinator<K> {
    pub fn new() -> Self {
        Self::with_clock(ManualClock::new())
    }

    pub fn with_clock(clock: ManualClock) -> Self {
        Self {
            clock,
            session: None,
            interactive: false,
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Starts a transition, replacing any in-flight one.
    ///
    /// The prior session is cancelled before the new one subscribes, so the
    /// clock never sees two live runs. `on_complete` fires exactly once when
    /// every item animation converges; a session that gets replaced or
    /// cancelled never completes.
    pub fn transition_to(
        &mut self,
        options: TransitionOptions<K>,
        on_complete: Option<CompletionCallback>,
    ) {
        if let Some(mut prior) = self.session.take() {
            adebug!("cancelling in-flight transition");
            prior.cancel();
        }
        self.interactive = false;
        let mut session = TransitionSession::new(options, self.clock.clone());
        session.start(on_complete);
        self.session = Some(session);
    }

    /// Delivers one frame and returns the scroll offset to apply, or `None`
    /// when no transition is in flight.
    ///
    /// While an interactive scrub is in progress the clock does not advance
    /// the animations; the offset tracks the scrubbed progress instead.
    pub fn frame(&mut self, now: f64) -> Option<Point> {
        let session = self.session.as_mut()?;
        if self.interactive {
            return Some(session.current_offset());
        }
        let outcome = session.frame(now);
        let offset = session.current_offset();
        if outcome == FrameOutcome::Completed {
            adebug!("transition completed");
            self.session = None;
        }
        Some(offset)
    }

    pub fn is_transitioning(&self) -> bool {
        self.session.is_some()
    }

    /// Hands offset control to the host's gesture.
    ///
    /// The scrub starts from the transition's current progress, so taking
    /// over mid-flight does not jump the content. No-op without a session.
    pub fn begin_interactive_transition(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let seed = session.progress();
        session.set_interactive_progress(seed);
        self.interactive = true;
    }

    /// Updates the scrubbed progress; values outside `[0, 1]` clamp.
    pub fn update_interactive_progress(&mut self, progress: f32) {
        if !self.interactive {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.set_interactive_progress(progress);
        }
    }

    /// Returns offset control to the clock-driven animations.
    ///
    /// Frames were withheld from the animator during the scrub, so the frame
    /// timing is reset: the first post-scrub frame ticks with a zero delta
    /// instead of the whole scrub duration.
    pub fn end_interactive_transition(&mut self) {
        self.interactive = false;
        if let Some(session) = self.session.as_mut() {
            session.clear_interactive_progress();
            session.reset_frame_timing();
        }
    }

    pub fn is_interactive_transition_in_progress(&self) -> bool {
        self.interactive
    }

    /// Retargets the in-flight transition so it lands with `key` aligned per
    /// `alignment`, and returns the new destination offset. `None` when no
    /// transition is in flight.
    pub fn retarget_to_item(&mut self, key: &K, alignment: Alignment) -> Option<Point> {
        let session = self.session.as_mut()?;
        let offset = session.final_offset_for_item(key, alignment);
        session.set_to_offset(offset);
        Some(offset)
    }

    /// Tears down the in-flight transition without completing it. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(mut session) = self.session.take() {
            adebug!("transition cancelled");
            session.cancel();
        }
        self.interactive = false;
    }

    pub fn session(&self) -> Option<&TransitionSession<K, ManualClock>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut TransitionSession<K, ManualClock>> {
        self.session.as_mut()
    }
}

impl<K: TransitionKey> Default for TransitionCoordinator<K> {
    fn default() -> Self {
        Self::new()
    }
}
