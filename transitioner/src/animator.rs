use std::sync::Arc;

use crate::Animatable;

/// A callback fired after every member has been advanced for a frame.
///
/// The argument is the frame's `delta` in seconds.
pub type TickCallback = Arc<dyn Fn(f32) + Send + Sync>;

/// A callback fired exactly once when a run's last member finishes.
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// Opaque handle identifying one live frame-clock subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// External per-display-refresh timing source.
///
/// The animator subscribes while a run is active and unsubscribes on
/// completion or cancellation, so a real adapter can start/stop its vsync
/// source. While subscribed, the host pumps [`Animator::frame`] once per
/// notification with a monotonic timestamp (seconds, same clock domain across
/// calls).
pub trait FrameClock {
    fn subscribe(&mut self) -> SubscriptionId;
    fn unsubscribe(&mut self, subscription: SubscriptionId);
}

/// Result of delivering one frame-clock notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No run is active (e.g. a notification that was already pending when
    /// the run was cancelled).
    Idle,
    /// Members were advanced; at least one is still animating.
    Ticked,
    /// The run finished on this frame; the completion callback has fired.
    Completed,
}

struct Run<A> {
    members: Vec<A>,
    on_tick: Option<TickCallback>,
    on_complete: Option<CompletionCallback>,
    subscription: SubscriptionId,
    last_timestamp: Option<f64>,
}

/// The tick loop: owns the active set of animatables for the current run,
/// holds the frame-clock subscription, advances every member each frame with
/// the same delta, and fires the completion callback exactly once.
///
/// At most one run is active at a time; starting a new one tears down the
/// prior one synchronously without invoking its completion callback.
pub struct Animator<A, C: FrameClock> {
    clock: C,
    run: Option<Run<A>>,
}

impl<A: Animatable, C: FrameClock> Animator<A, C> {
    pub fn new(clock: C) -> Self {
        Self { clock, run: None }
    }

    /// Replaces any currently running set and subscribes to the frame clock.
    ///
    /// The prior run (if any) is unsubscribed and discarded first; its
    /// completion callback is *not* invoked. An empty `members` set completes
    /// on the next frame without any tick.
    pub fn start(
        &mut self,
        members: Vec<A>,
        on_tick: Option<TickCallback>,
        on_complete: Option<CompletionCallback>,
    ) {
        if let Some(prior) = self.run.take() {
            tdebug!(members = prior.members.len(), "replacing active run");
            self.clock.unsubscribe(prior.subscription);
        }
        let subscription = self.clock.subscribe();
        tdebug!(members = members.len(), "run started");
        self.run = Some(Run {
            members,
            on_tick,
            on_complete,
            subscription,
            last_timestamp: None,
        });
    }

    /// Delivers one frame-clock notification.
    ///
    /// `now` is a monotonic timestamp in seconds. The delta is the gap from
    /// the previous notification (zero on the first). Every member is
    /// advanced with the same delta before the tick callback fires, so the
    /// host always reads a consistent snapshot after a frame.
    pub fn frame(&mut self, now: f64) -> FrameOutcome {
        let Some(run) = self.run.as_mut() else {
            return FrameOutcome::Idle;
        };

        let delta = match run.last_timestamp {
            Some(prev) => {
                debug_assert!(now >= prev, "frame timestamps must be monotonic");
                (now - prev).max(0.0) as f32
            }
            None => 0.0,
        };
        run.last_timestamp = Some(now);

        if !run.members.is_empty() {
            for member in &mut run.members {
                member.animation_tick(delta);
            }
            if let Some(on_tick) = &run.on_tick {
                on_tick(delta);
            }
        }

        if run.members.iter().any(|m| !m.is_finished()) {
            return FrameOutcome::Ticked;
        }

        // Taking the run before invoking the callback makes completion
        // exactly-once even if the callback re-enters the animator.
        let Some(run) = self.run.take() else {
            return FrameOutcome::Idle;
        };
        self.clock.unsubscribe(run.subscription);
        tdebug!("run completed");
        if let Some(on_complete) = &run.on_complete {
            on_complete();
        }
        FrameOutcome::Completed
    }

    /// Forgets the previous frame timestamp, so the next frame ticks with a
    /// zero delta. Call after a stretch where notifications were withheld
    /// (e.g. while a gesture owned the offset): the gap must not become a
    /// single integration step.
    pub fn reset_frame_timing(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.last_timestamp = None;
        }
    }

    /// Unsubscribes immediately and discards the active set without invoking
    /// the completion callback. Idempotent when nothing is running.
    pub fn cancel_all_animations(&mut self) {
        if let Some(run) = self.run.take() {
            tdebug!(members = run.members.len(), "run cancelled");
            self.clock.unsubscribe(run.subscription);
        }
    }

    /// Whether any member of the active run is still animating.
    pub fn is_animating(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| run.members.iter().any(|m| !m.is_finished()))
    }

    /// Aggregate progress: the mean of member progress, `1.0` when idle.
    pub fn progress(&self) -> f32 {
        match &self.run {
            Some(run) if !run.members.is_empty() => {
                run.members.iter().map(|m| m.progress()).sum::<f32>() / run.members.len() as f32
            }
            _ => 1.0,
        }
    }

    /// Members of the active run (empty when idle).
    pub fn members(&self) -> &[A] {
        self.run.as_ref().map_or(&[], |run| run.members.as_slice())
    }

    pub fn members_mut(&mut self) -> &mut [A] {
        self.run.as_mut().map_or(&mut [], |run| &mut run.members)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<A, C: FrameClock> Drop for Animator<A, C> {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            self.clock.unsubscribe(run.subscription);
        }
    }
}
