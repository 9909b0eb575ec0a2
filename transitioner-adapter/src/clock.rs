use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use transitioner::{FrameClock, SubscriptionId};

/// A frame clock the host pumps itself.
///
/// Cloning returns a handle to the same subscription registry, so one clone
/// can be handed to an animator while the host keeps another to observe which
/// subscriptions are live (i.e. whether anything still wants frames).
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

#[derive(Debug, Default)]
struct ClockState {
    next_id: u64,
    live: Vec<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of currently live subscriptions. Zero means no animation
    /// wants frames and the host can stop pumping.
    pub fn live_subscriptions(&self) -> usize {
        self.lock().live.len()
    }

    pub fn is_subscribed(&self, subscription: SubscriptionId) -> bool {
        self.lock().live.contains(&subscription.get())
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameClock for ManualClock {
    fn subscribe(&mut self) -> SubscriptionId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.live.push(id);
        SubscriptionId::new(id)
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.lock().live.retain(|&id| id != subscription.get());
    }
}
