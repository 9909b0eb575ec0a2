/// Capability contract for anything advanceable by a time delta.
///
/// [`crate::Animator`] drives a typed set of these once per frame-clock
/// notification. [`crate::SpringAnimation`] and [`crate::PoseAnimation`] both
/// satisfy it; a timing-curve-based implementation can slot in the same way.
pub trait Animatable {
    /// Advances the animation by `delta` seconds. Must be a no-op once
    /// [`Self::is_finished`] returns `true`.
    fn animation_tick(&mut self, delta: f32);

    /// Normalized progress in `[0, 1]`, non-decreasing across ticks with
    /// non-negative deltas, and exactly `1.0` once finished.
    fn progress(&self) -> f32;

    /// Whether the animation has converged. Monotonic: once `true`, stays
    /// `true`.
    fn is_finished(&self) -> bool;
}
