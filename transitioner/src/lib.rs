//! A headless layout-transition animation engine.
//!
//! For adapter-level utilities (manual clocks, interactive scrubbing), see the
//! `transitioner-adapter` crate.
//!
//! This crate animates a grid/list from one layout state to another: each item's
//! pose (frame, opacity, transform) rides a damped-spring trajectory, advanced
//! once per display refresh, while the scroll offset interpolates between the
//! two layouts' offsets.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - the per-item poses of the "from" and "to" layouts
//! - a frame clock (per-refresh timestamps)
//! - viewport bounds/insets for final-offset alignment
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod animatable;
mod animator;
mod key;
mod pose;
mod session;
mod spring;
mod types;

#[cfg(test)]
mod tests;

pub use animatable::Animatable;
pub use animator::{
    Animator, CompletionCallback, FrameClock, FrameOutcome, SubscriptionId, TickCallback,
};
pub use key::TransitionKey;
pub use pose::PoseAnimation;
pub use session::{AnimationProvider, TransitionOptions, TransitionSession};
pub use spring::{SpringAnimation, SpringConfig};
pub use types::{Alignment, Insets, Point, Pose, Rect, Size, Transform};
