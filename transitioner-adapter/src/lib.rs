//! Host-side driver for [`transitioner`] sessions.
//!
//! [`TransitionCoordinator`] owns at most one [`TransitionSession`] per host
//! view and exposes the operations a scrollable container needs during a
//! layout change: starting and replacing transitions, pumping frames,
//! interactive scrubbing, and retargeting the final scroll offset to a
//! specific item. [`ManualClock`] is a frame clock the host pumps itself,
//! suitable for tests and for embedding in an existing render loop.
//!
//! [`TransitionSession`]: transitioner::TransitionSession

#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod clock;
mod coordinator;

pub use clock::ManualClock;
pub use coordinator::TransitionCoordinator;
