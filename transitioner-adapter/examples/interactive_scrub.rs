//! Starts a transition, scrubs it interactively for a while, then hands
//! control back to the springs and lets them finish.
//!
//! Run with `cargo run --example interactive_scrub`.

use std::collections::HashMap;

use transitioner::{Point, Pose, Rect, Size, TransitionOptions};
use transitioner_adapter::TransitionCoordinator;

fn main() {
    let mut from = HashMap::new();
    let mut to = HashMap::new();
    for i in 0..4u32 {
        from.insert(i, Pose::new(Rect::new(0.0, i as f32 * 100.0, 300.0, 90.0)));
        to.insert(i, Pose::new(Rect::new(0.0, i as f32 * 220.0, 300.0, 200.0)));
    }

    let mut coordinator = TransitionCoordinator::new();
    coordinator.transition_to(
        TransitionOptions::new(from, to)
            .with_offsets(Point::ZERO, Point::new(0.0, 240.0))
            .with_viewport(Size::new(300.0, 600.0))
            .with_content_size(Size::new(300.0, 880.0)),
        Some(std::sync::Arc::new(|| println!("transition complete"))),
    );

    let mut now = 0.0;
    let dt = 1.0 / 60.0;

    // Simulated drag: the gesture owns the offset for twenty frames.
    coordinator.begin_interactive_transition();
    for step in 0..20 {
        now += dt;
        coordinator.update_interactive_progress(step as f32 / 20.0 * 0.6);
        if let Some(offset) = coordinator.frame(now) {
            println!("scrub  frame {step:>2}  offset y {:.1}", offset.y);
        }
    }
    coordinator.end_interactive_transition();

    // Release: the springs take over from wherever the scrub left off.
    while coordinator.is_transitioning() {
        now += dt;
        if let Some(offset) = coordinator.frame(now) {
            println!("spring frame        offset y {:.1}", offset.y);
        }
    }
}
