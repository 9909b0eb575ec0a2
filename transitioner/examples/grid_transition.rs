//! Animates items from a two-column grid into a single-column list and
//! prints the interpolated poses as the springs converge.
//!
//! Run with `cargo run --example grid_transition`.

use std::collections::HashMap;

use transitioner::{
    FrameClock, FrameOutcome, Point, Pose, Rect, Size, SubscriptionId, TransitionOptions,
    TransitionSession,
};

/// Minimal pump-it-yourself clock for the demo.
#[derive(Default)]
struct LoopClock {
    next_id: u64,
}

impl FrameClock for LoopClock {
    fn subscribe(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId::new(self.next_id)
    }

    fn unsubscribe(&mut self, _subscription: SubscriptionId) {}
}

fn main() {
    let mut grid = HashMap::new();
    let mut list = HashMap::new();
    for i in 0..6u32 {
        let col = (i % 2) as f32;
        let row = (i / 2) as f32;
        grid.insert(i, Pose::new(Rect::new(col * 160.0, row * 160.0, 150.0, 150.0)));
        list.insert(i, Pose::new(Rect::new(0.0, i as f32 * 90.0, 320.0, 80.0)));
    }

    let options = TransitionOptions::new(grid, list)
        .with_offsets(Point::ZERO, Point::new(0.0, 60.0))
        .with_viewport(Size::new(320.0, 480.0))
        .with_content_size(Size::new(320.0, 540.0));
    let mut session = TransitionSession::new(options, LoopClock::default());
    session.start(Some(std::sync::Arc::new(|| {
        println!("transition complete");
    })));

    let mut now = 0.0;
    let mut frame_count = 0u32;
    loop {
        now += 1.0 / 60.0;
        frame_count += 1;
        let outcome = session.frame(now);
        if frame_count % 10 == 0 || outcome == FrameOutcome::Completed {
            println!(
                "frame {frame_count:>3}  progress {:.3}  offset y {:.1}",
                session.progress(),
                session.current_offset().y
            );
            session.for_each_pose(|key, pose| {
                println!(
                    "  item {key}: ({:.1}, {:.1}) {:.0}x{:.0}",
                    pose.frame.origin.x,
                    pose.frame.origin.y,
                    pose.frame.size.width,
                    pose.frame.size.height
                );
            });
        }
        if outcome == FrameOutcome::Completed {
            break;
        }
    }
}
