use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::*;

const DT: f64 = 1.0 / 60.0;

/// A frame clock that records live subscriptions, driven by the tests.
#[derive(Clone, Default)]
struct TestClock {
    state: Arc<Mutex<ClockState>>,
}

#[derive(Default)]
struct ClockState {
    next: u64,
    live: Vec<u64>,
}

impl TestClock {
    fn live(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }
}

impl FrameClock for TestClock {
    fn subscribe(&mut self) -> SubscriptionId {
        let mut state = self.state.lock().unwrap();
        state.next += 1;
        let id = state.next;
        state.live.push(id);
        SubscriptionId::new(id)
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.state
            .lock()
            .unwrap()
            .live
            .retain(|&id| id != subscription.get());
    }
}

fn pose(x: f32, y: f32, w: f32, h: f32) -> Pose {
    Pose::new(Rect::new(x, y, w, h))
}

/// Pumps frames at 60fps starting just after `start`, until the outcome is
/// `Completed` (or the tick budget runs out). Returns the number of frames
/// delivered.
fn pump_session<K: TransitionKey>(
    session: &mut TransitionSession<K, TestClock>,
    start: f64,
    max_frames: usize,
) -> usize {
    let mut now = start;
    for i in 1..=max_frames {
        now += DT;
        if session.frame(now) == FrameOutcome::Completed {
            return i;
        }
    }
    max_frames
}

#[test]
fn spring_converges_from_rest_within_bounded_ticks() {
    // Reference trace: (0,0) -> (100,0), stiffness 250, damping 20, 60fps.
    let mut spring = SpringAnimation::new(Point::ZERO, Point::new(100.0, 0.0));
    let mut ticks = 0;
    while !spring.is_finished() {
        spring.animation_tick(DT as f32);
        ticks += 1;
        assert!(ticks <= 90, "spring did not converge within 1.5s");
    }
    let p = spring.current_point();
    assert!((p.x - 100.0).abs() < 0.5);
    assert!(p.y.abs() < 0.5);
}

#[test]
fn spring_progress_is_monotonic_and_snaps_to_one() {
    let mut spring = SpringAnimation::new(Point::ZERO, Point::new(100.0, 50.0));
    let mut last = spring.progress();
    for _ in 0..200 {
        spring.animation_tick(DT as f32);
        let p = spring.progress();
        assert!(p >= last, "progress regressed: {p} < {last}");
        assert!((0.0..=1.0).contains(&p));
        last = p;
    }
    assert!(spring.is_finished());
    assert_eq!(spring.progress(), 1.0);
}

#[test]
fn finished_spring_ignores_further_ticks() {
    let mut spring = SpringAnimation::new(Point::ZERO, Point::new(100.0, 0.0));
    for _ in 0..200 {
        spring.animation_tick(DT as f32);
    }
    assert!(spring.is_finished());
    let frozen_position = spring.current_point();
    let frozen_velocity = spring.velocity();
    spring.animation_tick(DT as f32);
    spring.animation_tick(1.0);
    assert_eq!(spring.current_point(), frozen_position);
    assert_eq!(spring.velocity(), frozen_velocity);
}

#[test]
fn zero_displacement_is_done_immediately() {
    let at = Point::new(42.0, 7.0);
    let mut spring = SpringAnimation::new(at, at);
    assert_eq!(spring.progress(), 1.0);
    assert!(!spring.is_finished());
    spring.animation_tick(DT as f32);
    assert!(spring.is_finished());
    assert_eq!(spring.current_point(), at);
}

#[test]
fn spring_honors_initial_velocity() {
    let config = SpringConfig::default().with_initial_velocity(Point::new(0.0, -500.0));
    let mut spring =
        SpringAnimation::with_config(Point::ZERO, Point::new(100.0, 0.0), config);
    spring.animation_tick(DT as f32);
    // The injected downward-negative velocity must show up in the trajectory.
    assert!(spring.current_point().y < 0.0);
}

#[test]
fn default_spring_is_underdamped() {
    let config = SpringConfig::default();
    assert_eq!(config.stiffness, 250.0);
    assert_eq!(config.damping, 20.0);
    assert!(config.is_underdamped());
}

#[test]
fn animator_first_frame_has_zero_delta() {
    let deltas = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&deltas);
    let mut animator: Animator<SpringAnimation, TestClock> = Animator::new(TestClock::default());
    animator.start(
        vec![SpringAnimation::new(Point::ZERO, Point::new(100.0, 0.0))],
        Some(Arc::new(move |delta| recorded.lock().unwrap().push(delta))),
        None,
    );
    animator.frame(5.0);
    animator.frame(5.0 + DT);
    let deltas = deltas.lock().unwrap();
    assert_eq!(deltas[0], 0.0);
    assert!((deltas[1] - DT as f32).abs() < 1e-6);
}

#[test]
fn animator_completes_exactly_once() {
    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    let clock = TestClock::default();
    let mut animator = Animator::new(clock.clone());
    animator.start(
        vec![SpringAnimation::new(Point::ZERO, Point::new(100.0, 0.0))],
        None,
        Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        })),
    );
    assert_eq!(clock.live(), 1);

    let mut now = 0.0;
    let mut completed = 0;
    for _ in 0..200 {
        now += DT;
        if animator.frame(now) == FrameOutcome::Completed {
            completed += 1;
        }
    }
    assert_eq!(completed, 1);
    assert_eq!(completions.load(Ordering::Relaxed), 1);
    assert!(!animator.is_animating());
    assert_eq!(clock.live(), 0);
    // Frames after completion are idle.
    assert_eq!(animator.frame(now + DT), FrameOutcome::Idle);
}

#[test]
fn animator_empty_set_completes_on_next_frame_without_ticking() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let completions = Arc::new(AtomicUsize::new(0));
    let t = Arc::clone(&ticks);
    let c = Arc::clone(&completions);
    let mut animator: Animator<SpringAnimation, TestClock> = Animator::new(TestClock::default());
    animator.start(
        Vec::new(),
        Some(Arc::new(move |_| {
            t.fetch_add(1, Ordering::Relaxed);
        })),
        Some(Arc::new(move || {
            c.fetch_add(1, Ordering::Relaxed);
        })),
    );
    assert_eq!(animator.frame(0.0), FrameOutcome::Completed);
    assert_eq!(ticks.load(Ordering::Relaxed), 0);
    assert_eq!(completions.load(Ordering::Relaxed), 1);
}

#[test]
fn cancel_mid_run_never_completes() {
    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    let clock = TestClock::default();
    let mut animator = Animator::new(clock.clone());
    animator.start(
        vec![SpringAnimation::new(Point::ZERO, Point::new(100.0, 0.0))],
        None,
        Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        })),
    );
    animator.frame(DT);
    animator.frame(2.0 * DT);
    assert!(animator.is_animating());

    animator.cancel_all_animations();
    assert!(!animator.is_animating());
    assert_eq!(clock.live(), 0);
    // A notification already pending when the run was cancelled is a no-op.
    assert_eq!(animator.frame(3.0 * DT), FrameOutcome::Idle);
    assert_eq!(completions.load(Ordering::Relaxed), 0);
    // Idempotent.
    animator.cancel_all_animations();
}

#[test]
fn restarting_replaces_run_without_completing_it() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let clock = TestClock::default();
    let mut animator = Animator::new(clock.clone());

    let a = Arc::clone(&first);
    animator.start(
        vec![SpringAnimation::new(Point::ZERO, Point::new(100.0, 0.0))],
        None,
        Some(Arc::new(move || {
            a.fetch_add(1, Ordering::Relaxed);
        })),
    );
    animator.frame(DT);

    // Atomic replacement: the old subscription is released before the new
    // one is taken, and the old run never completes.
    let b = Arc::clone(&second);
    animator.start(
        vec![SpringAnimation::new(Point::ZERO, Point::new(50.0, 50.0))],
        None,
        Some(Arc::new(move || {
            b.fetch_add(1, Ordering::Relaxed);
        })),
    );
    assert_eq!(clock.live(), 1);

    let mut now = 1.0;
    for _ in 0..200 {
        now += DT;
        animator.frame(now);
    }
    assert_eq!(first.load(Ordering::Relaxed), 0);
    assert_eq!(second.load(Ordering::Relaxed), 1);
    assert_eq!(clock.live(), 0);
}

#[test]
fn pose_animation_blends_attributes_toward_target() {
    let initial = pose(0.0, 0.0, 100.0, 100.0);
    let target = pose(200.0, 0.0, 50.0, 50.0).with_opacity(0.5);
    let mut animation = PoseAnimation::new(0u64, initial, target);
    for _ in 0..200 {
        animation.animation_tick(DT as f32);
    }
    assert!(animation.is_finished());
    let current = animation.current_pose();
    // Progress snapped to 1.0: blended attributes land exactly on target.
    assert_eq!(current.opacity, 0.5);
    assert_eq!(current.frame.size, Size::new(50.0, 50.0));
    // The spring-driven center is frozen within the settle epsilon.
    assert!(current.frame.center().distance(target.frame.center()) < 0.5);
}

#[test]
fn pose_animation_midflight_attributes_track_progress() {
    let initial = pose(0.0, 0.0, 100.0, 100.0);
    let target = pose(300.0, 0.0, 100.0, 100.0).with_opacity(0.0);
    let mut animation = PoseAnimation::new(0u64, initial, target);
    for _ in 0..5 {
        animation.animation_tick(DT as f32);
    }
    assert!(!animation.is_finished());
    let t = animation.progress();
    assert!(t > 0.0 && t < 1.0);
    assert!((animation.current_pose().opacity - (1.0 - t)).abs() < 1e-4);
}

fn session_options(
    from: HashMap<u64, Pose>,
    to: HashMap<u64, Pose>,
) -> TransitionOptions<u64> {
    TransitionOptions::new(from, to)
        .with_viewport(Size::new(100.0, 100.0))
        .with_content_size(Size::new(1000.0, 1000.0))
}

#[test]
fn vanishing_item_collapses_and_fades_out() {
    // Present in "from" only: animates toward a synthesized zero-extent pose
    // at its own center. A moving companion keeps the run alive so the
    // settled pose is observable through the registry.
    let mut from = HashMap::new();
    from.insert(7u64, pose(10.0, 20.0, 100.0, 50.0));
    from.insert(1u64, pose(0.0, 200.0, 10.0, 10.0));
    let mut to = HashMap::new();
    to.insert(1u64, pose(500.0, 200.0, 10.0, 10.0));
    let mut session = TransitionSession::new(session_options(from, to), TestClock::default());
    session.start(None);
    session.frame(DT);
    session.frame(2.0 * DT);
    assert!(session.is_animating());
    let current = session.current_pose(&7).copied().unwrap();
    assert_eq!(current.opacity, 0.0);
    assert_eq!(current.frame.size, Size::ZERO);
    // The synthesized target sits at the counterpart's center.
    assert!(current.frame.center().distance(Point::new(60.0, 45.0)) < 0.5);

    let frames = pump_session(&mut session, 2.0 * DT, 200);
    assert!(frames < 200, "transition never completed");
    assert!(session.is_completed());
}

#[test]
fn appearing_item_grows_in_from_collapsed_pose() {
    let mut to = HashMap::new();
    to.insert(3u64, pose(100.0, 100.0, 80.0, 80.0));
    let mut session =
        TransitionSession::new(session_options(HashMap::new(), to), TestClock::default());
    // Before the first frame the item sits at its synthesized collapsed pose.
    let current = session.current_pose(&3).copied().unwrap();
    assert_eq!(current.frame.size, Size::ZERO);
    assert_eq!(current.opacity, 0.0);

    // Zero center displacement: the grow-in converges on the first frame.
    session.start(None);
    assert_eq!(session.frame(DT), FrameOutcome::Completed);
    assert!(session.is_completed());
    assert_eq!(session.progress(), 1.0);
}

#[test]
fn offset_interpolation_hits_both_endpoints_exactly() {
    let mut from = HashMap::new();
    from.insert(1u64, pose(0.0, 0.0, 10.0, 10.0));
    let mut to = HashMap::new();
    to.insert(1u64, pose(0.0, 500.0, 10.0, 10.0));
    let mut session = TransitionSession::new(
        session_options(from, to).with_offsets(Point::new(0.0, 100.0), Point::new(0.0, 400.0)),
        TestClock::default(),
    );

    session.set_interactive_progress(0.0);
    assert_eq!(session.current_offset(), Point::new(0.0, 100.0));
    session.set_interactive_progress(1.0);
    assert_eq!(session.current_offset(), Point::new(0.0, 400.0));
    session.set_interactive_progress(0.5);
    assert_eq!(session.current_offset(), Point::new(0.0, 250.0));
    // Out-of-range scrub input clamps.
    session.set_interactive_progress(7.0);
    assert_eq!(session.current_offset(), Point::new(0.0, 400.0));
}

#[test]
fn clock_progress_drives_offset_once_scrubbing_clears() {
    let mut from = HashMap::new();
    from.insert(1u64, pose(0.0, 0.0, 10.0, 10.0));
    let mut to = HashMap::new();
    to.insert(1u64, pose(400.0, 0.0, 10.0, 10.0));
    let mut session = TransitionSession::new(
        session_options(from, to).with_offsets(Point::ZERO, Point::new(300.0, 0.0)),
        TestClock::default(),
    );
    session.start(None);
    assert_eq!(session.current_offset(), Point::ZERO);

    session.set_interactive_progress(0.25);
    assert_eq!(session.current_offset(), Point::new(75.0, 0.0));

    session.clear_interactive_progress();
    pump_session(&mut session, 0.0, 200);
    assert!(session.is_completed());
    assert_eq!(session.progress(), 1.0);
    assert_eq!(session.current_offset(), Point::new(300.0, 0.0));
}

#[test]
fn final_offset_top_clamps_to_minimum() {
    // Target frame's top edge sits above the viewport's top inset: the
    // aligned offset must clamp to the minimum, never below it.
    let mut to = HashMap::new();
    to.insert(1u64, pose(0.0, -50.0, 100.0, 40.0));
    let session = TransitionSession::new(
        session_options(HashMap::new(), to.clone()),
        TestClock::default(),
    );
    let offset = session.final_offset_for_item(&1, Alignment::Top);
    assert_eq!(offset.y, 0.0);

    let session = TransitionSession::new(
        session_options(HashMap::new(), to).with_insets(Insets::new(10.0, 0.0, 0.0, 0.0)),
        TestClock::default(),
    );
    let offset = session.final_offset_for_item(&1, Alignment::Top);
    assert_eq!(offset.y, -10.0);
}

#[test]
fn final_offset_alignment_policies() {
    let mut to = HashMap::new();
    to.insert(1u64, pose(300.0, 450.0, 100.0, 100.0));
    let session =
        TransitionSession::new(session_options(HashMap::new(), to), TestClock::default());

    assert_eq!(session.final_offset_for_item(&1, Alignment::Top).y, 450.0);
    assert_eq!(session.final_offset_for_item(&1, Alignment::Bottom).y, 450.0);
    assert_eq!(session.final_offset_for_item(&1, Alignment::Left).x, 300.0);
    assert_eq!(session.final_offset_for_item(&1, Alignment::Right).x, 300.0);
    assert_eq!(
        session
            .final_offset_for_item(&1, Alignment::CenteredVertically)
            .y,
        450.0
    );
    assert_eq!(
        session
            .final_offset_for_item(&1, Alignment::CenteredHorizontally)
            .x,
        300.0
    );
}

#[test]
fn final_offset_clamps_to_scrollable_extent() {
    let mut to = HashMap::new();
    to.insert(1u64, pose(0.0, 950.0, 100.0, 50.0));
    let session =
        TransitionSession::new(session_options(HashMap::new(), to), TestClock::default());
    // Raw centered offset would be 925; max is content - viewport = 900.
    let offset = session.final_offset_for_item(&1, Alignment::CenteredVertically);
    assert_eq!(offset.y, 900.0);
}

#[test]
fn alignment_none_and_unknown_key_return_current_target_offset() {
    let mut to = HashMap::new();
    to.insert(1u64, pose(0.0, 0.0, 10.0, 10.0));
    let mut session = TransitionSession::new(
        session_options(HashMap::new(), to)
            .with_offsets(Point::ZERO, Point::new(0.0, 123.0)),
        TestClock::default(),
    );
    assert_eq!(
        session.final_offset_for_item(&1, Alignment::None),
        Point::new(0.0, 123.0)
    );
    assert_eq!(
        session.final_offset_for_item(&999, Alignment::Top),
        Point::new(0.0, 123.0)
    );
    session.set_to_offset(Point::new(0.0, 200.0));
    assert_eq!(
        session.final_offset_for_item(&1, Alignment::None),
        Point::new(0.0, 200.0)
    );
}

#[test]
fn retargeting_is_ignored_after_completion() {
    let mut from = HashMap::new();
    from.insert(1u64, pose(0.0, 0.0, 10.0, 10.0));
    let mut session = TransitionSession::new(
        session_options(from.clone(), from).with_offsets(Point::ZERO, Point::new(0.0, 50.0)),
        TestClock::default(),
    );
    session.start(None);
    pump_session(&mut session, 0.0, 200);
    assert!(session.is_completed());

    session.set_to_offset(Point::new(0.0, 999.0));
    assert_eq!(session.to_offset(), Point::new(0.0, 50.0));
    assert_eq!(session.current_offset(), Point::new(0.0, 50.0));
}

#[test]
fn completion_clears_the_pose_registry() {
    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    let mut from = HashMap::new();
    from.insert(1u64, pose(0.0, 0.0, 10.0, 10.0));
    let mut to = HashMap::new();
    to.insert(1u64, pose(50.0, 0.0, 10.0, 10.0));
    let clock = TestClock::default();
    let mut session = TransitionSession::new(session_options(from, to), clock.clone());
    session.start(Some(Arc::new(move || {
        counter.fetch_add(1, Ordering::Relaxed);
    })));
    assert!(session.current_pose(&1).is_some());

    pump_session(&mut session, 0.0, 200);
    assert_eq!(completions.load(Ordering::Relaxed), 1);
    assert!(session.current_pose(&1).is_none());
    let mut visited = 0;
    session.for_each_pose(|_, _| visited += 1);
    assert_eq!(visited, 0);
    assert_eq!(clock.live(), 0);
}

#[test]
fn repeated_session_start_is_a_no_op() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let mut from = HashMap::new();
    from.insert(1u64, pose(0.0, 0.0, 10.0, 10.0));
    let mut to = HashMap::new();
    to.insert(1u64, pose(500.0, 0.0, 10.0, 10.0));
    let clock = TestClock::default();
    let mut session = TransitionSession::new(session_options(from, to), clock.clone());

    let a = Arc::clone(&first);
    session.start(Some(Arc::new(move || {
        a.fetch_add(1, Ordering::Relaxed);
    })));
    session.frame(DT);

    // The animations survive a second call; its callback is discarded.
    let b = Arc::clone(&second);
    session.start(Some(Arc::new(move || {
        b.fetch_add(1, Ordering::Relaxed);
    })));
    assert!(session.is_animating());
    assert!(session.current_pose(&1).is_some());
    assert_eq!(clock.live(), 1);

    pump_session(&mut session, DT, 200);
    assert!(session.is_completed());
    assert_eq!(first.load(Ordering::Relaxed), 1);
    assert_eq!(second.load(Ordering::Relaxed), 0);
}

#[test]
fn session_cancel_drops_animations_without_completion() {
    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    let mut from = HashMap::new();
    from.insert(1u64, pose(0.0, 0.0, 10.0, 10.0));
    let mut to = HashMap::new();
    to.insert(1u64, pose(500.0, 0.0, 10.0, 10.0));
    let clock = TestClock::default();
    let mut session = TransitionSession::new(session_options(from, to), clock.clone());
    session.start(Some(Arc::new(move || {
        counter.fetch_add(1, Ordering::Relaxed);
    })));
    session.frame(DT);
    session.cancel();

    assert!(!session.is_animating());
    assert_eq!(session.frame(2.0 * DT), FrameOutcome::Idle);
    assert_eq!(completions.load(Ordering::Relaxed), 0);
    assert_eq!(clock.live(), 0);
}

#[test]
fn custom_animation_provider_builds_every_item() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&invocations);
    let mut from = HashMap::new();
    from.insert(1u64, pose(0.0, 0.0, 10.0, 10.0));
    from.insert(2u64, pose(20.0, 0.0, 10.0, 10.0));
    let mut to = HashMap::new();
    to.insert(1u64, pose(500.0, 0.0, 10.0, 10.0));
    to.insert(3u64, pose(40.0, 0.0, 10.0, 10.0));
    let session = TransitionSession::new(
        session_options(from, to).with_animation_provider(move |key: &u64, initial, target| {
            counter.fetch_add(1, Ordering::Relaxed);
            PoseAnimation::with_spring(*key, *initial, *target, SpringConfig::snappy())
        }),
        TestClock::default(),
    );
    // One animation per item in the union of the two layouts.
    assert_eq!(invocations.load(Ordering::Relaxed), 3);
    let mut visited = Vec::new();
    session.for_each_pose(|key, _| visited.push(*key));
    visited.sort_unstable();
    assert_eq!(visited, vec![1, 2, 3]);
}
