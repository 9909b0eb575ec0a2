use std::collections::HashMap;
use std::sync::Arc;

use crate::Animatable;
use crate::animator::{Animator, CompletionCallback, FrameClock, FrameOutcome, TickCallback};
use crate::key::TransitionKey;
use crate::pose::PoseAnimation;
use crate::spring::SpringConfig;
use crate::types::{Alignment, Insets, Point, Pose, Size};

/// Factory building the per-item animation; swapping it swaps the timing
/// behavior (e.g. a different spring per item) without touching the session.
pub type AnimationProvider<K> =
    Arc<dyn Fn(&K, &Pose, &Pose) -> PoseAnimation<K> + Send + Sync>;

/// Configuration for [`TransitionSession`].
///
/// Cheap to clone: closures are stored in `Arc`s.
pub struct TransitionOptions<K> {
    /// Pose per item in the layout being transitioned away from.
    pub from_poses: HashMap<K, Pose>,
    /// Pose per item in the layout being transitioned to.
    pub to_poses: HashMap<K, Pose>,
    /// Scroll offset at transition start. Immutable once the session exists.
    pub from_offset: Point,
    /// Scroll offset the transition is heading to. Retargetable mid-flight
    /// via [`TransitionSession::set_to_offset`].
    pub to_offset: Point,
    /// Viewport extent, used for alignment and offset clamping.
    pub viewport: Size,
    /// Viewport edge insets, used for alignment and offset clamping.
    pub insets: Insets,
    /// Content extent of the target layout, used for offset clamping.
    pub content_size: Size,
    /// Spring tunables used by the default animation provider.
    pub spring: SpringConfig,
    /// Optional custom per-item animation factory.
    pub animation_provider: Option<AnimationProvider<K>>,
    /// Optional callback fired after every member has been advanced.
    pub on_tick: Option<TickCallback>,
}

impl<K> TransitionOptions<K> {
    pub fn new(from_poses: HashMap<K, Pose>, to_poses: HashMap<K, Pose>) -> Self {
        Self {
            from_poses,
            to_poses,
            from_offset: Point::ZERO,
            to_offset: Point::ZERO,
            viewport: Size::ZERO,
            insets: Insets::default(),
            content_size: Size::ZERO,
            spring: SpringConfig::default(),
            animation_provider: None,
            on_tick: None,
        }
    }

    pub fn with_offsets(mut self, from_offset: Point, to_offset: Point) -> Self {
        self.from_offset = from_offset;
        self.to_offset = to_offset;
        self
    }

    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    pub fn with_content_size(mut self, content_size: Size) -> Self {
        self.content_size = content_size;
        self
    }

    pub fn with_spring(mut self, spring: SpringConfig) -> Self {
        self.spring = spring;
        self
    }

    pub fn with_animation_provider(
        mut self,
        provider: impl Fn(&K, &Pose, &Pose) -> PoseAnimation<K> + Send + Sync + 'static,
    ) -> Self {
        self.animation_provider = Some(Arc::new(provider));
        self
    }

    pub fn with_on_tick(mut self, on_tick: impl Fn(f32) + Send + Sync + 'static) -> Self {
        self.on_tick = Some(Arc::new(on_tick));
        self
    }
}

impl<K: Clone> Clone for TransitionOptions<K> {
    fn clone(&self) -> Self {
        Self {
            from_poses: self.from_poses.clone(),
            to_poses: self.to_poses.clone(),
            from_offset: self.from_offset,
            to_offset: self.to_offset,
            viewport: self.viewport,
            insets: self.insets,
            content_size: self.content_size,
            spring: self.spring,
            animation_provider: self.animation_provider.clone(),
            on_tick: self.on_tick.clone(),
        }
    }
}

impl<K: core::fmt::Debug> core::fmt::Debug for TransitionOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransitionOptions")
            .field("from_poses", &self.from_poses.len())
            .field("to_poses", &self.to_poses.len())
            .field("from_offset", &self.from_offset)
            .field("to_offset", &self.to_offset)
            .field("viewport", &self.viewport)
            .field("insets", &self.insets)
            .field("content_size", &self.content_size)
            .field("spring", &self.spring)
            .finish_non_exhaustive()
    }
}

/// One complete from-layout-to-layout animation run.
///
/// Builds one [`PoseAnimation`] per item present in either layout (items
/// missing on one side get a synthesized collapsed pose, so they animate
/// in/out), hands the set to an [`Animator`], and interpolates the scroll
/// offset alongside the poses.
///
/// The host pumps [`TransitionSession::frame`] per refresh while the session
/// is animating, then reads the interpolated poses and offset.
pub struct TransitionSession<K, C: FrameClock> {
    animator: Animator<PoseAnimation<K>, C>,
    /// Animations built at construction, handed to the animator on `start`.
    pending: Vec<PoseAnimation<K>>,
    index: HashMap<K, usize>,
    to_poses: HashMap<K, Pose>,
    from_offset: Point,
    to_offset: Point,
    viewport: Size,
    insets: Insets,
    content_size: Size,
    interactive_progress: Option<f32>,
    on_tick: Option<TickCallback>,
    started: bool,
    completed: bool,
}

impl<K: TransitionKey, C: FrameClock> TransitionSession<K, C> {
    pub fn new(options: TransitionOptions<K>, clock: C) -> Self {
        let TransitionOptions {
            from_poses,
            to_poses,
            from_offset,
            to_offset,
            viewport,
            insets,
            content_size,
            spring,
            animation_provider,
            on_tick,
        } = options;

        let build = |key: &K, initial: &Pose, target: &Pose| match &animation_provider {
            Some(provider) => provider(key, initial, target),
            None => PoseAnimation::with_spring(key.clone(), *initial, *target, spring),
        };

        let mut pending = Vec::with_capacity(from_poses.len().max(to_poses.len()));
        let mut index = HashMap::with_capacity(pending.capacity());

        for (key, from) in &from_poses {
            let to = to_poses
                .get(key)
                .copied()
                .unwrap_or_else(|| Pose::collapsed_at(from));
            index.insert(key.clone(), pending.len());
            pending.push(build(key, from, &to));
        }
        for (key, to) in &to_poses {
            if from_poses.contains_key(key) {
                continue;
            }
            let from = Pose::collapsed_at(to);
            index.insert(key.clone(), pending.len());
            pending.push(build(key, &from, to));
        }

        tdebug!(
            items = pending.len(),
            from_x = from_offset.x,
            from_y = from_offset.y,
            to_x = to_offset.x,
            to_y = to_offset.y,
            "session built"
        );

        Self {
            animator: Animator::new(clock),
            pending,
            index,
            to_poses,
            from_offset,
            to_offset,
            viewport,
            insets,
            content_size,
            interactive_progress: None,
            on_tick,
            started: false,
            completed: false,
        }
    }

    /// Registers the built animations with the animator (subscribing to the
    /// frame clock). `on_complete` fires exactly once when every animation
    /// has converged; it is not invoked if the session is cancelled or
    /// replaced.
    ///
    /// A session runs at most once: repeated calls are no-ops and their
    /// callback is discarded.
    pub fn start(&mut self, on_complete: Option<CompletionCallback>) {
        if self.started {
            return;
        }
        self.started = true;
        let members = core::mem::take(&mut self.pending);
        self.animator.start(members, self.on_tick.clone(), on_complete);
    }

    /// Delivers one frame-clock notification; see [`Animator::frame`].
    ///
    /// On completion the per-item registry is cleared and the animations are
    /// dropped with the run.
    pub fn frame(&mut self, now: f64) -> FrameOutcome {
        let outcome = self.animator.frame(now);
        if outcome == FrameOutcome::Completed {
            self.index.clear();
            self.completed = true;
        }
        outcome
    }

    /// Tears down without invoking the completion callback. Idempotent.
    pub fn cancel(&mut self) {
        self.animator.cancel_all_animations();
        self.pending.clear();
        self.index.clear();
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn animations(&self) -> &[PoseAnimation<K>] {
        let members = self.animator.members();
        if members.is_empty() {
            &self.pending
        } else {
            members
        }
    }

    /// Aggregate progress across all item animations (0.0 before the first
    /// tick, exactly 1.0 after completion).
    pub fn progress(&self) -> f32 {
        let animations = self.animations();
        if animations.is_empty() {
            return if self.completed { 1.0 } else { 0.0 };
        }
        animations.iter().map(|a| a.progress()).sum::<f32>() / animations.len() as f32
    }

    /// The interpolated pose for one item, `None` once the session has
    /// completed (the registry is cleared) or for unknown keys.
    pub fn current_pose(&self, key: &K) -> Option<&Pose> {
        let i = *self.index.get(key)?;
        self.animations().get(i).map(|a| a.current_pose())
    }

    /// Visits every item's interpolated pose without allocating.
    pub fn for_each_pose(&self, mut f: impl FnMut(&K, &Pose)) {
        for animation in self.animations() {
            f(animation.key(), animation.current_pose());
        }
    }

    pub fn from_offset(&self) -> Point {
        self.from_offset
    }

    pub fn to_offset(&self) -> Point {
        self.to_offset
    }

    /// Retargets the destination offset (e.g. the focused item changed
    /// mid-flight). Ignored after completion.
    pub fn set_to_offset(&mut self, to_offset: Point) {
        if self.completed {
            return;
        }
        ttrace!(x = to_offset.x, y = to_offset.y, "retarget to_offset");
        self.to_offset = to_offset;
    }

    /// Overrides the clock-driven progress with an externally supplied value
    /// (interactive scrubbing). Clamped to `[0, 1]`.
    pub fn set_interactive_progress(&mut self, progress: f32) {
        self.interactive_progress = Some(progress.clamp(0.0, 1.0));
    }

    /// Returns offset interpolation to the animator's own progress.
    pub fn clear_interactive_progress(&mut self) {
        self.interactive_progress = None;
    }

    /// Forgets the previous frame timestamp; see
    /// [`Animator::reset_frame_timing`].
    pub fn reset_frame_timing(&mut self) {
        self.animator.reset_frame_timing();
    }

    pub fn interactive_progress(&self) -> Option<f32> {
        self.interactive_progress
    }

    fn driving_progress(&self) -> f32 {
        self.interactive_progress.unwrap_or_else(|| self.progress())
    }

    /// The interpolated scroll offset:
    /// `from + (to − from) * driving_progress`.
    pub fn current_offset(&self) -> Point {
        Point::lerp(self.from_offset, self.to_offset, self.driving_progress())
    }

    /// Computes the offset placing `key`'s target frame per `alignment`,
    /// clamped to the valid scrollable range. `Alignment::None` (and an
    /// unknown key) return the current target offset unchanged.
    pub fn final_offset_for_item(&self, key: &K, alignment: Alignment) -> Point {
        let Some(pose) = self.to_poses.get(key) else {
            return self.to_offset;
        };
        let frame = pose.frame;
        let mut target = self.to_offset;
        match alignment {
            Alignment::Top => target.y = frame.min_y() - self.insets.top,
            Alignment::Bottom => {
                target.y = frame.max_y() + self.insets.bottom - self.viewport.height;
            }
            Alignment::Left => target.x = frame.min_x() - self.insets.left,
            Alignment::Right => {
                target.x = frame.max_x() + self.insets.right - self.viewport.width;
            }
            Alignment::CenteredVertically => {
                target.y = frame.mid_y() - self.viewport.height / 2.0;
            }
            Alignment::CenteredHorizontally => {
                target.x = frame.mid_x() - self.viewport.width / 2.0;
            }
            Alignment::None => return self.to_offset,
        }
        self.clamp_offset(target)
    }

    /// Clamps an offset to the valid scrollable range: no further up/left
    /// than the inset-adjusted minimum, no further down/right than the
    /// content extent minus the viewport extent.
    pub fn clamp_offset(&self, offset: Point) -> Point {
        let min_x = -self.insets.left;
        let min_y = -self.insets.top;
        let max_x = (self.content_size.width + self.insets.right - self.viewport.width).max(min_x);
        let max_y =
            (self.content_size.height + self.insets.bottom - self.viewport.height).max(min_y);
        Point::new(offset.x.clamp(min_x, max_x), offset.y.clamp(min_y, max_y))
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }
}
