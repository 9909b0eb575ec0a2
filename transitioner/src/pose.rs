use crate::Animatable;
use crate::spring::{SpringAnimation, SpringConfig};
use crate::types::{Point, Pose, Rect, Size, Transform, lerp};

/// Binds one spring to an item identity and a pose pair.
///
/// The spring physically drives the frame's center; every other attribute
/// (size, opacity, transform) is blended linearly between the initial and
/// target pose using the spring's scalar progress, keeping all attributes on
/// a single physically-driven timeline.
///
/// Construction requires both poses up front; there is no partially
/// initialized state to observe.
#[derive(Clone, Debug)]
pub struct PoseAnimation<K> {
    key: K,
    initial: Pose,
    target: Pose,
    current: Pose,
    spring: SpringAnimation,
}

impl<K> PoseAnimation<K> {
    pub fn new(key: K, initial: Pose, target: Pose) -> Self {
        Self::with_spring(key, initial, target, SpringConfig::default())
    }

    pub fn with_spring(key: K, initial: Pose, target: Pose, config: SpringConfig) -> Self {
        let spring =
            SpringAnimation::with_config(initial.frame.center(), target.frame.center(), config);
        Self {
            key,
            initial,
            target,
            current: initial,
            spring,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn initial_pose(&self) -> &Pose {
        &self.initial
    }

    pub fn target_pose(&self) -> &Pose {
        &self.target
    }

    /// The derived pose as of the latest tick.
    pub fn current_pose(&self) -> &Pose {
        &self.current
    }

    pub fn spring(&self) -> &SpringAnimation {
        &self.spring
    }

    /// Injects a starting velocity into the underlying spring.
    pub fn set_velocity(&mut self, velocity: Point) {
        self.spring.set_velocity(velocity);
    }

    fn interpolate_pose(&mut self) {
        let t = self.spring.progress();
        let size = Size::lerp(self.initial.frame.size, self.target.frame.size, t);
        self.current = Pose {
            frame: Rect::centered_at(self.spring.current_point(), size),
            opacity: lerp(self.initial.opacity, self.target.opacity, t),
            transform: Transform::lerp(&self.initial.transform, &self.target.transform, t),
        };
    }
}

impl<K> Animatable for PoseAnimation<K> {
    fn animation_tick(&mut self, delta: f32) {
        self.spring.animation_tick(delta);
        self.interpolate_pose();
    }

    fn progress(&self) -> f32 {
        self.spring.progress()
    }

    fn is_finished(&self) -> bool {
        self.spring.is_finished()
    }
}
