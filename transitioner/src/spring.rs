use crate::Animatable;
use crate::types::Point;

/// Positional error (distance units) below which a spring may settle.
const POSITION_EPSILON: f32 = 0.1;
/// Speed (units/second) below which a spring may settle.
///
/// Both thresholds must hold: checking position alone would declare
/// completion while still oscillating through the target.
const VELOCITY_EPSILON: f32 = 0.1;

/// Tunables for [`SpringAnimation`].
///
/// `stiffness` is the restoring coefficient (pulls position toward the
/// target, proportional to displacement); `damping` opposes velocity,
/// proportional to speed. The original tunables carried swapped names; these
/// fields are named by their numeric roles.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub initial_velocity: Point,
}

impl SpringConfig {
    pub fn new(stiffness: f32, damping: f32) -> Self {
        Self {
            stiffness,
            damping,
            initial_velocity: Point::ZERO,
        }
    }

    /// A softer spring with visible overshoot.
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0)
    }

    /// A stiffer spring that settles quickly with little overshoot.
    pub fn snappy() -> Self {
        Self::new(400.0, 30.0)
    }

    pub fn with_initial_velocity(mut self, velocity: Point) -> Self {
        self.initial_velocity = velocity;
        self
    }

    /// The damping value at which this stiffness stops oscillating.
    pub fn critical_damping(&self) -> f32 {
        2.0 * self.stiffness.sqrt()
    }

    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::new(250.0, 20.0)
    }
}

/// A damped-harmonic integrator driving a 2D value from an initial point
/// toward a target point.
///
/// Integration is semi-implicit Euler, per axis:
///
/// ```text
/// a = -stiffness * (pos - target) - damping * vel
/// vel += a * dt
/// pos += vel * dt
/// ```
///
/// Progress is the normalized distance covered, reported as a running maximum
/// so overshoot never makes it regress; it snaps to exactly `1.0` on finish.
/// A finished spring is frozen: further ticks change nothing.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringAnimation {
    initial: Point,
    target: Point,
    current: Point,
    velocity: Point,
    config: SpringConfig,
    initial_distance: f32,
    progress: f32,
    finished: bool,
}

impl SpringAnimation {
    pub fn new(initial: Point, target: Point) -> Self {
        Self::with_config(initial, target, SpringConfig::default())
    }

    pub fn with_config(initial: Point, target: Point, config: SpringConfig) -> Self {
        let initial_distance = initial.distance(target);
        Self {
            initial,
            target,
            current: initial,
            velocity: config.initial_velocity,
            config,
            initial_distance,
            // Already-converged edge case: zero displacement reads as done
            // immediately (avoids a division by zero below).
            progress: if initial_distance == 0.0 { 1.0 } else { 0.0 },
            finished: false,
        }
    }

    pub fn initial_point(&self) -> Point {
        self.initial
    }

    pub fn target_point(&self) -> Point {
        self.target
    }

    pub fn current_point(&self) -> Point {
        self.current
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Injects a starting velocity (e.g. carried over from a gesture).
    pub fn set_velocity(&mut self, velocity: Point) {
        if self.finished {
            return;
        }
        self.velocity = velocity;
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    fn settled(&self) -> bool {
        self.current.distance(self.target) < POSITION_EPSILON
            && self.velocity.length() < VELOCITY_EPSILON
    }

    fn finish(&mut self) {
        self.finished = true;
        self.progress = 1.0;
    }
}

impl Animatable for SpringAnimation {
    fn animation_tick(&mut self, delta: f32) {
        if self.finished {
            return;
        }
        if self.settled() {
            ttrace!(
                x = self.current.x,
                y = self.current.y,
                "spring settled before integration"
            );
            self.finish();
            return;
        }

        let k = self.config.stiffness;
        let d = self.config.damping;

        let ax = -k * (self.current.x - self.target.x) - d * self.velocity.x;
        self.velocity.x += ax * delta;
        self.current.x += self.velocity.x * delta;

        let ay = -k * (self.current.y - self.target.y) - d * self.velocity.y;
        self.velocity.y += ay * delta;
        self.current.y += self.velocity.y * delta;

        if self.initial_distance > 0.0 {
            let raw = 1.0 - self.current.distance(self.target) / self.initial_distance;
            // Running maximum: an overshooting spring briefly increases its
            // remaining distance, and progress must never regress.
            self.progress = self.progress.max(raw.clamp(0.0, 1.0));
        }

        if self.settled() {
            self.finish();
        }
    }

    fn progress(&self) -> f32 {
        self.progress
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
