/// A 2D point, also used as a vector (velocities, scroll offsets).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Vector length (for velocity magnitude checks).
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            x: lerp(a.x, b.x, t),
            y: lerp(a.y, b.y, t),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            width: lerp(a.width, b.width, t),
            height: lerp(a.height, b.height, t),
        }
    }
}

/// An axis-aligned rectangle (item frame, viewport bounds).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn centered_at(center: Point, size: Size) -> Self {
        Self {
            origin: Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
            size,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    pub fn min_x(&self) -> f32 {
        self.origin.x
    }

    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn mid_x(&self) -> f32 {
        self.origin.x + self.size.width / 2.0
    }

    pub fn mid_y(&self) -> f32 {
        self.origin.y + self.size.height / 2.0
    }
}

/// Viewport edge insets used when computing aligned scroll offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Insets {
    pub fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

/// A 2D affine transform in column-major `{a, b, c, d, tx, ty}` form.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Component-wise blend. Keeps all pose attributes on the single
    /// spring-driven timeline; not a true matrix decomposition.
    pub fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Self {
            a: lerp(a.a, b.a, t),
            b: lerp(a.b, b.b, t),
            c: lerp(a.c, b.c, t),
            d: lerp(a.d, b.d, t),
            tx: lerp(a.tx, b.tx, t),
            ty: lerp(a.ty, b.ty, t),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An immutable snapshot of one item's visual placement.
///
/// Produced by the external layout engines; never mutated in place. The
/// engine derives interpolated poses from a pair of these.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub frame: Rect,
    pub opacity: f32,
    pub transform: Transform,
}

impl Pose {
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            opacity: 1.0,
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Synthesizes the degenerate pose used for an item present in only one
    /// of the two layouts: zero size and opacity at the counterpart's
    /// location, so the item animates in/out instead of erroring.
    pub fn collapsed_at(counterpart: &Pose) -> Self {
        Self {
            frame: Rect::centered_at(counterpart.frame.center(), Size::ZERO),
            opacity: 0.0,
            transform: counterpart.transform,
        }
    }
}

/// Policy for computing a final scroll offset relative to a target item's
/// frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    Top,
    Bottom,
    Left,
    Right,
    CenteredVertically,
    CenteredHorizontally,
    /// Explicit no-op: keep the current target offset.
    None,
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
