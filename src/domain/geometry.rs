/// Geometry primitives shared by physics, collision and rendering.
///
/// `Rect` is integer-valued (pixel bounds). Positions and velocities are
/// `Vec2` in pixels and pixels/second.

use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Snap both axes to the nearest whole pixel (ties to even).
    pub fn snapped(self) -> Self {
        Vec2 { x: self.x.round_ties_even(), y: self.y.round_ties_even() }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2 { x: self.x * rhs, y: self.y * rhs }
    }
}

/// Integer pixel coordinate (exit marker).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned integer rectangle. `right` and `bottom` are exclusive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Rect { left, top, width, height }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point { x: self.left + self.width / 2, y: self.top + self.height / 2 }
    }

    pub fn bottom_center(&self) -> Vec2 {
        Vec2::new(self.left as f32 + self.width as f32 / 2.0, self.bottom() as f32)
    }

    pub fn offset_x(&self, dx: i32) -> Rect {
        Rect { left: self.left + dx, ..*self }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        other.left < self.right()
            && self.left < other.right()
            && other.top < self.bottom()
            && self.top < other.bottom()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.left <= p.x && p.x < self.right() && self.top <= p.y && p.y < self.bottom()
    }

    /// Signed overlap of `self` into `other`, per axis.
    ///
    /// The sign gives the push-out direction for `self`. Returns
    /// `Vec2::ZERO` when the rectangles do not overlap.
    pub fn intersection_depth(&self, other: &Rect) -> Vec2 {
        let half_a = Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0);
        let half_b = Vec2::new(other.width as f32 / 2.0, other.height as f32 / 2.0);

        let center_a = Vec2::new(self.left as f32 + half_a.x, self.top as f32 + half_a.y);
        let center_b = Vec2::new(other.left as f32 + half_b.x, other.top as f32 + half_b.y);

        let dist = center_a - center_b;
        let min = half_a + half_b;

        if dist.x.abs() >= min.x || dist.y.abs() >= min.y {
            return Vec2::ZERO;
        }

        let depth_x = if dist.x > 0.0 { min.x - dist.x } else { -min.x - dist.x };
        let depth_y = if dist.y > 0.0 { min.y - dist.y } else { -min.y - dist.y };
        Vec2::new(depth_x, depth_y)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    /// Closest point on the rectangle lies strictly inside the radius.
    /// Distance zero is included on purpose: a center inside the
    /// rectangle is an overlap, so a gem is collected from within.
    pub fn intersects(&self, rect: &Rect) -> bool {
        let nearest = Vec2::new(
            self.center.x.clamp(rect.left as f32, rect.right() as f32),
            self.center.y.clamp(rect.top as f32, rect.bottom() as f32),
        );
        (self.center - nearest).length_squared() < self.radius * self.radius
    }
}
