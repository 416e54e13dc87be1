use core::ops::{Add, Div, Mul, Sub};

/// 2D vector in logical coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector perpendicular to `self` (rotated 90° clockwise in
    /// +Y-down space). Returns zero for a zero-length input.
    #[inline]
    pub fn perpendicular_unit(self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            return Vec2::zero();
        }
        Vec2::new(-self.y / len, self.x / len)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_is_unit_and_orthogonal() {
        let v = Vec2::new(3.0, 4.0);
        let p = v.perpendicular_unit();
        assert!((p.length() - 1.0).abs() < 1e-6);
        assert!((v.x * p.x + v.y * p.y).abs() < 1e-6);
    }

    #[test]
    fn perpendicular_of_zero_is_zero() {
        assert_eq!(Vec2::zero().perpendicular_unit(), Vec2::zero());
    }
}
