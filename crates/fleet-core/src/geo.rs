//! Facility-plane coordinates and the small amount of vector maths the
//! dispatch and routing layers need.
//!
//! `Point` uses `f32` metres on a flat floor plan.  It doubles as a 2-D
//! vector for headings and offsets; there is no separate `Vec2` type.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use crate::FleetError;

/// Lengths below this are treated as zero when normalising.
const EPSILON: f32 = 1e-5;

/// A position (or direction) on the facility floor plan.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or `Point::ZERO` for a
    /// (near-)zero vector.
    pub fn normalized(self) -> Point {
        let len = self.length();
        if len < EPSILON {
            Point::ZERO
        } else {
            Point::new(self.x / len, self.y / len)
        }
    }

    /// `true` if the vector is too short to carry a direction.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.length() < EPSILON
    }

    /// Counter-clockwise perpendicular.
    #[inline]
    pub fn perpendicular(self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// Linear interpolation: `t = 0` yields `self`, `t = 1` yields `other`.
    #[inline]
    pub fn lerp(self, other: Point, t: f32) -> Point {
        self + (other - self) * t
    }

    /// Step from `self` toward `target` by at most `max_step`, never
    /// overshooting.
    pub fn move_towards(self, target: Point, max_step: f32) -> Point {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist < EPSILON {
            target
        } else {
            self + delta * (max_step / dist)
        }
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Wire form used by the task import format: `x;y`.
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .trim()
            .split_once(';')
            .ok_or_else(|| FleetError::InvalidPoint(s.to_owned()))?;
        let x: f32 = x.trim().parse().map_err(|_| FleetError::InvalidPoint(s.to_owned()))?;
        let y: f32 = y.trim().parse().map_err(|_| FleetError::InvalidPoint(s.to_owned()))?;
        if !x.is_finite() || !y.is_finite() {
            return Err(FleetError::InvalidPoint(s.to_owned()));
        }
        Ok(Point::new(x, y))
    }
}
