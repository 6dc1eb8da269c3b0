//! Coordinate: an immutable integer pair used as a map key.

use crate::key::ChainKey;
use core::fmt;

/// Multiplier applied to `x` before adding `y`.
const X_FACTOR: i32 = 101;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn x(&self) -> i32 {
        self.x
    }

    pub const fn y(&self) -> i32 {
        self.y
    }
}

impl ChainKey for Coordinate {
    fn equals(&self, other: &Self) -> bool {
        core::ptr::eq(self, other) || (self.x == other.x && self.y == other.y)
    }

    /// `x * 101 + y` with two's complement wraparound.
    fn digest(&self) -> i32 {
        self.x.wrapping_mul(X_FACTOR).wrapping_add(self.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
