//! 26.6 fixed-point scalar for advances, widths and justification amounts.
//!
//! Layout arithmetic stays in integers: 26 bits of whole pixels and 6 bits
//! of fraction, so sums of advances are exact and independent of the order
//! they are added in. Addition and subtraction wrap like the underlying
//! `i32`; multiplication and division round to the nearest 1/64.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Signed 26.6 fixed-point value.
///
/// ```rust
/// use scriptline_core::Fixed;
///
/// let x = Fixed::from_int(5);
/// let y = Fixed::from_f32(2.5);
/// assert_eq!((x + y).to_f32(), 7.5);
/// assert_eq!((x * y).to_f32(), 12.5);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    pub const FRAC_BITS: u32 = 6;
    pub const FRAC_MASK: i32 = (1 << Self::FRAC_BITS) - 1;

    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << Self::FRAC_BITS);
    pub const HALF: Fixed = Fixed(1 << (Self::FRAC_BITS - 1));
    pub const MAX: Fixed = Fixed(i32::MAX);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(x: i32) -> Self {
        Fixed(x.wrapping_shl(Self::FRAC_BITS))
    }

    /// Rounds to the nearest 1/64.
    #[inline]
    pub fn from_f32(x: f32) -> Self {
        Fixed((x * 64.0).round() as i32)
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / 64.0
    }

    /// Whole pixels after rounding to nearest.
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.round().0 >> Self::FRAC_BITS
    }

    /// Whole pixels toward negative infinity.
    #[inline]
    pub const fn truncate(self) -> i32 {
        self.0 >> Self::FRAC_BITS
    }

    #[inline]
    pub const fn round(self) -> Self {
        Fixed(self.0.wrapping_add(32) & -64)
    }

    #[inline]
    pub const fn floor(self) -> Self {
        Fixed(self.0 & -64)
    }

    #[inline]
    pub const fn ceil(self) -> Self {
        Fixed(self.0.wrapping_add(63) & -64)
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Fixed(self.0.wrapping_abs())
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Ord::max(self, other)
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Ord::min(self, other)
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Fixed {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Fixed(self.0.wrapping_add(other.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.wrapping_add(other.0);
    }
}

impl Sub for Fixed {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Fixed(self.0.wrapping_sub(other.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.wrapping_sub(other.0);
    }
}

impl Neg for Fixed {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Fixed(self.0.wrapping_neg())
    }
}

/// 26.6 product, rounded half away from zero.
impl Mul for Fixed {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        let a = i64::from(self.0);
        let b = i64::from(other.0);
        let magnitude = (a.abs() * b.abs() + 32) >> Self::FRAC_BITS;
        let value = if (a < 0) != (b < 0) { -magnitude } else { magnitude };
        Fixed(value as i32)
    }
}

/// 26.6 quotient, rounded to nearest. Division by zero yields [`Fixed::MAX`].
impl Div for Fixed {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        if other.0 == 0 {
            return Fixed::MAX;
        }
        let a = i64::from(self.0);
        let b = i64::from(other.0);
        let magnitude = ((a.abs() << Self::FRAC_BITS) + (b.abs() >> 1)) / b.abs();
        let value = if (a < 0) != (b < 0) { -magnitude } else { magnitude };
        Fixed(value as i32)
    }
}

impl Mul<i32> for Fixed {
    type Output = Self;

    #[inline]
    fn mul(self, factor: i32) -> Self {
        Fixed(self.0.wrapping_mul(factor))
    }
}

/// Truncating integer division. Division by zero yields [`Fixed::MAX`].
impl Div<i32> for Fixed {
    type Output = Self;

    #[inline]
    fn div(self, divisor: i32) -> Self {
        if divisor == 0 {
            return Fixed::MAX;
        }
        Fixed(self.0.wrapping_div(divisor))
    }
}

impl Sum for Fixed {
    fn sum<I: Iterator<Item = Fixed>>(iter: I) -> Self {
        iter.fold(Fixed::ZERO, |acc, x| acc + x)
    }
}

impl From<i32> for Fixed {
    #[inline]
    fn from(x: i32) -> Self {
        Self::from_int(x)
    }
}

impl From<Fixed> for f32 {
    #[inline]
    fn from(x: Fixed) -> f32 {
        x.to_f32()
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f32())
    }
}

/// A point in 26.6 coordinates; glyph advances and offsets use it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FixedPoint {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedPoint {
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }
}
