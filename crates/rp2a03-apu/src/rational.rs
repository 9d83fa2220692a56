//! Exact fractions for cycle bookkeeping.
//!
//! The CPU clock is rarely an integer multiple of the host sample rate
//! (1 789 773 / 44 100 is roughly 40.58), and the frame sequencer splits its
//! period into quarters that land on half cycles. Tracking those phases in
//! floating point drifts over a long session, so every timer works in
//! [`Rational`] instead.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Signed fraction kept in lowest terms with a positive denominator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Rational {
    pub const ZERO: Self = Self { num: 0, den: 1 };
    pub const ONE: Self = Self { num: 1, den: 1 };

    /// Builds `num / den` in lowest terms.
    ///
    /// # Panics
    ///
    /// Panics when `den` is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "rational with zero denominator");
        Self::normalized(i128::from(num), i128::from(den))
    }

    pub const fn from_integer(value: i64) -> Self {
        Self { num: value, den: 1 }
    }

    pub const fn numer(&self) -> i64 {
        self.num
    }

    pub const fn denom(&self) -> i64 {
        self.den
    }

    pub const fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// Largest integer not greater than `self`.
    pub const fn floor(&self) -> i64 {
        self.num.div_euclid(self.den)
    }

    /// Smallest integer not less than `self`.
    pub const fn ceil(&self) -> i64 {
        let floor = self.floor();
        if self.num.rem_euclid(self.den) == 0 {
            floor
        } else {
            floor + 1
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    fn normalized(num: i128, den: i128) -> Self {
        let sign = if den < 0 { -1 } else { 1 };
        let divisor = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1) as i128;
        let num = sign * num / divisor;
        let den = sign * den / divisor;
        Self {
            num: i64::try_from(num).expect("rational numerator overflow"),
            den: i64::try_from(den).expect("rational denominator overflow"),
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<u32> for Rational {
    fn from(value: u32) -> Self {
        Self::from_integer(i64::from(value))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (a, b, c, d) = widen(self, rhs);
        Self::normalized(a * d + c * b, b * d)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let (a, b, c, d) = widen(self, rhs);
        Self::normalized(a * d - c * b, b * d)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let (a, b, c, d) = widen(self, rhs);
        Self::normalized(a * c, b * d)
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        assert!(rhs.num != 0, "rational division by zero");
        let (a, b, c, d) = widen(self, rhs);
        Self::normalized(a * d, b * c)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            num: -self.num,
            den: self.den,
        }
    }
}

impl AddAssign for Rational {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Rational {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplying keeps the order.
        let (a, b, c, d) = widen(*self, *other);
        (a * d).cmp(&(c * b))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn widen(lhs: Rational, rhs: Rational) -> (i128, i128, i128, i128) {
    (
        i128::from(lhs.num),
        i128::from(lhs.den),
        i128::from(rhs.num),
        i128::from(rhs.den),
    )
}
