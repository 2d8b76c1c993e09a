//! Exact concrete phases.
//!
//! A phase is stored as a fraction of a full turn (2*π*), always reduced into
//! the half-open interval [0, 1). All arithmetic is performed modulo one turn,
//! so two phases compare equal exactly when they differ by a whole number of
//! turns. No floating-point values are involved at any point.

use std::fmt;
use num_rational::Rational64 as R64;
use num_traits::{ One, Signed, Zero };

// `turns` modulo one, in [0, 1)
fn reduce(turns: R64) -> R64 {
    let r = turns % R64::one();
    if r.is_negative() { r + R64::one() } else { r }
}

// return `true` if `a` is a whole number of turns
pub(crate) fn is_whole(a: R64) -> bool { a.is_integer() }

/// A concrete phase, as an exact fraction of a full turn.
///
/// The fraction is kept reduced into [0, 1), so the derived comparisons are
/// comparisons modulo one turn.
///
/// ```
/// # use zx_rewrite::phase::Phase;
/// assert_eq!( Phase::new(3, 4),     -Phase::new(1, 4) );
/// assert_eq!( Phase::new(5, 4),      Phase::new(1, 4) );
/// assert_eq!( Phase::new(3, 8) * 2,  Phase::new(3, 4) );
/// assert_eq!( Phase::pi() + Phase::pi(), Phase::zero() );
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Phase(R64);

impl Default for Phase {
    fn default() -> Self { Self::zero() }
}

impl From<R64> for Phase {
    fn from(turns: R64) -> Self { Self(reduce(turns)) }
}

impl From<Phase> for R64 {
    fn from(ph: Phase) -> Self { ph.0 }
}

impl Phase {
    /// `numer / denom` of a turn.
    ///
    /// *Panics if `denom` is zero.*
    pub fn new(numer: i64, denom: i64) -> Self {
        R64::new(numer, denom).into()
    }

    pub fn zero() -> Self { Self(R64::zero()) }

    /// Half a turn.
    pub fn pi() -> Self { Self(R64::new(1, 2)) }

    /// A quarter turn.
    pub fn pi2() -> Self { Self(R64::new(1, 4)) }

    /// An eighth of a turn, as in the T gate.
    pub fn pi4() -> Self { Self(R64::new(1, 8)) }

    pub fn pi8() -> Self { Self(R64::new(1, 16)) }

    /// `1 / n` of a turn.
    pub fn frac(n: i64) -> Self { Self::new(1, n) }

    /// Return the fraction of a full turn represented by `self`, in [0, 1).
    pub fn turns(self) -> R64 { self.0 }

    pub fn is_zero(self) -> bool { self.0.is_zero() }

    /// Return `true` if `self` is a whole number of `1 / n` turns.
    pub fn is_mult(self, n: i64) -> bool { (self.0 * n).is_integer() }

    /// Render the phase as a multiple of π, e.g. `3π/4`.
    pub fn pi_label(&self) -> String {
        if self.is_zero() { return "0".to_string(); }
        let halves = self.0 * 2;
        match (*halves.numer(), *halves.denom()) {
            (1, 1) => "π".to_string(),
            (n, 1) => format!("{}π", n),
            (1, d) => format!("π/{}", d),
            (n, d) => format!("{}π/{}", n, d),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Neg for Phase {
    type Output = Phase;

    fn neg(self) -> Self::Output { reduce(-self.0).into() }
}

macro_rules! impl_phase_binop {
    ( $trait:ident, $fun:ident, $op:tt, $trait_assign:ident, $fun_assign:ident ) => {
        impl std::ops::$trait<Phase> for Phase {
            type Output = Phase;

            fn $fun(self, rhs: Phase) -> Self::Output {
                Self(reduce(self.0 $op rhs.0))
            }
        }

        impl std::ops::$trait_assign<Phase> for Phase {
            fn $fun_assign(&mut self, rhs: Phase) {
                *self = *self $op rhs;
            }
        }
    }
}
impl_phase_binop!(Add, add, +, AddAssign, add_assign);
impl_phase_binop!(Sub, sub, -, SubAssign, sub_assign);

impl std::iter::Sum for Phase {
    fn sum<I>(iter: I) -> Self
    where I: IntoIterator<Item = Self>
    {
        iter.into_iter().fold(Self::zero(), |acc, ph| acc + ph)
    }
}

// scaling by integers and rationals; both sides for `Mul`
macro_rules! impl_phase_scale {
    ( $rhs:ty ) => {
        impl std::ops::Mul<$rhs> for Phase {
            type Output = Phase;

            fn mul(self, k: $rhs) -> Self::Output { Self(reduce(self.0 * k)) }
        }

        impl std::ops::Mul<Phase> for $rhs {
            type Output = Phase;

            fn mul(self, ph: Phase) -> Self::Output { ph * self }
        }

        impl std::ops::Div<$rhs> for Phase {
            type Output = Phase;

            fn div(self, k: $rhs) -> Self::Output { Self(reduce(self.0 / k)) }
        }
    }
}
impl_phase_scale!(i64);
impl_phase_scale!(R64);
