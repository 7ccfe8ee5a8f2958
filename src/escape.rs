// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  Takes one point on the complex plane
//! and answers the only question the rest of the pipeline cares
//! about: how quickly does the orbit of z ← z² + c leave the bailout
//! radius, or does it never leave at all?
//!
//! The answer is a sum type rather than the NaN trick older renderers
//! use for "never leaves"; a match on [`EscapeValue`] can't forget the
//! member case, and no sentinel can collide with a real escape value.

use num::complex::Complex;
use std::f64::consts::LN_2;

/// The bailout radius.  An orbit whose magnitude exceeds this is
/// definitively diverging.  Far larger than the mathematical minimum
/// of 2; the extra headroom tightens the logarithmic smoothing so
/// the color gradient stays continuous instead of visibly snapping
/// at the escape boundary.
pub const BAILOUT: f64 = 65536.0;

const BAILOUT_SQR: f64 = BAILOUT * BAILOUT;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

/// What the evaluator learned about one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EscapeValue {
    /// The orbit escaped.  The value is the smoothed, fractional
    /// iteration count, never more than the iteration budget.  It can
    /// undershoot zero slightly for points far outside the set, where
    /// the smoothing correction exceeds the one iteration the orbit
    /// needed; the palette mapper normalizes that away.
    Escaped(f64),
    /// The orbit stayed bounded for the whole iteration budget, or
    /// was proven bounded without iterating.  The point is treated as
    /// a member of the set.
    Member,
}

impl EscapeValue {
    /// True for the member case.
    pub fn is_member(&self) -> bool {
        match *self {
            EscapeValue::Member => true,
            EscapeValue::Escaped(_) => false,
        }
    }
}

/// The two largest interior regions of the set, the main cardioid and
/// the period-2 bulb, have closed-form membership tests.  Points in
/// either would burn the entire iteration budget just to come back
/// "member", so catching them here is the single biggest win in the
/// whole renderer.  Unlike the bailout test this one is exact: a true
/// result is a guarantee of membership, not an estimate.
pub fn provably_in_set(c: Complex<f64>) -> bool {
    let y2 = c.im * c.im;
    let q = (c.re - D4) * (c.re - D4) + y2;
    if q * (q + (c.re - D4)) < D4 * y2 {
        return true;
    }
    (c.re + 1.0) * (c.re + 1.0) + y2 < D16
}

/// The iteration loop, without the fast-path membership tests.  Runs
/// z ← z² + c until the orbit leaves the bailout radius or the budget
/// runs out, and reports the smoothed escape value or membership.
///
/// If a newly computed z is bit-identical to its predecessor the
/// orbit has landed on a fixed point and will never escape; the loop
/// charges the full budget and stops early.
pub fn iterate(c: Complex<f64>, max_iterations: usize) -> EscapeValue {
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    let mut i = 0;
    while z.norm_sqr() < BAILOUT_SQR && i < max_iterations {
        let next = z * z + c;
        if next == z {
            i = max_iterations;
            break;
        }
        z = next;
        i += 1;
    }

    if i >= max_iterations {
        return EscapeValue::Member;
    }

    // Fractional escape time: i + 1 - log2(log2(|z|)).  The raw
    // integer count renders as concentric bands; this interpolates
    // between them.
    let log_zn = z.norm_sqr().ln() / 2.0;
    let nu = (log_zn / LN_2).ln() / LN_2;
    let smoothed = (i as f64) + 1.0 - nu;
    if smoothed.is_finite() {
        EscapeValue::Escaped(smoothed)
    } else {
        // The orbit overflowed f64 before the bailout test saw it.
        // Treat the point as having escaped at the current count.
        EscapeValue::Escaped(i as f64)
    }
}

/// Evaluate one point: the fast membership tests first, then the
/// iteration loop.  Pure; the same (c, budget) always produces a
/// bit-identical answer.
pub fn evaluate(c: Complex<f64>, max_iterations: usize) -> EscapeValue {
    if provably_in_set(c) {
        return EscapeValue::Member;
    }
    iterate(c, max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_member_by_the_closed_form_test() {
        // c = 0 sits in the middle of the main cardioid; the fast
        // path answers before the loop is ever entered.
        assert!(provably_in_set(Complex::new(0.0, 0.0)));
        assert_eq!(evaluate(Complex::new(0.0, 0.0), 1000), EscapeValue::Member);
    }

    #[test]
    fn cardioid_and_bulb_interiors_are_caught() {
        assert!(provably_in_set(Complex::new(-0.5, 0.0)));
        assert!(provably_in_set(Complex::new(0.1, 0.1)));
        assert!(provably_in_set(Complex::new(-1.0, 0.0)));
        assert!(provably_in_set(Complex::new(-1.1, 0.1)));
    }

    #[test]
    fn points_outside_the_big_regions_are_not_caught() {
        // In the set, but in neither the cardioid nor the bulb.
        assert!(!provably_in_set(Complex::new(-1.76, 0.0)));
        // Far outside the set.
        assert!(!provably_in_set(Complex::new(2.0, 2.0)));
    }

    #[test]
    fn distant_points_escape_quickly() {
        for &(re, im) in &[(3.0, 0.0), (0.0, 3.0), (-2.5, 2.5), (10.0, -10.0)] {
            match evaluate(Complex::new(re, im), 100) {
                EscapeValue::Escaped(v) => assert!(v < 100.0),
                EscapeValue::Member => panic!("|c| > 2 cannot be a member"),
            }
        }
    }

    #[test]
    fn huge_points_do_not_panic() {
        // The first squaring overflows f64; the evaluator degrades to
        // the integer count instead of emitting a non-finite value.
        match evaluate(Complex::new(1.0e200, 1.0e200), 100) {
            EscapeValue::Escaped(v) => assert!(v.is_finite()),
            EscapeValue::Member => panic!("overflowing point reported as member"),
        }
    }

    #[test]
    fn zero_budget_means_member() {
        // Outside both fast-path regions, so the loop is consulted,
        // finds i == max immediately, and reports membership.
        assert_eq!(evaluate(Complex::new(0.3, 0.5), 0), EscapeValue::Member);
    }

    #[test]
    fn interior_real_axis_points_never_escape() {
        // The segment [-2, 0.25] of the real axis is inside the set.
        // -2 and -1.76 are beyond the bulb test's reach, so these run
        // the loop; -2's orbit parks on the fixed point 2 and trips
        // the periodicity check.
        assert_eq!(evaluate(Complex::new(-2.0, 0.0), 10_000), EscapeValue::Member);
        assert_eq!(evaluate(Complex::new(-1.76, 0.0), 10_000), EscapeValue::Member);
        assert_eq!(evaluate(Complex::new(0.25, 0.0), 10_000), EscapeValue::Member);
    }

    #[test]
    fn periodicity_check_short_circuits_fixed_points() {
        // Through iterate() directly so the cardioid test can't hide
        // the loop: z stays parked at 0 and the very first comparison
        // ends the loop, budget notwithstanding.
        assert_eq!(iterate(Complex::new(0.0, 0.0), usize::max_value()), EscapeValue::Member);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let c = Complex::new(-0.743, 0.131);
        assert_eq!(evaluate(c, 5000), evaluate(c, 5000));
    }

    #[test]
    fn smoothed_value_stays_near_the_integer_count() {
        // The fractional correction moves the count by a bounded
        // amount; for a gently escaping point it must land within the
        // budget.
        match evaluate(Complex::new(0.3, 0.6), 1000) {
            EscapeValue::Escaped(v) => assert!(v < 1000.0),
            EscapeValue::Member => panic!("0.3+0.6i escapes"),
        }
    }
}
