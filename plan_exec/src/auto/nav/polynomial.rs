//! # Polynomial
//!
//! Cubic polynomial over arc length, giving the lateral offset `rho(s)` of a candidate. Derivatives
//! are taken symbolically so curvature never suffers from finite difference noise.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of coefficients of a cubic
pub const NUM_COEFFS: usize = 4;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A polynomial of at most third degree.
///
/// Coefficients are stored lowest power first, so `[a0, a1, a2, a3]` is
/// `a0 + a1*s + a2*s^2 + a3*s^3`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Polynomial {
    coeffs: [f64; NUM_COEFFS],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Polynomial {
    /// Create a new polynomial from its coefficients, lowest power first.
    pub fn new(coeffs: [f64; NUM_COEFFS]) -> Self {
        Self { coeffs }
    }

    /// The zero polynomial.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn coeffs(&self) -> &[f64; NUM_COEFFS] {
        &self.coeffs
    }

    /// Degree of the polynomial, `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.iter().rposition(|&c| c != 0.0)
    }

    /// Evaluate the polynomial at `s`.
    pub fn at(&self, s: f64) -> f64 {
        // Horner's method
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * s + c)
    }

    /// The exact derivative of this polynomial, one degree lower.
    pub fn derivative(&self) -> Self {
        let mut coeffs = [0.0; NUM_COEFFS];

        for (power, &c) in self.coeffs.iter().enumerate().skip(1) {
            coeffs[power - 1] = c * power as f64;
        }

        Self { coeffs }
    }
}

impl From<[f64; NUM_COEFFS]> for Polynomial {
    fn from(coeffs: [f64; NUM_COEFFS]) -> Self {
        Self::new(coeffs)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_eval() {
        let p = Polynomial::new([1.0, -2.0, 0.5, 0.25]);

        assert_relative_eq!(p.at(0.0), 1.0);
        assert_relative_eq!(p.at(2.0), 1.0 - 4.0 + 2.0 + 2.0);
        assert_relative_eq!(p.at(-1.0), 1.0 + 2.0 + 0.5 - 0.25);
        assert_eq!(p.degree(), Some(3));
    }

    #[test]
    fn test_derivative() {
        let p = Polynomial::new([1.0, -2.0, 0.5, 0.25]);

        let d = p.derivative();
        assert_eq!(d.coeffs(), &[-2.0, 1.0, 0.75, 0.0]);
        assert_eq!(d.degree(), Some(2));

        let dd = d.derivative();
        assert_eq!(dd.coeffs(), &[1.0, 1.5, 0.0, 0.0]);

        for &s in &[-3.0, -0.5, 0.0, 1.0, 7.5] {
            assert_relative_eq!(d.at(s), -2.0 + s + 0.75 * s * s, epsilon = 1e-12);
            assert_relative_eq!(dd.at(s), 1.0 + 1.5 * s, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_constant_derivative_is_zero() {
        let c = Polynomial::new([4.2, 0.0, 0.0, 0.0]);
        assert_eq!(c.degree(), Some(0));

        let d = c.derivative();
        assert_eq!(d, Polynomial::zero());
        assert_eq!(d.degree(), None);
        assert_eq!(d.derivative(), Polynomial::zero());
        assert_eq!(d.at(12.0), 0.0);
    }
}
