//! Basic numerical concepts used throughout the analysis

#![allow(missing_docs)]

// Floating-point precision is configured here
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f32")]
pub use std::f32 as floats;
#[cfg(not(feature = "f32"))]
pub type Float = f64;
#[cfg(not(feature = "f32"))]
pub use std::f64 as floats;

/// Angular helpers
pub mod functions {
    use super::{floats::consts::TAU, Float};

    /// Bring an azimuthal angle into the [0, 2𝜋) range
    pub fn phi_0_2pi(phi: Float) -> Float {
        let wrapped = phi.rem_euclid(TAU);
        // rem_euclid can round up to exactly 2𝜋 for tiny negative inputs
        if wrapped >= TAU {
            0.
        } else {
            wrapped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{floats::consts::PI, functions::phi_0_2pi, Float};
    use approx::assert_relative_eq;

    #[test]
    fn phi_wrapping() {
        assert_eq!(phi_0_2pi(1.), 1.);
        let tolerance = 4. * Float::EPSILON;
        assert_relative_eq!(phi_0_2pi(-PI / 2.), 1.5 * PI, max_relative = tolerance);
        assert_relative_eq!(phi_0_2pi(5. * PI), PI, max_relative = tolerance);
        assert!(phi_0_2pi(-1e-300) < 2. * PI);
    }
}
