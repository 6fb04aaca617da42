//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value between the given minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Apply a symmetric deadzone about zero to a normalised input.
///
/// Inputs with a magnitude below `deadzone` map to zero. Inputs above it are
/// rescaled so that the output still covers the full [-1, +1] range without a
/// step at the deadzone boundary.
pub fn deadzone<T>(value: T, deadzone: T) -> T
where
    T: Float,
{
    let one = T::from(1.0).unwrap();

    if value.abs() < deadzone {
        T::from(0.0).unwrap()
    } else {
        (value - deadzone * value.signum()) / (one - deadzone)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&0.5f64, &0f64, &1f64), 0.5f64);
        assert_eq!(clamp(&-0.5f64, &0f64, &1f64), 0f64);
        assert_eq!(clamp(&1.5f64, &0f64, &1f64), 1f64);
    }

    #[test]
    fn test_deadzone() {
        assert_eq!(deadzone(0.04f64, 0.05f64), 0f64);
        assert_eq!(deadzone(-0.04f64, 0.05f64), 0f64);
        assert_eq!(deadzone(1f64, 0.05f64), 1f64);
        assert_eq!(deadzone(-1f64, 0.05f64), -1f64);

        // Continuous at the deadzone boundary
        assert!(deadzone(0.05f64, 0.05f64).abs() < 1e-12);
    }
}
