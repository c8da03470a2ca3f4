//! Scalar types accepted by the dense kernels.

use num_traits::Float;
use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Real floating-point scalar. Implemented for `f32` and `f64` only.
pub trait Scalar:
    Float + Debug + Default + Send + Sync + nalgebra::Scalar + sealed::Sealed
{
    /// Lossy conversion from an `f64` constant (settings, tolerances).
    fn of_f64(v: f64) -> Self;

    /// Widening conversion used for diagnostics.
    fn as_f64(self) -> f64;
}

impl Scalar for f32 {
    #[inline]
    fn of_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for f64 {
    #[inline]
    fn of_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}
