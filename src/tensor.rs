use std::fmt::Debug;

/// A trait that represents a type that can be used as a derivative value in this library.
///
/// An implementation for f64 and f32 is provided by the crate, but you can implement it for
/// your custom type, such as vectors, matrices or complex numbers.
///
/// The backpropagation engine only ever adds values together, so the requirement is
/// an additive identity and in-place addition. `one` is the conventional seed for a
/// scalar output.
pub trait Tensor: std::ops::AddAssign<Self> + Sized + Debug + Clone {
    fn zero() -> Self;
    fn one() -> Self;
}

impl Tensor for f64 {
    fn zero() -> Self {
        0.
    }

    fn one() -> Self {
        1.
    }
}

impl Tensor for f32 {
    fn zero() -> Self {
        0.
    }

    fn one() -> Self {
        1.
    }
}
