/// A trait that represents an unary operation on a value.
/// It needs to implement a transformation of the value and its derivative.
pub trait UnaryFn<T = f64> {
    fn name(&self) -> String;
    fn f(&self, data: T) -> T;
    /// Derivative of `f` evaluated at `data`.
    fn grad(&self, data: T) -> T;
}

pub(crate) struct PtrUnaryFn<T> {
    pub name: String,
    pub f: fn(T) -> T,
    pub grad: fn(T) -> T,
}

impl<T> UnaryFn<T> for PtrUnaryFn<T> {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn f(&self, data: T) -> T {
        (self.f)(data)
    }
    fn grad(&self, data: T) -> T {
        (self.grad)(data)
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    if x >= 0. {
        1. / (1. + (-x).exp())
    } else {
        x.exp() / (1. + x.exp())
    }
}

pub(crate) fn sigmoid_derive(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1. - s)
}

pub(crate) fn relu(x: f64) -> f64 {
    x.max(0.)
}

pub(crate) fn relu_derive(x: f64) -> f64 {
    if x > 0. {
        1.
    } else {
        0.
    }
}

pub(crate) fn ln_derive(x: f64) -> f64 {
    1. / x
}
