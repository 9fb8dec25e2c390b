//! Reverse-mode automatic differentiation over dynamically built computation graphs.
//!
//! The engine ([`topological_sort`], [`backpropagate`]) works on any node type that
//! implements [`Variable`]. [`Term`] is a scalar node type built on top of it.

mod backprop;
mod central_diff;
mod context;
pub mod error;
mod tensor;
mod term;
mod topo;
mod unary_fn;
mod variable;

pub use backprop::backpropagate;
pub use central_diff::{central_difference, CentralDifference};
pub use context::Context;
pub use error::{Error, Result};
#[cfg(feature = "macro")]
pub use minigrad_macro::minigrad;
pub use tensor::Tensor;
pub use term::{History, Term};
pub use topo::topological_sort;
pub use unary_fn::UnaryFn;
pub use variable::{IdGenerator, VarId, Variable};
