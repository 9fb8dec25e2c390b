/// Values saved during the forward pass for use in `chain_rule`.
///
/// A context is created together with the node it belongs to. When `no_grad` is set,
/// nothing is stored, since no backward pass will run on the node.
#[derive(Clone, Debug, PartialEq)]
pub struct Context<T> {
    no_grad: bool,
    saved_values: Vec<T>,
}

impl<T> Context<T> {
    pub fn new(no_grad: bool) -> Self {
        Self {
            no_grad,
            saved_values: vec![],
        }
    }

    pub fn no_grad(&self) -> bool {
        self.no_grad
    }

    /// Store the given values if they need to be used during backpropagation.
    /// A second call replaces what the first one saved.
    pub fn save_for_backward(&mut self, values: impl IntoIterator<Item = T>) {
        if self.no_grad {
            return;
        }
        self.saved_values = values.into_iter().collect();
    }

    pub fn saved_tensors(&self) -> &[T] {
        &self.saved_values
    }
}

impl<T> Default for Context<T> {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_values_in_order() {
        let mut ctx = Context::default();
        ctx.save_for_backward([2., 3.]);
        assert_eq!(ctx.saved_tensors(), &[2., 3.]);
    }

    #[test]
    fn no_grad_skips_saving() {
        let mut ctx = Context::new(true);
        ctx.save_for_backward([2., 3.]);
        assert!(ctx.no_grad());
        assert!(ctx.saved_tensors().is_empty());
    }

    #[test]
    fn later_save_replaces() {
        let mut ctx = Context::new(false);
        ctx.save_for_backward(vec![1.]);
        ctx.save_for_backward(vec![4., 5.]);
        assert_eq!(ctx.saved_tensors(), &[4., 5.]);
    }
}
