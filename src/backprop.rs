//! Reverse-mode pass over a computation graph.

use std::collections::HashMap;

use crate::{error::Result, topological_sort, Tensor, VarId, Variable};

/// Runs backpropagation on the computation graph in order to compute derivatives
/// for the leaf nodes.
///
/// `deriv` is the derivative of the final output with respect to `root`, usually
/// [`Tensor::one`]. Results are written to each leaf through
/// [`Variable::accumulate_derivative`], which adds to whatever the leaf already holds.
///
/// A leaf reachable through several paths receives the sum of the contributions of
/// all paths, in a single call.
///
/// # Errors
///
/// [`Error::GraphNotADag`](crate::Error::GraphNotADag) if the graph has a cycle. The
/// order is computed before anything is mutated, so no leaf is touched in that case.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use minigrad::{backpropagate, IdGenerator, Term};
///
/// let ids = Rc::new(IdGenerator::new());
/// let x = Term::leaf(&ids, "x", 2.);
/// let y = Term::leaf(&ids, "y", 3.);
/// let z = &x * &y;
///
/// backpropagate(&z, 1.).unwrap();
/// assert_eq!(x.grad(), 3.);
/// assert_eq!(y.grad(), 2.);
/// ```
pub fn backpropagate<V: Variable>(root: &V, deriv: V::Value) -> Result<()> {
    let order = topological_sort(root)?;
    log::debug!(
        "backpropagate: {} variables from root {}",
        order.len(),
        root.unique_id()
    );

    let mut derivs: HashMap<VarId, V::Value> = HashMap::new();
    derivs.insert(root.unique_id(), deriv);

    for node in order {
        // Every node after the root has been fed by a child earlier in the order,
        // unless its chain rule chose to report nothing for it.
        let Some(d_output) = derivs.remove(&node.unique_id()) else {
            continue;
        };
        if node.is_leaf() {
            log::trace!("backpropagate: {} <- {d_output:?}", node.unique_id());
            node.accumulate_derivative(d_output);
            continue;
        }
        for (parent, d) in node.chain_rule(&d_output) {
            if parent.is_constant() {
                continue;
            }
            *derivs
                .entry(parent.unique_id())
                .or_insert_with(<V::Value as Tensor>::zero) += d;
        }
    }

    Ok(())
}
