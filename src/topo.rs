//! Topological ordering of a computation graph.

use std::collections::HashSet;

use crate::{
    error::{Error, Result},
    VarId, Variable,
};

/// A node whose parents are being visited. `parents` yields the ones not visited yet.
struct Frame<V> {
    node: V,
    parents: std::vec::IntoIter<V>,
}

#[derive(Default)]
struct Marks {
    temporary: HashSet<VarId>,
    permanent: HashSet<VarId>,
}

/// Computes the topological order of the computation graph.
///
/// Returns the non-constant variables reachable from `root`, root first: every node
/// comes before all of its parents, so the leaves end up at the back. Parents are
/// visited in the order the node reports them, which makes the result deterministic.
///
/// The traversal keeps its own stack of frames, so the depth of the graph is limited by
/// memory rather than by the call stack.
///
/// # Errors
///
/// [`Error::GraphNotADag`] if a node is reachable from itself.
pub fn topological_sort<V: Variable>(root: &V) -> Result<Vec<V>> {
    let mut marks = Marks::default();
    let mut stack = vec![];
    // Post-order; reversed at the end, which is the same as prepending each finished node.
    let mut finished = vec![];

    enter(root.clone(), &mut marks, &mut stack)?;

    while let Some(frame) = stack.last_mut() {
        match frame.parents.next() {
            Some(parent) => enter(parent, &mut marks, &mut stack)?,
            None => {
                let Some(Frame { node, .. }) = stack.pop() else {
                    break;
                };
                let id = node.unique_id();
                marks.temporary.remove(&id);
                marks.permanent.insert(id);
                finished.push(node);
            }
        }
    }

    finished.reverse();
    log::debug!(
        "topological_sort: {} variables from root {}",
        finished.len(),
        root.unique_id()
    );
    Ok(finished)
}

/// Starts visiting `node` unless it is constant or already placed.
fn enter<V: Variable>(node: V, marks: &mut Marks, stack: &mut Vec<Frame<V>>) -> Result<()> {
    if node.is_constant() {
        return Ok(());
    }
    let id = node.unique_id();
    if marks.permanent.contains(&id) {
        return Ok(());
    }
    if marks.temporary.contains(&id) {
        return Err(Error::GraphNotADag { id });
    }
    log::trace!("topological_sort: visit {id}");
    marks.temporary.insert(id);
    let parents = if node.is_leaf() {
        vec![]
    } else {
        node.parents()
    };
    stack.push(Frame {
        node,
        parents: parents.into_iter(),
    });
    Ok(())
}
