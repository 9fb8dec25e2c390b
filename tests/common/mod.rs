//! A graph node type for tests: edges carry a fixed local derivative multiplier and
//! can be added after construction, which allows building cycles.
#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use minigrad::{IdGenerator, VarId, Variable};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Kind {
    Leaf,
    Constant,
    Op,
}

struct NodeData {
    id: VarId,
    kind: Kind,
    parents: Vec<(usize, f64)>,
    calls: Vec<f64>,
}

/// Arena of nodes. Edges are indices, so dropping a deep graph does not recurse.
#[derive(Default)]
pub struct Graph {
    ids: IdGenerator,
    nodes: RefCell<Vec<NodeData>>,
}

#[derive(Clone)]
pub struct Node {
    graph: Rc<Graph>,
    idx: usize,
}

impl Graph {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn push(self: &Rc<Self>, kind: Kind, parents: Vec<(usize, f64)>) -> Node {
        let mut nodes = self.nodes.borrow_mut();
        let idx = nodes.len();
        nodes.push(NodeData {
            id: self.ids.next_id(),
            kind,
            parents,
            calls: vec![],
        });
        Node {
            graph: self.clone(),
            idx,
        }
    }

    pub fn leaf(self: &Rc<Self>) -> Node {
        self.push(Kind::Leaf, vec![])
    }

    pub fn constant(self: &Rc<Self>) -> Node {
        self.push(Kind::Constant, vec![])
    }

    /// A node whose local derivative with respect to each parent is the given multiplier.
    pub fn op(self: &Rc<Self>, parents: &[(&Node, f64)]) -> Node {
        let parents = parents.iter().map(|(p, m)| (p.idx, *m)).collect();
        self.push(Kind::Op, parents)
    }
}

impl Node {
    /// Adds an edge after construction.
    pub fn connect(&self, parent: &Node, multiplier: f64) {
        self.graph.nodes.borrow_mut()[self.idx]
            .parents
            .push((parent.idx, multiplier));
    }

    /// Every value passed to `accumulate_derivative`, in call order.
    pub fn calls(&self) -> Vec<f64> {
        self.graph.nodes.borrow()[self.idx].calls.clone()
    }

    pub fn grad(&self) -> f64 {
        self.calls().iter().sum()
    }

    fn kind(&self) -> Kind {
        self.graph.nodes.borrow()[self.idx].kind
    }

    fn node(&self, idx: usize) -> Node {
        Node {
            graph: self.graph.clone(),
            idx,
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.unique_id())
            .field("kind", &self.kind())
            .finish()
    }
}

impl Variable for Node {
    type Value = f64;

    fn unique_id(&self) -> VarId {
        self.graph.nodes.borrow()[self.idx].id
    }

    fn is_leaf(&self) -> bool {
        self.kind() == Kind::Leaf
    }

    fn is_constant(&self) -> bool {
        self.kind() == Kind::Constant
    }

    fn parents(&self) -> Vec<Self> {
        let nodes = self.graph.nodes.borrow();
        nodes[self.idx]
            .parents
            .iter()
            .map(|(idx, _)| self.node(*idx))
            .collect()
    }

    fn chain_rule(&self, d_output: &f64) -> Vec<(Self, f64)> {
        let nodes = self.graph.nodes.borrow();
        nodes[self.idx]
            .parents
            .iter()
            .map(|(idx, m)| (self.node(*idx), d_output * m))
            .collect()
    }

    fn accumulate_derivative(&self, x: f64) {
        self.graph.nodes.borrow_mut()[self.idx].calls.push(x);
    }
}
