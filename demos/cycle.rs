//! A graph node type whose edges can be rewired after construction, which makes it
//! possible to close a cycle. Backpropagation reports it instead of looping.

use std::{cell::RefCell, rc::Rc};

use minigrad::{backpropagate, IdGenerator, VarId, Variable};

struct Payload {
    id: VarId,
    parents: RefCell<Vec<Node>>,
    grad: RefCell<f64>,
}

#[derive(Clone)]
struct Node(Rc<Payload>);

impl Node {
    fn new(ids: &IdGenerator, parents: &[&Node]) -> Self {
        Self(Rc::new(Payload {
            id: ids.next_id(),
            parents: RefCell::new(parents.iter().map(|p| (*p).clone()).collect()),
            grad: RefCell::new(0.),
        }))
    }
}

impl Variable for Node {
    type Value = f64;

    fn unique_id(&self) -> VarId {
        self.0.id
    }

    fn is_leaf(&self) -> bool {
        self.0.parents.borrow().is_empty()
    }

    fn is_constant(&self) -> bool {
        false
    }

    fn parents(&self) -> Vec<Self> {
        self.0.parents.borrow().clone()
    }

    fn chain_rule(&self, d_output: &f64) -> Vec<(Self, f64)> {
        self.parents().into_iter().map(|p| (p, *d_output)).collect()
    }

    fn accumulate_derivative(&self, x: f64) {
        *self.0.grad.borrow_mut() += x;
    }
}

fn main() {
    env_logger::init();

    let ids = IdGenerator::new();
    let x = Node::new(&ids, &[]);
    let a = Node::new(&ids, &[&x]);
    let b = Node::new(&ids, &[&a]);
    let c = Node::new(&ids, &[&b]);

    backpropagate(&c, 1.).unwrap();
    println!("x.grad = {}", x.0.grad.borrow());

    a.0.parents.borrow_mut().push(c.clone());
    match backpropagate(&c, 1.) {
        Ok(()) => println!("unexpected success"),
        Err(e) => println!("error: {e}"),
    }

    // Break the cycle so the nodes can be freed.
    a.0.parents.borrow_mut().clear();
}
