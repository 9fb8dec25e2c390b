mod common;

use std::collections::HashMap;

use common::{Graph, Node};
use minigrad::{topological_sort, VarId, Variable};

/// Small deterministic generator so the graphs are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

/// Builds a random DAG: each new node picks its parents among earlier nodes.
fn random_dag(seed: u64, size: usize) -> (Vec<Node>, Node) {
    let g = Graph::new();
    let mut rng = Lcg(seed);
    let mut nodes = vec![g.leaf(), g.leaf(), g.constant()];
    for _ in 0..size {
        let node = match rng.below(6) {
            0 => g.leaf(),
            1 => g.constant(),
            _ => {
                let fan_in = 1 + rng.below(3);
                let picks: Vec<Node> = (0..fan_in)
                    .map(|_| nodes[rng.below(nodes.len())].clone())
                    .collect();
                let parents: Vec<(&Node, f64)> = picks.iter().map(|p| (p, 1.)).collect();
                g.op(&parents)
            }
        };
        nodes.push(node);
    }
    let picks: Vec<Node> = nodes.iter().rev().take(4).cloned().collect();
    let parents: Vec<(&Node, f64)> = picks.iter().map(|p| (p, 1.)).collect();
    let root = g.op(&parents);
    (nodes, root)
}

#[test]
fn children_precede_parents() {
    for seed in 0..20 {
        let (_, root) = random_dag(seed, 60);
        let order = topological_sort(&root).unwrap();
        let position: HashMap<VarId, usize> = order
            .iter()
            .enumerate()
            .map(|(i, n)| (n.unique_id(), i))
            .collect();

        assert_eq!(position.len(), order.len(), "a node appears twice");
        assert_eq!(order[0].unique_id(), root.unique_id());
        for node in &order {
            if node.is_leaf() {
                continue;
            }
            for parent in node.parents() {
                if parent.is_constant() {
                    continue;
                }
                assert!(
                    position[&node.unique_id()] < position[&parent.unique_id()],
                    "seed {seed}: {node:?} does not precede {parent:?}"
                );
            }
        }
    }
}

#[test]
fn constants_never_appear() {
    for seed in 100..120 {
        let (_, root) = random_dag(seed, 60);
        let order = topological_sort(&root).unwrap();
        assert!(order.iter().all(|n| !n.is_constant()));
    }
}

#[test]
fn order_is_deterministic() {
    let (_, root) = random_dag(7, 80);
    let first: Vec<VarId> = topological_sort(&root)
        .unwrap()
        .iter()
        .map(|n| n.unique_id())
        .collect();
    let second: Vec<VarId> = topological_sort(&root)
        .unwrap()
        .iter()
        .map(|n| n.unique_id())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn only_reachable_nodes() {
    let (nodes, root) = random_dag(3, 40);
    let order = topological_sort(&root).unwrap();
    assert!(order.len() <= nodes.len() + 1);

    // Every node in the order must be reachable from the root.
    let mut reachable = vec![root.clone()];
    let mut i = 0;
    while i < reachable.len() {
        let node = reachable[i].clone();
        for parent in node.parents() {
            if !reachable.iter().any(|r| r.unique_id() == parent.unique_id()) {
                reachable.push(parent);
            }
        }
        i += 1;
    }
    for node in &order {
        assert!(reachable.iter().any(|r| r.unique_id() == node.unique_id()));
    }
    let expected = reachable.iter().filter(|n| !n.is_constant()).count();
    assert_eq!(order.len(), expected);
}
