//! Dependency graph in diamond shape. It evaluates the same term twice, so the derivative should add up.

use std::rc::Rc;

use minigrad::{IdGenerator, Term};

fn main() -> minigrad::Result<()> {
    env_logger::init();

    let ids = Rc::new(IdGenerator::new());
    let a = Term::leaf(&ids, "a", 1.);
    let b = Term::leaf(&ids, "b", 3.);
    let c = Term::leaf(&ids, "c", 5.);
    let ab = &a + &b;
    let ac = &a + &c;
    let abac = &ab + &ac;

    abac.backprop()?;
    println!("abac: {abac:#?}");
    println!("a: {a:?}");
    println!("b: {b:?}");
    println!("c: {c:?}");
    Ok(())
}
