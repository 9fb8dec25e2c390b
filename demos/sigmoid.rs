//! Compare the gradient of a sigmoid with its numerical derivative over a range of inputs.

use std::rc::Rc;

use minigrad::{CentralDifference, IdGenerator, Term};

fn main() -> minigrad::Result<()> {
    env_logger::init();

    let diff = CentralDifference::default();
    for i in -10..=10 {
        let x0 = i as f64 * 0.5;
        let ids = Rc::new(IdGenerator::new());
        let x = Term::leaf(&ids, "x", x0);
        let w = Term::leaf(&ids, "w", 1.5);
        let y = (&x * &w).sigmoid();
        y.backprop()?;

        let numeric = diff.derive(
            |v| {
                let ids = Rc::new(IdGenerator::new());
                let x = Term::leaf(&ids, "x", v[0]);
                let w = Term::constant(&ids, 1.5);
                (&x * &w).sigmoid().data()
            },
            &[x0],
        );
        println!(
            "{x0:5.1}, {:.6}, {:.6}, {:.6}",
            y.data(),
            x.grad(),
            numeric
        );
    }
    Ok(())
}
