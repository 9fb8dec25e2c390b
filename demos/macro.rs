use std::rc::Rc;

use minigrad::IdGenerator;
use minigrad_macro::minigrad;

fn main() -> minigrad::Result<()> {
    env_logger::init();

    let ids = Rc::new(IdGenerator::new());
    minigrad!(ids, {
        let a = 123.;
        let b = 321.;
        let c = 42.;
        let ab = a + b;
        let abc = ab * c;
        let d = 2.;
        let abcd = abc / d;
    });

    abcd.backprop()?;
    println!("(a + b) * c / d = {}", abcd.data());
    println!("d/da = {}", a.grad());
    println!("d/db = {}", b.grad());
    println!("d/dc = {}", c.grad());
    println!("d/dd = {}", d.grad());
    Ok(())
}
