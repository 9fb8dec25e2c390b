//! A scalar computation graph node with shared ownership.
//!
//! Every operation evaluates its value eagerly and records a [`History`]: the operation,
//! the inputs and a [`Context`] with whatever the operation needs to compute its
//! derivative later. Leaves have an empty history, constants have none at all.

use std::{
    cell::Cell,
    ops::{Add, Div, Mul, Neg, Sub},
    rc::Rc,
};

use crate::{
    backpropagate,
    error::Result,
    unary_fn::{ln_derive, relu, relu_derive, sigmoid, sigmoid_derive, PtrUnaryFn},
    Context, IdGenerator, Tensor, UnaryFn, VarId, Variable,
};

#[derive(Clone)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    UnaryFn(Rc<dyn UnaryFn>),
}

impl Op {
    fn forward(&self, ctx: &mut Context<f64>, vals: &[f64]) -> f64 {
        use Op::*;
        match self {
            Add => vals[0] + vals[1],
            Sub => vals[0] - vals[1],
            Mul => {
                ctx.save_for_backward([vals[0], vals[1]]);
                vals[0] * vals[1]
            }
            Div => {
                ctx.save_for_backward([vals[0], vals[1]]);
                vals[0] / vals[1]
            }
            Neg => -vals[0],
            UnaryFn(f) => {
                ctx.save_for_backward([vals[0]]);
                f.f(vals[0])
            }
        }
    }

    /// Vector-Jacobian product: one contribution per input.
    fn backward(&self, ctx: &Context<f64>, d: f64) -> Vec<f64> {
        use Op::*;
        let saved = ctx.saved_tensors();
        match self {
            Add => vec![d, d],
            Sub => vec![d, -d],
            Mul => vec![d * saved[1], d * saved[0]],
            Div => {
                let (lhs, rhs) = (saved[0], saved[1]);
                vec![d / rhs, -d * lhs / (rhs * rhs)]
            }
            Neg => vec![-d],
            UnaryFn(f) => vec![f.grad(saved[0]) * d],
        }
    }
}

/// How a node was produced.
#[derive(Clone)]
pub struct History {
    op: Option<Op>,
    ctx: Context<f64>,
    inputs: Vec<Term>,
}

impl History {
    fn leaf() -> Self {
        Self {
            op: None,
            ctx: Context::default(),
            inputs: vec![],
        }
    }

    pub fn inputs(&self) -> &[Term] {
        &self.inputs
    }

    pub fn ctx(&self) -> &Context<f64> {
        &self.ctx
    }
}

struct TermPayload {
    id: VarId,
    name: String,
    data: f64,
    grad: Cell<f64>,
    history: Option<History>,
    ids: Rc<IdGenerator>,
}

impl Drop for TermPayload {
    /// Unlinks the inputs iteratively, so dropping a deep graph does not recurse once
    /// per level.
    fn drop(&mut self) {
        let Some(history) = self.history.as_mut() else {
            return;
        };
        let mut stack = std::mem::take(&mut history.inputs);
        while let Some(term) = stack.pop() {
            // Terms still shared elsewhere are left to their other owners.
            if let Ok(mut payload) = Rc::try_unwrap(term.0) {
                if let Some(history) = payload.history.as_mut() {
                    stack.append(&mut history.inputs);
                }
            }
        }
    }
}

/// Handle to a node. Cloning is cheap and the clone refers to the same node.
#[derive(Clone)]
pub struct Term(Rc<TermPayload>);

impl Add for &Term {
    type Output = Term;
    fn add(self, rhs: Self) -> Self::Output {
        self.binary(Op::Add, rhs, || format!("({} + {})", self.0.name, rhs.0.name))
    }
}

impl Sub for &Term {
    type Output = Term;
    fn sub(self, rhs: Self) -> Self::Output {
        self.binary(Op::Sub, rhs, || format!("({} - {})", self.0.name, rhs.0.name))
    }
}

impl Mul for &Term {
    type Output = Term;
    fn mul(self, rhs: Self) -> Self::Output {
        self.binary(Op::Mul, rhs, || format!("{} * {}", self.0.name, rhs.0.name))
    }
}

impl Div for &Term {
    type Output = Term;
    fn div(self, rhs: Self) -> Self::Output {
        self.binary(Op::Div, rhs, || format!("{} / {}", self.0.name, rhs.0.name))
    }
}

impl Neg for &Term {
    type Output = Term;
    fn neg(self) -> Self::Output {
        Term::neg(self)
    }
}

impl Term {
    /// A user supplied input. Derivatives are deposited here.
    ///
    /// Intermediate terms take the generator of their left operand.
    pub fn leaf(ids: &Rc<IdGenerator>, name: impl Into<String>, val: f64) -> Term {
        Self::new_payload(ids, name.into(), val, Some(History::leaf()))
    }

    /// A value that does not track gradients.
    pub fn constant(ids: &Rc<IdGenerator>, val: f64) -> Term {
        Self::new_payload(ids, val.to_string(), val, None)
    }

    fn new_payload(
        ids: &Rc<IdGenerator>,
        name: String,
        data: f64,
        history: Option<History>,
    ) -> Term {
        Self(Rc::new(TermPayload {
            id: ids.next_id(),
            name,
            data,
            grad: Cell::new(0.),
            history,
            ids: ids.clone(),
        }))
    }

    /// Applies `op` to `inputs`. The result is a constant if none of the inputs
    /// tracks gradients, and its context then saves nothing.
    fn new_op(&self, op: Op, inputs: Vec<Term>, expr: impl FnOnce() -> String) -> Term {
        let vals: Vec<f64> = inputs.iter().map(|t| t.data()).collect();
        let need_grad = inputs.iter().any(|t| !t.is_constant());
        let mut ctx = Context::new(!need_grad);
        let data = op.forward(&mut ctx, &vals);
        let history = need_grad.then(|| History {
            op: Some(op),
            ctx,
            inputs,
        });
        let id = self.0.ids.next_id();
        let name = if cfg!(feature = "expr_name") {
            expr()
        } else {
            format!("a{}", id.raw())
        };
        Self(Rc::new(TermPayload {
            id,
            name,
            data,
            grad: Cell::new(0.),
            history,
            ids: self.0.ids.clone(),
        }))
    }

    fn binary(&self, op: Op, rhs: &Term, expr: impl FnOnce() -> String) -> Term {
        self.new_op(op, vec![self.clone(), rhs.clone()], expr)
    }

    pub fn id(&self) -> VarId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The value computed in the forward pass.
    pub fn data(&self) -> f64 {
        self.0.data
    }

    pub fn grad(&self) -> f64 {
        self.0.grad.get()
    }

    pub fn zero_grad(&self) {
        self.0.grad.set(0.);
    }

    pub fn history(&self) -> Option<&History> {
        self.0.history.as_ref()
    }

    /// The entry point to backpropagation, with the conventional seed of 1.
    pub fn backprop(&self) -> Result<()> {
        backpropagate(self, <f64 as Tensor>::one())
    }

    pub fn neg(&self) -> Self {
        self.new_op(Op::Neg, vec![self.clone()], || format!("-{}", self.0.name))
    }

    pub fn exp(&self) -> Self {
        self.apply_fn("exp", f64::exp, f64::exp)
    }

    pub fn ln(&self) -> Self {
        self.apply_fn("ln", f64::ln, ln_derive)
    }

    pub fn sigmoid(&self) -> Self {
        self.apply_fn("sigmoid", sigmoid, sigmoid_derive)
    }

    pub fn relu(&self) -> Self {
        self.apply_fn("relu", relu, relu_derive)
    }

    pub fn apply_fn(
        &self,
        name: &(impl AsRef<str> + ?Sized),
        f: fn(f64) -> f64,
        grad: fn(f64) -> f64,
    ) -> Self {
        self.apply(PtrUnaryFn {
            name: name.as_ref().to_string(),
            f,
            grad,
        })
    }

    pub fn apply(&self, f: impl UnaryFn + 'static) -> Self {
        let f: Rc<dyn UnaryFn> = Rc::new(f);
        let expr = || format!("{}({})", f.name(), self.0.name);
        self.new_op(Op::UnaryFn(f.clone()), vec![self.clone()], expr)
    }
}

impl Variable for Term {
    type Value = f64;

    fn unique_id(&self) -> VarId {
        self.0.id
    }

    fn is_leaf(&self) -> bool {
        matches!(self.0.history, Some(History { op: None, .. }))
    }

    fn is_constant(&self) -> bool {
        self.0.history.is_none()
    }

    fn parents(&self) -> Vec<Self> {
        self.0
            .history
            .as_ref()
            .map(|h| h.inputs.clone())
            .unwrap_or_default()
    }

    fn chain_rule(&self, d_output: &f64) -> Vec<(Self, f64)> {
        let Some(History {
            op: Some(op),
            ctx,
            inputs,
        }) = &self.0.history
        else {
            return vec![];
        };
        inputs
            .iter()
            .cloned()
            .zip(op.backward(ctx, *d_output))
            .collect()
    }

    fn accumulate_derivative(&self, x: f64) {
        debug_assert!(self.is_leaf(), "only leaves accumulate derivatives");
        self.0.grad.set(self.0.grad.get() + x);
    }
}

impl std::fmt::Debug for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Term")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("data", &self.0.data)
            .field("grad", &self.0.grad.get())
            .finish()
    }
}
