use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    spanned::Spanned,
    BinOp, Block, Expr, ExprLit, Ident, Pat, Stmt, Token, UnOp,
};

/// `minigrad!(ids, { let a = 1.; let b = a * 2.; })`
///
/// `ids` is an `Rc<IdGenerator>` shared by every term the block creates.
struct MacroInput {
    ids: Expr,
    block: Block,
}

impl Parse for MacroInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ids = input.parse()?;
        input.parse::<Token![,]>()?;
        let block = input.parse()?;
        Ok(Self { ids, block })
    }
}

#[proc_macro]
pub fn minigrad(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let MacroInput { ids, block } = parse_macro_input!(input as MacroInput);

    let mut objs = vec![];

    for stmt in &block.stmts {
        traverse_stmt(stmt, &mut objs);
    }

    // Build the output, possibly using quasi-quotation
    let expanded = quote! {
        let __minigrad_ids: &::std::rc::Rc<::minigrad::IdGenerator> = &(#ids);
        #(#objs)*
    };

    // Hand the output tokens back to the compiler
    TokenStream::from(expanded)
}

fn traverse_stmt(input: &Stmt, terms: &mut Vec<TokenStream2>) {
    match input {
        Stmt::Local(local) => {
            if let (Pat::Ident(id), Some(init)) = (&local.pat as &Pat, &local.init) {
                let name = id.ident.clone();
                let ex = &init.expr;
                let ts = match ex as &Expr {
                    Expr::Lit(lit) => quote! {
                        let #name = ::minigrad::Term::leaf(__minigrad_ids, stringify!(#name), #lit);
                    },
                    // `let a = -2.;` is a negative leaf, not a negated constant.
                    Expr::Unary(un)
                        if matches!(un.op, UnOp::Neg(_)) && matches!(&*un.expr, Expr::Lit(_)) =>
                    {
                        let lit = &un.expr;
                        quote! {
                            let #name = ::minigrad::Term::leaf(__minigrad_ids, stringify!(#name), -#lit);
                        }
                    }
                    Expr::Path(path) => quote! {
                        let #name = #path;
                    },
                    _ => {
                        if let Some(res) = traverse_expr(ex, terms) {
                            quote! {
                                let #name = #res;
                            }
                        } else {
                            quote! {
                                let #name = ::minigrad::Term::leaf(__minigrad_ids, stringify!(#name), 1.);
                            }
                        }
                    }
                };
                terms.push(ts);
            }
        }
        Stmt::Expr(ex, _) => {
            traverse_expr(ex, terms);
        }
        _ => (),
    }
}

fn var_name(terms: &[TokenStream2]) -> String {
    format!("_a{}", terms.len())
}

/// Literals inside expressions do not track gradients.
fn format_constant(ex: &ExprLit, terms: &mut Vec<TokenStream2>) -> Ident {
    let name = Ident::new(&var_name(terms), ex.span());
    let ts = quote! {
        let #name = ::minigrad::Term::constant(__minigrad_ids, #ex);
    };
    terms.push(ts);
    name
}

fn traverse_expr(input: &Expr, terms: &mut Vec<TokenStream2>) -> Option<Ident> {
    match input {
        Expr::Binary(ex) => {
            let lhs = traverse_expr(&ex.left, terms);
            let rhs = traverse_expr(&ex.right, terms);
            if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
                let name = Ident::new(&var_name(terms), ex.span());
                let binop = match ex.op {
                    BinOp::Add(_) => quote! { &#lhs + &#rhs },
                    BinOp::Sub(_) => quote! { &#lhs - &#rhs },
                    BinOp::Mul(_) => quote! { &#lhs * &#rhs },
                    BinOp::Div(_) => quote! { &#lhs / &#rhs },
                    _ => return None,
                };
                let ts = quote! {
                    let #name = #binop;
                };
                terms.push(ts);
                Some(name)
            } else {
                None
            }
        }
        Expr::Unary(ex) => {
            if !matches!(ex.op, UnOp::Neg(_)) {
                return None;
            }
            let term = traverse_expr(&ex.expr, terms)?;
            let name = Ident::new(&var_name(terms), ex.span());
            terms.push(quote! {
                let #name = -&#term;
            });
            Some(name)
        }
        Expr::Paren(ex) => traverse_expr(&ex.expr, terms),
        Expr::Lit(lit) => Some(format_constant(lit, terms)),
        Expr::Path(path) => path.path.segments.last().map(|seg| seg.ident.clone()),
        Expr::Call(call) => {
            if let (Expr::Path(func), Some(arg)) = (&call.func as &Expr, call.args.first()) {
                let arg = if let Expr::Path(path) = arg {
                    path.path.segments.last().map(|seg| seg.ident.clone())?
                } else {
                    traverse_expr(arg, terms)?
                };
                let name = Ident::new(&var_name(terms), call.span());
                let mut func_derive = func.clone();
                if let Some(seg) = func_derive.path.segments.last_mut() {
                    seg.ident = Ident::new(&format!("{}_derive", seg.ident), func.span());
                }
                let ts = quote! {
                    let #name = #arg.apply_fn(stringify!(#func), #func, #func_derive);
                };
                terms.push(ts);
                Some(name)
            } else {
                None
            }
        }
        _ => None,
    }
}
