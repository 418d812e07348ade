use proc_macro as proc;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, BinOp, Error, Expr, Lit, UnOp};

/// Builds a `fracalc::Expr` from rust arithmetic syntax.
///
/// Integer literals become constants, identifiers become variables, `+ - * /`
/// and unary `-` become the matching nodes. `{ .. }` interpolates any value
/// that converts into an expression.
///
/// ```ignore
/// let e = expr!((x + 3) * -2);
/// assert_eq!(e.to_string(), "((x + 3/1) * (-2/1))");
/// ```
#[proc_macro]
pub fn expr(input: proc::TokenStream) -> proc::TokenStream {
    let input = parse_macro_input!(input as Expr);

    match lower(&input) {
        Ok(tok) => tok.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn lower(e: &Expr) -> syn::Result<TokenStream> {
    let krate = quote!(::fracalc);

    let tok = match e {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Int(int), ..
        }) => {
            let n: i64 = int.base10_parse()?;
            quote!(#krate::Expr::constant(#krate::Fraction::from_int(#n)))
        }
        Expr::Path(syn::ExprPath { path, qself: None, .. }) => {
            let ident = path
                .get_ident()
                .ok_or_else(|| Error::new(path.span(), "expected a variable name"))?;
            let name = ident.to_string();
            quote!(#krate::Expr::var(#name))
        }
        Expr::Paren(syn::ExprParen { expr, .. }) | Expr::Group(syn::ExprGroup { expr, .. }) => {
            lower(expr)?
        }
        Expr::Unary(syn::ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => {
            let operand = lower(expr)?;
            quote!(#krate::Expr::neg(#operand))
        }
        Expr::Binary(syn::ExprBinary {
            left, op, right, ..
        }) => {
            let ctor = match op {
                BinOp::Add(_) => format_ident!("add"),
                BinOp::Sub(_) => format_ident!("sub"),
                BinOp::Mul(_) => format_ident!("mul"),
                BinOp::Div(_) => format_ident!("div"),
                _ => return Err(Error::new(op.span(), "expected one of `+ - * /`")),
            };
            let (lhs, rhs) = (lower(left)?, lower(right)?);
            quote!(#krate::Expr::#ctor(#lhs, #rhs))
        }
        Expr::Block(syn::ExprBlock { block, .. }) => {
            quote!(#krate::Expr::from(#block))
        }
        _ => return Err(Error::new(e.span(), "unsupported expression syntax")),
    };

    Ok(tok)
}
