//! Defines Pinwheel runtime macros.

#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

extern crate proc_macro;

use proc_macro::TokenStream;

use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{ItemFn, LitStr, ReturnType};

mod helpers;

use crate::helpers::pinwheel_crate_path;

/// Macro definition for Pinwheel Runtime.
///
/// This macro should be used once only in a project.
///
/// _Runs the entire function inside a tokio runtime and waits for every task dynamically
/// created with `pinwheel::utils::task::run` to finish before returning._
///
/// # Example
/// ```ignore
/// #[pinwheel::runtime]
/// async fn main() {
///     // whatever
/// }
/// ```
#[proc_macro_attribute]
pub fn runtime(_: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(item.into(), false).into()
}

/// Same as `#[pinwheel::runtime]` but for tests.
#[proc_macro_attribute]
pub fn test(_: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(item.into(), true).into()
}

/// See `#[pinwheel::runtime]` for details.
fn runtime_macro(item: TokenStream2, test: bool) -> TokenStream2 {
    let pinwheel = pinwheel_crate_path();
    let input: ItemFn = match syn::parse2(item) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;

    if sig.asyncness.is_none() {
        return syn::Error::new_spanned(sig.fn_token, "the `async` keyword is missing")
            .to_compile_error();
    }

    // The function body runs as an inner async block so an early `return` (or `?`) still goes
    // through the task synchronisation below.
    let output_type = match &sig.output {
        ReturnType::Default => quote!(()),
        ReturnType::Type(_, ty) => quote!(#ty),
    };

    // tokio macros need to know where tokio lives since the caller may not depend on it.
    let tokio_path = LitStr::new(
        &format!("{}::utils::tokio", pinwheel).replace(' ', ""),
        Span::call_site(),
    );
    let tokio_attr = match test {
        true => quote! { #[#pinwheel::utils::tokio::test(crate = #tokio_path)] },
        false => quote! { #[#pinwheel::utils::tokio::main(crate = #tokio_path)] },
    };

    quote! {
        #tokio_attr
        #(#attrs)*
        #vis #sig {
            #pinwheel::utils::task::init_task_channel();
            let output: #output_type = async move #block.await;
            #pinwheel::utils::task::wait_for_tasks().await;
            output
        }
    }
}

/// Expands `item` to a string (unit tests only).
#[cfg(test)]
fn expand(item: &str, test: bool) -> String {
    let stream: TokenStream2 = item.parse().unwrap();
    runtime_macro(stream, test).to_string()
}

#[cfg(test)]
mod tests {
    use super::expand;

    #[test]
    fn test_runtime_expansion() {
        let output = expand("async fn main() { let a = 1; }", false);
        assert!(output.contains("tokio :: main"));
        assert!(output.contains("init_task_channel"));
        assert!(output.contains("wait_for_tasks"));
        assert!(output.contains("let output : ()"));
    }

    #[test]
    fn test_test_expansion() {
        let output = expand("async fn my_test() -> Result<(), Error> { Ok(()) }", true);
        assert!(output.contains("tokio :: test"));
        assert!(output.contains("let output : Result < () , Error >"));
    }

    #[test]
    fn test_missing_async() {
        let output = expand("fn main() {}", false);
        assert!(output.contains("compile_error"));
        assert!(output.contains("the `async` keyword is missing"));
    }

    #[test]
    fn test_syntax_error() {
        let output = expand("struct NotAFunction;", false);
        assert!(output.contains("compile_error"));
    }
}
