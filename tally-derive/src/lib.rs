//! # Tally Derive
//!
//! Procedural macros for the tally unit test framework.
//!
//! ## Macros
//!
//! - `#[tally::test]` - Turns an async test body into a test factory
//! - `#[tally::test(name = "...", describe = "...", timeout = 500)]` - Same, with
//!   an explicit name, description and timeout in milliseconds
//!
//! These macros are re-exported by the main `tally` crate, so users typically
//! don't need to import this crate directly.

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::Parse, parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, LitInt, LitStr,
    ReturnType, Signature, Token, Type,
};

/// Arguments of `#[test(name = "...", describe = "...", timeout = 500)]`.
#[derive(Debug, Default)]
struct Input {
    /// Test name, the function name when omitted.
    name: Option<LitStr>,
    /// Human readable description.
    describe: Option<LitStr>,
    /// Timeout in milliseconds.
    timeout: Option<LitInt>,
}

impl Parse for Input {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut parsed = Input::default();

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            if key == "name" {
                parsed.name = Some(input.parse()?);
            } else if key == "describe" {
                parsed.describe = Some(input.parse()?);
            } else if key == "timeout" {
                let millis: LitInt = input.parse()?;
                millis.base10_parse::<u64>()?;
                parsed.timeout = Some(millis);
            } else {
                return Err(syn::Error::new(
                    key.span(),
                    format!("unknown argument `{key}`, expected `name`, `describe` or `timeout`"),
                ));
            }

            // Consume comma if present
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            } else if !input.is_empty() {
                return Err(input.error("expected `,`"));
            }
        }

        Ok(parsed)
    }
}

#[derive(Debug, Eq, PartialEq)]
enum ErrorCrate {
    Eyre,
    AnythingElse,
}

/// Inspects the current function's signature to determine which error crate is being used.
///
/// **Limitation:**
/// Due to the inherent limitations of proc macros, this function can only detect error types
/// when `eyre` is referenced using its fully qualified path (for example, `eyre::Result`).
fn inspect_error_crate(sig: &Signature) -> syn::Result<ErrorCrate> {
    let ReturnType::Type(_, ty) = &sig.output else {
        return Err(syn::Error::new(
            sig.span(),
            "return type needs to be other than ()",
        ));
    };
    let Type::Path(type_path) = ty.as_ref() else {
        return Err(syn::Error::new(ty.span(), "failed to get return type path"));
    };

    let path = &type_path.path;
    match (path.segments.first(), path.segments.last()) {
        (Some(first), Some(last)) if first.ident == "eyre" && last.ident == "Result" => {
            Ok(ErrorCrate::Eyre)
        }
        (Some(_), Some(_)) => Ok(ErrorCrate::AnythingElse),
        _ => Err(syn::Error::new(ty.span(), "unexpected return type")),
    }
}

/// Expands the attribute on `input_fn`.
fn expand(input_args: Input, input_fn: ItemFn) -> syn::Result<TokenStream2> {
    let sig = &input_fn.sig;
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(
            sig.fn_token.span(),
            "#[tally::test] requires an async function",
        ));
    }
    if sig.inputs.len() != 1 || matches!(sig.inputs.first(), Some(FnArg::Receiver(_))) {
        return Err(syn::Error::new(
            sig.inputs.span(),
            "#[tally::test] functions take exactly one argument, the running `UnitTest`",
        ));
    }
    let error_crate = inspect_error_crate(sig)?;

    let func_name = sig.ident.clone();
    let body_name = format_ident!("__tally_{}", func_name);
    let test_name = input_args
        .name
        .unwrap_or_else(|| LitStr::new(&func_name.to_string(), func_name.span()));
    let describe = input_args
        .describe
        .map(|describe| quote! { .describe(#describe) });
    let timeout = input_args
        .timeout
        .map(|millis| quote! { .timeout(::std::time::Duration::from_millis(#millis)) });

    // `UnitTest` bodies return `eyre::Result`. Any other error type is wrapped.
    let call = match error_crate {
        ErrorCrate::Eyre => quote! { #body_name(test).await },
        ErrorCrate::AnythingElse => quote! {
            #body_name(test).await.map_err(|e| ::tally::eyre::eyre!(Box::new(e)))
        },
    };

    let vis = &input_fn.vis;
    let attrs = &input_fn.attrs;
    let mut body_fn = input_fn.clone();
    body_fn.attrs.clear();
    body_fn.vis = syn::Visibility::Inherited;
    body_fn.sig.ident = body_name;

    Ok(quote! {
        #(#attrs)*
        #vis fn #func_name() -> ::tally::TestFactory {
            #body_fn

            ::tally::TestFactory::new(
                ::tally::Definition::new(#test_name) #describe #timeout,
                |test: ::tally::UnitTest| async move { #call },
            )
        }
    })
}

/// Turns an async function into a tally test factory.
///
/// # Basic Usage
///
/// ```rust,ignore
/// #[tally::test]
/// async fn loads_user(t: tally::UnitTest) -> eyre::Result<()> {
///     t.assert(true, "user has a name").await?;
///     Ok(())
/// }
///
/// // `loads_user` is now `fn loads_user() -> tally::TestFactory`.
/// let suite = TestRunner::runs(Definition::new("API"), [loads_user()]);
/// ```
///
/// # Arguments
///
/// ```rust,ignore
/// #[tally::test(name = "Load User", describe = "fetches a user", timeout = 500)]
/// async fn load_user(t: tally::UnitTest) -> eyre::Result<()> {
///     Ok(())
/// }
/// ```
///
/// - `name`: test name, defaults to the function name
/// - `describe`: description, defaults to `unit test <name>`
/// - `timeout`: timeout in milliseconds, defaults to the configured default
///
/// # Requirements
///
/// - Function must be `async`
/// - Function must take the running `UnitTest` as its only argument
/// - Function must return a `Result<(), E>` type; non-`eyre` errors are wrapped
#[proc_macro_attribute]
pub fn test(args: TokenStream, input: TokenStream) -> TokenStream {
    let input_args = parse_macro_input!(args as Input);
    let input_fn = parse_macro_input!(input as ItemFn);

    expand(input_args, input_fn)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[cfg(test)]
mod test {
    use super::{ErrorCrate, Input};
    use test_case::test_case;

    #[test_case("fn foo() -> eyre::Result" => ErrorCrate::Eyre; "eyre")]
    #[test_case("fn foo() -> eyre::Result<()>" => ErrorCrate::Eyre; "eyre with unit")]
    #[test_case("fn foo() -> anyhow::Result" => ErrorCrate::AnythingElse; "anyhow")]
    #[test_case("fn foo() -> Result" => ErrorCrate::AnythingElse; "std_result")]
    fn inspect_error_crate(s: &str) -> ErrorCrate {
        let sig: syn::Signature = syn::parse_str(s).expect("failed to parse function signature");
        super::inspect_error_crate(&sig).expect("failed to inspect")
    }

    #[test_case("fn foo()"; "unit return")]
    #[test_case("fn foo() -> (u8, u8)"; "tuple return")]
    fn inspect_error_crate_rejects(s: &str) {
        let sig: syn::Signature = syn::parse_str(s).expect("failed to parse function signature");
        assert!(super::inspect_error_crate(&sig).is_err());
    }

    #[test_case("" => (None, None, None); "empty")]
    #[test_case("name = \"Load User\"" => (Some("Load User".into()), None, None); "name")]
    #[test_case("describe = \"fetches\", timeout = 500" => (None, Some("fetches".into()), Some(500)); "describe and timeout")]
    #[test_case("timeout = 10, name = \"x\"," => (Some("x".into()), None, Some(10)); "trailing comma")]
    fn parse_input(s: &str) -> (Option<String>, Option<String>, Option<u64>) {
        let input: Input = syn::parse_str(s).expect("failed to parse input args");
        (
            input.name.map(|n| n.value()),
            input.describe.map(|d| d.value()),
            input.timeout.map(|t| t.base10_parse().unwrap()),
        )
    }

    #[test_case("retries = 3"; "unknown key")]
    #[test_case("timeout = \"1s\""; "timeout as string")]
    #[test_case("timeout = -1"; "negative timeout")]
    #[test_case("name = \"a\" describe = \"b\""; "missing comma")]
    fn parse_input_rejects(s: &str) {
        assert!(syn::parse_str::<Input>(s).is_err());
    }

    fn expand(args: &str, item: &str) -> syn::Result<String> {
        let input: Input = syn::parse_str(args)?;
        let item: syn::ItemFn = syn::parse_str(item)?;
        Ok(super::expand(input, item)?.to_string())
    }

    #[test]
    fn expands_into_factory() -> syn::Result<()> {
        let out = expand(
            "describe = \"fetches\", timeout = 500",
            "pub async fn load_user(t: UnitTest) -> eyre::Result<()> { Ok(()) }",
        )?;
        assert!(out.contains("pub fn load_user () -> :: tally :: TestFactory"), "{out}");
        assert!(out.contains("async fn __tally_load_user (t : UnitTest)"), "{out}");
        assert!(out.contains(":: tally :: Definition :: new (\"load_user\")"), "{out}");
        assert!(out.contains(". describe (\"fetches\")"), "{out}");
        assert!(out.contains("from_millis (500)"), "{out}");
        assert!(!out.contains("map_err"), "{out}");
        Ok(())
    }

    #[test]
    fn wraps_foreign_errors() -> syn::Result<()> {
        let out = expand(
            "name = \"Load User\"",
            "async fn load_user(t: UnitTest) -> anyhow::Result<()> { Ok(()) }",
        )?;
        assert!(out.contains(":: tally :: Definition :: new (\"Load User\")"), "{out}");
        assert!(out.contains("map_err"), "{out}");
        Ok(())
    }

    #[test_case("fn sync_fn(t: UnitTest) -> eyre::Result<()> { Ok(()) }"; "not async")]
    #[test_case("async fn no_args() -> eyre::Result<()> { Ok(()) }"; "no argument")]
    #[test_case("async fn two(a: UnitTest, b: u8) -> eyre::Result<()> { Ok(()) }"; "two arguments")]
    #[test_case("async fn unit(t: UnitTest) {}"; "no result")]
    fn rejects(item: &str) {
        assert!(expand("", item).is_err());
    }
}
